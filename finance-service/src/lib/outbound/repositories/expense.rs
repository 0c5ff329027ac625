use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::Category;
use crate::domain::expense::models::Expense;
use crate::domain::expense::models::ExpenseId;
use crate::domain::expense::models::TimeWindow;
use crate::domain::expense::ports::ExpenseRepository;
use crate::domain::user::models::UserId;

pub struct PostgresExpenseRepository {
    pool: PgPool,
}

impl PostgresExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ExpenseRow {
    id: Uuid,
    user_id: Uuid,
    category: String,
    amount: f64,
    description: String,
    transaction_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = ExpenseError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Expense {
            id: ExpenseId(row.id),
            user_id: UserId(row.user_id),
            category: row.category.parse::<Category>()?,
            amount: row.amount,
            description: row.description,
            transaction_at: row.transaction_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn to_i64(value: u64) -> Result<i64, ExpenseError> {
    i64::try_from(value).map_err(|e| ExpenseError::Unknown(e.to_string()))
}

#[async_trait]
impl ExpenseRepository for PostgresExpenseRepository {
    async fn create(&self, expense: Expense) -> Result<Expense, ExpenseError> {
        sqlx::query(
            r#"
            INSERT INTO expenses
                (id, user_id, category, amount, description, transaction_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(expense.id.0)
        .bind(expense.user_id.0)
        .bind(expense.category.as_str())
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(expense.transaction_at)
        .bind(expense.created_at)
        .bind(expense.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ExpenseError::DatabaseError(e.to_string()))?;

        Ok(expense)
    }

    async fn sum_between(
        &self,
        user_id: &UserId,
        window: &TimeWindow,
    ) -> Result<f64, ExpenseError> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(amount), 0)::DOUBLE PRECISION
            FROM expenses
            WHERE user_id = $1 AND transaction_at BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id.0)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ExpenseError::DatabaseError(e.to_string()))
    }

    async fn count_between(
        &self,
        user_id: &UserId,
        window: &TimeWindow,
    ) -> Result<u64, ExpenseError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM expenses
            WHERE user_id = $1 AND transaction_at BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id.0)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ExpenseError::DatabaseError(e.to_string()))?;

        u64::try_from(count).map_err(|e| ExpenseError::Unknown(e.to_string()))
    }

    async fn page_between(
        &self,
        user_id: &UserId,
        window: &TimeWindow,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Expense>, ExpenseError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT id, user_id, category, amount, description, transaction_at, created_at, updated_at
            FROM expenses
            WHERE user_id = $1 AND transaction_at BETWEEN $2 AND $3
            ORDER BY transaction_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(user_id.0)
        .bind(window.start)
        .bind(window.end)
        .bind(to_i64(limit)?)
        .bind(to_i64(offset)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ExpenseError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Expense::try_from).collect()
    }
}
