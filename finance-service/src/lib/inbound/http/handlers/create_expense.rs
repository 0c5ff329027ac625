use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::FixedOffset;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use validation::Constraint;
use validation::DateLayout;
use validation::FieldRule;
use validation::InputShape;
use validation::ValidationErrors;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::expense::models::from_local;
use crate::domain::expense::models::Category;
use crate::domain::expense::models::CreateExpenseCommand;
use crate::domain::expense::models::Expense;
use crate::inbound::http::extract::ValidatedJson;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Wall-clock layout of `transactionAt`, read in the application time zone.
pub const TRANSACTION_LAYOUT: DateLayout = DateLayout::new("%Y-%m-%d %H:%M", "YYYY-MM-DD HH:MM");

pub async fn create_expense(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    ValidatedJson(body): ValidatedJson<CreateExpenseRequest>,
) -> Result<ApiSuccess<ExpenseData>, ApiError> {
    let command = body.try_into_command(state.time_zone)?;

    state
        .expense_service
        .create_expense(&caller.user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref expense| ApiSuccess::new(StatusCode::CREATED, expense.into()))
}

/// HTTP request body for logging an expense (raw JSON)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    category: String,
    amount: f64,
    description: String,
    transaction_at: String,
}

impl InputShape for CreateExpenseRequest {
    const RULES: &'static [FieldRule] = &[
        FieldRule::text(
            "category",
            &[Constraint::Required, Constraint::OneOf(Category::NAMES)],
        ),
        FieldRule::number("amount", &[Constraint::Required, Constraint::Positive]),
        FieldRule::text(
            "description",
            &[Constraint::Required, Constraint::MaxLength(255)],
        ),
        FieldRule::timestamp(
            "transactionAt",
            TRANSACTION_LAYOUT,
            &[
                Constraint::Required,
                Constraint::DateFormat(TRANSACTION_LAYOUT),
            ],
        ),
    ];
}

impl CreateExpenseRequest {
    fn try_into_command(self, zone: FixedOffset) -> Result<CreateExpenseCommand, ApiError> {
        let category = self.category.parse::<Category>().map_err(|_| {
            ValidationErrors::single("category", Constraint::OneOf(Category::NAMES).message())
        })?;

        if self.description.trim().is_empty() {
            let errors = ValidationErrors::single("description", Constraint::Required.message());
            return Err(errors.into());
        }

        let transaction_at = TRANSACTION_LAYOUT
            .parse(&self.transaction_at)
            .and_then(|local| from_local(local, zone))
            .ok_or_else(|| {
                ValidationErrors::single("transactionAt", TRANSACTION_LAYOUT.message())
            })?;

        Ok(CreateExpenseCommand {
            category,
            amount: self.amount,
            description: self.description,
            transaction_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseData {
    pub id: String,
    pub user_id: String,
    pub category: Category,
    pub amount: f64,
    pub description: String,
    pub transaction_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseData {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.to_string(),
            user_id: expense.user_id.to_string(),
            category: expense.category,
            amount: expense.amount,
            description: expense.description.clone(),
            transaction_at: expense.transaction_at,
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}
