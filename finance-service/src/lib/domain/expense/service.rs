use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::FixedOffset;
use chrono::Utc;

use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::CreateExpenseCommand;
use crate::domain::expense::models::Expense;
use crate::domain::expense::models::ExpenseId;
use crate::domain::expense::models::MonthlySummary;
use crate::domain::expense::models::PageRequest;
use crate::domain::expense::models::TimeWindow;
use crate::domain::expense::ports::ExpenseRepository;
use crate::domain::expense::ports::ExpenseServicePort;
use crate::domain::user::models::UserId;

/// Domain service implementation for expense operations.
pub struct ExpenseService<ER>
where
    ER: ExpenseRepository,
{
    repository: Arc<ER>,
    time_zone: FixedOffset,
}

impl<ER> ExpenseService<ER>
where
    ER: ExpenseRepository,
{
    /// Create a new expense service.
    ///
    /// # Arguments
    /// * `repository` - Expense persistence implementation
    /// * `time_zone` - Zone whose calendar month bounds the summary
    pub fn new(repository: Arc<ER>, time_zone: FixedOffset) -> Self {
        Self {
            repository,
            time_zone,
        }
    }
}

#[async_trait]
impl<ER> ExpenseServicePort for ExpenseService<ER>
where
    ER: ExpenseRepository,
{
    async fn create_expense(
        &self,
        user_id: &UserId,
        command: CreateExpenseCommand,
    ) -> Result<Expense, ExpenseError> {
        if !command.amount.is_finite() || command.amount <= 0.0 {
            return Err(ExpenseError::InvalidAmount);
        }

        let description = command.description.trim();
        if description.is_empty() {
            return Err(ExpenseError::EmptyDescription);
        }

        let now = Utc::now();
        let expense = Expense {
            id: ExpenseId::new(),
            user_id: *user_id,
            category: command.category,
            amount: command.amount,
            description: description.to_string(),
            transaction_at: command.transaction_at,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(expense).await?;
        tracing::info!(
            expense_id = %created.id,
            user_id = %created.user_id,
            category = %created.category,
            "Expense created"
        );

        Ok(created)
    }

    async fn monthly_summary(
        &self,
        user_id: &UserId,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<MonthlySummary, ExpenseError> {
        let window = TimeWindow::month_to_date(now, self.time_zone);

        let amount = self.repository.sum_between(user_id, &window).await?;
        let total_items = self.repository.count_between(user_id, &window).await?;
        let data = self
            .repository
            .page_between(user_id, &window, page.limit(), page.offset())
            .await?;

        Ok(MonthlySummary {
            amount,
            data,
            current_page: page.page,
            last_page: page.last_page(total_items),
            total_items,
            per_page: page.per_page,
        })
    }
}
