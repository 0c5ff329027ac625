use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::expense::errors::ExpenseError;
use crate::domain::expense::models::CreateExpenseCommand;
use crate::domain::expense::models::Expense;
use crate::domain::expense::models::MonthlySummary;
use crate::domain::expense::models::PageRequest;
use crate::domain::expense::models::TimeWindow;
use crate::domain::user::models::UserId;

/// Port for expense domain service operations.
#[async_trait]
pub trait ExpenseServicePort: Send + Sync + 'static {
    /// Log an expense for a user.
    ///
    /// # Arguments
    /// * `user_id` - Owner of the expense (the authenticated principal)
    /// * `command` - Category, amount, description and transaction time
    ///
    /// # Returns
    /// Stored expense entity
    ///
    /// # Errors
    /// * `InvalidAmount` - Amount is not greater than zero
    /// * `EmptyDescription` - Description is blank
    /// * `DatabaseError` - Database operation failed
    async fn create_expense(
        &self,
        user_id: &UserId,
        command: CreateExpenseCommand,
    ) -> Result<Expense, ExpenseError>;

    /// Summarize a user's spending from the start of the current month.
    ///
    /// # Arguments
    /// * `user_id` - Whose expenses to summarize
    /// * `page` - Normalized pagination parameters
    /// * `now` - Upper bound of the window
    ///
    /// # Returns
    /// Total amount plus one page of expenses, newest first
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn monthly_summary(
        &self,
        user_id: &UserId,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<MonthlySummary, ExpenseError>;
}

/// Persistence operations for expenses.
///
/// Every query is scoped to a single owner and an inclusive time window.
#[async_trait]
pub trait ExpenseRepository: Send + Sync + 'static {
    /// Persist a new expense.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, expense: Expense) -> Result<Expense, ExpenseError>;

    /// Sum of amounts inside the window (0 when empty).
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn sum_between(&self, user_id: &UserId, window: &TimeWindow)
        -> Result<f64, ExpenseError>;

    /// Number of expenses inside the window.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn count_between(
        &self,
        user_id: &UserId,
        window: &TimeWindow,
    ) -> Result<u64, ExpenseError>;

    /// One page of expenses inside the window, newest transaction first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn page_between(
        &self,
        user_id: &UserId,
        window: &TimeWindow,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Expense>, ExpenseError>;
}
