use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::create_expense::ExpenseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::expense::models::MonthlySummary;
use crate::domain::expense::models::PageRequest;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn monthly_summary(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Query(query): Query<MonthlySummaryQuery>,
) -> Result<ApiSuccess<MonthlySummaryData>, ApiError> {
    state
        .expense_service
        .monthly_summary(&caller.user_id, query.page_request(), Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|ref summary| ApiSuccess::new(StatusCode::OK, summary.into()))
}

/// Raw query parameters; anything unparseable falls back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthlySummaryQuery {
    page: Option<String>,
    #[serde(rename = "perPage")]
    per_page: Option<String>,
}

impl MonthlySummaryQuery {
    fn page_request(&self) -> PageRequest {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(|v| v.trim().parse::<i64>().ok());
        PageRequest::new(parse(&self.page), parse(&self.per_page))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummaryData {
    pub amount: f64,
    pub data: Vec<ExpenseData>,
    pub current_page: u32,
    pub last_page: u64,
    pub total_items: u64,
    pub per_page: u32,
}

impl From<&MonthlySummary> for MonthlySummaryData {
    fn from(summary: &MonthlySummary) -> Self {
        Self {
            amount: summary.amount,
            data: summary.data.iter().map(ExpenseData::from).collect(),
            current_page: summary.current_page,
            last_page: summary.last_page,
            total_items: summary.total_items,
            per_page: summary.per_page,
        }
    }
}
