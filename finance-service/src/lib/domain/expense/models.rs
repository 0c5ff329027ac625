use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Datelike;
use chrono::Days;
use chrono::Duration;
use chrono::FixedOffset;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::expense::errors::CategoryError;
use crate::domain::user::models::UserId;

/// Closed set of spending categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Food,
    Transportation,
    Housing,
    Health,
    Education,
    Entertainment,
    Clothing,
    Personal,
    Finance,
    Others,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Food,
        Category::Transportation,
        Category::Housing,
        Category::Health,
        Category::Education,
        Category::Entertainment,
        Category::Clothing,
        Category::Personal,
        Category::Finance,
        Category::Others,
    ];

    /// Wire names, in the same order as `ALL`.
    pub const NAMES: &'static [&'static str] = &[
        "FOOD",
        "TRANSPORTATION",
        "HOUSING",
        "HEALTH",
        "EDUCATION",
        "ENTERTAINMENT",
        "CLOTHING",
        "PERSONAL",
        "FINANCE",
        "OTHERS",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "FOOD",
            Category::Transportation => "TRANSPORTATION",
            Category::Housing => "HOUSING",
            Category::Health => "HEALTH",
            Category::Education => "EDUCATION",
            Category::Entertainment => "ENTERTAINMENT",
            Category::Clothing => "CLOTHING",
            Category::Personal => "PERSONAL",
            Category::Finance => "FINANCE",
            Category::Others => "OTHERS",
        }
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| CategoryError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expense unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpenseId(pub Uuid);

impl ExpenseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Expense entity, always owned by exactly one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub user_id: UserId,
    pub category: Category,
    pub amount: f64,
    pub description: String,
    pub transaction_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command to log a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseCommand {
    pub category: Category,
    pub amount: f64,
    pub description: String,
    pub transaction_at: DateTime<Utc>,
}

/// Interpret a wall-clock reading in the application time zone.
///
/// `None` when the instant falls outside the representable range.
pub fn from_local(local: NaiveDateTime, zone: FixedOffset) -> Option<DateTime<Utc>> {
    local
        .checked_sub_signed(Duration::seconds(i64::from(zone.local_minus_utc())))
        .map(|utc| Utc.from_utc_datetime(&utc))
}

/// Inclusive time range used for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// From the first day of `now`'s month at 00:00 in `zone` through `now`.
    pub fn month_to_date(now: DateTime<Utc>, zone: FixedOffset) -> Self {
        let local = now.with_timezone(&zone);
        let first_day = local.date_naive() - Days::new(u64::from(local.day0()));
        let elapsed = local.naive_local() - first_day.and_time(NaiveTime::MIN);

        Self {
            start: now - elapsed,
            end: now,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Normalized pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_PER_PAGE: u32 = 15;

    /// Build a request from raw client values.
    ///
    /// Missing or non-positive values fall back to page 1 and 15 per page.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let positive = |value: Option<i64>| {
            value
                .filter(|v| *v > 0)
                .and_then(|v| u32::try_from(v).ok())
        };

        Self {
            page: positive(page).unwrap_or(Self::DEFAULT_PAGE),
            per_page: positive(per_page).unwrap_or(Self::DEFAULT_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }

    /// Number of pages needed for `total_items` (0 when there are none).
    pub fn last_page(&self, total_items: u64) -> u64 {
        total_items.div_ceil(u64::from(self.per_page))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// Month-to-date spending of one user with one page of expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub amount: f64,
    pub data: Vec<Expense>,
    pub current_page: u32,
    pub last_page: u64,
    pub total_items: u64,
    pub per_page: u32,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sao_paulo() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("HEALTH".parse::<Category>(), Ok(Category::Health));
        assert_eq!(
            "health".parse::<Category>(),
            Err(CategoryError::Unknown("health".to_string()))
        );

        for (category, name) in Category::ALL.iter().zip(Category::NAMES) {
            assert_eq!(category.as_str(), *name);
        }
    }

    #[test]
    fn test_category_serializes_as_wire_name() {
        let json = serde_json::to_string(&Category::Transportation).unwrap();
        assert_eq!(json, "\"TRANSPORTATION\"");
    }

    #[test]
    fn test_local_time_converts_to_utc() {
        let local = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(21, 30, 0)
            .unwrap();

        let utc = from_local(local, sao_paulo());
        assert_eq!(utc, Some(Utc.with_ymd_and_hms(2024, 3, 6, 0, 30, 0).unwrap()));
    }

    #[test]
    fn test_local_time_out_of_range() {
        let latest = NaiveDateTime::MAX;
        assert_eq!(from_local(latest, sao_paulo()), None);
        assert!(from_local(latest, FixedOffset::east_opt(0).unwrap()).is_some());
    }

    #[test]
    fn test_month_window_uses_local_month() {
        // 02:00 UTC on April 1st is still March 31st in UTC-3
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 2, 0, 0).unwrap();

        let window = TimeWindow::month_to_date(now, sao_paulo());
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap()
        );
        assert_eq!(window.end, now);
        assert!(window.contains(now));
        assert!(!window.contains(window.start - Duration::seconds(1)));
    }

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::new(Some(0), Some(-5)),
            PageRequest {
                page: 1,
                per_page: 15
            }
        );
        assert_eq!(
            PageRequest::new(Some(3), Some(10)),
            PageRequest {
                page: 3,
                per_page: 10
            }
        );
    }

    #[test]
    fn test_page_math() {
        let request = PageRequest::new(Some(3), Some(10));

        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
        assert_eq!(request.last_page(0), 0);
        assert_eq!(request.last_page(10), 1);
        assert_eq!(request.last_page(21), 3);
    }
}
