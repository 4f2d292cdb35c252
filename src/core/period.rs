//! Month/year restriction of transaction snapshots.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{CalendarZone, Transaction};

/// Optional month (`"01"`..`"12"`) and year (`"2024"`) criteria.
///
/// Criteria are compared as text against the zero-padded components of each
/// transaction's local date, so a malformed selector simply matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelector {
    pub month: Option<String>,
    pub year: Option<String>,
}

impl PeriodSelector {
    /// Empty strings count as "not selected".
    pub fn new(month: Option<&str>, year: Option<&str>) -> Self {
        let keep = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Self {
            month: keep(month),
            year: keep(year),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn month_of(year: i32, month: u32) -> Self {
        Self {
            month: Some(format!("{:02}", month)),
            year: Some(format!("{:04}", year)),
        }
    }

    pub fn year(year: i32) -> Self {
        Self {
            month: None,
            year: Some(format!("{:04}", year)),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.month.is_none() && self.year.is_none()
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        let month_ok = self
            .month
            .as_deref()
            .map_or(true, |month| month == format!("{:02}", date.month()));
        let year_ok = self
            .year
            .as_deref()
            .map_or(true, |year| year == format!("{:04}", date.year()));
        month_ok && year_ok
    }
}

/// Transactions whose local date falls in the selected period, in input order.
pub fn filter_period<'a>(
    transactions: &'a [Transaction],
    selector: &PeriodSelector,
    zone: &CalendarZone,
) -> Vec<&'a Transaction> {
    if selector.is_unfiltered() {
        return transactions.iter().collect();
    }
    transactions
        .iter()
        .filter(|txn| selector.matches(txn.date.local_date(zone)))
        .collect()
}

/// Distinct years present in `transactions`, newest first. Feeds year pickers.
pub fn available_years(transactions: &[Transaction], zone: &CalendarZone) -> Vec<i32> {
    let mut years: Vec<i32> = transactions
        .iter()
        .map(|txn| txn.date.local_date(zone).year())
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}
