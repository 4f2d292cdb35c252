use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::period::{filter_period, PeriodSelector};
use crate::domain::{CalendarZone, Transaction, TransactionKind};

/// Totals derived from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub income_total: f64,
    pub expense_total: f64,
    /// Expense totals keyed by the exact category string on each transaction.
    pub category_totals: BTreeMap<String, f64>,
}

impl Summary {
    pub fn net_balance(&self) -> f64 {
        self.income_total - self.expense_total
    }
}

/// One slice of the expense breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub name: String,
    pub amount: f64,
    pub color: String,
    /// Fraction of the expense total, `0.0` when there are no expenses.
    pub share: f64,
}

/// Everything the dashboard shows for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub period: PeriodSelector,
    pub transaction_count: usize,
    pub summary: Summary,
    pub breakdown: Vec<CategorySlice>,
}

pub struct SummaryService;

impl SummaryService {
    /// Single pass over the snapshot. Category names are not normalized, so
    /// `"Food"` and `"food"` are separate buckets.
    pub fn aggregate<'a, I>(transactions: I) -> Summary
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .fold(Summary::default(), |mut summary, txn| {
                match txn.kind {
                    TransactionKind::Income => summary.income_total += txn.amount,
                    TransactionKind::Expense => {
                        summary.expense_total += txn.amount;
                        *summary
                            .category_totals
                            .entry(txn.category.clone())
                            .or_insert(0.0) += txn.amount;
                    }
                }
                summary
            })
    }

    /// Stable `#rrggbb` colour for a category name. Different names usually,
    /// but not always, get different colours.
    pub fn category_color(name: &str) -> String {
        let hash = name.encode_utf16().fold(0i32, |hash, unit| {
            i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
        });
        format!("#{:06x}", hash & 0x00FF_FFFF)
    }

    /// Breakdown slices ordered by amount (largest first), then by name.
    pub fn breakdown(summary: &Summary) -> Vec<CategorySlice> {
        let mut slices: Vec<CategorySlice> = summary
            .category_totals
            .iter()
            .map(|(name, amount)| CategorySlice {
                name: name.clone(),
                amount: *amount,
                color: Self::category_color(name),
                share: if summary.expense_total.abs() > f64::EPSILON {
                    amount / summary.expense_total
                } else {
                    0.0
                },
            })
            .collect();
        slices.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
        slices
    }

    /// Filters `snapshot` to `period` and summarizes the result.
    pub fn dashboard(
        snapshot: &[Transaction],
        period: &PeriodSelector,
        zone: &CalendarZone,
    ) -> Dashboard {
        let selected = filter_period(snapshot, period, zone);
        let summary = Self::aggregate(selected.iter().copied());
        Dashboard {
            period: period.clone(),
            transaction_count: selected.len(),
            breakdown: Self::breakdown(&summary),
            summary,
        }
    }
}
