use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    calendar::{CalendarZone, TransactionDate},
    common::{Identifiable, TransactionKind},
};

/// A single dated income or expense record.
///
/// `category` is a copy of the category name taken when the record was
/// written. It is not a reference and is never rewritten by category edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    pub date: TransactionDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        amount: f64,
        category: impl Into<String>,
        date: TransactionDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            category: category.into(),
            date,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Applies an edit. The transaction type is not part of [`TransactionChanges`]
    /// and therefore never changes here.
    pub fn apply(&mut self, changes: &TransactionChanges) {
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(category) = &changes.category {
            self.category = category.clone();
        }
        if let Some(date) = &changes.date {
            self.date = date.resolve(self.kind);
        }
        if let Some(notes) = &changes.notes {
            self.notes = notes.clone();
        }
    }

    /// Day shown in an edit form for this record.
    pub fn edit_date(&self, zone: &CalendarZone) -> NaiveDate {
        self.date.local_date(zone)
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Storage-level edit of a transaction. `None` fields are left untouched;
/// `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<DateChange>,
    pub notes: Option<Option<String>>,
}

/// A new day for a transaction, pre-normalized for both kinds since the
/// writer does not know the stored record's type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateChange {
    income: TransactionDate,
    expense: TransactionDate,
}

impl DateChange {
    pub fn new(date: NaiveDate, zone: &CalendarZone) -> Self {
        Self {
            income: TransactionDate::for_kind(TransactionKind::Income, date, zone),
            expense: TransactionDate::for_kind(TransactionKind::Expense, date, zone),
        }
    }

    pub fn resolve(&self, kind: TransactionKind) -> TransactionDate {
        match kind {
            TransactionKind::Income => self.income,
            TransactionKind::Expense => self.expense,
        }
    }
}

/// Result of reading a free-text amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedAmount {
    pub value: f64,
    /// Set when the input had no usable number and `value` was coerced to zero.
    pub coerced: bool,
}

impl ParsedAmount {
    /// Reads the longest leading decimal number from `raw` (`"12.5 USD"` reads
    /// as 12.5). Input without a finite leading number becomes zero.
    pub fn parse(raw: &str) -> Self {
        match leading_number(raw).filter(|value| value.is_finite()) {
            Some(value) => Self {
                value,
                coerced: false,
            },
            None => Self {
                value: 0.0,
                coerced: true,
            },
        }
    }
}

fn leading_number(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    text[..end].parse().ok()
}
