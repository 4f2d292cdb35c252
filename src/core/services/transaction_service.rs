//! Business logic helpers for managing transactions.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::domain::{
    CalendarZone, DateChange, ParsedAmount, Transaction, TransactionChanges, TransactionDate,
    TransactionKind, UserId,
};
use crate::storage::{DocumentStore, Subscription, TransactionQuery};

use super::{NumericLeniencyWarning, ServiceResult};

/// User input for a new transaction, as entered in a form.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: String,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl TransactionDraft {
    pub fn new(kind: TransactionKind, amount: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            kind,
            amount: amount.into(),
            category: category.into(),
            date: None,
            notes: None,
        }
    }

    pub fn expense(amount: impl Into<String>, category: impl Into<String>) -> Self {
        Self::new(TransactionKind::Expense, amount, category)
    }

    pub fn income(amount: impl Into<String>, category: impl Into<String>) -> Self {
        Self::new(TransactionKind::Income, amount, category)
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Edit form contents. There is deliberately no way to change the type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub notes: Option<Option<String>>,
}

/// A transaction handed to the store, plus any leniency applied to its input.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub transaction: Transaction,
    pub warning: Option<NumericLeniencyWarning>,
}

/// Provides CRUD helpers and live feeds for a user's transactions.
#[derive(Clone)]
pub struct TransactionService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    zone: CalendarZone,
}

impl TransactionService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, zone: CalendarZone) -> Self {
        Self { store, clock, zone }
    }

    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    /// Newest-first feed, restricted to `kind` when given.
    pub fn subscribe(
        &self,
        user: &UserId,
        kind: Option<TransactionKind>,
    ) -> ServiceResult<Subscription<Transaction>> {
        Ok(self
            .store
            .subscribe_transactions(user, TransactionQuery { kind, zone: self.zone })?)
    }

    /// Writes a new transaction. Category reconciliation is the caller's job.
    pub async fn add(&self, user: &UserId, draft: TransactionDraft) -> ServiceResult<Recorded> {
        let (amount, warning) = read_amount(&draft.amount);
        let date = match draft.date {
            Some(date) => TransactionDate::for_kind(draft.kind, date, &self.zone),
            None => TransactionDate::default_for_kind(draft.kind, self.clock.now(), &self.zone),
        };
        let mut transaction = Transaction::new(draft.kind, amount, draft.category, date);
        transaction.notes = draft.notes;
        self.store
            .insert_transaction(user, transaction.clone())
            .await?;
        info!(
            user = %user,
            id = %transaction.id,
            kind = %transaction.kind,
            amount = transaction.amount,
            category = %transaction.category,
            date = %transaction.date,
            "added transaction"
        );
        Ok(Recorded {
            transaction,
            warning,
        })
    }

    /// Applies an edit to amount, category, date or notes.
    pub async fn update(
        &self,
        user: &UserId,
        id: Uuid,
        patch: TransactionPatch,
    ) -> ServiceResult<Option<NumericLeniencyWarning>> {
        let (amount, warning) = match patch.amount.as_deref() {
            Some(raw) => {
                let (value, warning) = read_amount(raw);
                (Some(value), warning)
            }
            None => (None, None),
        };
        let changes = TransactionChanges {
            amount,
            category: patch.category,
            date: patch.date.map(|date| DateChange::new(date, &self.zone)),
            notes: patch.notes,
        };
        self.store.update_transaction(user, id, changes).await?;
        info!(user = %user, %id, "updated transaction");
        Ok(warning)
    }

    pub async fn remove(&self, user: &UserId, id: Uuid) -> ServiceResult<()> {
        self.store.delete_transaction(user, id).await?;
        info!(user = %user, %id, "removed transaction");
        Ok(())
    }
}

fn read_amount(raw: &str) -> (f64, Option<NumericLeniencyWarning>) {
    let parsed = ParsedAmount::parse(raw);
    if parsed.coerced {
        warn!(input = raw, "amount is not a number, storing 0");
        (
            parsed.value,
            Some(NumericLeniencyWarning {
                input: raw.to_string(),
            }),
        )
    } else {
        (parsed.value, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::services::ServiceError;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn service() -> TransactionService {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 8, 15, 0).unwrap();
        TransactionService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock(now)),
            CalendarZone::utc(),
        )
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn undated_drafts_use_the_clock() {
        let service = service();
        let user = UserId::new("u");
        let income = service
            .add(&user, TransactionDraft::income("100", "Salary"))
            .await
            .unwrap();
        assert_eq!(income.transaction.date.to_string(), "2024-03-20");
        let expense = service
            .add(&user, TransactionDraft::expense("5", "Snacks"))
            .await
            .unwrap();
        assert_eq!(expense.transaction.date.to_string(), "2024-03-20T08:15:00.000Z");
    }

    #[tokio::test]
    async fn unparsable_amount_is_stored_as_zero_with_warning() {
        let service = service();
        let user = UserId::new("u");
        let recorded = service
            .add(&user, TransactionDraft::expense("twelve", "Misc").on(day(2024, 3, 1)))
            .await
            .unwrap();
        assert_eq!(recorded.transaction.amount, 0.0);
        assert_eq!(
            recorded.warning,
            Some(NumericLeniencyWarning {
                input: "twelve".into()
            })
        );
    }

    #[tokio::test]
    async fn feed_is_filtered_by_type_and_newest_first() {
        let service = service();
        let user = UserId::new("u");
        let mut expenses = service
            .subscribe(&user, Some(TransactionKind::Expense))
            .unwrap();
        assert_eq!(expenses.next().await, Some(Vec::new()));

        service
            .add(&user, TransactionDraft::expense("1", "A").on(day(2024, 1, 5)))
            .await
            .unwrap();
        service
            .add(&user, TransactionDraft::income("9", "Pay").on(day(2024, 1, 9)))
            .await
            .unwrap();
        let newest = service
            .add(&user, TransactionDraft::expense("2", "B").on(day(2024, 2, 1)))
            .await
            .unwrap();

        let snapshot = expenses.next().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0], newest.transaction);
    }

    #[tokio::test]
    async fn update_touches_only_editable_fields() {
        let service = service();
        let user = UserId::new("u");
        let recorded = service
            .add(&user, TransactionDraft::income("100", "Salary").on(day(2024, 3, 1)))
            .await
            .unwrap();
        let id = recorded.transaction.id;

        let warning = service
            .update(
                &user,
                id,
                TransactionPatch {
                    amount: Some("150.25".into()),
                    category: Some("Wages".into()),
                    date: Some(day(2024, 3, 2)),
                    notes: Some(Some("raise".into())),
                },
            )
            .await
            .unwrap();
        assert!(warning.is_none());

        let stored = service.subscribe(&user, None).unwrap().current();
        assert_eq!(stored.len(), 1);
        let txn = &stored[0];
        assert_eq!(txn.kind, TransactionKind::Income);
        assert_eq!(txn.amount, 150.25);
        assert_eq!(txn.category, "Wages");
        assert_eq!(txn.date, TransactionDate::Calendar(day(2024, 3, 2)));
        assert_eq!(txn.notes.as_deref(), Some("raise"));
    }

    #[tokio::test]
    async fn update_and_remove_of_unknown_ids() {
        let service = service();
        let user = UserId::new("u");
        let err = service
            .update(&user, Uuid::new_v4(), TransactionPatch::default())
            .await
            .expect_err("unknown id");
        assert!(matches!(err, ServiceError::Store(_)));
        assert!(err.is_not_found());
        service.remove(&user, Uuid::new_v4()).await.unwrap();
    }
}
