//! Per-user facade tying the stores, the reconciler and the derived views together.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::core::clock::{Clock, SystemClock};
use crate::core::period::PeriodSelector;
use crate::core::services::{
    CategoryReconciler, CategoryService, Dashboard, Reconciliation, Recorded, ServiceResult,
    SummaryService, TransactionDraft, TransactionPatch, TransactionService,
};
use crate::core::services::NumericLeniencyWarning;
use crate::config::Config;
use crate::domain::{CalendarZone, Category, Transaction, TransactionKind, UserId};
use crate::identity::IdentityProvider;
use crate::storage::{DocumentStore, Subscription};

/// Result of the add-transaction flow.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub reconciliation: Reconciliation,
    pub recorded: Recorded,
}

impl RecordOutcome {
    pub fn transaction(&self) -> &Transaction {
        &self.recorded.transaction
    }

    pub fn created_category(&self) -> Option<&Category> {
        self.reconciliation.created()
    }
}

/// Live dashboard: recomputes the period view on every transactions snapshot.
pub struct DashboardFeed {
    feed: Subscription<Transaction>,
    period: PeriodSelector,
    zone: CalendarZone,
}

impl DashboardFeed {
    pub fn set_period(&mut self, period: PeriodSelector) {
        self.period = period;
    }

    pub fn current(&self) -> Dashboard {
        SummaryService::dashboard(&self.feed.current(), &self.period, &self.zone)
    }

    pub async fn next(&mut self) -> Option<Dashboard> {
        let snapshot = self.feed.next().await?;
        Some(SummaryService::dashboard(&snapshot, &self.period, &self.zone))
    }
}

/// Facade over one signed-in user's ledger.
///
/// The session keeps a category subscription open for reconciliation. Close it
/// (or drop it) when the user signs out.
pub struct LedgerSession {
    user: UserId,
    categories: CategoryService,
    transactions: TransactionService,
    reconciler: CategoryReconciler,
    category_feed: Subscription<Category>,
}

impl LedgerSession {
    /// Opens a session for the identity's current user. Returns `None` when
    /// nobody is signed in; no subscription is created in that case.
    pub fn open(
        identity: &dyn IdentityProvider,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        zone: CalendarZone,
    ) -> ServiceResult<Option<Self>> {
        let Some(user) = identity.current_user() else {
            debug!("no signed-in user, session not opened");
            return Ok(None);
        };
        Self::for_user(user, store, clock, zone).map(Some)
    }

    /// Opens a session using the system clock and the configured zone.
    pub fn open_with_config(
        identity: &dyn IdentityProvider,
        store: Arc<dyn DocumentStore>,
        config: &Config,
    ) -> ServiceResult<Option<Self>> {
        Self::open(identity, store, Arc::new(SystemClock), config.zone())
    }

    pub fn for_user(
        user: UserId,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        zone: CalendarZone,
    ) -> ServiceResult<Self> {
        let categories = CategoryService::new(Arc::clone(&store));
        let transactions = TransactionService::new(store, clock, zone);
        let category_feed = categories.subscribe(&user)?;
        info!(user = %user, "ledger session opened");
        Ok(Self {
            reconciler: CategoryReconciler::new(categories.clone()),
            user,
            categories,
            transactions,
            category_feed,
        })
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn zone(&self) -> CalendarZone {
        self.transactions.zone()
    }

    /// Latest category snapshot, ordered by name.
    pub fn categories(&self) -> Vec<Category> {
        self.category_feed.current()
    }

    /// Categories offered when entering a transaction of `kind`.
    pub fn categories_of(&self, kind: TransactionKind) -> Vec<Category> {
        self.categories()
            .into_iter()
            .filter(|category| category.kind == kind)
            .collect()
    }

    /// Reconciles the draft's category against the latest category snapshot,
    /// then writes the transaction. Not atomic: if the transaction write fails
    /// a freshly created category stays behind.
    pub async fn record_transaction(&self, draft: TransactionDraft) -> ServiceResult<RecordOutcome> {
        let snapshot = self.category_feed.current();
        let reconciliation = self
            .reconciler
            .reconcile(&self.user, &snapshot, &draft.category, draft.kind)
            .await?;
        let recorded = self.transactions.add(&self.user, draft).await?;
        Ok(RecordOutcome {
            reconciliation,
            recorded,
        })
    }

    /// Edits never reconcile categories.
    pub async fn edit_transaction(
        &self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> ServiceResult<Option<NumericLeniencyWarning>> {
        self.transactions.update(&self.user, id, patch).await
    }

    pub async fn delete_transaction(&self, id: Uuid) -> ServiceResult<()> {
        self.transactions.remove(&self.user, id).await
    }

    pub async fn create_category(&self, name: &str, kind: TransactionKind) -> ServiceResult<Category> {
        self.categories.create(&self.user, name, kind).await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        name: &str,
        kind: TransactionKind,
    ) -> ServiceResult<()> {
        self.categories.update(&self.user, id, name, kind).await
    }

    pub async fn delete_category(&self, id: Uuid) -> ServiceResult<()> {
        self.categories.delete(&self.user, id).await
    }

    /// Newest-first history of one transaction type.
    pub fn history(&self, kind: TransactionKind) -> ServiceResult<Subscription<Transaction>> {
        self.transactions.subscribe(&self.user, Some(kind))
    }

    /// Every transaction regardless of type.
    pub fn all_transactions(&self) -> ServiceResult<Subscription<Transaction>> {
        self.transactions.subscribe(&self.user, None)
    }

    pub fn dashboard(&self, snapshot: &[Transaction], period: &PeriodSelector) -> Dashboard {
        SummaryService::dashboard(snapshot, period, &self.zone())
    }

    pub fn dashboard_feed(&self, period: PeriodSelector) -> ServiceResult<DashboardFeed> {
        Ok(DashboardFeed {
            feed: self.all_transactions()?,
            period,
            zone: self.zone(),
        })
    }

    /// Tears down the session's own subscriptions.
    pub fn close(self) {
        info!(user = %self.user, "ledger session closed");
        self.category_feed.unsubscribe();
    }
}
