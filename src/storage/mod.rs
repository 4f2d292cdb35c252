pub mod memory;
pub mod subscription;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    domain::{
        CalendarZone, Category, NamedEntity, Transaction, TransactionChanges, TransactionKind,
        UserId,
    },
    errors::StoreError,
};

pub use memory::MemoryStore;
pub use subscription::Subscription;

pub type Result<T> = std::result::Result<T, StoreError>;

pub const CATEGORIES: &str = "categories";
pub const TRANSACTIONS: &str = "transactions";

/// Abstraction over the live document store holding each user's
/// "categories" and "transactions" collections.
///
/// Writes give no read-your-writes guarantee: callers observe their effect
/// through the next subscription snapshot.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_category(&self, user: &UserId, category: Category) -> Result<()>;
    async fn update_category(
        &self,
        user: &UserId,
        id: Uuid,
        name: String,
        kind: TransactionKind,
    ) -> Result<()>;
    /// Deleting an id that is not present is not an error.
    async fn delete_category(&self, user: &UserId, id: Uuid) -> Result<()>;
    /// Categories ordered by name.
    fn subscribe_categories(&self, user: &UserId) -> Result<Subscription<Category>>;

    async fn insert_transaction(&self, user: &UserId, transaction: Transaction) -> Result<()>;
    async fn update_transaction(
        &self,
        user: &UserId,
        id: Uuid,
        changes: TransactionChanges,
    ) -> Result<()>;
    /// Deleting an id that is not present is not an error.
    async fn delete_transaction(&self, user: &UserId, id: Uuid) -> Result<()>;
    fn subscribe_transactions(
        &self,
        user: &UserId,
        query: TransactionQuery,
    ) -> Result<Subscription<Transaction>>;
}

/// Equality filter on type plus newest-first ordering. Calendar-day dates are
/// placed at local midnight in `zone`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub kind: Option<TransactionKind>,
    pub zone: CalendarZone,
}

impl TransactionQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_kind(kind: TransactionKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn in_zone(mut self, zone: CalendarZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn apply(&self, docs: &[Transaction]) -> Vec<Transaction> {
        let mut selected: Vec<Transaction> = docs
            .iter()
            .filter(|txn| self.kind.map_or(true, |kind| txn.kind == kind))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.date.sort_key(&self.zone).cmp(&a.date.sort_key(&self.zone)));
        selected
    }
}

/// Orders categories by name, byte-wise and case-sensitive.
pub fn order_categories(docs: &[Category]) -> Vec<Category> {
    let mut ordered = docs.to_vec();
    ordered.sort_by(|a, b| a.name().cmp(b.name()));
    ordered
}
