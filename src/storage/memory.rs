//! In-process [`DocumentStore`] with per-user watch channels and optional
//! write-through JSON persistence.

use std::{
    collections::{hash_map::Entry, HashMap},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    domain::{
        Category, Identifiable, Transaction, TransactionChanges, TransactionKind, UserId,
    },
    errors::StoreError,
    utils::persistence::{load_user_documents, save_user_documents, user_file, UserDocuments},
};

use super::{
    order_categories, DocumentStore, Result, Subscription, TransactionQuery, CATEGORIES,
    TRANSACTIONS,
};

struct UserCollections {
    categories: watch::Sender<Arc<Vec<Category>>>,
    transactions: watch::Sender<Arc<Vec<Transaction>>>,
}

impl UserCollections {
    fn from_documents(docs: UserDocuments) -> Self {
        let (categories, _) = watch::channel(Arc::new(docs.categories));
        let (transactions, _) = watch::channel(Arc::new(docs.transactions));
        Self {
            categories,
            transactions,
        }
    }

    fn documents(&self) -> UserDocuments {
        UserDocuments {
            categories: Vec::clone(&self.categories.borrow()),
            transactions: Vec::clone(&self.transactions.borrow()),
        }
    }
}

/// Document store living in process memory. Every write publishes a new
/// snapshot to all subscribers of the affected user and collection.
///
/// Collections of every user touched stay loaded for the store's lifetime;
/// nothing is evicted.
pub struct MemoryStore {
    users: Mutex<HashMap<UserId, UserCollections>>,
    data_dir: Option<PathBuf>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            data_dir: None,
            available: AtomicBool::new(true),
        }
    }

    /// Store that loads each user's documents from `dir` on first access and
    /// rewrites the user's file before publishing every write.
    pub fn with_persistence(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            ..Self::new()
        }
    }

    /// Toggles simulated availability. While unavailable every call fails
    /// with [`StoreError::Unavailable`] and no state changes.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of live subscriptions across both collections of `user`.
    pub fn active_subscriptions(&self, user: &UserId) -> usize {
        let Ok(users) = self.lock() else {
            return 0;
        };
        let count = users.get(user).map_or(0, |collections| {
            collections.categories.receiver_count() + collections.transactions.receiver_count()
        });
        count
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            warn!("memory store is unavailable");
            Err(StoreError::Unavailable("store is offline".into()))
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, UserCollections>>> {
        self.users
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn collections<'a>(
        &self,
        users: &'a mut HashMap<UserId, UserCollections>,
        user: &UserId,
    ) -> Result<&'a mut UserCollections> {
        match users.entry(user.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let docs = match &self.data_dir {
                    Some(dir) => load_user_documents(&user_file(dir, user))?,
                    None => UserDocuments::default(),
                };
                debug!(
                    user = %user,
                    categories = docs.categories.len(),
                    transactions = docs.transactions.len(),
                    "opened user collections"
                );
                Ok(entry.insert(UserCollections::from_documents(docs)))
            }
        }
    }

    fn persist(&self, user: &UserId, docs: &UserDocuments) -> Result<()> {
        match &self.data_dir {
            Some(dir) => save_user_documents(docs, &user_file(dir, user)),
            None => Ok(()),
        }
    }

    fn write_categories<F>(&self, user: &UserId, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Category>) -> Result<()>,
    {
        self.ensure_available()?;
        let mut users = self.lock()?;
        let collections = self.collections(&mut users, user)?;
        let mut docs = collections.documents();
        edit(&mut docs.categories)?;
        self.persist(user, &docs)?;
        let count = docs.categories.len();
        collections.categories.send_replace(Arc::new(docs.categories));
        debug!(user = %user, count, "published categories snapshot");
        Ok(())
    }

    fn write_transactions<F>(&self, user: &UserId, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Transaction>) -> Result<()>,
    {
        self.ensure_available()?;
        let mut users = self.lock()?;
        let collections = self.collections(&mut users, user)?;
        let mut docs = collections.documents();
        edit(&mut docs.transactions)?;
        self.persist(user, &docs)?;
        let count = docs.transactions.len();
        collections
            .transactions
            .send_replace(Arc::new(docs.transactions));
        debug!(user = %user, count, "published transactions snapshot");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_category(&self, user: &UserId, category: Category) -> Result<()> {
        self.write_categories(user, |docs| {
            docs.push(category);
            Ok(())
        })
    }

    async fn update_category(
        &self,
        user: &UserId,
        id: Uuid,
        name: String,
        kind: TransactionKind,
    ) -> Result<()> {
        self.write_categories(user, |docs| {
            let category = docs
                .iter_mut()
                .find(|category| category.id() == id)
                .ok_or_else(|| StoreError::NotFound {
                    collection: CATEGORIES,
                    id: id.to_string(),
                })?;
            category.name = name;
            category.kind = kind;
            Ok(())
        })
    }

    async fn delete_category(&self, user: &UserId, id: Uuid) -> Result<()> {
        self.write_categories(user, |docs| {
            docs.retain(|category| category.id() != id);
            Ok(())
        })
    }

    fn subscribe_categories(&self, user: &UserId) -> Result<Subscription<Category>> {
        self.ensure_available()?;
        let mut users = self.lock()?;
        let rx = self.collections(&mut users, user)?.categories.subscribe();
        Ok(Subscription::new(rx, order_categories))
    }

    async fn insert_transaction(&self, user: &UserId, transaction: Transaction) -> Result<()> {
        self.write_transactions(user, |docs| {
            docs.push(transaction);
            Ok(())
        })
    }

    async fn update_transaction(
        &self,
        user: &UserId,
        id: Uuid,
        changes: TransactionChanges,
    ) -> Result<()> {
        self.write_transactions(user, |docs| {
            let transaction = docs
                .iter_mut()
                .find(|txn| txn.id() == id)
                .ok_or_else(|| StoreError::NotFound {
                    collection: TRANSACTIONS,
                    id: id.to_string(),
                })?;
            transaction.apply(&changes);
            Ok(())
        })
    }

    async fn delete_transaction(&self, user: &UserId, id: Uuid) -> Result<()> {
        self.write_transactions(user, |docs| {
            docs.retain(|txn| txn.id() != id);
            Ok(())
        })
    }

    fn subscribe_transactions(
        &self,
        user: &UserId,
        query: TransactionQuery,
    ) -> Result<Subscription<Transaction>> {
        self.ensure_available()?;
        let mut users = self.lock()?;
        let rx = self.collections(&mut users, user)?.transactions.subscribe();
        Ok(Subscription::new(rx, move |docs: &[Transaction]| query.apply(docs)))
    }
}
