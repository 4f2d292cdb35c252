//! Implicit category creation on the add-transaction path.
//!
//! Reconciliation checks a category snapshot and then writes. The two steps
//! are not atomic: two adds that read the same snapshot before either write
//! lands will both create the category.

use tracing::debug;

use crate::domain::{Category, TransactionKind, UserId};

use super::{CategoryService, ServiceResult};

/// Outcome of reconciling a typed category name.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// A category of the same type already matched; nothing was written.
    Existing(Category),
    Created(Category),
}

impl Reconciliation {
    pub fn category(&self) -> &Category {
        match self {
            Reconciliation::Existing(category) | Reconciliation::Created(category) => category,
        }
    }

    pub fn created(&self) -> Option<&Category> {
        match self {
            Reconciliation::Created(category) => Some(category),
            Reconciliation::Existing(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct CategoryReconciler {
    categories: CategoryService,
}

impl CategoryReconciler {
    pub fn new(categories: CategoryService) -> Self {
        Self { categories }
    }

    /// First category of `kind` whose name matches `name` case-insensitively.
    pub fn find_match<'a>(
        snapshot: &'a [Category],
        name: &str,
        kind: TransactionKind,
    ) -> Option<&'a Category> {
        snapshot
            .iter()
            .filter(|category| category.kind == kind)
            .find(|category| category.matches_name(name))
    }

    /// Ensures a category named `name` exists for `kind` according to
    /// `snapshot`, creating it with the name exactly as typed otherwise.
    pub async fn reconcile(
        &self,
        user: &UserId,
        snapshot: &[Category],
        name: &str,
        kind: TransactionKind,
    ) -> ServiceResult<Reconciliation> {
        if let Some(existing) = Self::find_match(snapshot, name, kind) {
            debug!(user = %user, name, matched = %existing.name, "reusing category");
            return Ok(Reconciliation::Existing(existing.clone()));
        }
        let created = self.categories.create(user, name, kind).await?;
        Ok(Reconciliation::Created(created))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::services::ServiceError;
    use crate::storage::MemoryStore;

    fn reconciler() -> (CategoryReconciler, CategoryService) {
        let categories = CategoryService::new(Arc::new(MemoryStore::new()));
        (CategoryReconciler::new(categories.clone()), categories)
    }

    #[test]
    fn match_ignores_other_types() {
        let snapshot = vec![Category::new("Bonus", TransactionKind::Income)];
        assert!(CategoryReconciler::find_match(&snapshot, "bonus", TransactionKind::Expense).is_none());
        assert!(CategoryReconciler::find_match(&snapshot, " BONUS ", TransactionKind::Income).is_some());
    }

    #[tokio::test]
    async fn creates_missing_category_with_typed_name() {
        let (reconciler, categories) = reconciler();
        let user = UserId::new("u");
        let outcome = reconciler
            .reconcile(&user, &[], "Coffee Shops", TransactionKind::Expense)
            .await
            .unwrap();
        let created = outcome.created().expect("created").clone();
        assert_eq!(created.name, "Coffee Shops");
        assert_eq!(categories.subscribe(&user).unwrap().current(), vec![created]);
    }

    #[tokio::test]
    async fn same_name_of_other_type_still_creates() {
        let (reconciler, categories) = reconciler();
        let user = UserId::new("u");
        let income = categories
            .create(&user, "Refunds", TransactionKind::Income)
            .await
            .unwrap();
        let outcome = reconciler
            .reconcile(&user, &[income], "refunds", TransactionKind::Expense)
            .await
            .unwrap();
        assert!(matches!(outcome, Reconciliation::Created(ref c) if c.kind == TransactionKind::Expense));
        assert_eq!(categories.subscribe(&user).unwrap().current().len(), 2);
    }

    #[tokio::test]
    async fn stale_snapshots_race_into_duplicates() {
        let (reconciler, categories) = reconciler();
        let user = UserId::new("u");
        let stale = categories.subscribe(&user).unwrap().current();

        let first = reconciler.reconcile(&user, &stale, "Travel", TransactionKind::Expense);
        let second = reconciler.reconcile(&user, &stale, "travel", TransactionKind::Expense);
        let (first, second) = tokio::join!(first, second);
        assert!(first.unwrap().created().is_some());
        assert!(second.unwrap().created().is_some());

        let names: Vec<_> = categories
            .subscribe(&user)
            .unwrap()
            .current()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Travel", "travel"]);
    }

    #[tokio::test]
    async fn blank_name_fails_validation() {
        let (reconciler, _) = reconciler();
        let err = reconciler
            .reconcile(&UserId::new("u"), &[], "  ", TransactionKind::Expense)
            .await
            .expect_err("blank");
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
