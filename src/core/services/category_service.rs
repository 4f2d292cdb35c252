use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{Category, Displayable, TransactionKind, UserId};
use crate::storage::{DocumentStore, Subscription};

use super::{ServiceError, ServiceResult};

/// Category management for one store. Names must not be blank; duplicate
/// names and type changes are accepted as-is.
#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn DocumentStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Live, name-ordered feed of the user's categories.
    pub fn subscribe(&self, user: &UserId) -> ServiceResult<Subscription<Category>> {
        Ok(self.store.subscribe_categories(user)?)
    }

    pub async fn create(
        &self,
        user: &UserId,
        name: &str,
        kind: TransactionKind,
    ) -> ServiceResult<Category> {
        Self::validate_name(name)?;
        let category = Category::new(name, kind);
        self.store.insert_category(user, category.clone()).await?;
        info!(user = %user, id = %category.id, label = %category.display_label(), "created category");
        Ok(category)
    }

    pub async fn update(
        &self,
        user: &UserId,
        id: Uuid,
        name: &str,
        kind: TransactionKind,
    ) -> ServiceResult<()> {
        Self::validate_name(name)?;
        self.store
            .update_category(user, id, name.to_string(), kind)
            .await?;
        info!(user = %user, %id, name, %kind, "updated category");
        Ok(())
    }

    /// Removes the category only. Transactions carrying its name are untouched.
    pub async fn delete(&self, user: &UserId, id: Uuid) -> ServiceResult<()> {
        self.store.delete_category(user, id).await?;
        info!(user = %user, %id, "deleted category");
        Ok(())
    }

    fn validate_name(candidate: &str) -> ServiceResult<()> {
        if candidate.trim().is_empty() {
            Err(ServiceError::Validation(
                "Category name must not be empty".into(),
            ))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn service() -> CategoryService {
        CategoryService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn blank_names_are_rejected_before_writing() {
        let service = service();
        let user = UserId::new("u");
        let feed = service.subscribe(&user).unwrap();
        for name in ["", "   ", "\t"] {
            let err = service
                .create(&user, name, TransactionKind::Expense)
                .await
                .expect_err("blank name must fail");
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        assert!(feed.current().is_empty());
    }

    #[tokio::test]
    async fn duplicates_and_type_changes_are_allowed() {
        let service = service();
        let user = UserId::new("u");
        let first = service
            .create(&user, "Gifts", TransactionKind::Expense)
            .await
            .unwrap();
        service
            .create(&user, "Gifts", TransactionKind::Expense)
            .await
            .unwrap();
        service
            .update(&user, first.id, "Gifts", TransactionKind::Income)
            .await
            .unwrap();

        let snapshot = service.subscribe(&user).unwrap().current();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot
            .iter()
            .any(|c| c.id == first.id && c.kind == TransactionKind::Income));
    }

    #[tokio::test]
    async fn update_validates_and_reports_missing_ids() {
        let service = service();
        let user = UserId::new("u");
        let err = service
            .update(&user, Uuid::new_v4(), " ", TransactionKind::Expense)
            .await
            .expect_err("blank");
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service
            .update(&user, Uuid::new_v4(), "Taxes", TransactionKind::Expense)
            .await
            .expect_err("missing");
        assert!(err.is_not_found());
    }
}
