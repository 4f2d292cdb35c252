pub mod category_reconciler;
pub mod category_service;
pub mod summary_service;
pub mod transaction_service;

pub use category_reconciler::{CategoryReconciler, Reconciliation};
pub use category_service::CategoryService;
pub use summary_service::{CategorySlice, Dashboard, Summary, SummaryService};
pub use transaction_service::{Recorded, TransactionDraft, TransactionPatch, TransactionService};

use crate::errors::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Rejected locally before anything was written.
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Store(StoreError::NotFound { .. }))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ServiceError::Store(StoreError::Unavailable(_)))
    }
}

/// Non-fatal notice that an amount could not be read and was stored as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericLeniencyWarning {
    pub input: String,
}
