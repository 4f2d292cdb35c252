//! Domain types representing user-defined categories.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Named, typed tag a user attaches to transactions.
///
/// Transactions copy the category name at write time, so renaming or deleting
/// a category never touches existing transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
        }
    }

    /// Case-insensitive comparison against user input, ignoring surrounding whitespace.
    pub fn matches_name(&self, candidate: &str) -> bool {
        normalized_name(&self.name) == normalized_name(candidate)
    }
}

pub(crate) fn normalized_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}
