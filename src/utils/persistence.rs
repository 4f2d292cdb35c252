use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Category, Transaction, UserId},
    errors::StoreError,
};

/// On-disk image of one user's collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserDocuments {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// File holding `user`'s documents inside `dir`. The name is the hex encoding
/// of the id's UTF-8 bytes, so distinct ids never share a file.
pub fn user_file(dir: &Path, user: &UserId) -> PathBuf {
    let encoded: String = user
        .as_str()
        .bytes()
        .map(|byte| format!("{byte:02x}"))
        .collect();
    dir.join(format!("user-{encoded}.json"))
}

/// Writes the documents atomically by staging to a temporary file.
pub fn save_user_documents(docs: &UserDocuments, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(docs)?;
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Loads a user's documents, returning empty collections when no file exists yet.
pub fn load_user_documents(path: &Path) -> Result<UserDocuments, StoreError> {
    if !path.exists() {
        return Ok(UserDocuments::default());
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
