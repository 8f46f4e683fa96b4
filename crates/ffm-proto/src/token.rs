//! Per-installation user token.
//!
//! The token is an opaque UUID-v4 minted on first use and persisted under
//! the data directory. It never changes afterwards; together with the
//! station name it forms the bearer credential for the audio service.

use std::path::{Path, PathBuf};

use anyhow::Context;
use uuid::Uuid;

const TOKEN_FILE: &str = "usertoken";

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(TOKEN_FILE),
        }
    }

    /// Return the persisted token, minting and persisting a fresh one on
    /// first call. Idempotent across restarts.
    pub fn get_or_create(&self) -> anyhow::Result<String> {
        if let Ok(existing) = std::fs::read_to_string(&self.path) {
            let existing = existing.trim();
            if !existing.is_empty() {
                return Ok(existing.to_string());
            }
        }

        let token = Uuid::new_v4().to_string();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&self.path, &token)
            .with_context(|| format!("writing {}", self.path.display()))?;
        tracing::info!("Minted new user token");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_stable_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let first = TokenStore::new(dir.path()).get_or_create().unwrap();
        let second = TokenStore::new(dir.path()).get_or_create().unwrap();
        assert_eq!(first, second);
        // UUID-v4 shape: 36 chars, hyphens in the usual places
        assert_eq!(first.len(), 36);
        assert_eq!(first.as_bytes()[14], b'4');
    }

    #[test]
    fn test_blank_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "  \n").unwrap();
        let token = TokenStore::new(dir.path()).get_or_create().unwrap();
        assert!(!token.trim().is_empty());
    }
}
