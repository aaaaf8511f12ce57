use super::{GitError, GitInfo};
use async_trait::async_trait;

/// Which layer of the config store a read consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// Repository-local config only.
    Local,
    /// User-wide config only.
    Global,
    /// Whatever git resolves across all layers.
    Effective,
}

/// Key-value configuration store of the external version-control tool.
///
/// Writes always target the repository-local scope.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read `key`; `Ok(None)` when the key is not set in `scope`.
    async fn get(&self, key: &str, scope: ConfigScope) -> Result<Option<String>, GitError>;

    /// Write a non-empty value.
    async fn write(&self, key: &str, value: &str) -> Result<(), GitError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn unset(&self, key: &str) -> Result<(), GitError>;

    /// Remotes configured for the repository.
    async fn remotes(&self) -> Result<GitInfo, GitError>;

    /// Write `value`, or remove the key when `value` is empty.
    async fn set(&self, key: &str, value: &str) -> Result<(), GitError> {
        if value.is_empty() {
            self.unset(key).await
        } else {
            self.write(key, value).await
        }
    }
}
