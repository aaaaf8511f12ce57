//! In-memory [`ConfigStore`] for unit tests.

use crate::git::{ConfigScope, ConfigStore, GitError, GitInfo, Remote};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    local: Mutex<BTreeMap<String, String>>,
    global: BTreeMap<String, String>,
    remotes: Vec<Remote>,
    failing_key: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(self, key: &str, value: &str) -> Self {
        self.local
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_global(mut self, key: &str, value: &str) -> Self {
        self.global.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_remote(mut self, name: &str, url: &str) -> Self {
        self.remotes.push(Remote::new(name, url));
        self
    }

    /// Every operation touching `key` fails like a broken git would.
    pub fn failing_on(mut self, key: &str) -> Self {
        self.failing_key = Some(key.to_string());
        self
    }

    pub fn local(&self) -> BTreeMap<String, String> {
        self.local.lock().unwrap().clone()
    }

    fn check(&self, key: &str) -> Result<(), GitError> {
        if self.failing_key.as_deref() == Some(key) {
            return Err(GitError::NonZeroExit {
                command: format!("git config {key}"),
                code: 3,
                output: "error: could not lock config file".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, key: &str, scope: ConfigScope) -> Result<Option<String>, GitError> {
        self.check(key)?;
        let local = self.local.lock().unwrap().get(key).cloned();
        let global = self.global.get(key).cloned();
        Ok(match scope {
            ConfigScope::Local => local,
            ConfigScope::Global => global,
            ConfigScope::Effective => local.or(global),
        })
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), GitError> {
        self.check(key)?;
        self.local
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn unset(&self, key: &str) -> Result<(), GitError> {
        self.check(key)?;
        self.local.lock().unwrap().remove(key);
        Ok(())
    }

    async fn remotes(&self) -> Result<GitInfo, GitError> {
        Ok(GitInfo {
            remotes: self.remotes.clone(),
        })
    }
}
