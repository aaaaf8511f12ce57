//! Sub-command implementations of the `gitidentity` binary.

pub mod add;
pub mod clone;
pub mod current;
pub mod prompt;
pub mod set;
pub mod unset;
pub mod version;

use gitidentity::{
    read_config, CommandRunner, ConfigError, GitCli, GitInfo, IdentityManager, LoadedConfig,
    MatchContext,
};
use std::path::PathBuf;

/// Settings shared by every sub-command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file; `None` means the default search list.
    pub config_path: Option<PathBuf>,
    pub runner: CommandRunner,
    pub git: String,
}

impl Context {
    #[must_use]
    pub fn store(&self) -> GitCli {
        GitCli::new(self.runner.clone()).with_executable(&self.git)
    }

    #[must_use]
    pub fn manager(&self) -> IdentityManager<GitCli> {
        IdentityManager::new(self.store())
    }

    #[must_use]
    pub fn match_context(&self, git_info: GitInfo) -> MatchContext {
        MatchContext::new(git_info, self.runner.clone())
    }

    pub async fn load_config(&self) -> Result<LoadedConfig, ConfigError> {
        read_config(self.config_path.as_deref()).await
    }
}
