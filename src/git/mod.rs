//! Access to the external git tool: its key-value config store and the
//! repository's configured remotes.

mod cli;
mod command;
mod error;
mod remote;
mod store;

pub use cli::{GitCli, GIT_EXECUTABLE_ENV};
pub use command::{CommandOutput, CommandRunner};
pub use error::GitError;
pub use remote::{parse_remote_lines, GitInfo, Remote};
pub use store::{ConfigScope, ConfigStore};
