use super::{parse_remote_lines, CommandOutput, CommandRunner, ConfigScope, ConfigStore, GitError, GitInfo};
use async_trait::async_trait;

/// Environment variable naming the git executable to use.
pub const GIT_EXECUTABLE_ENV: &str = "GITIDENTITY_GIT_EXECUTABLE";

/// `git config --get` exit code for a key that is not set.
const GET_KEY_MISSING: i32 = 1;
/// `git config --unset` exit code for a key that does not exist.
const UNSET_KEY_MISSING: i32 = 5;

/// [`ConfigStore`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    runner: CommandRunner,
    executable: String,
}

impl GitCli {
    #[must_use]
    pub fn new(runner: CommandRunner) -> Self {
        Self {
            runner,
            executable: "git".to_string(),
        }
    }

    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    async fn git(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        self.runner.output(&self.executable, &args).await
    }
}

#[async_trait]
impl ConfigStore for GitCli {
    async fn get(&self, key: &str, scope: ConfigScope) -> Result<Option<String>, GitError> {
        let out = match scope {
            ConfigScope::Local => self.git(&["config", "--get", "--local", key]).await?,
            ConfigScope::Global => self.git(&["config", "--get", "--global", key]).await?,
            ConfigScope::Effective => self.git(&["config", "--get", key]).await?,
        };
        match out.code() {
            Some(0) => {
                let text = out.stdout_text()?;
                let value = text.strip_suffix('\n').unwrap_or(&text);
                let value = value.strip_suffix('\r').unwrap_or(value);
                Ok(Some(value.to_string()))
            }
            Some(GET_KEY_MISSING) => Ok(None),
            _ => Err(out.into_error()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), GitError> {
        let out = self.git(&["config", "--local", key, value]).await?;
        if out.success() {
            Ok(())
        } else {
            Err(out.into_error())
        }
    }

    async fn unset(&self, key: &str) -> Result<(), GitError> {
        let out = self.git(&["config", "--local", "--unset", key]).await?;
        match out.code() {
            Some(0 | UNSET_KEY_MISSING) => Ok(()),
            _ => Err(out.into_error()),
        }
    }

    async fn remotes(&self) -> Result<GitInfo, GitError> {
        let out = self.git(&["remote", "-v"]).await?;
        if !out.success() {
            return Err(out.into_error());
        }
        Ok(GitInfo {
            remotes: parse_remote_lines(&out.stdout_text()?),
        })
    }
}
