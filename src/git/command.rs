use super::GitError;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Spawns external processes with a shared working directory and timeout.
///
/// Children are killed when the awaiting future is dropped, so racing a call
/// against Ctrl-C never leaves a probe running.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    workdir: Option<PathBuf>,
    timeout: Option<Duration>,
    envs: Vec<(String, String)>,
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub command: String,
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Exit code, or `None` when the process was killed by a signal.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout followed by stderr, lossily decoded.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut out = String::from_utf8_lossy(&self.stdout).into_owned();
        out.push_str(&String::from_utf8_lossy(&self.stderr));
        out
    }

    pub fn stdout_text(&self) -> Result<String, GitError> {
        std::str::from_utf8(&self.stdout)
            .map(str::to_owned)
            .map_err(|_| GitError::InvalidUtf8 {
                command: self.command.clone(),
            })
    }

    /// Turn an unsuccessful outcome into the matching error.
    #[must_use]
    pub fn into_error(self) -> GitError {
        let output = self.combined();
        match self.code() {
            Some(code) => GitError::NonZeroExit {
                command: self.command,
                code,
                output,
            },
            None => GitError::Terminated {
                command: self.command,
                output,
            },
        }
    }
}

impl CommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Limit how long a captured command may run. Inherited-stdio runs are never limited.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set an environment variable for every spawned process.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn command(&self, program: &str, args: &[String]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            // Clear GIT_DIR so a hook environment does not redirect git
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .kill_on_drop(true);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run `program` to completion, capturing stdout and stderr.
    ///
    /// A non-zero exit is not an error here; callers classify it.
    pub async fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput, GitError> {
        let line = command_line(program, args);
        debug!("COMMAND: {line}");

        let child = self
            .command(program, args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                warn!("COMMAND FAILED: {line}, err: {source}");
                GitError::Spawn {
                    command: line.clone(),
                    source,
                }
            })?;

        let waited = child.wait_with_output();
        let result = match self.timeout {
            Some(limit) => {
                if let Ok(result) = tokio::time::timeout(limit, waited).await {
                    result
                } else {
                    warn!("COMMAND TIMED OUT: {line} after {limit:?}");
                    return Err(GitError::Timeout {
                        command: line,
                        timeout_secs: limit.as_secs(),
                    });
                }
            }
            None => waited.await,
        };
        let output = result.map_err(|source| {
            warn!("COMMAND FAILED: {line}, err: {source}");
            GitError::Spawn {
                command: line.clone(),
                source,
            }
        })?;

        let out = CommandOutput {
            command: line,
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        };
        if out.success() {
            debug!("COMMAND RETURNED: {}, output: {:?}", out.command, out.combined());
        } else {
            debug!(
                "COMMAND FAILED ({}): {}, output: {:?}",
                out.status,
                out.command,
                out.combined()
            );
        }
        Ok(out)
    }

    /// Run `program` attached to this process's stdin, stdout and stderr.
    pub async fn run_inherited(&self, program: &str, args: &[String]) -> Result<ExitStatus, GitError> {
        let line = command_line(program, args);
        debug!("COMMAND: {line}");
        let status = self
            .command(program, args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| {
                warn!("COMMAND FAILED: {line}, err: {source}");
                GitError::Spawn {
                    command: line.clone(),
                    source,
                }
            })?;
        debug!("COMMAND RETURNED ({status}): {line}");
        Ok(status)
    }
}

fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_output_captures_both_streams_in_order() {
        let out = CommandRunner::new()
            .output("sh", &args(&["-c", "printf err >&2; printf out"]))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.combined(), "outerr");
        assert_eq!(out.stdout_text().unwrap(), "out");
        assert_eq!(out.command, "sh -c printf err >&2; printf out");
    }

    #[tokio::test]
    async fn test_output_reports_non_zero_exit_without_error() {
        let out = CommandRunner::new()
            .output("sh", &args(&["-c", "echo nope; exit 5"]))
            .await
            .unwrap();
        assert_eq!(out.code(), Some(5));
        let err = out.into_error();
        assert!(matches!(err, GitError::NonZeroExit { code: 5, .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn test_output_spawn_failure() {
        let err = CommandRunner::new()
            .output("gitidentity-no-such-program", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_output_honours_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new().with_workdir(dir.path());
        assert_eq!(runner.workdir(), Some(dir.path()));

        let out = runner.output("pwd", &[]).await.unwrap();
        let reported = std::fs::canonicalize(out.stdout_text().unwrap().trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn test_output_passes_extra_env() {
        let out = CommandRunner::new()
            .with_env("GITIDENTITY_TEST_VALUE", "hello")
            .output("sh", &args(&["-c", "printf %s \"$GITIDENTITY_TEST_VALUE\""]))
            .await
            .unwrap();
        assert_eq!(out.combined(), "hello");
    }

    #[tokio::test]
    async fn test_output_times_out() {
        let err = CommandRunner::new()
            .with_timeout(Duration::from_millis(100))
            .output("sh", &args(&["-c", "sleep 5"]))
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_terminated_by_signal() {
        let out = CommandRunner::new()
            .output("sh", &args(&["-c", "kill -9 $$"]))
            .await
            .unwrap();
        assert_eq!(out.code(), None);
        assert!(matches!(out.into_error(), GitError::Terminated { .. }));
    }

    #[tokio::test]
    async fn test_run_inherited_returns_status() {
        let status = CommandRunner::new()
            .run_inherited("sh", &args(&["-c", "exit 3"]))
            .await
            .unwrap();
        assert_eq!(status.code(), Some(3));
    }
}
