//! Common test utilities

#![allow(dead_code)] // Each test binary uses a different subset

use gitidentity::CommandRunner;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// True when a `git` executable can be spawned.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

/// A throwaway git repository with its own HOME and global config.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    /// `None` when git is not installed.
    pub fn new() -> Option<Self> {
        if !git_available() {
            eprintln!("git is not available, skipping");
            return None;
        }
        let sandbox = Self {
            dir: create_test_dir(),
        };
        std::fs::create_dir_all(sandbox.repo()).expect("Failed to create repo directory");
        std::fs::create_dir_all(sandbox.home()).expect("Failed to create home directory");
        sandbox.git_ok(&["init", "-q"]);
        Some(sandbox)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo(&self) -> PathBuf {
        self.root().join("repo")
    }

    pub fn home(&self) -> PathBuf {
        self.root().join("home")
    }

    pub fn global_config(&self) -> PathBuf {
        self.home().join(".gitconfig")
    }

    fn isolate(&self, cmd: &mut Command) {
        cmd.env("HOME", self.home())
            .env("GIT_CONFIG_GLOBAL", self.global_config())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .env_remove("GITIDENTITY_CONFIG")
            .env_remove("GITIDENTITY_DEBUG")
            .env_remove("GITIDENTITY_GIT_EXECUTABLE")
            .env_remove("RUST_LOG");
    }

    /// Runner confined to the sandbox, for driving the library directly.
    pub fn runner(&self) -> CommandRunner {
        CommandRunner::new()
            .with_workdir(self.repo())
            .with_env("HOME", self.home().to_string_lossy())
            .with_env("GIT_CONFIG_GLOBAL", self.global_config().to_string_lossy())
            .with_env("GIT_CONFIG_NOSYSTEM", "1")
    }

    /// Run git inside the repository.
    pub fn git(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(self.repo());
        self.isolate(&mut cmd);
        cmd.output().expect("Failed to run git")
    }

    pub fn git_ok(&self, args: &[&str]) -> String {
        let out = self.git(args);
        assert!(
            out.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8_lossy(&out.stdout).trim_end().to_string()
    }

    /// Local value of `key`, `None` when unset.
    pub fn local(&self, key: &str) -> Option<String> {
        let out = self.git(&["config", "--get", "--local", key]);
        out.status
            .success()
            .then(|| String::from_utf8_lossy(&out.stdout).trim_end().to_string())
    }

    /// Write a config file under the sandbox root and return its path.
    pub fn write_config(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.root().join(file_name);
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }

    /// Run the `gitidentity` binary in the repository, feeding `stdin`.
    pub fn gitidentity(&self, args: &[&str], stdin: &str) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gitidentity"));
        cmd.args(args)
            .current_dir(self.repo())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        self.isolate(&mut cmd);
        let mut child = cmd.spawn().expect("Failed to spawn gitidentity");
        if let Some(mut input) = child.stdin.take() {
            // The binary may exit before reading, ignore a broken pipe
            let _ = input.write_all(stdin.as_bytes());
        }
        child.wait_with_output().expect("Failed to wait for gitidentity")
    }
}

pub fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

pub fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}
