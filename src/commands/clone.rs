//! `git clone` with an identity applied through inline config flags.

use super::prompt::select_identity;
use super::Context;
use clap::Args;
use color_eyre::eyre::Result;
use gitidentity::{
    apply_identity_as_args, first_auto_matching_identity, ConfigScope, ConfigStore, GitInfo,
    IdentityManager, Remote,
};
use std::process::ExitCode;
use tracing::debug;

/// Config key git reads the default remote name from.
pub const CLONE_DEFAULT_REMOTE_NAME_KEY: &str = "clone.defaultRemoteName";

const DEFAULT_REMOTE_NAME: &str = "origin";

/// Short options of `git clone` that take a value.
const SHORT_WITH_VALUE: &[char] = &['b', 'c', 'j', 'o', 'u'];

/// Long options of `git clone` that take a value.
const LONG_WITH_VALUE: &[&str] = &[
    "branch",
    "bundle-uri",
    "config",
    "depth",
    "filter",
    "jobs",
    "origin",
    "ref-format",
    "reference",
    "reference-if-able",
    "revision",
    "separate-git-dir",
    "server-option",
    "shallow-exclude",
    "shallow-since",
    "template",
    "upload-pack",
];

#[derive(Args, Debug, Default)]
pub struct CloneArgs {
    /// Arguments passed to git clone as is
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<String>,
}

/// What `git clone` would make of its arguments, as far as remote naming goes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CloneScan {
    /// Last `-o`/`--origin` value.
    pub origin: Option<String>,
    /// Last `-c clone.defaultRemoteName=<name>` value.
    pub config_remote_name: Option<String>,
    /// Non-option arguments: repository and directory.
    pub positionals: Vec<String>,
}

impl CloneScan {
    fn record(&mut self, option: &str, value: String) {
        match option {
            "origin" => self.origin = Some(value),
            "config" => {
                if let Some((key, name)) = value.split_once('=') {
                    if key.eq_ignore_ascii_case(CLONE_DEFAULT_REMOTE_NAME_KEY) {
                        self.config_remote_name = Some(name.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    /// Remote name git will use: `--origin`, then `-c` overrides, then the
    /// configured default, then `origin`.
    #[must_use]
    pub fn remote_name(&self, configured: Option<String>) -> String {
        self.origin
            .clone()
            .or_else(|| self.config_remote_name.clone())
            .or(configured)
            .unwrap_or_else(|| DEFAULT_REMOTE_NAME.to_string())
    }

    /// Each positional argument as a possible url of the new remote.
    #[must_use]
    pub fn candidate_remotes(&self, remote_name: &str) -> GitInfo {
        GitInfo {
            remotes: self
                .positionals
                .iter()
                .map(|url| Remote::new(remote_name, url.as_str()))
                .collect(),
        }
    }
}

/// Walk `git clone` arguments the way git's option parser does.
#[must_use]
pub fn scan_clone_args(args: &[String]) -> CloneScan {
    let mut scan = CloneScan::default();
    let mut rest = args.iter();
    while let Some(arg) = rest.next() {
        if arg == "--" {
            scan.positionals.extend(rest.by_ref().cloned());
            break;
        }
        if let Some(long) = arg.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (long, None),
            };
            if !LONG_WITH_VALUE.contains(&name) {
                continue;
            }
            if let Some(value) = inline.or_else(|| rest.next().cloned()) {
                scan.record(name, value);
            }
        } else if let Some(pack) = arg.strip_prefix('-').filter(|p| !p.is_empty()) {
            // Flags may be packed; the first one taking a value consumes the rest
            for (pos, flag) in pack.char_indices() {
                if !SHORT_WITH_VALUE.contains(&flag) {
                    continue;
                }
                let attached = pack.get(pos + flag.len_utf8()..).unwrap_or_default();
                let value = if attached.is_empty() {
                    rest.next().cloned()
                } else {
                    Some(attached.to_string())
                };
                if let Some(value) = value {
                    scan.record(short_to_long(flag), value);
                }
                break;
            }
        } else {
            scan.positionals.push(arg.clone());
        }
    }
    scan
}

fn short_to_long(flag: char) -> &'static str {
    match flag {
        'o' => "origin",
        'c' => "config",
        _ => "",
    }
}

pub async fn run(ctx: &Context, args: &CloneArgs) -> Result<ExitCode> {
    let loaded = ctx.load_config().await?;
    let list = &loaded.config.list;
    let store = ctx.store();

    let configured = store
        .get(CLONE_DEFAULT_REMOTE_NAME_KEY, ConfigScope::Effective)
        .await
        .ok()
        .flatten()
        .filter(|name| !name.is_empty());
    let scan = scan_clone_args(&args.args);
    let remote_name = scan.remote_name(configured);
    debug!("clone remote name inferred as {remote_name:?}");

    let match_ctx = ctx.match_context(scan.candidate_remotes(&remote_name));
    let identity = match first_auto_matching_identity(list, &match_ctx).await? {
        Some(identity) => identity.clone(),
        None => select_identity(&IdentityManager::new(store), list).await?,
    };

    let mut git_args = vec!["clone".to_string()];
    git_args.extend(apply_identity_as_args(&identity)?);
    git_args.extend(args.args.iter().cloned());
    let status = ctx.runner.run_inherited(&ctx.git, &git_args).await?;
    Ok(status
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(args: &[&str]) -> CloneScan {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        scan_clone_args(&args)
    }

    #[test]
    fn test_defaults_to_origin() {
        let s = scan(&["https://example.com/x.git"]);
        assert_eq!(s.remote_name(None), "origin");
        assert_eq!(s.positionals, vec!["https://example.com/x.git"]);
    }

    #[test]
    fn test_configured_default_is_used() {
        let s = scan(&["https://example.com/x.git", "dir"]);
        assert_eq!(s.remote_name(Some("upstream".to_string())), "upstream");
        assert_eq!(s.positionals.len(), 2);
    }

    #[test]
    fn test_config_flag_overrides_configured_default() {
        for args in [
            &["-c", "clone.defaultRemoteName=fork", "url"][..],
            &["--config", "clone.defaultremotename=fork", "url"][..],
            &["--config=clone.defaultRemoteName=fork", "url"][..],
            &["-cclone.defaultRemoteName=fork", "url"][..],
        ] {
            let s = scan(args);
            assert_eq!(s.remote_name(Some("upstream".to_string())), "fork", "{args:?}");
            assert_eq!(s.positionals, vec!["url"], "{args:?}");
        }
    }

    #[test]
    fn test_other_config_flags_are_ignored() {
        let s = scan(&["-c", "user.name=X", "url"]);
        assert_eq!(s.config_remote_name, None);
        assert_eq!(s.remote_name(None), "origin");
    }

    #[test]
    fn test_origin_flag_wins() {
        let s = scan(&[
            "--origin",
            "first",
            "-c",
            "clone.defaultRemoteName=fork",
            "-o",
            "mine",
            "url",
        ]);
        assert_eq!(s.remote_name(Some("upstream".to_string())), "mine");
        assert_eq!(s.positionals, vec!["url"]);
    }

    #[test]
    fn test_origin_forms() {
        assert_eq!(scan(&["--origin=a", "u"]).origin.as_deref(), Some("a"));
        assert_eq!(scan(&["-ob", "u"]).origin.as_deref(), Some("b"));
        assert_eq!(scan(&["-qo", "c", "u"]).origin.as_deref(), Some("c"));
        assert_eq!(scan(&["-qvo", "d", "u"]).positionals, vec!["u"]);
    }

    #[test]
    fn test_packed_value_flag_consumes_the_rest() {
        // -b takes "o" as its value, so no origin is set
        let s = scan(&["-bo", "url"]);
        assert_eq!(s.origin, None);
        assert_eq!(s.positionals, vec!["url"]);
    }

    #[test]
    fn test_values_of_other_options_are_not_urls() {
        let s = scan(&["--depth", "1", "--branch=main", "-j", "4", "--bare", "url", "dir"]);
        assert_eq!(s.positionals, vec!["url", "dir"]);
    }

    #[test]
    fn test_double_dash_ends_options() {
        let s = scan(&["--", "-o", "weird"]);
        assert_eq!(s.origin, None);
        assert_eq!(s.positionals, vec!["-o", "weird"]);
    }

    #[test]
    fn test_missing_value_is_ignored() {
        let s = scan(&["url", "-o"]);
        assert_eq!(s.origin, None);
        assert_eq!(s.positionals, vec!["url"]);
    }

    #[test]
    fn test_candidate_remotes() {
        let s = scan(&["https://example.com/x.git", "x"]);
        let info = s.candidate_remotes("origin");
        assert_eq!(
            info.remotes,
            vec![
                Remote::new("origin", "https://example.com/x.git"),
                Remote::new("origin", "x"),
            ]
        );
    }
}
