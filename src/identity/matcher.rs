//! Auto-matching of identities against live signals.
//!
//! Lists, matches and identities are evaluated in their given order and the
//! first decisive result wins, so order defines precedence between rules.

use super::IdentityError;
use crate::config::{
    Condition, Identity, Match, MatchCommand, MatchEnv, MatchList, MatchRemote, MatchShellScript,
};
use crate::git::{CommandRunner, GitInfo, Remote};
use std::sync::Arc;
use tracing::debug;

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Live signals a match is evaluated against.
#[derive(Clone)]
pub struct MatchContext {
    git_info: GitInfo,
    runner: CommandRunner,
    env: EnvLookup,
}

impl MatchContext {
    /// Context reading the process environment and running probes through `runner`.
    #[must_use]
    pub fn new(git_info: GitInfo, runner: CommandRunner) -> Self {
        Self {
            git_info,
            runner,
            env: Arc::new(process_env),
        }
    }

    /// Replace the environment lookup.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.env = Arc::new(lookup);
        self
    }

    fn env_var(&self, name: &str) -> Option<String> {
        (self.env)(name)
    }
}

fn process_env(name: &str) -> Option<String> {
    if name.is_empty() || name.contains(['=', '\0']) {
        return None;
    }
    std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
}

/// First identity, in list order, whose rules are satisfied.
///
/// Stops at the first evaluation error; nothing after it is tried.
pub async fn first_auto_matching_identity<'i>(
    identities: &'i [Identity],
    ctx: &MatchContext,
) -> Result<Option<&'i Identity>, IdentityError> {
    for identity in identities {
        if auto_match_identity(identity, ctx).await? {
            debug!("identity {:?} matched automatically", identity.display());
            return Ok(Some(identity));
        }
    }
    Ok(None)
}

/// True when any of the identity's match lists is fully satisfied.
pub async fn auto_match_identity(identity: &Identity, ctx: &MatchContext) -> Result<bool, IdentityError> {
    for list in &identity.auto_apply_when {
        let verdict = match_list(list, ctx)
            .await
            .map_err(|source| IdentityError::Match {
                identity: identity.display(),
                source: Box::new(source),
            })?;
        if verdict {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn match_list(list: &MatchList, ctx: &MatchContext) -> Result<bool, IdentityError> {
    if list.matches.is_empty() {
        return Ok(false);
    }
    for m in &list.matches {
        if !evaluate_match(m, ctx).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

async fn evaluate_match(m: &Match, ctx: &MatchContext) -> Result<bool, IdentityError> {
    match m {
        Match::Unset => Ok(false),
        Match::Env(env) => match_env(env, ctx),
        Match::Remote(remote) => match_remote(remote, ctx),
        Match::Command(command) => match_command(command, ctx).await,
        Match::ShellScript(script) => match_shell_script(script, ctx).await,
    }
}

fn match_env(m: &MatchEnv, ctx: &MatchContext) -> Result<bool, IdentityError> {
    let Some(value) = ctx.env_var(&m.name) else {
        return Ok(m.to.negate);
    };
    m.to
        .evaluate(&value)
        .map_err(|e| e.in_subject(format!("environment variable {:?}", m.name)))
}

fn match_remote(m: &MatchRemote, ctx: &MatchContext) -> Result<bool, IdentityError> {
    for remote in &ctx.git_info.remotes {
        if match_single_remote(m, remote)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn match_single_remote(m: &MatchRemote, remote: &Remote) -> Result<bool, IdentityError> {
    let name = m
        .name
        .evaluate(&remote.name)
        .map_err(|e| e.in_subject(format!("remote {:?} name", remote.name)))?;
    let url = m
        .url
        .evaluate(&remote.url)
        .map_err(|e| e.in_subject(format!("remote {:?} url", remote.name)))?;
    Ok(name && url)
}

async fn match_command(m: &MatchCommand, ctx: &MatchContext) -> Result<bool, IdentityError> {
    probe(&m.cmd, &m.args, &m.output, m.allow_non_zero_exit_code, ctx).await
}

async fn match_shell_script(m: &MatchShellScript, ctx: &MatchContext) -> Result<bool, IdentityError> {
    let (shell, flags) = platform_shell();
    let mut args: Vec<String> = flags.iter().map(ToString::to_string).collect();
    args.push(m.content.clone());
    probe(shell, &args, &m.output, m.allow_non_zero_exit_code, ctx).await
}

fn platform_shell() -> (&'static str, &'static [&'static str]) {
    if cfg!(windows) {
        ("powershell.exe", &["-NoProfile"])
    } else {
        ("sh", &["-c"])
    }
}

/// Run a probe and test its combined output.
///
/// A non-zero exit is a plain non-match unless explicitly allowed; launch
/// failures, signals and timeouts are always errors.
async fn probe(
    program: &str,
    args: &[String],
    output: &Condition,
    allow_non_zero_exit_code: bool,
    ctx: &MatchContext,
) -> Result<bool, IdentityError> {
    let out = ctx.runner.output(program, args).await?;
    match out.code() {
        None => return Err(out.into_error().into()),
        Some(code) if code != 0 && !allow_non_zero_exit_code => return Ok(false),
        Some(_) => {}
    }
    output
        .evaluate(&out.combined())
        .map_err(|e| e.in_subject("command output"))
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod matcher_tests;
