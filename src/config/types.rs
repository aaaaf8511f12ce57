//! Canonical (v2) configuration schema.
//!
//! This is the only shape the match engine and the lifecycle manager ever
//! see. Older on-disk generations are upgraded into it by
//! [`super::legacy`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag written by this release.
pub const CONFIG_VERSION: &str = "v2";

/// Well-known git key holding the user name.
pub const USER_NAME_KEY: &str = "user.name";

/// Well-known git key holding the user email.
pub const USER_EMAIL_KEY: &str = "user.email";

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<Identity>,
}

impl Config {
    /// An empty configuration in the current schema generation.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            list: Vec::new(),
        }
    }
}

/// A named set of git configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Identity {
    /// Human-chosen label; derived from name and email when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identifier: String,
    /// Git configuration key to value, e.g. `user.name` -> `Alice`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
    /// The identity is auto-selected when any of these lists is satisfied.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        alias = "auto_apply_when"
    )]
    pub auto_apply_when: Vec<MatchList>,
}

impl Identity {
    /// Value of `key`, or an empty string when the identity does not set it.
    #[must_use]
    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.value(USER_NAME_KEY)
    }

    #[must_use]
    pub fn email(&self) -> &str {
        self.value(USER_EMAIL_KEY)
    }

    /// Display string: the identifier if set, otherwise `name <email>`
    /// (or `<email>` when the name is empty).
    #[must_use]
    pub fn display(&self) -> String {
        if !self.identifier.is_empty() {
            return self.identifier.clone();
        }
        let (name, email) = (self.name(), self.email());
        if name.is_empty() {
            format!("<{email}>")
        } else {
            format!("{name} <{email}>")
        }
    }

    /// Fill in the derived identifier when none was chosen.
    pub fn fill_identifier(&mut self) {
        self.identifier = self.display();
    }
}

/// Stable ascending sort by display string.
pub fn sort_identities(list: &mut [Identity]) {
    list.sort_by_cached_key(Identity::display);
}

/// AND-group of matches. An empty list never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchList {
    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<Match>,
}

/// A single predicate over one live signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMatch", into = "RawMatch")]
pub enum Match {
    /// No subject set. Never matches and never errors.
    #[default]
    Unset,
    Env(MatchEnv),
    Remote(MatchRemote),
    Command(MatchCommand),
    ShellScript(MatchShellScript),
}

/// Wire shape of [`Match`]: an object carrying at most one subject key.
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    env: Option<MatchEnv>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remote: Option<MatchRemote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<MatchCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "shell_script")]
    shell_script: Option<MatchShellScript>,
}

impl TryFrom<RawMatch> for Match {
    type Error = String;

    fn try_from(raw: RawMatch) -> Result<Self, Self::Error> {
        let mut subjects = Vec::with_capacity(1);
        if let Some(env) = raw.env {
            subjects.push(Match::Env(env));
        }
        if let Some(remote) = raw.remote {
            subjects.push(Match::Remote(remote));
        }
        if let Some(command) = raw.command {
            subjects.push(Match::Command(command));
        }
        if let Some(script) = raw.shell_script {
            subjects.push(Match::ShellScript(script));
        }
        if subjects.len() > 1 {
            return Err(format!(
                "match must have at most one subject, found {}",
                subjects.len()
            ));
        }
        Ok(subjects.pop().unwrap_or_default())
    }
}

impl From<Match> for RawMatch {
    fn from(m: Match) -> Self {
        let mut raw = RawMatch::default();
        match m {
            Match::Unset => {}
            Match::Env(env) => raw.env = Some(env),
            Match::Remote(remote) => raw.remote = Some(remote),
            Match::Command(command) => raw.command = Some(command),
            Match::ShellScript(script) => raw.shell_script = Some(script),
        }
        raw
    }
}

/// Match on an environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchEnv {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Condition::is_unset")]
    pub to: Condition,
}

/// Match on any configured remote whose name and url both satisfy their conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchRemote {
    #[serde(default, skip_serializing_if = "Condition::is_unset")]
    pub name: Condition,
    #[serde(default, skip_serializing_if = "Condition::is_unset")]
    pub url: Condition,
}

/// Match on the output of a probe command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchCommand {
    #[serde(default)]
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Condition::is_unset")]
    pub output: Condition,
    #[serde(
        default,
        skip_serializing_if = "is_false",
        alias = "allow_non_zero_exit_code"
    )]
    pub allow_non_zero_exit_code: bool,
}

/// Match on the output of a script run through the platform shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchShellScript {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Condition::is_unset")]
    pub output: Condition,
    #[serde(
        default,
        skip_serializing_if = "is_false",
        alias = "allow_non_zero_exit_code"
    )]
    pub allow_non_zero_exit_code: bool,
}

/// How a [`Condition`] compares its value against the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionMode {
    #[default]
    Contains,
    Prefix,
    Suffix,
    Full,
    ShellPattern,
    Regexp,
}

impl ConditionMode {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// String predicate with optional negation.
///
/// The default condition (`CONTAINS ""`, not negated) is true for every target,
/// which is what omitted conditions in the schema rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "ConditionMode::is_default")]
    pub mode: ConditionMode,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub negate: bool,
}

impl Condition {
    #[must_use]
    pub fn new(mode: ConditionMode, value: impl Into<String>) -> Self {
        Self {
            mode,
            value: value.into(),
            negate: false,
        }
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}
