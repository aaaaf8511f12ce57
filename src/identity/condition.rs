//! String predicates used by every match subject.

use super::IdentityError;
use crate::config::{Condition, ConditionMode};
use regex::Regex;
use std::str::Chars;

impl Condition {
    /// Evaluate the predicate against `target`, then apply `negate`.
    ///
    /// Patterns are compiled on every call; a malformed one is an error, never a non-match.
    pub fn evaluate(&self, target: &str) -> Result<bool, IdentityError> {
        let value = self.value.as_str();
        let verdict = match self.mode {
            ConditionMode::Contains => target.contains(value),
            ConditionMode::Prefix => target.starts_with(value),
            ConditionMode::Suffix => target.ends_with(value),
            ConditionMode::Full => target == value,
            ConditionMode::ShellPattern => shell_pattern_regex(value)?.is_match(target),
            ConditionMode::Regexp => Regex::new(value)
                .map_err(|source| IdentityError::InvalidRegex {
                    pattern: value.to_string(),
                    source,
                })?
                .is_match(target),
        };
        Ok(verdict != self.negate)
    }
}

/// Compile a path-style shell pattern into an anchored regex.
///
/// `*` matches any run of non-`/` characters, `?` a single non-`/` character,
/// `[...]` a class (`[^...]` negated, `a-z` ranges) and `\` escapes the next
/// character. A leading `!` is an ordinary class member.
pub fn shell_pattern_regex(pattern: &str) -> Result<Regex, IdentityError> {
    let bad = |reason: &str| IdentityError::InvalidShellPattern(format!("{pattern:?}: {reason}"));

    let mut re = String::with_capacity(pattern.len() * 2 + 2);
    re.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '\\' => {
                let escaped = chars.next().ok_or_else(|| bad("trailing escape"))?;
                push_literal(&mut re, escaped);
            }
            '[' => push_class(&mut chars, &mut re).map_err(bad)?,
            _ => push_literal(&mut re, c),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| bad(&e.to_string()))
}

fn push_literal(re: &mut String, c: char) {
    let mut buf = [0u8; 4];
    re.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Translate a class body; `chars` is positioned right after the opening `[`.
fn push_class(chars: &mut Chars<'_>, re: &mut String) -> Result<(), &'static str> {
    let mut lookahead = chars.clone();
    let negated = lookahead.next() == Some('^');
    if negated {
        *chars = lookahead;
    }

    let mut body = String::new();
    let mut items = 0usize;
    loop {
        let c = chars.next().ok_or("unterminated character class")?;
        if c == ']' && items > 0 {
            break;
        }
        let lo = class_char(c, chars)?;
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('-') {
            *chars = lookahead;
            let next = chars.next().ok_or("unterminated character class")?;
            let hi = class_char(next, chars)?;
            if lo > hi {
                return Err("character range out of order");
            }
            push_literal(&mut body, lo);
            body.push('-');
            push_literal(&mut body, hi);
        } else {
            push_literal(&mut body, lo);
        }
        items += 1;
    }

    re.push('[');
    if negated {
        re.push('^');
    }
    re.push_str(&body);
    re.push(']');
    Ok(())
}

fn class_char(c: char, chars: &mut Chars<'_>) -> Result<char, &'static str> {
    match c {
        '-' | ']' => Err("unexpected character in character class"),
        '\\' => chars.next().ok_or("trailing escape"),
        _ => Ok(c),
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod condition_tests;
