//! Identity engine: condition predicates, auto-matching, and the lifecycle
//! of the identity applied to a repository.

mod condition;
mod error;
mod lifecycle;
mod marker;
mod matcher;
#[cfg(test)]
pub(crate) mod testing;

pub use condition::shell_pattern_regex;
pub use error::IdentityError;
pub use lifecycle::{apply_identity_as_args, IdentityManager};
pub use marker::{decode_marker, encode_marker, MARKER_KEY};
pub use matcher::{auto_match_identity, first_auto_matching_identity, MatchContext};

use crate::config::Identity;

/// Display strings of `list`, in order.
#[must_use]
pub fn identities_as_strings(list: &[Identity]) -> Vec<String> {
    list.iter().map(Identity::display).collect()
}
