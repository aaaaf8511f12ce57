use crate::git::GitError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    /// No identity was applied to the repository.
    #[error("no current identity: no identity was set")]
    NoCurrentIdentity,

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("compiling regexp {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("matching shell pattern: {0}")]
    InvalidShellPattern(String),

    #[error("failed to decode value of {key} config key: {reason}")]
    Marker { key: String, reason: String },

    #[error("matching {subject}: {source}")]
    Subject {
        subject: String,
        #[source]
        source: Box<IdentityError>,
    },

    #[error("identity {identity:?}: {source}")]
    Match {
        identity: String,
        #[source]
        source: Box<IdentityError>,
    },

    #[error("encoding identity marker: {0}")]
    Encode(#[source] serde_json::Error),
}

impl IdentityError {
    pub(crate) fn in_subject(self, subject: impl Into<String>) -> Self {
        Self::Subject {
            subject: subject.into(),
            source: Box::new(self),
        }
    }
}
