//! Snapshot of the applied identity stored under a reserved config key.
//!
//! The value is compact JSON tagged with `@type`, so snapshots written by a
//! release using the legacy schema still decode.

use super::IdentityError;
use crate::config::{Identity, LegacyIdentity};
use serde::{Deserialize, Serialize};

/// Config key recording the last applied identity.
pub const MARKER_KEY: &str = "gitidentity.lastAppliedIdentity";

#[derive(Serialize, Deserialize)]
#[serde(tag = "@type")]
enum Marker {
    #[serde(rename = "type.googleapis.com/gitidentity.config.v1.Identity")]
    Legacy(LegacyIdentity),
    #[serde(rename = "type.googleapis.com/gitidentity.config.v2.Identity")]
    Current(Identity),
}

pub fn encode_marker(identity: &Identity) -> Result<String, IdentityError> {
    serde_json::to_string(&Marker::Current(identity.clone())).map_err(IdentityError::Encode)
}

/// Decode a snapshot of either schema generation into the canonical shape.
pub fn decode_marker(raw: &str) -> Result<Identity, IdentityError> {
    let marker: Marker = serde_json::from_str(raw).map_err(|e| IdentityError::Marker {
        key: MARKER_KEY.to_string(),
        reason: e.to_string(),
    })?;
    Ok(match marker {
        Marker::Legacy(legacy) => Identity::from(legacy),
        Marker::Current(identity) => identity,
    })
}
