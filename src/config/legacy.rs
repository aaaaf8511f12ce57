//! Legacy (v1) configuration schema and its upgrade to the canonical shape.
//!
//! Never change the fields of these types: a v1 file or marker written by an
//! old release must keep decoding.

use super::types::{Config, Identity, CONFIG_VERSION, USER_EMAIL_KEY, USER_NAME_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag of the legacy generation.
pub const LEGACY_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyConfig {
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<LegacyIdentity>,
}

/// A v1 identity: just a name and an email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyIdentity {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

impl From<LegacyIdentity> for Identity {
    fn from(legacy: LegacyIdentity) -> Self {
        let mut values = BTreeMap::new();
        values.insert(USER_NAME_KEY.to_string(), legacy.name);
        values.insert(USER_EMAIL_KEY.to_string(), legacy.email);
        let mut identity = Identity {
            values,
            ..Identity::default()
        };
        identity.fill_identifier();
        identity
    }
}

impl From<LegacyConfig> for Config {
    fn from(legacy: LegacyConfig) -> Self {
        Config {
            version: CONFIG_VERSION.to_string(),
            list: legacy.list.into_iter().map(Identity::from).collect(),
        }
    }
}
