use super::legacy::{LegacyConfig, LEGACY_VERSION};
use super::types::{sort_identities, Config, CONFIG_VERSION};
use super::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Human-editable serialization formats of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Format implied by a file extension; anything but `.yaml`/`.yml` is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Supported schema generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    V1,
    V2,
}

impl SchemaVersion {
    /// Validate a raw version tag.
    pub fn parse(version: &str) -> Result<Self, ConfigError> {
        if version.chars().any(char::is_whitespace) {
            return Err(ConfigError::Version(
                "version cannot contain whitespace characters".to_string(),
            ));
        }
        match version {
            "" => Err(ConfigError::Version(
                "unset version is unsupported".to_string(),
            )),
            LEGACY_VERSION => Ok(Self::V1),
            CONFIG_VERSION => Ok(Self::V2),
            other => Err(ConfigError::Version(format!(
                "version {other} is unsupported"
            ))),
        }
    }
}

/// Partial view of a config document; every other field is ignored.
#[derive(Deserialize)]
struct VersionTag {
    #[serde(default)]
    version: String,
}

/// Find and validate the version tag, trying JSON first and YAML second.
pub fn decode_version_tag(bytes: &[u8]) -> Result<(SchemaVersion, Format), ConfigError> {
    let (tag, format) = match serde_json::from_slice::<VersionTag>(bytes) {
        Ok(tag) => (tag, Format::Json),
        Err(_) => (serde_yaml::from_slice::<VersionTag>(bytes)?, Format::Yaml),
    };
    Ok((SchemaVersion::parse(&tag.version)?, format))
}

/// Decode a config document of any supported generation into the canonical shape.
///
/// The identities come back sorted by display string.
pub fn decode_config(bytes: &[u8]) -> Result<(Config, Format), ConfigError> {
    let (version, format) = decode_version_tag(bytes)?;
    let mut config = match version {
        SchemaVersion::V1 => Config::from(decode::<LegacyConfig>(bytes, format)?),
        SchemaVersion::V2 => decode::<Config>(bytes, format)?,
    };
    sort_identities(&mut config.list);
    Ok((config, format))
}

fn decode<T: DeserializeOwned>(bytes: &[u8], format: Format) -> Result<T, ConfigError> {
    Ok(match format {
        Format::Json => serde_json::from_slice(bytes)?,
        Format::Yaml => serde_yaml::from_slice(bytes)?,
    })
}

/// Pretty-print any schema value with 2-space indentation.
pub fn encode<T: Serialize + ?Sized>(value: &T, format: Format) -> Result<String, ConfigError> {
    Ok(match format {
        Format::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            out
        }
        Format::Yaml => serde_yaml::to_string(value)?,
    })
}

/// Serialize the canonical config with its identities in display order.
pub fn encode_config(config: &Config, format: Format) -> Result<String, ConfigError> {
    let mut sorted = config.clone();
    sort_identities(&mut sorted.list);
    encode(&sorted, format)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod codec_tests;
