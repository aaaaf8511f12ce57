//! Current / apply / unset of the repository identity.
//!
//! All state lives in the config store: the marker key remembers which keys
//! the last applied identity wrote, the keys themselves hold the live values.
//! Sub-steps are not rolled back; a failure stops at the step that failed.

use super::marker::{decode_marker, encode_marker, MARKER_KEY};
use super::IdentityError;
use crate::config::{Identity, USER_EMAIL_KEY, USER_NAME_KEY};
use crate::git::{ConfigScope, ConfigStore};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub struct IdentityManager<S> {
    store: S,
}

impl<S: ConfigStore> IdentityManager<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Identity currently applied to the repository.
    ///
    /// Without a marker this is [`IdentityError::NoCurrentIdentity`], unless
    /// `include_global` asks for a best-effort identity built from the
    /// effective name and email. With a marker, every key it lists is re-read
    /// from the store (all scopes when `include_global`, local otherwise).
    pub async fn current_identity(&self, include_global: bool) -> Result<Identity, IdentityError> {
        let Some(raw) = self.store.get(MARKER_KEY, ConfigScope::Local).await? else {
            if include_global {
                return self.name_and_email_identity(ConfigScope::Effective).await;
            }
            return Err(IdentityError::NoCurrentIdentity);
        };

        let mut identity = decode_marker(&raw)?;
        let scope = if include_global {
            ConfigScope::Effective
        } else {
            ConfigScope::Local
        };
        for (key, value) in &mut identity.values {
            *value = self.store.get(key, scope).await?.unwrap_or_default();
        }
        Ok(identity)
    }

    /// Identity made of the user-wide name and email.
    pub async fn global_identity(&self) -> Result<Identity, IdentityError> {
        self.name_and_email_identity(ConfigScope::Global).await
    }

    async fn name_and_email_identity(&self, scope: ConfigScope) -> Result<Identity, IdentityError> {
        let mut values = BTreeMap::new();
        for key in [USER_NAME_KEY, USER_EMAIL_KEY] {
            let value = self.store.get(key, scope).await?.unwrap_or_default();
            values.insert(key.to_string(), value);
        }
        let mut identity = Identity {
            values,
            ..Identity::default()
        };
        identity.fill_identifier();
        Ok(identity)
    }

    /// Remove every key the marker lists, the marker itself, then name and email.
    ///
    /// A missing marker is not an error. An undecodable one is logged and
    /// dropped; name and email are still cleared.
    pub async fn unset_current_identity(&self) -> Result<(), IdentityError> {
        if let Some(raw) = self.store.get(MARKER_KEY, ConfigScope::Local).await? {
            match decode_marker(&raw) {
                Ok(applied) => {
                    debug!("unsetting identity {:?}", applied.display());
                    for key in applied.values.keys() {
                        self.store.unset(key).await?;
                    }
                }
                Err(e) => warn!("dropping unreadable marker: {e}"),
            }
            self.store.unset(MARKER_KEY).await?;
        }
        self.store.unset(USER_NAME_KEY).await?;
        self.store.unset(USER_EMAIL_KEY).await?;
        Ok(())
    }

    /// Unset the current identity, then write `identity` if given.
    ///
    /// The marker is written before the values.
    pub async fn apply_identity(&self, identity: Option<&Identity>) -> Result<(), IdentityError> {
        self.unset_current_identity().await?;
        let Some(identity) = identity else {
            return Ok(());
        };

        let mut identity = identity.clone();
        identity.fill_identifier();
        debug!("applying identity {:?}", identity.identifier);
        self.store
            .set(MARKER_KEY, &encode_marker(&identity)?)
            .await?;
        for (key, value) in &identity.values {
            self.store.set(key, value).await?;
        }
        Ok(())
    }
}

/// Inline `--config=key=value` flags applying `identity`, marker first.
pub fn apply_identity_as_args(identity: &Identity) -> Result<Vec<String>, IdentityError> {
    let mut identity = identity.clone();
    identity.fill_identifier();
    let mut args = Vec::with_capacity(identity.values.len() + 1);
    args.push(format!("--config={MARKER_KEY}={}", encode_marker(&identity)?));
    args.extend(
        identity
            .values
            .iter()
            .map(|(key, value)| format!("--config={key}={value}")),
    );
    Ok(args)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;
