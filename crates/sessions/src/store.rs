//! Process-resident credential store.
//!
//! Maps an unguessable session identifier to the upstream credentials it
//! stands for.  Nothing is persisted: a restart drops every bundle, and
//! every outstanding session token then resolves to "not found".

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;

use tg_domain::error::{Error, Result};
use tg_domain::UpstreamCredentials;

/// Raw entropy per session identifier (128 bits).
const SESSION_ID_BYTES: usize = 16;

/// Fresh draws attempted before giving up on a colliding identifier.
const MAX_ID_ATTEMPTS: usize = 4;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Credential bundle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One user's upstream credential set.  Immutable once stored.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    /// Capability that unlocks this bundle.  Never logged.
    pub id: String,
    pub primary_token: String,
    pub secondary_token: String,
    pub refresh_token: String,
    /// Non-sensitive id used to join log lines for this session.
    pub correlation_id: String,
    pub created_at: DateTime<Utc>,
}

impl CredentialBundle {
    pub fn credentials(&self) -> UpstreamCredentials {
        UpstreamCredentials::new(
            self.primary_token.clone(),
            self.secondary_token.clone(),
            self.refresh_token.clone(),
        )
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("id", &"<redacted>")
            .field("correlation_id", &self.correlation_id)
            .field("created_at", &self.created_at)
            .field("has_refresh_token", &!self.refresh_token.is_empty())
            .finish_non_exhaustive()
    }
}

/// What [`CredentialStore::put`] hands back to the caller.
#[derive(Clone)]
pub struct StoredSession {
    pub id: String,
    pub correlation_id: String,
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Credential store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Concurrency-safe map from session id to [`CredentialBundle`].
///
/// Reads share the lock; `put` and `delete` take it exclusively only for
/// the single map mutation, so a reader sees a bundle either fully present
/// or fully absent.
#[derive(Default)]
pub struct CredentialStore {
    bundles: RwLock<HashMap<String, CredentialBundle>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a credential triple under a fresh random identifier.
    ///
    /// Fails only when the OS random source cannot produce an identifier.
    pub fn put(&self, primary: &str, secondary: &str, refresh: &str) -> Result<StoredSession> {
        let correlation_id = uuid::Uuid::new_v4().to_string();

        for _ in 0..MAX_ID_ATTEMPTS {
            // Entropy is drawn before taking the lock.
            let id = generate_session_id()?;
            let bundle = CredentialBundle {
                id: id.clone(),
                primary_token: primary.to_owned(),
                secondary_token: secondary.to_owned(),
                refresh_token: refresh.to_owned(),
                correlation_id: correlation_id.clone(),
                created_at: Utc::now(),
            };

            let mut bundles = self.bundles.write();
            if bundles.contains_key(&id) {
                continue;
            }
            bundles.insert(id.clone(), bundle);
            return Ok(StoredSession { id, correlation_id });
        }

        Err(Error::Entropy(
            "random source kept producing colliding session ids".into(),
        ))
    }

    /// Copy of the bundle stored under `id`, if any.
    pub fn get(&self, id: &str) -> Option<CredentialBundle> {
        self.bundles.read().get(id).cloned()
    }

    /// Remove the bundle stored under `id`.  Deleting an absent id is a
    /// no-op and returns `None`.
    pub fn delete(&self, id: &str) -> Option<CredentialBundle> {
        self.bundles.write().remove(id)
    }

    /// Drop every bundle created strictly before `cutoff`.  Returns how many
    /// were removed.
    pub fn purge_created_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut bundles = self.bundles.write();
        let before = bundles.len();
        bundles.retain(|_, b| b.created_at >= cutoff);
        before - bundles.len()
    }

    pub fn len(&self) -> usize {
        self.bundles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.read().is_empty()
    }
}

fn generate_session_id() -> Result<String> {
    let mut buf = [0u8; SESSION_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| Error::Entropy(e.to_string()))?;
    Ok(hex::encode(buf))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
