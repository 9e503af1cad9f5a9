//! Session manager: the only writer of the credential store.
//!
//! Session state for a bundle is `Absent -> Live -> Absent`; there is no
//! partially invalidated state.

use std::sync::Arc;

use chrono::{Duration, Utc};

use tg_domain::config::AuthConfig;
use tg_domain::error::{Error, Result};
use tg_domain::trace::TraceEvent;

use crate::store::CredentialStore;
use crate::token::{JwtCodec, TokenCodec, TokenError};
use crate::verdict::VerificationVerdict;

/// Extra age a bundle must reach past the token lifetime before a purge.
const PURGE_SLACK_SECS: i64 = 2;

pub struct SessionManager {
    store: Arc<CredentialStore>,
    codec: Arc<dyn TokenCodec>,
}

impl SessionManager {
    pub fn new(store: Arc<CredentialStore>, codec: Arc<dyn TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Manager with an empty store and a [`JwtCodec`] built from `[auth]`.
    /// A missing or short signing secret is an error here, never later.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let codec = JwtCodec::from_config(config)?;
        Ok(Self::new(Arc::new(CredentialStore::new()), Arc::new(codec)))
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Park a credential triple and return the session token for it.
    ///
    /// `primary` and `secondary` are required; `refresh` may be empty.
    pub fn create_session(&self, primary: &str, secondary: &str, refresh: &str) -> Result<String> {
        if primary.is_empty() {
            return Err(Error::InvalidArgument("primary token is required".into()));
        }
        if secondary.is_empty() {
            return Err(Error::InvalidArgument("secondary token is required".into()));
        }

        let stored = self.store.put(primary, secondary, refresh)?;

        let token = match self.codec.generate(&stored.id) {
            Ok(token) => token,
            Err(e) => {
                // No token will ever reference this bundle.
                self.store.delete(&stored.id);
                tracing::error!(
                    correlation_id = %stored.correlation_id,
                    error = %e,
                    "session token generation failed; bundle removed"
                );
                return Err(e);
            }
        };

        TraceEvent::SessionCreated {
            correlation_id: stored.correlation_id,
            has_refresh_token: !refresh.is_empty(),
        }
        .emit();

        Ok(token)
    }

    /// Classify a client-supplied token.  Never fails: bad input is a verdict.
    pub fn verify_session(&self, token: &str) -> VerificationVerdict {
        if token.is_empty() {
            return VerificationVerdict::NoToken;
        }

        let verdict = match self.codec.validate(token) {
            Err(TokenError::Malformed) => VerificationVerdict::Malformed,
            Err(TokenError::Expired) => VerificationVerdict::Expired,
            Ok(session_id) => match self.store.get(&session_id) {
                Some(bundle) => VerificationVerdict::Verified(bundle),
                None => VerificationVerdict::SessionNotFound,
            },
        };

        let correlation_id = match &verdict {
            VerificationVerdict::Verified(bundle) => Some(bundle.correlation_id.clone()),
            _ => None,
        };
        TraceEvent::SessionVerified {
            outcome: verdict.kind().to_string(),
            correlation_id,
        }
        .emit();

        verdict
    }

    /// Remove the bundle for `session_id`.  Always succeeds.
    pub fn destroy_session(&self, session_id: &str) {
        let removed = self.store.delete(session_id);
        TraceEvent::SessionDestroyed {
            existed: removed.is_some(),
            correlation_id: removed.map(|b| b.correlation_id),
        }
        .emit();
    }

    /// Revoke whatever bundle a correctly signed token points at, even if the
    /// token has expired.  Tokens that fail the signature check are ignored.
    pub fn destroy_session_by_token(&self, token: &str) {
        match self.codec.revocable_session_id(token) {
            Some(session_id) => self.destroy_session(&session_id),
            None => tracing::debug!("destroy ignored for unverifiable token"),
        }
    }

    /// Drop bundles older than the token lifetime.  No live token can still
    /// reference them.
    pub fn purge_expired(&self) -> usize {
        // `exp` is whole seconds and stays valid through its last second.
        let Some(cutoff) = Utc::now()
            .checked_sub_signed(self.codec.ttl())
            .and_then(|t| t.checked_sub_signed(Duration::seconds(PURGE_SLACK_SECS)))
        else {
            tracing::warn!("token lifetime too large to compute a purge cutoff; skipping sweep");
            return 0;
        };
        let removed = self.store.purge_created_before(cutoff);
        if removed > 0 {
            TraceEvent::SessionsPurged {
                removed,
                remaining: self.store.len(),
            }
            .emit();
        }
        removed
    }
}
