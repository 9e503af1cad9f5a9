//! Signed session tokens.
//!
//! A session token is an HS256 JWT whose only payload of substance is the
//! session id (`jti`).  No record of issued tokens is kept; revoking one
//! means deleting the bundle it points at.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use tg_domain::config::{AuthConfig, MAX_TOKEN_TTL_HOURS};
use tg_domain::error::{Error, Result};

/// Shortest signing secret accepted at startup.
pub const MIN_SECRET_BYTES: usize = 32;

/// The only signature algorithm accepted on validation.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Unparsable, wrong algorithm, bad signature or foreign issuer.
    #[error("malformed session token")]
    Malformed,
    #[error("session token expired")]
    Expired,
}

/// Produces and checks session tokens.
pub trait TokenCodec: Send + Sync {
    /// Sign a token for `session_id`.  Fails only on key misconfiguration.
    fn generate(&self, session_id: &str) -> Result<String>;

    /// Return the session id embedded in a valid, unexpired token.
    fn validate(&self, token: &str) -> std::result::Result<String, TokenError>;

    /// Session id of a correctly signed token, expired or not.  Used for
    /// logout so a stale cookie still revokes its bundle.
    fn revocable_session_id(&self, token: &str) -> Option<String>;

    /// Lifetime stamped into new tokens.
    fn ttl(&self) -> Duration;
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    jti: String,
    iat: i64,
    nbf: i64,
    exp: i64,
    iss: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HS256 codec
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    issuer: String,
}

impl JwtCodec {
    pub fn new(secret: &[u8], ttl: Duration, issuer: impl Into<String>) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config("session signing secret is empty".into()));
        }
        if secret.len() < MIN_SECRET_BYTES {
            return Err(Error::Config(format!(
                "session signing secret must be at least {MIN_SECRET_BYTES} bytes (got {})",
                secret.len()
            )));
        }
        let issuer = issuer.into();

        let mut validation = Validation::new(ALGORITHM);
        validation.algorithms = vec![ALGORITHM];
        // Expiry is checked by hand against an explicit clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.required_spec_claims = HashSet::from(["exp".to_owned(), "iss".to_owned()]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            issuer,
        })
    }

    /// Build the codec from `[auth]`, reading the secret inline or from the
    /// configured environment variable.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let secret = match &config.secret {
            Some(s) if !s.is_empty() => s.clone(),
            _ => std::env::var(&config.secret_env).map_err(|_| {
                Error::Config(format!(
                    "session signing secret not set (export {})",
                    config.secret_env
                ))
            })?,
        };
        if config.token_ttl_hours == 0 || config.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(Error::Config(format!(
                "token_ttl_hours must be between 1 and {MAX_TOKEN_TTL_HOURS} (got {})",
                config.token_ttl_hours
            )));
        }
        Self::new(
            secret.as_bytes(),
            Duration::hours(i64::from(config.token_ttl_hours)),
            config.issuer.clone(),
        )
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn generate_at(&self, session_id: &str, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let exp = now.checked_add_signed(self.ttl).ok_or_else(|| {
            Error::Signing(format!("token lifetime {} overflows the clock", self.ttl))
        })?;
        let claims = SessionClaims {
            jti: session_id.to_owned(),
            iat,
            nbf: iat,
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
        };
        encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| Error::Signing(e.to_string()))
    }

    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<String, TokenError> {
        let claims = self.decode_verified(token)?;
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims.jti)
    }

    fn decode_verified(&self, token: &str) -> std::result::Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
            TokenError::Malformed
        })?;
        if data.claims.jti.is_empty() {
            return Err(TokenError::Malformed);
        }
        Ok(data.claims)
    }
}

impl TokenCodec for JwtCodec {
    fn generate(&self, session_id: &str) -> Result<String> {
        self.generate_at(session_id, Utc::now())
    }

    fn validate(&self, token: &str) -> std::result::Result<String, TokenError> {
        self.validate_at(token, Utc::now())
    }

    fn revocable_session_id(&self, token: &str) -> Option<String> {
        self.decode_verified(token).ok().map(|c| c.jti)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn codec() -> JwtCodec {
        JwtCodec::new(SECRET, Duration::hours(24), "tradegate-auth-service").unwrap()
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = JwtCodec::new(b"too-short", Duration::hours(1), "iss").err().unwrap();
        assert!(matches!(err, Error::Config(_)));
        assert!(JwtCodec::new(b"", Duration::hours(1), "iss").is_err());
    }

    #[test]
    fn unrepresentable_expiry_is_a_signing_error() {
        let codec = JwtCodec::new(SECRET, Duration::MAX, "tradegate-auth-service").unwrap();
        assert!(matches!(codec.generate("sid"), Err(Error::Signing(_))));
    }

    #[test]
    fn from_config_bounds_token_lifetime() {
        let mut config = AuthConfig {
            secret: Some(String::from_utf8_lossy(SECRET).into_owned()),
            token_ttl_hours: u32::MAX,
            ..AuthConfig::default()
        };
        assert!(matches!(JwtCodec::from_config(&config), Err(Error::Config(_))));

        config.token_ttl_hours = 0;
        assert!(matches!(JwtCodec::from_config(&config), Err(Error::Config(_))));

        config.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        let codec = JwtCodec::from_config(&config).unwrap();
        assert!(codec.generate("sid").is_ok());
    }

    #[test]
    fn generate_then_validate_returns_session_id() {
        let codec = codec();
        let token = codec.generate("abc123").unwrap();
        assert_eq!(codec.validate(&token).unwrap(), "abc123");
    }

    #[test]
    fn expiry_boundary_has_no_leeway() {
        let codec = codec();
        let issued = Utc::now();
        let token = codec.generate_at("sid", issued).unwrap();
        let exp = issued + Duration::hours(24);
        assert_eq!(codec.validate_at(&token, exp).unwrap(), "sid");
        assert_eq!(
            codec.validate_at(&token, exp + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn expired_token_is_still_revocable() {
        let codec = codec();
        let token = codec
            .generate_at("sid", Utc::now() - Duration::hours(48))
            .unwrap();
        assert_eq!(codec.validate(&token), Err(TokenError::Expired));
        assert_eq!(codec.revocable_session_id(&token).as_deref(), Some("sid"));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.validate("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(codec.validate("a.b.c"), Err(TokenError::Malformed));
        assert!(codec.revocable_session_id("a.b.c").is_none());
    }

    #[test]
    fn foreign_secret_is_malformed() {
        let other = JwtCodec::new(
            b"ffffffffffffffffffffffffffffffff",
            Duration::hours(24),
            "tradegate-auth-service",
        )
        .unwrap();
        let token = other.generate("sid").unwrap();
        assert_eq!(codec().validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn foreign_issuer_is_malformed() {
        let other = JwtCodec::new(SECRET, Duration::hours(24), "someone-else").unwrap();
        let token = other.generate("sid").unwrap();
        assert_eq!(codec().validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn every_signature_byte_matters() {
        let codec = codec();
        let token = codec.generate("sid").unwrap();
        let (head, sig) = token.rsplit_once('.').unwrap();
        let sig_bytes = URL_SAFE_NO_PAD.decode(sig).unwrap();

        for i in 0..sig_bytes.len() {
            let mut tampered = sig_bytes.clone();
            tampered[i] ^= 0x01;
            let forged = format!("{head}.{}", URL_SAFE_NO_PAD.encode(&tampered));
            assert_eq!(codec.validate(&forged), Err(TokenError::Malformed), "byte {i}");
        }
    }

    #[test]
    fn other_hmac_algorithms_are_refused() {
        let claims = SessionClaims {
            jti: "sid".into(),
            iat: Utc::now().timestamp(),
            nbf: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iss: "tradegate-auth-service".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(codec().validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn unsigned_tokens_are_refused() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            format!(
                r#"{{"jti":"sid","iat":0,"nbf":0,"exp":{},"iss":"tradegate-auth-service"}}"#,
                (Utc::now() + Duration::hours(1)).timestamp()
            )
            .as_bytes(),
        );
        let token = format!("{header}.{payload}.");
        assert_eq!(codec().validate(&token), Err(TokenError::Malformed));
        assert!(codec().revocable_session_id(&token).is_none());
    }
}
