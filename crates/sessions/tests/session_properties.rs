use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;

use tg_domain::error::{Error, Result};
use tg_sessions::protocol::{CreateSessionRequest, DestroySessionRequest, VerifySessionRequest};
use tg_sessions::{
    CredentialStore, JwtCodec, SessionManager, SessionService, TokenCodec, TokenError, VerdictKind,
    VerificationVerdict,
};

const SECRET: &[u8] = b"an-integration-test-secret-of-40-bytes!!";

fn manager(ttl: Duration) -> SessionManager {
    let codec = JwtCodec::new(SECRET, ttl, "tradegate-auth-service").unwrap();
    SessionManager::new(Arc::new(CredentialStore::new()), Arc::new(codec))
}

/// Codec whose signing key is broken.
struct BrokenSigner;

impl TokenCodec for BrokenSigner {
    fn generate(&self, _session_id: &str) -> Result<String> {
        Err(Error::Signing("signing key unavailable".into()))
    }
    fn validate(&self, _token: &str) -> std::result::Result<String, TokenError> {
        Err(TokenError::Malformed)
    }
    fn revocable_session_id(&self, _token: &str) -> Option<String> {
        None
    }
    fn ttl(&self) -> Duration {
        Duration::hours(1)
    }
}

#[test]
fn create_then_verify_round_trips_the_exact_triple() {
    let m = manager(Duration::hours(24));
    let long_refresh = "a very long refresh token ".repeat(50);
    let triples = [
        ("J1", "F1", "R1"),
        ("eyJhbGciOi.payload.sig", "feed-token", ""),
        ("ünïcødé", "with spaces and = signs", "r"),
        ("x", "y", long_refresh.as_str()),
    ];
    for (p, s, r) in triples {
        let token = m.create_session(p, s, r).unwrap();
        match m.verify_session(&token) {
            VerificationVerdict::Verified(bundle) => {
                assert_eq!(bundle.primary_token, p);
                assert_eq!(bundle.secondary_token, s);
                assert_eq!(bundle.refresh_token, r);
            }
            other => panic!("expected Verified, got {other:?}"),
        }
    }
}

#[test]
fn scenario_create_verify_destroy() {
    let m = manager(Duration::hours(24));
    let t1 = m.create_session("J1", "F1", "R1").unwrap();

    let bundle = match m.verify_session(&t1) {
        VerificationVerdict::Verified(bundle) => bundle,
        other => panic!("expected Verified, got {other:?}"),
    };
    assert_eq!(
        bundle.credentials().into_wire(),
        vec!["J1".to_string(), "F1".to_string(), "R1".to_string()]
    );

    m.destroy_session(&bundle.id);
    assert!(matches!(m.verify_session(&t1), VerificationVerdict::SessionNotFound));

    // Idempotent.
    m.destroy_session(&bundle.id);
    assert!(matches!(m.verify_session(&t1), VerificationVerdict::SessionNotFound));
}

#[test]
fn expired_token_is_rejected_while_bundle_is_live() {
    let m = manager(Duration::minutes(-5));
    let token = m.create_session("J1", "F1", "R1").unwrap();
    assert_eq!(m.store().len(), 1);
    assert!(matches!(m.verify_session(&token), VerificationVerdict::Expired));
}

#[test]
fn token_from_another_deployment_is_malformed() {
    let ours = manager(Duration::hours(24));
    let theirs = {
        let codec = JwtCodec::new(
            b"a-completely-different-secret-for-tests",
            Duration::hours(24),
            "tradegate-auth-service",
        )
        .unwrap();
        SessionManager::new(Arc::new(CredentialStore::new()), Arc::new(codec))
    };
    let token = theirs.create_session("J1", "F1", "R1").unwrap();
    assert!(matches!(ours.verify_session(&token), VerificationVerdict::Malformed));
}

#[test]
fn failed_signing_leaves_no_orphaned_bundle() {
    let store = Arc::new(CredentialStore::new());
    let m = SessionManager::new(store.clone(), Arc::new(BrokenSigner));

    let err = m.create_session("J1", "F1", "R1").unwrap_err();
    assert!(matches!(err, Error::Signing(_)));
    assert!(err.is_retryable());
    assert!(store.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_are_independent() {
    let m: Arc<dyn SessionService> = Arc::new(manager(Duration::hours(24)));

    let mut handles = Vec::new();
    for i in 0..64 {
        let m = m.clone();
        handles.push(tokio::spawn(async move {
            let req = CreateSessionRequest {
                primary_token: format!("jwt-{i}"),
                secondary_token: format!("feed-{i}"),
                refresh_token: format!("refresh-{i}"),
            };
            let token = m.create_session(req).await.unwrap().session_token;
            (i, token)
        }));
    }

    let mut tokens = HashSet::new();
    for h in handles {
        let (i, token) = h.await.unwrap();
        assert!(tokens.insert(token.clone()));

        let resp = m
            .verify_session(VerifySessionRequest {
                session_token: token,
            })
            .await
            .unwrap();
        assert_eq!(resp.verdict, VerdictKind::Verified);
        assert_eq!(
            resp.credentials,
            vec![format!("jwt-{i}"), format!("feed-{i}"), format!("refresh-{i}")]
        );
    }
    assert_eq!(tokens.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn logout_racing_verify_sees_whole_states_only() {
    let m = Arc::new(manager(Duration::hours(24)));
    let token = m.create_session("J1", "F1", "R1").unwrap();

    let verifier = {
        let m = m.clone();
        let token = token.clone();
        tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..200 {
                seen.push(m.verify_session(&token));
                tokio::task::yield_now().await;
            }
            seen
        })
    };
    let destroyers: Vec<_> = (0..2)
        .map(|_| {
            let m = m.clone();
            let token = token.clone();
            tokio::spawn(async move {
                SessionService::destroy_session(
                    m.as_ref(),
                    DestroySessionRequest {
                        session_token: token,
                    },
                )
                .await
                .unwrap();
            })
        })
        .collect();

    for d in destroyers {
        d.await.unwrap();
    }
    for verdict in verifier.await.unwrap() {
        match verdict {
            VerificationVerdict::Verified(b) => {
                assert_eq!(b.primary_token, "J1");
                assert_eq!(b.secondary_token, "F1");
                assert_eq!(b.refresh_token, "R1");
            }
            VerificationVerdict::SessionNotFound => {}
            other => panic!("unexpected verdict {other:?}"),
        }
    }
    assert!(matches!(m.verify_session(&token), VerificationVerdict::SessionNotFound));
}

#[tokio::test]
async fn service_maps_empty_credentials_to_invalid_argument() {
    let m = manager(Duration::hours(24));
    let err = SessionService::create_session(
        &m,
        CreateSessionRequest {
            primary_token: "J1".into(),
            secondary_token: String::new(),
            refresh_token: String::new(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(!err.is_retryable());
}
