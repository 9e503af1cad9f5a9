//! The session RPC server and the remote client that talks to it.

use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tower::ServiceExt;

use tg_domain::error::Error;
use tg_domain::UpstreamCredentials;
use tg_gateway::rpc::{self, RemoteSessionService, RpcState};
use tg_sessions::protocol::{
    CreateSessionRequest, DestroySessionRequest, VerifySessionRequest, CREATE_PATH, VERIFY_PATH,
};
use tg_sessions::{CredentialStore, JwtCodec, SessionManager, SessionService, VerdictKind};

const SECRET: &[u8] = b"rpc-boundary-test-secret-0123456789abcdef";
const RPC_TOKEN: &str = "internal-rpc-token";

fn rpc_state(rpc_token: Option<&str>) -> RpcState {
    let codec = JwtCodec::new(SECRET, Duration::hours(24), "tradegate-auth-service").unwrap();
    let manager = SessionManager::new(Arc::new(CredentialStore::new()), Arc::new(codec));
    RpcState {
        service: Arc::new(manager),
        rpc_token_hash: rpc_token.map(|t| Sha256::digest(t.as_bytes()).to_vec()),
    }
}

fn app(state: RpcState) -> Router {
    rpc::router(state.clone()).with_state(state)
}

fn post(path: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn spawn_server(state: RpcState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Accepts connections and never answers on them.
async fn spawn_silent_listener() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

fn remote(base_url: &str, token: Option<&str>) -> RemoteSessionService {
    RemoteSessionService::new(
        base_url,
        StdDuration::from_secs(2),
        StdDuration::from_secs(2),
        token.map(str::to_owned),
    )
    .unwrap()
}

fn create(primary: &str, secondary: &str, refresh: &str) -> CreateSessionRequest {
    CreateSessionRequest {
        primary_token: primary.into(),
        secondary_token: secondary.into(),
        refresh_token: refresh.into(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn guard_rejects_missing_or_wrong_bearer() {
    let app = app(rpc_state(Some(RPC_TOKEN)));
    let body = json!({"session_token": ""});

    let resp = app.clone().oneshot(post(VERIFY_PATH, None, body.clone())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["code"], "unauthenticated");

    let resp = app
        .clone()
        .oneshot(post(VERIFY_PATH, Some("wrong"), body.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.oneshot(post(VERIFY_PATH, Some(RPC_TOKEN), body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["verified"], false);
    assert_eq!(json["verdict"], "no_token");
    assert_eq!(json["credentials"], json!([]));
}

#[tokio::test]
async fn health_is_outside_the_guard() {
    let app = app(rpc_state(Some(RPC_TOKEN)));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_with_empty_credential_is_invalid_argument() {
    let app = app(rpc_state(None));
    let resp = app
        .oneshot(post(
            CREATE_PATH,
            None,
            json!({"primary_token": "", "secondary_token": "F1"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "invalid_argument");
}

#[tokio::test]
async fn unparsable_body_is_invalid_argument() {
    let app = app(rpc_state(None));
    let req = Request::builder()
        .method("POST")
        .uri(CREATE_PATH)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "invalid_argument");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client against a live server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn remote_create_verify_destroy() {
    let base = spawn_server(rpc_state(Some(RPC_TOKEN))).await;
    let client = remote(&base, Some(RPC_TOKEN));

    let token = client
        .create_session(create("J1", "F1", "R1"))
        .await
        .unwrap()
        .session_token;

    let resp = client
        .verify_session(VerifySessionRequest {
            session_token: token.clone(),
        })
        .await
        .unwrap();
    assert_eq!(resp.verdict, VerdictKind::Verified);
    assert_eq!(
        resp.into_credentials(),
        Some(UpstreamCredentials::new("J1", "F1", "R1"))
    );

    for _ in 0..2 {
        client
            .destroy_session(DestroySessionRequest {
                session_token: token.clone(),
            })
            .await
            .unwrap();
    }

    let resp = client
        .verify_session(VerifySessionRequest {
            session_token: token,
        })
        .await
        .unwrap();
    assert_eq!(resp.verdict, VerdictKind::SessionNotFound);
    assert!(!resp.verified);
    assert!(resp.credentials.is_empty());
}

#[tokio::test]
async fn remote_maps_status_codes_to_errors() {
    let base = spawn_server(rpc_state(Some(RPC_TOKEN))).await;

    let err = remote(&base, Some(RPC_TOKEN))
        .create_session(create("J1", "", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");
    assert!(!err.is_retryable());

    let err = remote(&base, Some("wrong"))
        .create_session(create("J1", "F1", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "{err}");
}

#[tokio::test]
async fn unreachable_service_is_retryable() {
    let err = remote("http://127.0.0.1:9", None)
        .verify_session(VerifySessionRequest {
            session_token: "t".into(),
        })
        .await
        .unwrap_err();
    assert!(err.is_retryable(), "{err}");
}

#[tokio::test]
async fn silent_service_times_out_within_verify_budget() {
    let base = spawn_silent_listener().await;
    let client = RemoteSessionService::new(
        &base,
        StdDuration::from_millis(300),
        StdDuration::from_secs(30),
        None,
    )
    .unwrap();

    let started = Instant::now();
    let err = client
        .verify_session(VerifySessionRequest {
            session_token: "t".into(),
        })
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, Error::Timeout(_)), "{err}");
    assert!(err.is_retryable());
    assert!(elapsed >= StdDuration::from_millis(250), "{elapsed:?}");
    assert!(elapsed < StdDuration::from_secs(5), "{elapsed:?}");
}
