//! Gateway side of the session RPC boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use tg_domain::config::Config;
use tg_domain::error::{Error, Result};
use tg_sessions::protocol::{
    CreateSessionRequest, CreateSessionResponse, DestroySessionRequest, DestroySessionResponse,
    RpcErrorBody, VerifySessionRequest, VerifySessionResponse, CREATE_PATH, DESTROY_PATH,
    VERIFY_PATH,
};
use tg_sessions::SessionService;

/// [`SessionService`] backed by a remote `tradegate auth-service`.
///
/// Every call carries its own timeout: `verify_timeout` for the per-request
/// verification, `call_timeout` for create and destroy.  A timeout aborts
/// only the waiting caller.
pub struct RemoteSessionService {
    http: Client,
    base_url: String,
    verify_timeout: Duration,
    call_timeout: Duration,
    rpc_token: Option<String>,
}

impl std::fmt::Debug for RemoteSessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSessionService")
            .field("base_url", &self.base_url)
            .field("verify_timeout", &self.verify_timeout)
            .field("call_timeout", &self.call_timeout)
            .field("rpc_token", &self.rpc_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RemoteSessionService {
    pub fn new(
        base_url: &str,
        verify_timeout: Duration,
        call_timeout: Duration,
        rpc_token: Option<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            verify_timeout,
            call_timeout,
            rpc_token: rpc_token.filter(|t| !t.is_empty()),
        })
    }

    /// Build from `[session_service]`; the bearer token comes from the env
    /// var named by `auth.rpc_token_env`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cfg = &config.session_service;
        let url = cfg
            .url
            .as_deref()
            .ok_or_else(|| Error::Config("session_service.url is not set".into()))?;
        let rpc_token = std::env::var(&config.auth.rpc_token_env).ok();
        Self::new(
            url,
            Duration::from_millis(cfg.verify_timeout_ms),
            Duration::from_millis(cfg.call_timeout_ms),
            rpc_token,
        )
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req, timeout: Duration) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let mut rb = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .timeout(timeout)
            .json(body);
        if let Some(token) = &self.rpc_token {
            rb = rb.bearer_auth(token);
        }

        let resp = rb.send().await.map_err(from_reqwest)?;
        let status = resp.status();
        if status.is_success() {
            return resp.json::<Resp>().await.map_err(from_reqwest);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RpcErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("session service returned {status}"));
        Err(match status {
            StatusCode::BAD_REQUEST => Error::InvalidArgument(message),
            StatusCode::UNAUTHORIZED => Error::Auth(message),
            _ => Error::Unavailable(message),
        })
    }
}

fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

#[async_trait]
impl SessionService for RemoteSessionService {
    async fn create_session(&self, req: CreateSessionRequest) -> Result<CreateSessionResponse> {
        self.post(CREATE_PATH, &req, self.call_timeout).await
    }

    async fn verify_session(&self, req: VerifySessionRequest) -> Result<VerifySessionResponse> {
        self.post(VERIFY_PATH, &req, self.verify_timeout).await
    }

    async fn destroy_session(&self, req: DestroySessionRequest) -> Result<DestroySessionResponse> {
        self.post(DESTROY_PATH, &req, self.call_timeout).await
    }
}
