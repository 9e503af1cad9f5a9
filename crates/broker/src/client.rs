//! REST implementation of [`BrokerApi`] against Angel One SmartAPI.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use tg_domain::config::BrokerConfig;
use tg_domain::error::{Error, Result};
use tg_domain::trace::TraceEvent;
use tg_domain::UpstreamCredentials;

use crate::api::BrokerApi;
use crate::normalize::{normalize, HTTP_EXECUTION_ERROR, MISSING_ARGUMENT, MISSING_CREDENTIALS};
use crate::types::{
    BrokerResponse, CancelAck, CancelOrderRequest, HoldingsData, LtpQuote, MarketData,
    MarketDataRequest, OrderAck, OrderBookItem, PlaceOrderRequest, ProfileData, RequestOrigin,
};

const PROFILE_PATH: &str = "/user/v1/getProfile";
const LOGOUT_PATH: &str = "/user/v1/logout";
const PLACE_ORDER_PATH: &str = "/order/v1/placeOrder";
const CANCEL_ORDER_PATH: &str = "/order/v1/cancelOrder";
const ORDER_BOOK_PATH: &str = "/order/v1/getOrderBook";
const HOLDINGS_PATH: &str = "/portfolio/v1/getAllHolding";
const QUOTE_PATH: &str = "/market/v1/quote";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Created once at boot; the inner `reqwest::Client` pools connections.
#[derive(Clone)]
pub struct AngelOneClient {
    http: Client,
    base_url: String,
    api_key: String,
    user_type: String,
    source_id: String,
    mac_address: Option<String>,
}

impl std::fmt::Debug for AngelOneClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AngelOneClient")
            .field("base_url", &self.base_url)
            .field("user_type", &self.user_type)
            .field("source_id", &self.source_id)
            .finish_non_exhaustive()
    }
}

impl AngelOneClient {
    /// Build from `[broker]`, reading the API key from `api_key_env`.
    pub fn new(cfg: &BrokerConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!(
                env_var = %cfg.api_key_env,
                "broker API key not set; upstream calls will be rejected"
            );
        }
        Self::with_api_key(cfg, api_key)
    }

    pub fn with_api_key(cfg: &BrokerConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            user_type: cfg.user_type.clone(),
            source_id: cfg.source_id.clone(),
            mac_address: cfg.mac_address.clone(),
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    fn decorate(
        &self,
        rb: RequestBuilder,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
    ) -> RequestBuilder {
        let mut rb = rb
            .bearer_auth(&creds.primary_token)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("X-UserType", &self.user_type)
            .header("X-SourceID", &self.source_id)
            .header("X-PrivateKey", &self.api_key);

        if let Some(ip) = &origin.client_local_ip {
            rb = rb.header("X-ClientLocalIP", ip);
        }
        if let Some(ip) = &origin.client_public_ip {
            rb = rb.header("X-ClientPublicIP", ip);
        }
        if let Some(mac) = &self.mac_address {
            rb = rb.header("X-MACAddress", mac);
        }
        rb
    }

    /// Send one upstream call and normalize whatever comes back.
    async fn call<T, B>(
        &self,
        method: Method,
        path: &str,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        body: Option<&B>,
    ) -> BrokerResponse<T>
    where
        T: DeserializeOwned + Send,
        B: Serialize + ?Sized + Sync,
    {
        if creds.primary_token.is_empty() {
            return BrokerResponse::failure(MISSING_CREDENTIALS, "no broker token in session");
        }

        let endpoint = format!("{method} {path}");
        let mut rb = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            rb = rb.json(body);
        }
        let rb = self.decorate(rb, creds, origin);

        let start = Instant::now();
        let result = rb.send().await;

        let (status, text) = match result {
            Ok(resp) => {
                let status = resp.status().as_u16();
                (status, resp.text().await)
            }
            Err(e) => {
                emit_call(&endpoint, e.status().map(|s| s.as_u16()).unwrap_or(0), start);
                tracing::warn!(endpoint = %endpoint, error = %e, "upstream request failed");
                return BrokerResponse::failure(
                    HTTP_EXECUTION_ERROR,
                    format!("failed to execute upstream request: {}", from_reqwest(e)),
                );
            }
        };
        emit_call(&endpoint, status, start);

        match text {
            Ok(body) => normalize(status, &body),
            Err(e) => BrokerResponse::failure(
                HTTP_EXECUTION_ERROR,
                format!("failed to read upstream response: {}", from_reqwest(e)),
            ),
        }
    }

    async fn quote<T: DeserializeOwned + Send>(
        &self,
        mode: &str,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        req: &MarketDataRequest,
    ) -> BrokerResponse<MarketData<T>> {
        if req.exchange_tokens.is_empty() {
            return BrokerResponse::failure(MISSING_ARGUMENT, "exchange_tokens must not be empty");
        }
        let mut exchange_tokens: HashMap<&str, Vec<&str>> = HashMap::new();
        for pair in &req.exchange_tokens {
            exchange_tokens
                .entry(pair.exchange.as_str())
                .or_default()
                .extend(pair.tokens.iter().map(String::as_str));
        }
        let payload = serde_json::json!({
            "mode": mode,
            "exchangeTokens": exchange_tokens,
        });
        self.call(Method::POST, QUOTE_PATH, creds, origin, Some(&payload))
            .await
    }
}

fn emit_call(endpoint: &str, status: u16, start: Instant) {
    TraceEvent::UpstreamCall {
        endpoint: endpoint.to_owned(),
        status,
        duration_ms: start.elapsed().as_millis() as u64,
    }
    .emit();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl BrokerApi for AngelOneClient {
    async fn profile(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
    ) -> BrokerResponse<ProfileData> {
        self.call::<_, ()>(Method::GET, PROFILE_PATH, creds, origin, None)
            .await
    }

    async fn logout(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        client_code: &str,
    ) -> BrokerResponse<serde_json::Value> {
        if client_code.is_empty() {
            return BrokerResponse::failure(MISSING_ARGUMENT, "client code is required");
        }
        let payload = serde_json::json!({ "clientcode": client_code });
        self.call(Method::POST, LOGOUT_PATH, creds, origin, Some(&payload))
            .await
    }

    async fn place_order(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        order: &PlaceOrderRequest,
    ) -> BrokerResponse<OrderAck> {
        self.call(Method::POST, PLACE_ORDER_PATH, creds, origin, Some(order))
            .await
    }

    async fn cancel_order(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        req: &CancelOrderRequest,
    ) -> BrokerResponse<CancelAck> {
        if req.orderid.is_empty() {
            return BrokerResponse::failure(MISSING_ARGUMENT, "orderid is required");
        }
        self.call(Method::POST, CANCEL_ORDER_PATH, creds, origin, Some(req))
            .await
    }

    async fn order_book(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
    ) -> BrokerResponse<Vec<OrderBookItem>> {
        self.call::<_, ()>(Method::GET, ORDER_BOOK_PATH, creds, origin, None)
            .await
    }

    async fn holdings(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
    ) -> BrokerResponse<HoldingsData> {
        self.call::<_, ()>(Method::GET, HOLDINGS_PATH, creds, origin, None)
            .await
    }

    async fn ltp(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        req: &MarketDataRequest,
    ) -> BrokerResponse<MarketData<LtpQuote>> {
        self.quote("LTP", creds, origin, req).await
    }

    async fn full_quote(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        req: &MarketDataRequest,
    ) -> BrokerResponse<MarketData<serde_json::Value>> {
        self.quote("FULL", creds, origin, req).await
    }
}

/// Convert a `reqwest::Error` into our domain error.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
