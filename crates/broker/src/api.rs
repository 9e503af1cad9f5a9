//! The `BrokerApi` trait: everything the gateway can ask of the broker.

use async_trait::async_trait;

use tg_domain::UpstreamCredentials;

use crate::types::{
    BrokerResponse, CancelAck, CancelOrderRequest, HoldingsData, LtpQuote, MarketData,
    MarketDataRequest, OrderAck, OrderBookItem, PlaceOrderRequest, ProfileData, RequestOrigin,
};

/// Abstraction over the upstream brokerage.
///
/// Methods never fail: every outcome, including transport errors, comes
/// back as a [`BrokerResponse`] with `status = false`.
#[async_trait]
pub trait BrokerApi: Send + Sync {
    /// GET /user/v1/getProfile
    async fn profile(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
    ) -> BrokerResponse<ProfileData>;

    /// POST /user/v1/logout
    async fn logout(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        client_code: &str,
    ) -> BrokerResponse<serde_json::Value>;

    /// POST /order/v1/placeOrder
    async fn place_order(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        order: &PlaceOrderRequest,
    ) -> BrokerResponse<OrderAck>;

    /// POST /order/v1/cancelOrder
    async fn cancel_order(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        req: &CancelOrderRequest,
    ) -> BrokerResponse<CancelAck>;

    /// GET /order/v1/getOrderBook
    async fn order_book(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
    ) -> BrokerResponse<Vec<OrderBookItem>>;

    /// GET /portfolio/v1/getAllHolding
    async fn holdings(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
    ) -> BrokerResponse<HoldingsData>;

    /// POST /market/v1/quote in `LTP` mode.
    async fn ltp(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        req: &MarketDataRequest,
    ) -> BrokerResponse<MarketData<LtpQuote>>;

    /// POST /market/v1/quote in `FULL` mode.  Quote rows (with market
    /// depth) are passed through untyped.
    async fn full_quote(
        &self,
        creds: &UpstreamCredentials,
        origin: &RequestOrigin,
        req: &MarketDataRequest,
    ) -> BrokerResponse<MarketData<serde_json::Value>>;
}
