//! Request and response shapes of the broker facade.
//!
//! Field names follow the upstream JSON (`tradingsymbol`, `orderid`, ...)
//! so values pass through unchanged.

use serde::{Deserialize, Deserializer, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Envelope
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The single response contract of every broker call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerResponse<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errorcode: String,
    pub data: Option<T>,
}

impl<T> BrokerResponse<T> {
    pub fn failure(errorcode: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            errorcode: errorcode.into(),
            data: None,
        }
    }
}

/// Caller network details forwarded as `X-ClientLocalIP` / `X-ClientPublicIP`.
#[derive(Debug, Clone, Default)]
pub struct RequestOrigin {
    pub client_local_ip: Option<String>,
    pub client_public_ip: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Profile
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(default, deserialize_with = "null_default")]
    pub clientcode: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub mobileno: String,
    #[serde(default, deserialize_with = "null_default")]
    pub exchanges: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub products: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub lastlogintime: String,
    #[serde(default, deserialize_with = "null_default")]
    pub brokerid: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Orders
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub variety: String,
    pub tradingsymbol: String,
    pub symboltoken: String,
    pub transactiontype: String,
    pub exchange: String,
    pub ordertype: String,
    pub producttype: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub triggerprice: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub squareoff: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub stoploss: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclosedquantity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    #[serde(default, deserialize_with = "null_default")]
    pub script: String,
    #[serde(default, deserialize_with = "null_default")]
    pub orderid: String,
    #[serde(default, deserialize_with = "null_default")]
    pub uniqueorderid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    pub variety: String,
    pub orderid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAck {
    #[serde(default, deserialize_with = "null_default")]
    pub orderid: String,
    #[serde(default, deserialize_with = "null_default")]
    pub uniqueorderid: String,
}

/// One order book row.  The commonly used columns are typed; everything
/// else upstream sends is kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookItem {
    #[serde(default, deserialize_with = "null_default")]
    pub orderid: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tradingsymbol: String,
    #[serde(default, deserialize_with = "null_default")]
    pub symboltoken: String,
    #[serde(default, deserialize_with = "null_default")]
    pub exchange: String,
    #[serde(default, deserialize_with = "null_default")]
    pub transactiontype: String,
    #[serde(default, deserialize_with = "null_default")]
    pub ordertype: String,
    #[serde(default, deserialize_with = "null_default")]
    pub producttype: String,
    #[serde(default, deserialize_with = "null_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub averageprice: f64,
    /// Upstream sends quantities as strings.
    #[serde(default, deserialize_with = "null_default")]
    pub quantity: String,
    #[serde(default, deserialize_with = "null_default")]
    pub orderstatus: String,
    #[serde(default, deserialize_with = "null_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_default")]
    pub updatetime: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Portfolio
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingsData {
    #[serde(default, deserialize_with = "null_default")]
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub totalholding: Option<TotalHolding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    #[serde(default, deserialize_with = "null_default")]
    pub tradingsymbol: String,
    #[serde(default, deserialize_with = "null_default")]
    pub exchange: String,
    #[serde(default, deserialize_with = "null_default")]
    pub isin: String,
    #[serde(default, deserialize_with = "null_default")]
    pub symboltoken: String,
    #[serde(default, deserialize_with = "null_default")]
    pub product: String,
    #[serde(default, deserialize_with = "null_default")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub t1quantity: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub averageprice: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub ltp: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub close: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub profitandloss: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub pnlpercentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalHolding {
    #[serde(default, deserialize_with = "null_default")]
    pub totalholdingvalue: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub totalinvvalue: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub totalprofitandloss: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub totalpnlpercentage: f64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Market data
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Body accepted by the gateway for LTP and quote lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataRequest {
    pub exchange_tokens: Vec<ExchangeTokens>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeTokens {
    pub exchange: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct MarketData<T> {
    #[serde(default, deserialize_with = "null_default")]
    pub fetched: Vec<T>,
    #[serde(default, deserialize_with = "null_default")]
    pub unfetched: Vec<UnfetchedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LtpQuote {
    #[serde(default, deserialize_with = "null_default")]
    pub exchange: String,
    #[serde(default, rename = "tradingSymbol", deserialize_with = "null_default")]
    pub trading_symbol: String,
    #[serde(default, rename = "symbolToken", deserialize_with = "null_default")]
    pub symbol_token: String,
    #[serde(default, deserialize_with = "null_default")]
    pub ltp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnfetchedItem {
    #[serde(default, deserialize_with = "null_default")]
    pub exchange: String,
    #[serde(default, rename = "symbolToken", deserialize_with = "null_default")]
    pub symbol_token: String,
    #[serde(default, deserialize_with = "null_default")]
    pub message: String,
    #[serde(default, rename = "errorCode", deserialize_with = "null_default")]
    pub error_code: String,
}

// ── serde helpers ───────────────────────────────────────────────────

/// Upstream sends `null` for many absent fields; treat it like a missing one.
fn null_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_tolerates_nulls() {
        let json = r#"{"clientcode":"A123","name":null,"exchanges":["NSE","BSE"],"products":null}"#;
        let p: ProfileData = serde_json::from_str(json).unwrap();
        assert_eq!(p.clientcode, "A123");
        assert_eq!(p.name, "");
        assert_eq!(p.exchanges, vec!["NSE", "BSE"]);
        assert!(p.products.is_empty());
    }

    #[test]
    fn market_order_omits_zero_prices() {
        let order = PlaceOrderRequest {
            variety: "NORMAL".into(),
            tradingsymbol: "SBIN-EQ".into(),
            symboltoken: "3045".into(),
            transactiontype: "BUY".into(),
            exchange: "NSE".into(),
            ordertype: "MARKET".into(),
            producttype: "DELIVERY".into(),
            duration: "DAY".into(),
            price: 0.0,
            triggerprice: 0.0,
            squareoff: 0.0,
            stoploss: 0.0,
            quantity: 1,
            disclosedquantity: None,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("price").is_none());
        assert!(json.get("disclosedquantity").is_none());
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn order_book_keeps_unknown_columns() {
        let json = r#"{"orderid":"1","quantity":"5","price":10.5,"exchtime":"x","symboltoken":null}"#;
        let item: OrderBookItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.quantity, "5");
        assert_eq!(item.symboltoken, "");
        assert_eq!(item.extra["exchtime"], "x");
    }

    #[test]
    fn ltp_uses_camel_case_upstream_names() {
        let json = r#"{"fetched":[{"exchange":"NSE","tradingSymbol":"SBIN-EQ","symbolToken":"3045","ltp":571.8}],"unfetched":null}"#;
        let data: MarketData<LtpQuote> = serde_json::from_str(json).unwrap();
        assert_eq!(data.fetched[0].trading_symbol, "SBIN-EQ");
        assert!(data.unfetched.is_empty());
    }
}
