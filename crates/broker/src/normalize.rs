//! Folding raw upstream answers into [`BrokerResponse`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::types::BrokerResponse;

/// The request never produced a response (connect error, timeout, body read).
pub const HTTP_EXECUTION_ERROR: &str = "HTTP_EXECUTION_ERROR";
/// The response body was not the expected JSON envelope.
pub const UNMARSHAL_ERROR: &str = "UNMARSHAL_ERROR";
/// The session carried no primary broker token; nothing was sent.
pub const MISSING_CREDENTIALS: &str = "MISSING_CREDENTIALS";
/// A required request field was empty; nothing was sent.
pub const MISSING_ARGUMENT: &str = "MISSING_ARGUMENT";

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    status: bool,
    #[serde(default, deserialize_with = "null_string")]
    message: String,
    #[serde(default, deserialize_with = "null_string")]
    errorcode: String,
    #[serde(default)]
    data: serde_json::Value,
}

fn null_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

/// Normalize an upstream HTTP answer.
///
/// - body not a JSON envelope: `UNMARSHAL_ERROR`
/// - non-2xx status: `status = false`, upstream message kept when present
/// - `status = false`: `data` dropped
/// - `status = true` with a `data` shape we cannot read: `UNMARSHAL_ERROR`
pub fn normalize<T: DeserializeOwned>(http_status: u16, body: &str) -> BrokerResponse<T> {
    let http_ok = (200..300).contains(&http_status);

    let raw: RawEnvelope = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(http_status, error = %e, "unparsable upstream body");
            let message = if http_ok {
                "failed to parse upstream response".to_owned()
            } else {
                format!("upstream API error: {http_status} (unparsable body)")
            };
            return BrokerResponse::failure(UNMARSHAL_ERROR, message);
        }
    };

    if !http_ok {
        let message = if raw.message.is_empty() {
            format!("upstream API error: {http_status}")
        } else {
            raw.message
        };
        return BrokerResponse::failure(raw.errorcode, message);
    }

    if !raw.status {
        return BrokerResponse::failure(raw.errorcode, raw.message);
    }

    let data = if raw.data.is_null() {
        None
    } else {
        match serde_json::from_value::<T>(raw.data) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(error = %e, "unexpected upstream data shape");
                return BrokerResponse::failure(
                    UNMARSHAL_ERROR,
                    format!("unexpected upstream data shape: {e}"),
                );
            }
        }
    };

    BrokerResponse {
        status: true,
        message: raw.message,
        errorcode: raw.errorcode,
        data,
    }
}
