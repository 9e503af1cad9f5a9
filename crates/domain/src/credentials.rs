use std::fmt;

use serde::{Deserialize, Serialize};

/// The upstream brokerage credential triple resolved from a verified session.
///
/// `primary_token` is the broker JWT, `secondary_token` the market-data feed
/// token and `refresh_token` the (possibly empty) refresh token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamCredentials {
    pub primary_token: String,
    pub secondary_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl UpstreamCredentials {
    pub fn new(
        primary_token: impl Into<String>,
        secondary_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            primary_token: primary_token.into(),
            secondary_token: secondary_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Rebuild from the positional `[primary, secondary, refresh]` wire form.
    /// Anything other than exactly three entries is rejected.
    pub fn from_wire(values: Vec<String>) -> Option<Self> {
        let [primary, secondary, refresh]: [String; 3] = values.try_into().ok()?;
        Some(Self::new(primary, secondary, refresh))
    }

    pub fn into_wire(self) -> Vec<String> {
        vec![self.primary_token, self.secondary_token, self.refresh_token]
    }
}

impl fmt::Debug for UpstreamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamCredentials")
            .field("primary_token", &"<redacted>")
            .field("secondary_token", &"<redacted>")
            .field("has_refresh_token", &!self.refresh_token.is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_positional() {
        let creds = UpstreamCredentials::new("J1", "F1", "R1");
        let wire = creds.clone().into_wire();
        assert_eq!(wire, vec!["J1", "F1", "R1"]);
        assert_eq!(UpstreamCredentials::from_wire(wire), Some(creds));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(UpstreamCredentials::from_wire(vec![]).is_none());
        assert!(UpstreamCredentials::from_wire(vec!["a".into(), "b".into()]).is_none());
    }

    #[test]
    fn debug_never_prints_tokens() {
        let creds = UpstreamCredentials::new("secret-jwt", "secret-feed", "");
        let out = format!("{creds:?}");
        assert!(!out.contains("secret-jwt"));
        assert!(!out.contains("secret-feed"));
    }
}
