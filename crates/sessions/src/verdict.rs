use serde::{Deserialize, Serialize};

use crate::store::CredentialBundle;

/// Outcome of checking one session token.  Every variant is ordinary
/// traffic; only `Verified` grants access.
#[derive(Debug, Clone)]
pub enum VerificationVerdict {
    NoToken,
    Malformed,
    Expired,
    SessionNotFound,
    Verified(CredentialBundle),
}

impl VerificationVerdict {
    pub fn kind(&self) -> VerdictKind {
        match self {
            Self::NoToken => VerdictKind::NoToken,
            Self::Malformed => VerdictKind::Malformed,
            Self::Expired => VerdictKind::Expired,
            Self::SessionNotFound => VerdictKind::SessionNotFound,
            Self::Verified(_) => VerdictKind::Verified,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

/// Payload-free verdict tag, as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    NoToken,
    Malformed,
    Expired,
    SessionNotFound,
    Verified,
}

impl VerdictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoToken => "no_token",
            Self::Malformed => "malformed",
            Self::Expired => "expired",
            Self::SessionNotFound => "session_not_found",
            Self::Verified => "verified",
        }
    }
}

impl std::fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_display() {
        for kind in [
            VerdictKind::NoToken,
            VerdictKind::Malformed,
            VerdictKind::Expired,
            VerdictKind::SessionNotFound,
            VerdictKind::Verified,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }
}
