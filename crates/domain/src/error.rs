/// Shared error type used across all tradegate crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// A required caller-supplied value was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The OS random source could not produce an identifier.
    #[error("entropy source: {0}")]
    Entropy(String),

    /// A session token could not be signed.
    #[error("signing: {0}")]
    Signing(String),

    /// A dependency (usually the session service) answered with a
    /// retryable failure.
    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::Timeout(_)
                | Error::Entropy(_)
                | Error::Signing(_)
                | Error::Unavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!Error::InvalidArgument("primary_token".into()).is_retryable());
        assert!(!Error::Config("secret".into()).is_retryable());
    }

    #[test]
    fn dependency_faults_are_retryable() {
        assert!(Error::Entropy("os rng".into()).is_retryable());
        assert!(Error::Timeout("verify".into()).is_retryable());
        assert!(Error::Unavailable("503".into()).is_retryable());
    }
}
