//! Broker error types.

/// Errors that can occur during broker operations.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("not connected")]
    NotConnected,

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("two-factor code required")]
    TwoFactorRequired,

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("failed to parse broker response: {0}")]
    Parse(String),

    #[error("rate limit exceeded")]
    RateLimit,
}
