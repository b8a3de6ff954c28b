//! Error taxonomy for fetching, caching and resolving rates

use thiserror::Error;

/// Failures surfaced by providers and the rate engine.
///
/// Every variant is scoped to a single requested key; none of them leave the
/// cache in a modified state.
#[derive(Error, Debug)]
pub enum FxError {
    /// The upstream answered with a non-2xx status.
    #[error("HTTP error: status {0}")]
    TransportError(u16),

    /// The upstream answered 2xx but the payload signals a logical failure,
    /// has an unexpected shape, or carries no usable data.
    #[error("Upstream rejected request: {0}")]
    UpstreamRejected(String),

    /// The requested currency never appears in the fetched historical window.
    #[error("Trend data not available for {0}")]
    TrendDataUnavailable(String),

    /// A conversion was requested for a currency missing from the rate map,
    /// or the source rate is zero.
    #[error("Missing rate information for {from} -> {to}")]
    MissingRate { from: String, to: String },

    /// A configured endpoint could not be turned into a request URL.
    #[error("Invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The request never produced a response (connect failure, timeout, bad URL).
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, FxError>;
