//! Fetch error taxonomy.
//!
//! The point of the split is the retryable-vs-not signal: an outer retry
//! loop calls [`FetchError::is_retryable`] instead of re-parsing status
//! codes. This crate itself never retries or sleeps.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Terminal status from the classified non-retryable set (401, 403, 404,
    /// 429, 500, 502, 503 by default). Retrying the identical request is
    /// pointless; the caller should give up or change something.
    #[error("{message}")]
    NonRetryableStatus { code: u16, message: String },

    /// Any other non-2xx terminal status. The caller's retry loop may try
    /// again per its own policy.
    #[error("HTTP {0}: unsuccessful status code")]
    UnsuccessfulStatus(u16),

    /// Network-level failure (DNS, connect, timeout, broken transfer).
    /// Treated as retryable by convention.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Redirect walk exceeded the configured hop bound.
    #[error("too many redirects ({hops} hops), stopped at {url}")]
    TooManyRedirects { url: String, hops: usize },

    /// Malformed request URL or redirect target.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Read failure on a `file:` URL. Not subject to retry classification.
    #[error("local I/O error: {0}")]
    LocalIo(#[from] std::io::Error),
}

impl FetchError {
    /// True when a caller-side retry of the same request could plausibly
    /// succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::UnsuccessfulStatus(_) | FetchError::Transport(_) => true,
            FetchError::NonRetryableStatus { .. }
            | FetchError::TooManyRedirects { .. }
            | FetchError::InvalidUrl(_)
            | FetchError::LocalIo(_) => false,
        }
    }

    /// The HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::NonRetryableStatus { code, .. } => Some(*code),
            FetchError::UnsuccessfulStatus(code) => Some(*code),
            _ => None,
        }
    }
}
