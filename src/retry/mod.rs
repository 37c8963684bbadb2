//! Retry classification of HTTP status codes.
//!
//! This module only classifies; the retry loop and backoff live above this
//! crate (scheduler/downloader side) and consume the classification through
//! [`crate::error::FetchError::is_retryable`].

mod classify;

pub use classify::{NonRetryableSet, StatusClass, DEFAULT_NON_RETRYABLE};
