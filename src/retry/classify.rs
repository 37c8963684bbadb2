//! Classify HTTP status codes into retry policy kinds.

/// Status codes for which a bare retry of the identical request is pointless.
///
/// 429/500/502/503 look transient but are included on purpose: this layer
/// signals "don't re-send the same request unchanged" and leaves Retry-After
/// handling, backoff and mirror selection to a caller with more context.
pub const DEFAULT_NON_RETRYABLE: &[u16] = &[401, 403, 404, 429, 500, 502, 503];

/// Classification of a terminal HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Caller must not retry; treat as terminal.
    NonRetryable,
    /// Success, or a failure the caller may retry per its own policy.
    Other,
}

/// The set of non-retryable status codes. Defaults to
/// [`DEFAULT_NON_RETRYABLE`]; overridable through
/// `FetchConfig::non_retryable_codes` so policy can change without touching
/// the fetch algorithm.
#[derive(Debug, Clone)]
pub struct NonRetryableSet {
    codes: Vec<u16>,
}

impl Default for NonRetryableSet {
    fn default() -> Self {
        Self {
            codes: DEFAULT_NON_RETRYABLE.to_vec(),
        }
    }
}

impl NonRetryableSet {
    pub fn new(codes: Vec<u16>) -> Self {
        Self { codes }
    }

    /// Build from an optional config override.
    pub fn from_override(codes: Option<&[u16]>) -> Self {
        match codes {
            Some(codes) => Self::new(codes.to_vec()),
            None => Self::default(),
        }
    }

    pub fn contains(&self, code: u16) -> bool {
        self.codes.contains(&code)
    }

    pub fn classify(&self, code: u16) -> StatusClass {
        if self.contains(code) {
            StatusClass::NonRetryable
        } else {
            StatusClass::Other
        }
    }
}
