//! HTTP fetch operations with manual redirect resolution.
//!
//! Redirects are followed by hand instead of by the transport so that
//! caller-supplied headers survive every hop and the final post-redirect URL
//! can be handed back for relative-reference resolution in fetched
//! playlists. The transport never retries; it classifies terminal failures
//! (see [`crate::retry`]) and fails fast.

mod redirect;

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Response};
use tracing::{debug, error, info};
use url::Url;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::retry::{NonRetryableSet, StatusClass};

use redirect::{is_redirect_status, resolve_location};

/// Placeholder returned instead of decoding a live MPEG-2 transport stream
/// as text. Some live-stream redirects land directly on a TS segment rather
/// than a playlist; decoding that as text would garble it.
pub const LIVE_TS_SENTINEL: &str = "Live TS Stream detected";

/// Shared HTTP fetcher. One instance per process; cheap to share by
/// reference, and all operations are concurrency-safe.
pub struct Fetcher {
    client: Client,
    max_redirects: usize,
    non_retryable: NonRetryableSet,
}

impl Fetcher {
    /// Build the fetcher and its pooled transport client from config.
    ///
    /// The client follows no redirects on its own, auto-negotiates and
    /// decodes gzip/deflate, prefers HTTP/2 via ALPN with HTTP/1.1 fallback,
    /// and (by default) skips TLS certificate verification — the tool talks
    /// to CDNs and ad-hoc origins with self-signed certificates.
    ///
    /// `max_connections_per_host` only sizes the idle connection pool
    /// (`pool_max_idle_per_host`); the transport has no hard cap on
    /// concurrent connections per server, so callers needing a strict bound
    /// must limit in-flight fetches themselves.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .gzip(true)
            .deflate(true)
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .pool_max_idle_per_host(config.max_connections_per_host)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            max_redirects: config.max_redirects,
            non_retryable: NonRetryableSet::from_override(config.non_retryable_codes.as_deref()),
        })
    }

    /// GET `url`, following redirects manually up to the configured hop
    /// bound. Returns the terminal response with its body still unread;
    /// `Response::url()` is the final URL (the URL of the last hop actually
    /// requested).
    async fn do_get(&self, url: &str, headers: &HashMap<String, String>) -> Result<Response, FetchError> {
        let mut current = Url::parse(url)?;
        for _ in 0..=self.max_redirects {
            debug!("fetching: {}", current);
            let header_map = build_headers(headers);
            debug!("request headers: {:?}", header_map);
            let response = self
                .client
                .get(current.clone())
                .headers(header_map)
                .send()
                .await?;

            if is_redirect_status(response.status().as_u16()) {
                debug!("redirect response headers: {:?}", response.headers());
                if let Some(target) = redirect_target(&current, &response)? {
                    // A Location pointing back at the URL just requested
                    // would loop forever; hand the response to status
                    // classification instead.
                    if target != current {
                        info!("redirected => {}", target);
                        current = target;
                        continue;
                    }
                }
            }
            return self.check_status(response);
        }
        Err(FetchError::TooManyRedirects {
            url: current.to_string(),
            hops: self.max_redirects,
        })
    }

    /// Classify the terminal status. Non-retryable codes fail without the
    /// body ever being read.
    fn check_status(&self, response: Response) -> Result<Response, FetchError> {
        let status = response.status();
        let code = status.as_u16();
        match self.non_retryable.classify(code) {
            StatusClass::NonRetryable => {
                let reason = status.canonical_reason().unwrap_or("Unknown Status");
                error!("HTTP {} {}: request failed, not retrying", code, reason);
                Err(FetchError::NonRetryableStatus {
                    code,
                    message: format!("HTTP {code} {reason}: request failed with non-retryable status code"),
                })
            }
            StatusClass::Other if !status.is_success() => Err(FetchError::UnsuccessfulStatus(code)),
            StatusClass::Other => Ok(response),
        }
    }

    /// Fetch raw bytes. `file:` URLs read straight from disk and skip the
    /// network path (and retry classification) entirely.
    pub async fn get_bytes(&self, url: &str, headers: &HashMap<String, String>) -> Result<Vec<u8>, FetchError> {
        if url.starts_with("file:") {
            let path = Url::parse(url)?
                .to_file_path()
                .map_err(|()| io::Error::new(io::ErrorKind::InvalidInput, "file URL has no local path"))?;
            return Ok(tokio::fs::read(path).await?);
        }
        let response = self.do_get(url, headers).await?;
        let bytes = response.bytes().await?;
        debug!("response bytes: {}", hex::encode(&bytes));
        Ok(bytes.to_vec())
    }

    /// Fetch a page/playlist as text, decoded per the response's declared
    /// charset.
    pub async fn get_text(&self, url: &str, headers: &HashMap<String, String>) -> Result<String, FetchError> {
        let response = self.do_get(url, headers).await?;
        let text = response.text().await?;
        debug!("response text: {}", text);
        Ok(text)
    }

    /// Fetch text plus the final post-redirect URL, for resolving relative
    /// references in the fetched document. Live transport-stream bodies are
    /// replaced by [`LIVE_TS_SENTINEL`] instead of being decoded.
    pub async fn get_text_and_final_url(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<(String, String), FetchError> {
        let response = self.do_get(url, headers).await?;
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let text = if is_live_ts(content_type.as_deref()) {
            LIVE_TS_SENTINEL.to_string()
        } else {
            response.text().await?
        };
        debug!("response text: {}", text);
        Ok((text, final_url))
    }

    /// POST raw bytes as `application/json` and return the response text.
    ///
    /// Intentionally does not go through the redirect walk or status
    /// classification; the status code is not checked at all. The
    /// client-level no-redirect policy still applies.
    pub async fn post_and_get_text(&self, url: &str, body: &[u8]) -> Result<String, FetchError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .body(body.to_vec())
            .send()
            .await?;
        Ok(response.text().await?)
    }
}

/// Extract and resolve the redirect target, if any. A missing or non-ASCII
/// `Location` makes the response terminal.
fn redirect_target(current: &Url, response: &Response) -> Result<Option<Url>, FetchError> {
    let location = match response.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
        Some(location) => location,
        None => return Ok(None),
    };
    Ok(Some(resolve_location(current, location)?))
}

/// Assemble per-request headers: `Cache-Control: no-cache` first, then the
/// caller's headers on top. Repeating a default's name overrides it.
/// Malformed names/values are dropped with a log line rather than failing
/// the request. `Accept-Encoding: gzip, deflate` is owned by the transport,
/// which also decodes the body; a caller-supplied value replaces it (and
/// disables auto-decoding for that request).
fn build_headers(custom: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    for (name, value) in custom {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => debug!("dropping malformed header {:?}", name),
        }
    }
    map
}

/// True when the content type denotes a raw MPEG-2 transport stream.
fn is_live_ts(content_type: Option<&str>) -> bool {
    let media_type = match content_type {
        Some(ct) => ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase(),
        None => return false,
    };
    matches!(media_type.as_str(), "video/ts" | "video/mp2t" | "video/mpeg")
}
