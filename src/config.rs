use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Transport configuration loaded from `~/.config/mediaget/config.toml`.
///
/// Built once at startup and handed to [`crate::fetch::Fetcher::new`]; never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout for a single request attempt, in seconds. Each redirect hop
    /// gets its own attempt; there is no chain-wide deadline.
    pub timeout_secs: u64,
    /// Connection pool cap per destination host.
    pub max_connections_per_host: usize,
    /// Skip TLS certificate and hostname verification. On by default: the
    /// tool fetches media from CDNs and ad-hoc origins with self-signed or
    /// mismatched certificates.
    pub insecure_skip_verify: bool,
    /// Maximum number of redirect hops followed within one fetch.
    pub max_redirects: usize,
    /// Override for the non-retryable status code set. `None` uses the
    /// built-in default (401, 403, 404, 429, 500, 502, 503).
    #[serde(default)]
    pub non_retryable_codes: Option<Vec<u16>>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 100,
            max_connections_per_host: 1024,
            insecure_skip_verify: true,
            max_redirects: 20,
            non_retryable_codes: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mediaget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
