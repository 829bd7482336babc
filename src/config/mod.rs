use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub marketplace: MarketplaceConfig,
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Store-scan configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketplaceConfig {
    #[serde(default = "default_marketplace_url")]
    pub base_url: String,

    /// Days back from now that still count as "recent".
    #[serde(default = "default_recency_days")]
    pub recency_window_days: i64,

    /// Quantity changes needed within the window for an item to qualify.
    #[serde(default = "default_min_qualifying")]
    pub min_qualifying_count: u32,

    /// Stop scanning once this many items have qualified.
    #[serde(default = "default_max_qualifying")]
    pub max_qualifying_items: usize,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Fixed pause between revision-history checks.
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,
}

/// Retailer-search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_url")]
    pub base_url: String,

    /// Search engine region pin, e.g. "au-en".
    #[serde(default = "default_region")]
    pub region: String,

    /// A harvested URL must contain this marker to be kept.
    #[serde(default = "default_domain_marker")]
    pub domain_marker: String,

    /// Marketplace keywords excluded from both the query and the results.
    #[serde(default = "default_exclude_domains")]
    pub exclude_domains: Vec<String>,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Randomized delay bounds between retailer page visits.
    #[serde(default = "default_page_delay_min")]
    pub page_delay_min_secs: f64,

    #[serde(default = "default_page_delay_max")]
    pub page_delay_max_secs: f64,
}

/// Page-fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_marketplace_url() -> String {
    "https://www.ebay.com.au".to_string()
}
fn default_recency_days() -> i64 {
    14
}
fn default_min_qualifying() -> u32 {
    3
}
fn default_max_qualifying() -> usize {
    10
}
fn default_page_size() -> u32 {
    200
}
fn default_item_delay_ms() -> u64 {
    1500
}
fn default_search_url() -> String {
    "https://duckduckgo.com/html".to_string()
}
fn default_region() -> String {
    "au-en".to_string()
}
fn default_domain_marker() -> String {
    ".com.au".to_string()
}
fn default_exclude_domains() -> Vec<String> {
    ["ebay", "amazon", "catch", "kogan"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_max_results() -> usize {
    15
}
fn default_page_delay_min() -> f64 {
    2.0
}
fn default_page_delay_max() -> f64 {
    5.0
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    1500
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
        .to_string()
}
fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("SCOUT").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            marketplace: MarketplaceConfig {
                base_url: default_marketplace_url(),
                recency_window_days: default_recency_days(),
                min_qualifying_count: default_min_qualifying(),
                max_qualifying_items: default_max_qualifying(),
                page_size: default_page_size(),
                item_delay_ms: default_item_delay_ms(),
            },
            search: SearchConfig {
                base_url: default_search_url(),
                region: default_region(),
                domain_marker: default_domain_marker(),
                exclude_domains: default_exclude_domains(),
                max_results: default_max_results(),
                page_delay_min_secs: default_page_delay_min(),
                page_delay_max_secs: default_page_delay_max(),
            },
            fetch: FetchConfig {
                timeout_secs: default_timeout_secs(),
                max_retries: default_max_retries(),
                retry_backoff_ms: default_retry_backoff_ms(),
                user_agent: default_user_agent(),
            },
            output: OutputConfig {
                dir: default_out_dir(),
            },
        }
    }
}
