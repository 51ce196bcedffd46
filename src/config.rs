use crate::constants::{cache, chain};
use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_BACKEND_URL: &str = "https://api.gorbscan.com";
pub const DEFAULT_RPC_URL: &str = "https://rpc.gorbchain.xyz";

/// Connection and cache settings shared by every front-end.
///
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Backend REST API base URL
    #[arg(long, env = "GORBX_BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// JSON-RPC node URL
    #[arg(long, env = "GORBX_RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Program id whose accounts count as token mints
    #[arg(long, env = "GORBX_TOKEN_PROGRAM_ID", global = true)]
    pub token_program_id: Option<String>,

    /// Per-request timeout in milliseconds (1000-60000)
    #[arg(long, env = "GORBX_REQUEST_TIMEOUT_MS", global = true)]
    pub request_timeout_ms: Option<u64>,

    /// Max age of cached transactions and addresses in milliseconds (1000-86400000)
    #[arg(long, env = "GORBX_CACHE_MAX_AGE_MS", global = true)]
    pub cache_max_age_ms: Option<u64>,

    /// Entries kept per entity kind before LRU eviction (10-100000)
    #[arg(long, env = "GORBX_CACHE_CAPACITY", global = true)]
    pub cache_capacity: Option<usize>,

    /// Blocks fetched by the initial bulk load (1-500)
    #[arg(long, env = "GORBX_LATEST_BLOCKS", global = true)]
    pub latest_blocks: Option<usize>,

    /// Transactions fetched by the initial bulk load (1-1000)
    #[arg(long, env = "GORBX_LATEST_TXS", global = true)]
    pub latest_transactions: Option<usize>,

    /// Path to SQLite database for cache persistence
    #[arg(long, env = "GORBX_CACHE_DB", global = true)]
    pub cache_db: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub rpc_url: String,
    pub token_program_id: String,
    pub request_timeout_ms: u64,
    pub cache_max_age_ms: u64,
    pub cache_capacity: usize,
    pub latest_blocks: usize,
    pub latest_transactions: usize,
    pub cache_db: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            token_program_id: chain::DEFAULT_TOKEN_PROGRAM_ID.to_string(),
            request_timeout_ms: 10_000,
            cache_max_age_ms: cache::DEFAULT_MAX_AGE_MS,
            cache_capacity: cache::DEFAULT_CAPACITY,
            latest_blocks: 25,
            latest_transactions: 300,
            cache_db: None,
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check), returning it without a trailing slash
fn validate_url(url: &str, name: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

impl Config {
    /// Merge parsed args over the defaults and validate every setting.
    pub fn from_args(args: ConfigArgs) -> Result<Self> {
        let d = Config::default();

        let backend_url = validate_url(
            args.backend_url.as_deref().unwrap_or(&d.backend_url),
            "GORBX_BACKEND_URL",
        )?;
        let rpc_url = validate_url(args.rpc_url.as_deref().unwrap_or(&d.rpc_url), "GORBX_RPC_URL")?;

        let token_program_id = args
            .token_program_id
            .map(|s| s.trim().to_string())
            .unwrap_or(d.token_program_id);
        if token_program_id.is_empty() {
            return Err(anyhow!("GORBX_TOKEN_PROGRAM_ID cannot be empty"));
        }

        let request_timeout_ms = validate_in_range(
            args.request_timeout_ms.unwrap_or(d.request_timeout_ms),
            1_000,
            60_000,
            "GORBX_REQUEST_TIMEOUT_MS",
        )?;
        let cache_max_age_ms = validate_in_range(
            args.cache_max_age_ms.unwrap_or(d.cache_max_age_ms),
            1_000,
            86_400_000,
            "GORBX_CACHE_MAX_AGE_MS",
        )?;
        let cache_capacity = validate_in_range(
            args.cache_capacity.unwrap_or(d.cache_capacity),
            10,
            100_000,
            "GORBX_CACHE_CAPACITY",
        )?;
        let latest_blocks = validate_in_range(
            args.latest_blocks.unwrap_or(d.latest_blocks),
            1,
            500,
            "GORBX_LATEST_BLOCKS",
        )?;
        let latest_transactions = validate_in_range(
            args.latest_transactions.unwrap_or(d.latest_transactions),
            1,
            1_000,
            "GORBX_LATEST_TXS",
        )?;

        Ok(Config {
            backend_url,
            rpc_url,
            token_program_id,
            request_timeout_ms,
            cache_max_age_ms,
            cache_capacity,
            latest_blocks,
            latest_transactions,
            cache_db: args.cache_db.filter(|p| !p.as_os_str().is_empty()),
        })
    }

    /// Print current configuration (useful for debugging)
    pub fn print_summary(&self) {
        eprintln!("gorbx configuration:");
        eprintln!("  Backend URL: {}", self.backend_url);
        eprintln!("  RPC URL: {}", self.rpc_url);
        eprintln!("  Token Program: {}", self.token_program_id);
        eprintln!("  Request Timeout: {}ms", self.request_timeout_ms);
        eprintln!("  Cache Max Age: {}ms", self.cache_max_age_ms);
        eprintln!("  Cache Capacity: {} per kind", self.cache_capacity);
        eprintln!("  Latest Blocks: {}", self.latest_blocks);
        eprintln!("  Latest Transactions: {}", self.latest_transactions);
        match &self.cache_db {
            Some(path) => eprintln!("  Cache DB: {}", path.display()),
            None => eprintln!("  Cache DB: disabled"),
        }
    }
}
