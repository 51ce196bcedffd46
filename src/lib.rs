//! gorbx - Gorbchain explorer data layer
//!
//! Fetches, caches and paginates blocks, transactions, addresses and token
//! metadata from the Gorbchain backend REST API and JSON-RPC node, and
//! normalizes their loosely typed payloads into stable view-models.
//!
//! ## Layers
//!
//! - `gateway`: upstream HTTP/RPC access; failures become "no data"
//! - `wire` / `normalize`: upstream shapes and their conversion to `types`
//! - `store`: keyed TTL/LRU caches, pagination, filters, request de-duplication
//! - `persist`: cache snapshots between sessions
//! - `explorer`: the facade front-ends call
//!
//! ## Usage
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use gorbx::{Config, Explorer};
//!
//! let explorer = Explorer::from_config(Config::default())?;
//! explorer.initialize().await;
//! let page = explorer.fetch_blocks(1, 25).await;
//! println!("{} of {} blocks", page.blocks.len(), page.total);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod constants;
pub mod types;

// Upstream shapes and conversion
pub mod normalize;
pub mod wire;

// Network access
pub mod gateway;

// Caching and persistence (SQLite only with the `native` feature)
pub mod persist;
pub mod store;

// Static data
pub mod catalog;

// Facade
pub mod explorer;

// Re-export commonly used types
pub use config::{Config, ConfigArgs};
pub use explorer::{Explorer, SessionState};
pub use gateway::{ExplorerSource, HttpGateway};
pub use persist::{CacheDb, CacheSnapshot};
pub use store::{ChainFilter, Clock, ManualClock, SystemClock, TxFilter};
pub use types::{
    Address, Block, BlocksPage, ChainStatus, L2Chain, NetworkStats, SearchResults, TokenInfo,
    Transaction, TransactionsPage, TxChartData, TxStatus,
};
