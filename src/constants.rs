//! Application constants
//!
//! Centralized constants for unit conversion, cache sizing, display fallbacks
//! and upstream paths used throughout the crate.

/// Native token and unit conversion constants
pub mod chain {
    /// Symbol of the chain's native token
    pub const NATIVE_SYMBOL: &str = "GORB";

    /// Base units (lamports) per native token
    pub const LAMPORTS_PER_NATIVE: u64 = 1_000_000_000;

    /// Fractional digits used when rendering native amounts
    pub const DISPLAY_DECIMALS: usize = 6;

    /// System program id (plain wallets are owned by it)
    pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

    /// Default token program whose mints count as token accounts
    pub const DEFAULT_TOKEN_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
}

/// Cache and session constants
pub mod cache {
    /// Max age of persisted transaction and address entries (5 minutes)
    pub const DEFAULT_MAX_AGE_MS: u64 = 5 * 60 * 1000;

    /// Entries kept per entity kind before LRU eviction kicks in
    pub const DEFAULT_CAPACITY: usize = 5_000;

    /// Upper bound for a single latest-blocks request
    ///
    /// Page windows wider than this are clamped; the backend rejects larger
    /// limits anyway.
    pub const MAX_BLOCK_WINDOW: usize = 1_000;

    /// Results returned per entity kind by `search`
    pub const SEARCH_LIMIT: usize = 10;

    /// SQLite key under which the cache snapshot blob is stored
    pub const SNAPSHOT_KEY: &str = "blockchain-storage";
}

/// Display fallbacks, one per field type
pub mod display {
    /// Display-only strings that the source did not provide
    pub const NOT_AVAILABLE: &str = "N/A";
}

/// User-facing empty-state strings
pub mod messages {
    pub const NO_BLOCKS: &str = "No blocks available";
    pub const NO_TRANSACTIONS: &str = "No transactions found";
    pub const NO_TRANSACTION: &str = "Transaction not found";
    pub const NO_ADDRESS: &str = "No address data";
    pub const NO_TOKEN: &str = "No token data found.";
    pub const NO_CHAINS: &str = "No L2 chains match the filter";
    pub const NO_RESULTS: &str = "No results in loaded data";
}
