//! Data-access facade.
//!
//! `Explorer` is the only surface front-ends use. Reads check the keyed
//! caches first; a miss goes to the injected `ExplorerSource`, is normalized,
//! stored, and returned. Concurrent misses for the same key share one
//! upstream call. Data locks are never held across upstream I/O; only the
//! initialize guard is.
//!
//! Nothing here returns an error: upstream failures surface as `None`, empty
//! lists or default stats.

use crate::catalog;
use crate::config::Config;
use crate::constants::{cache, chain, display::NOT_AVAILABLE};
use crate::gateway::{ExplorerSource, HttpGateway};
use crate::normalize;
use crate::persist::{CacheDb, CacheSnapshot};
use crate::store::{
    paginate, ChainFilter, Clock, InFlight, KeyedCache, SystemClock, TxFilter,
};
use crate::types::*;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Uninitialized,
    Loading,
    Initialized,
}

/// Bulk-loaded "latest" collections, replaced wholesale on refresh.
#[derive(Default)]
struct Latest {
    blocks: Vec<Block>,
    transactions: Vec<Transaction>,
    stats: NetworkStats,
    tx_chart: Option<TxChartData>,
    chains: Vec<L2Chain>,
    /// Upstream returned fewer blocks than asked for
    blocks_exhausted: bool,
}

struct Caches {
    blocks: KeyedCache<u64, Block>,
    block_txs: KeyedCache<u64, Vec<Transaction>>,
    transactions: KeyedCache<String, Transaction>,
    addresses: KeyedCache<String, Address>,
    tokens: KeyedCache<String, TokenInfo>,
}

impl Caches {
    fn new(config: &Config) -> Self {
        let cap = config.cache_capacity;
        let max_age = Some(config.cache_max_age_ms);
        Self {
            // blocks never expire within a session
            blocks: KeyedCache::new(cap.max(cache::MAX_BLOCK_WINDOW), None),
            block_txs: KeyedCache::new(cap, None),
            transactions: KeyedCache::new(cap, max_age),
            addresses: KeyedCache::new(cap, max_age),
            tokens: KeyedCache::new(cap, max_age),
        }
    }

    fn put_transactions(&mut self, txs: &[Transaction], now: u64) {
        for tx in txs {
            self.transactions.insert(tx.signature.clone(), tx.clone(), now);
        }
    }

    fn put_blocks(&mut self, blocks: &[Block], now: u64) {
        for b in blocks {
            self.blocks.insert(b.block_number, b.clone(), now);
        }
    }
}

pub struct Explorer {
    source: Arc<dyn ExplorerSource>,
    config: Config,
    clock: Arc<dyn Clock>,
    db: Option<CacheDb>,
    state: RwLock<SessionState>,
    init_lock: Mutex<()>,
    latest: RwLock<Latest>,
    caches: RwLock<Caches>,
    block_flight: InFlight<u64, (Block, Vec<Transaction>)>,
    tx_flight: InFlight<String, Transaction>,
    address_flight: InFlight<String, Address>,
    token_flight: InFlight<String, TokenInfo>,
}

fn newest_first(txs: &mut [Transaction]) {
    txs.sort_by(|a, b| {
        b.block_number
            .cmp(&a.block_number)
            .then_with(|| a.signature.cmp(&b.signature))
    });
}

impl Explorer {
    pub fn new(source: Arc<dyn ExplorerSource>, config: Config) -> Self {
        Self {
            caches: RwLock::new(Caches::new(&config)),
            source,
            config,
            clock: Arc::new(SystemClock),
            db: None,
            state: RwLock::new(SessionState::Uninitialized),
            init_lock: Mutex::new(()),
            latest: RwLock::new(Latest::default()),
            block_flight: InFlight::default(),
            tx_flight: InFlight::default(),
            address_flight: InFlight::default(),
            token_flight: InFlight::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cache_db(mut self, db: CacheDb) -> Self {
        self.db = Some(db);
        self
    }

    /// Network-backed explorer, with persistence when `config.cache_db` is set.
    #[cfg(feature = "native")]
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let gateway = Arc::new(HttpGateway::new(&config)?);
        let db = config.cache_db.as_ref().map(CacheDb::open).transpose()?;
        let mut explorer = Self::new(gateway, config);
        explorer.db = db;
        Ok(explorer)
    }

    #[cfg(not(feature = "native"))]
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let gateway = Arc::new(HttpGateway::new(&config)?);
        Ok(Self::new(gateway, config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    // -----------------------------------------------------------------------
    // Session lifecycle

    /// One parallel bulk load: latest blocks, latest transactions, network
    /// stats, tx chart data and the L2 catalog. Runs once per session.
    /// Callers arriving while the load is in progress wait for it to finish.
    pub async fn initialize(&self) {
        let _init = self.init_lock.lock().await;
        {
            let mut state = self.state.write().await;
            if *state == SessionState::Initialized {
                return;
            }
            *state = SessionState::Loading;
        }
        log::info!("[explorer] initializing");

        self.restore().await;

        let (raw_blocks, raw_txs, overview, chart) = tokio::join!(
            self.source.latest_blocks(self.config.latest_blocks),
            self.source.latest_transactions(self.config.latest_transactions),
            self.source.analytics_overview(),
            self.source.tx_chart_data(),
        );
        let blocks = normalize::normalize_blocks(&raw_blocks);
        let txs = normalize::normalize_transactions(&raw_txs);

        let now = self.now();
        {
            let mut caches = self.caches.write().await;
            caches.put_blocks(&blocks, now);
            caches.put_transactions(&txs, now);
        }
        {
            let mut latest = self.latest.write().await;
            latest.blocks_exhausted = blocks.len() < self.config.latest_blocks;
            latest.blocks = blocks;
            latest.transactions = txs;
            latest.stats = overview
                .as_ref()
                .map(normalize::normalize_network_stats)
                .unwrap_or_default();
            latest.tx_chart = chart.as_ref().map(normalize::normalize_tx_chart);
            latest.chains = catalog::l2_chains();
            log::info!(
                "[explorer] initialized: {} blocks, {} transactions",
                latest.blocks.len(),
                latest.transactions.len()
            );
        }
        *self.state.write().await = SessionState::Initialized;
    }

    /// Re-fetches the latest blocks, transactions and network stats. Keyed
    /// caches are kept.
    pub async fn refresh_data(&self) {
        let (raw_blocks, raw_txs, overview) = tokio::join!(
            self.source.latest_blocks(self.config.latest_blocks),
            self.source.latest_transactions(self.config.latest_transactions),
            self.source.analytics_overview(),
        );
        let blocks = normalize::normalize_blocks(&raw_blocks);
        let txs = normalize::normalize_transactions(&raw_txs);

        let now = self.now();
        {
            let mut caches = self.caches.write().await;
            caches.put_blocks(&blocks, now);
            caches.put_transactions(&txs, now);
        }
        let mut latest = self.latest.write().await;
        latest.blocks_exhausted = blocks.len() < self.config.latest_blocks;
        latest.blocks = blocks;
        latest.transactions = txs;
        if let Some(raw) = overview {
            latest.stats = normalize::normalize_network_stats(&raw);
        }
        log::debug!("[explorer] refreshed latest collections");
    }

    async fn restore(&self) {
        let Some(db) = &self.db else {
            return;
        };
        let mut snapshot = match db.load().await {
            Ok(Some(s)) => s,
            Ok(None) => return,
            Err(e) => {
                log::warn!("[explorer] ignoring unreadable cache snapshot: {e:#}");
                return;
            }
        };
        snapshot.retain_fresh(self.now(), self.config.cache_max_age_ms);
        if snapshot.is_empty() {
            return;
        }
        log::info!(
            "[explorer] restored {} transactions, {} addresses from cache db",
            snapshot.transactions.len(),
            snapshot.addresses.len()
        );
        let mut caches = self.caches.write().await;
        for (k, v) in snapshot.transactions {
            caches.transactions.insert_stamped(k, v);
        }
        for (k, v) in snapshot.addresses {
            caches.addresses.insert_stamped(k, v);
        }
    }

    /// Saves the transaction and address caches. Returns whether a snapshot was written.
    pub async fn persist(&self) -> bool {
        let Some(db) = &self.db else {
            return false;
        };
        let snapshot = {
            let mut caches = self.caches.write().await;
            let now = self.now();
            caches.transactions.purge_expired(now);
            caches.addresses.purge_expired(now);
            CacheSnapshot {
                transactions: caches.transactions.export(),
                addresses: caches.addresses.export(),
            }
        };
        match db.save(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[explorer] failed to persist cache: {e:#}");
                false
            }
        }
    }

    /// Empties the transaction and address caches, and the cache db when one
    /// is attached. Blocks and the latest collections are kept.
    pub async fn clear_cache(&self) {
        let (txs, addrs) = {
            let mut caches = self.caches.write().await;
            let counts = (caches.transactions.len(), caches.addresses.len());
            caches.transactions.clear();
            caches.addresses.clear();
            counts
        };
        log::info!("[explorer] cleared {txs} transactions, {addrs} addresses");
        if let Some(db) = &self.db {
            if let Err(e) = db.clear().await {
                log::warn!("[explorer] failed to clear cache db: {e:#}");
            }
        }
    }

    pub async fn latest_blocks(&self) -> Vec<Block> {
        self.latest.read().await.blocks.clone()
    }

    pub async fn latest_transactions(&self) -> Vec<Transaction> {
        self.latest.read().await.transactions.clone()
    }

    // -----------------------------------------------------------------------
    // Blocks

    /// Page `page` (1-based) of cached blocks, newest first.
    ///
    /// When the page lies beyond the loaded window and upstream still had
    /// more, the latest-blocks window is widened to cover it first.
    pub async fn fetch_blocks(&self, page: usize, limit: usize) -> BlocksPage {
        let page = page.max(1);
        let needed = page.saturating_mul(limit).min(cache::MAX_BLOCK_WINDOW);
        let (loaded, exhausted) = {
            let latest = self.latest.read().await;
            (latest.blocks.len(), latest.blocks_exhausted)
        };

        if limit > 0 && needed > loaded && !exhausted {
            log::debug!("[explorer] widening block window {loaded} -> {needed}");
            let blocks = normalize::normalize_blocks(&self.source.latest_blocks(needed).await);
            {
                let mut caches = self.caches.write().await;
                caches.put_blocks(&blocks, self.now());
            }
            let mut latest = self.latest.write().await;
            latest.blocks_exhausted = blocks.len() < needed;
            if blocks.len() >= latest.blocks.len() {
                latest.blocks = blocks;
            }
        }

        let mut blocks: Vec<Block> = {
            let caches = self.caches.read().await;
            caches.blocks.values(self.now()).cloned().collect()
        };
        blocks.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        let (blocks, total) = paginate(&blocks, page, limit);
        BlocksPage { blocks, total }
    }

    pub async fn fetch_block(&self, number: u64) -> Option<Block> {
        if let Some(block) = self.caches.write().await.blocks.get(&number, self.now()) {
            log::debug!("[explorer] block {number} cache hit");
            return Some(block);
        }
        self.block_flight
            .run(number, || self.load_block(number))
            .await
            .map(|(block, _)| block)
    }

    /// Transactions of block `number`, fetching the block if needed.
    pub async fn fetch_block_transactions(&self, number: u64) -> Vec<Transaction> {
        if let Some(txs) = self.caches.write().await.block_txs.get(&number, self.now()) {
            return txs;
        }
        self.block_flight
            .run(number, || self.load_block(number))
            .await
            .map(|(_, txs)| txs)
            .unwrap_or_default()
    }

    async fn load_block(&self, number: u64) -> Option<(Block, Vec<Transaction>)> {
        let payload = self.source.block(number).await?;
        let (block, txs) = normalize::normalize_block_payload(&payload, number);
        let block = block?;
        let now = self.now();
        let mut caches = self.caches.write().await;
        caches.blocks.insert(number, block.clone(), now);
        caches.block_txs.insert(number, txs.clone(), now);
        caches.put_transactions(&txs, now);
        Some((block, txs))
    }

    // -----------------------------------------------------------------------
    // Transactions

    /// Latest and cached transactions, de-duplicated, newest block first.
    async fn known_transactions(&self) -> Vec<Transaction> {
        let latest = self.latest.read().await.transactions.clone();
        let caches = self.caches.read().await;
        let mut seen: HashSet<String> = latest.iter().map(|t| t.signature.clone()).collect();
        let mut all = latest;
        all.extend(
            caches
                .transactions
                .values(self.now())
                .filter(|t| seen.insert(t.signature.clone()))
                .cloned(),
        );
        newest_first(&mut all);
        all
    }

    /// Client-side page over loaded transactions. `total` counts every
    /// transaction matching `filter`, independent of `page`.
    pub async fn fetch_transactions(&self, page: usize, limit: usize, filter: &TxFilter) -> TransactionsPage {
        let matching: Vec<Transaction> = self
            .known_transactions()
            .await
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        let (transactions, total) = paginate(&matching, page, limit);
        TransactionsPage { transactions, total }
    }

    pub async fn fetch_transaction(&self, signature: &str) -> Option<Transaction> {
        let signature = signature.trim();
        if signature.is_empty() {
            return None;
        }
        if let Some(tx) = self
            .caches
            .write()
            .await
            .transactions
            .get(&signature.to_string(), self.now())
        {
            log::debug!("[explorer] transaction {signature} cache hit");
            return Some(tx);
        }
        self.tx_flight
            .run(signature.to_string(), || self.load_transaction(signature))
            .await
    }

    async fn load_transaction(&self, signature: &str) -> Option<Transaction> {
        let raw = self.source.transaction(signature).await?;
        let tx = normalize::normalize_transaction(&raw)?;
        self.caches
            .write()
            .await
            .transactions
            .insert(signature.to_string(), tx.clone(), self.now());
        Some(tx)
    }

    // -----------------------------------------------------------------------
    // Addresses and tokens

    /// Balance, account metadata, holdings and history of `address`.
    ///
    /// History comes from the backend; when it has none, loaded transactions
    /// involving the address are used instead.
    pub async fn fetch_address(&self, address: &str) -> Option<Address> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        if let Some(hit) = self
            .caches
            .write()
            .await
            .addresses
            .get(&address.to_string(), self.now())
        {
            log::debug!("[explorer] address {address} cache hit");
            return Some(hit);
        }
        self.address_flight
            .run(address.to_string(), || self.load_address(address))
            .await
    }

    async fn load_address(&self, address: &str) -> Option<Address> {
        let (raw_txs, info) = tokio::join!(
            self.source.address_transactions(address),
            self.source.account_info(address),
        );
        let mut view = normalize::normalize_address(address, info.as_ref(), &raw_txs);
        let found = view.account.is_some() || !raw_txs.is_empty();

        if view.transactions.is_empty() {
            view.transactions = self
                .known_transactions()
                .await
                .into_iter()
                .filter(|t| t.involves(address))
                .collect();
        } else {
            newest_first(&mut view.transactions);
        }

        if found {
            let now = self.now();
            let mut caches = self.caches.write().await;
            caches.put_transactions(&view.transactions, now);
            caches.addresses.insert(address.to_string(), view.clone(), now);
        }
        Some(view)
    }

    pub async fn fetch_token(&self, mint: &str) -> Option<TokenInfo> {
        let mint = mint.trim();
        if mint.is_empty() {
            return None;
        }
        if let Some(hit) = self.caches.write().await.tokens.get(&mint.to_string(), self.now()) {
            return Some(hit);
        }
        self.token_flight
            .run(mint.to_string(), || async move {
                let raw = self.source.token_mint(mint).await?;
                let token = normalize::normalize_token(mint, &raw);
                self.caches
                    .write()
                    .await
                    .tokens
                    .insert(mint.to_string(), token.clone(), self.now());
                Some(token)
            })
            .await
    }

    /// True when `mint` is an account owned by the configured token program.
    pub async fn is_token_account(&self, mint: &str) -> bool {
        let mint = mint.trim();
        !mint.is_empty()
            && self
                .source
                .is_token_mint(mint, &self.config.token_program_id)
                .await
    }

    // -----------------------------------------------------------------------
    // Catalog, stats, charts

    async fn chains(&self) -> Vec<L2Chain> {
        let mut latest = self.latest.write().await;
        if latest.chains.is_empty() {
            latest.chains = catalog::l2_chains();
        }
        latest.chains.clone()
    }

    pub async fn fetch_l2_chains(&self, filter: &ChainFilter) -> Vec<L2Chain> {
        self.chains()
            .await
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect()
    }

    pub async fn fetch_l2_chain(&self, id: &str) -> Option<L2Chain> {
        let id = id.trim();
        self.chains().await.into_iter().find(|c| c.id == id)
    }

    /// Fresh network stats. On upstream failure the previous snapshot is returned.
    pub async fn fetch_network_stats(&self) -> NetworkStats {
        let fresh = self.source.analytics_overview().await;
        let mut latest = self.latest.write().await;
        if let Some(raw) = fresh {
            latest.stats = normalize::normalize_network_stats(&raw);
        }
        latest.stats.clone()
    }

    /// Daily transaction counts, replaced wholesale; `None` when upstream fails.
    pub async fn fetch_tx_chart_data(&self) -> Option<TxChartData> {
        let chart = self
            .source
            .tx_chart_data()
            .await
            .as_ref()
            .map(normalize::normalize_tx_chart);
        self.latest.write().await.tx_chart = chart.clone();
        chart
    }

    /// Dashboard series derived from loaded chart data, the L2 catalog and
    /// network stats.
    pub async fn fetch_chart_data(&self) -> ChartData {
        let have_chart = self.latest.read().await.tx_chart.is_some();
        if !have_chart {
            self.fetch_tx_chart_data().await;
        }
        let chains = self.chains().await;
        let latest = self.latest.read().await;

        let network_activity = latest
            .tx_chart
            .as_ref()
            .map(|c| {
                c.chart_data
                    .iter()
                    .map(|p| ActivityPoint {
                        date: p.date.clone(),
                        transactions: p.count,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let l2_performance = chains
            .iter()
            .map(|c| L2Performance {
                chain_id: c.id.clone(),
                name: c.name.clone(),
                tps: (c.daily_transactions as f64 / 86_400.0 * 100.0).round() / 100.0,
                tvl: c.tvl,
                uptime: catalog::parse_percent(&c.uptime),
            })
            .collect();

        ChartData {
            network_activity,
            l2_performance,
            token_metrics: TokenMetrics {
                symbol: chain::NATIVE_SYMBOL.to_string(),
                total_supply: latest.stats.total_supply,
                circulating_supply: latest.stats.circulating_supply,
                price: NOT_AVAILABLE.to_string(),
                market_cap: NOT_AVAILABLE.to_string(),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Search

    /// Substring search over loaded data only; this is not a global search.
    /// Blocks match by number or hash, transactions by signature, signer or
    /// recipient, addresses by key. At most ten of each, case-insensitive.
    pub async fn search(&self, query: &str) -> SearchResults {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return SearchResults::default();
        }
        let now = self.now();

        let mut blocks: Vec<Block> = {
            let caches = self.caches.read().await;
            caches
                .blocks
                .values(now)
                .filter(|b| {
                    b.block_number.to_string().contains(&needle)
                        || b.hash.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect()
        };
        blocks.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        blocks.truncate(cache::SEARCH_LIMIT);

        let by_text = TxFilter::default().with_search(needle.clone());
        let transactions: Vec<Transaction> = self
            .known_transactions()
            .await
            .into_iter()
            .filter(|t| by_text.matches(t))
            .take(cache::SEARCH_LIMIT)
            .collect();

        let mut addresses: Vec<String> = {
            let caches = self.caches.read().await;
            caches
                .addresses
                .values(now)
                .filter(|a| a.address.to_lowercase().contains(&needle))
                .map(|a| a.address.clone())
                .collect()
        };
        addresses.sort();
        addresses.truncate(cache::SEARCH_LIMIT);

        SearchResults {
            blocks,
            transactions,
            addresses,
        }
    }
}
