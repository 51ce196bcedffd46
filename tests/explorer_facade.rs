//! Facade behaviour against an in-memory source: caching, expiry,
//! pagination, filtering, search and request de-duplication.

use async_trait::async_trait;
use gorbx::gateway::ExplorerSource;
use gorbx::wire::{
    RawAccountInfo, RawBlock, RawBlockPayload, RawOverview, RawTokenMint, RawTransaction,
    RawTxChart,
};
use gorbx::{ChainFilter, ChainStatus, Config, Explorer, ManualClock, SessionState, TxFilter, TxStatus};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Calls {
    latest_blocks: AtomicUsize,
    block: AtomicUsize,
    latest_transactions: AtomicUsize,
    transaction: AtomicUsize,
    address_transactions: AtomicUsize,
    account_info: AtomicUsize,
    token_mint: AtomicUsize,
    overview: AtomicUsize,
}

fn count(c: &AtomicUsize) -> usize {
    c.load(Ordering::SeqCst)
}

#[derive(Default)]
struct MockSource {
    /// newest first
    blocks: Mutex<Vec<Value>>,
    latest_txs: Mutex<Vec<Value>>,
    txs: HashMap<String, Value>,
    block_payloads: HashMap<u64, Value>,
    accounts: HashMap<String, Value>,
    mints: HashMap<String, Value>,
    delay: Duration,
    calls: Calls,
}

impl MockSource {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl ExplorerSource for MockSource {
    async fn latest_blocks(&self, limit: usize) -> Vec<RawBlock> {
        self.calls.latest_blocks.fetch_add(1, Ordering::SeqCst);
        let blocks = self.blocks.lock().unwrap().clone();
        blocks
            .into_iter()
            .take(limit)
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    async fn block(&self, slot: u64) -> Option<RawBlockPayload> {
        self.calls.block.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        RawBlockPayload::from_value(self.block_payloads.get(&slot)?.clone())
    }

    async fn latest_transactions(&self, limit: usize) -> Vec<RawTransaction> {
        self.calls.latest_transactions.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let txs = self.latest_txs.lock().unwrap().clone();
        txs.into_iter()
            .take(limit)
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    async fn transaction(&self, signature: &str) -> Option<RawTransaction> {
        self.calls.transaction.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        serde_json::from_value(self.txs.get(signature)?.clone()).ok()
    }

    async fn address_transactions(&self, _address: &str) -> Vec<RawTransaction> {
        self.calls.address_transactions.fetch_add(1, Ordering::SeqCst);
        Vec::new()
    }

    async fn tx_chart_data(&self) -> Option<RawTxChart> {
        serde_json::from_value(json!({
            "chartData": [{ "date": "2024-03-01", "count": 10 }, { "date": "2024-03-02", "count": 20 }],
            "totalTxns": 30
        }))
        .ok()
    }

    async fn token_mint(&self, address: &str) -> Option<RawTokenMint> {
        self.calls.token_mint.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        serde_json::from_value(self.mints.get(address)?.clone()).ok()
    }

    async fn analytics_overview(&self) -> Option<RawOverview> {
        self.calls.overview.fetch_add(1, Ordering::SeqCst);
        serde_json::from_value(json!({ "currentSlot": 30, "supply": { "total": 1000.0, "circulating": 600.0 } })).ok()
    }

    async fn account_info(&self, address: &str) -> Option<RawAccountInfo> {
        self.calls.account_info.fetch_add(1, Ordering::SeqCst);
        serde_json::from_value(self.accounts.get(address)?.clone()).ok()
    }
}

fn raw_block(slot: u64) -> Value {
    json!({
        "slot": slot,
        "blockhash": format!("hash{slot}"),
        "previousBlockhash": format!("hash{}", slot.saturating_sub(1)),
        "blockTime": 1_709_294_400 + slot as i64,
        "transactionCount": 2
    })
}

fn raw_tx(sig: &str, slot: u64, signer: &str, recipient: &str, err: Value) -> Value {
    json!({
        "slot": slot,
        "blockTime": 1_709_294_400,
        "meta": { "err": err, "fee": 5000 },
        "transaction": {
            "signatures": [sig],
            "message": {
                "accountKeys": [
                    { "pubkey": signer, "signer": true, "writable": true },
                    { "pubkey": recipient, "signer": false, "writable": true }
                ],
                "instructions": [{
                    "programId": "11111111111111111111111111111111",
                    "program": "system",
                    "parsed": { "type": "transfer", "info": { "source": signer, "destination": recipient, "lamports": 1_000_000_000u64 } }
                }]
            }
        }
    })
}

fn explorer(source: &Arc<MockSource>) -> Explorer {
    Explorer::new(source.clone(), Config::default())
}

#[tokio::test]
async fn empty_backend_yields_empty_blocks_page() {
    let source = Arc::new(MockSource::default());
    let ex = explorer(&source);
    let page = ex.fetch_blocks(1, 25).await;
    assert!(page.blocks.is_empty());
    assert_eq!(page.total, 0);

    // upstream reported nothing, so asking again does not re-fetch
    ex.fetch_blocks(2, 25).await;
    assert_eq!(count(&source.calls.latest_blocks), 1);
}

#[tokio::test]
async fn blocks_widen_window_and_page_beyond_last_keeps_total() {
    let source = Arc::new(MockSource {
        blocks: Mutex::new((1..=30).rev().map(raw_block).collect()),
        ..Default::default()
    });
    let ex = explorer(&source);

    let first = ex.fetch_blocks(1, 10).await;
    assert_eq!(first.blocks.len(), 10);
    assert_eq!(first.blocks[0].block_number, 30);
    assert_eq!(first.total, 10);

    let beyond = ex.fetch_blocks(4, 10).await;
    assert!(beyond.blocks.is_empty());
    assert_eq!(beyond.total, 30);

    let last = ex.fetch_blocks(3, 10).await;
    assert_eq!(
        last.blocks.iter().map(|b| b.block_number).collect::<Vec<_>>(),
        (1..=10).rev().collect::<Vec<_>>()
    );
    // the window was widened once, then upstream was known to be exhausted
    assert_eq!(count(&source.calls.latest_blocks), 2);
}

#[tokio::test]
async fn fetch_block_is_idempotent_and_cached() {
    let source = Arc::new(MockSource {
        block_payloads: HashMap::from([(
            42,
            json!({
                "blockhash": "hash42",
                "parentSlot": 41,
                "blockTime": 1_709_294_400,
                "transactions": [raw_tx("inBlock", 42, "A", "B", Value::Null)]
            }),
        )]),
        ..Default::default()
    });
    let ex = explorer(&source);

    let a = ex.fetch_block(42).await.unwrap();
    let b = ex.fetch_block(42).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.block_number, 42);
    assert_eq!(a.transaction_count, 1);
    assert_eq!(count(&source.calls.block), 1);

    let txs = ex.fetch_block_transactions(42).await;
    assert_eq!(txs.len(), 1);
    assert_eq!(count(&source.calls.block), 1);

    // transactions seen in a block are served from cache afterwards
    assert!(ex.fetch_transaction("inBlock").await.is_some());
    assert_eq!(count(&source.calls.transaction), 0);

    assert!(ex.fetch_block(7).await.is_none());
}

#[tokio::test]
async fn cached_transaction_expires_after_max_age() {
    let source = Arc::new(MockSource {
        txs: HashMap::from([("sig1".to_string(), raw_tx("sig1", 5, "A", "B", Value::Null))]),
        ..Default::default()
    });
    let clock = Arc::new(ManualClock::new(1_000));
    let ex = Explorer::new(source.clone(), Config::default()).with_clock(clock.clone());

    let first = ex.fetch_transaction("sig1").await.unwrap();
    assert_eq!(first.status, TxStatus::Success);
    assert_eq!(first.amount, "1.000000");

    clock.advance(Config::default().cache_max_age_ms - 1);
    let hit = ex.fetch_transaction("sig1").await.unwrap();
    assert_eq!(hit, first);
    assert_eq!(count(&source.calls.transaction), 1);

    // an entry exactly max-age old is stale
    clock.advance(1);
    ex.fetch_transaction("sig1").await.unwrap();
    assert_eq!(count(&source.calls.transaction), 2);

    assert!(ex.fetch_transaction("unknown").await.is_none());
    assert!(ex.fetch_transaction("  ").await.is_none());
    assert_eq!(count(&source.calls.transaction), 3);
}

#[tokio::test]
async fn concurrent_lookups_share_one_upstream_call() {
    let source = Arc::new(MockSource {
        txs: HashMap::from([("slow".to_string(), raw_tx("slow", 5, "A", "B", Value::Null))]),
        delay: Duration::from_millis(50),
        ..Default::default()
    });
    let ex = Arc::new(explorer(&source));

    let lookups = (0..10).map(|_| {
        let ex = ex.clone();
        async move { ex.fetch_transaction("slow").await }
    });
    let results = futures::future::join_all(lookups).await;
    assert!(results.iter().all(|r| r.as_ref().map(|t| t.signature.as_str()) == Some("slow")));
    assert_eq!(count(&source.calls.transaction), 1);
}

fn listing_source() -> Arc<MockSource> {
    let mut txs = Vec::new();
    for i in 0..12u64 {
        let err = if i % 3 == 0 { json!({ "InstructionError": [0, "Custom"] }) } else { Value::Null };
        txs.push(raw_tx(&format!("sig{i:02}"), 100 + i, &format!("signer{i}"), "sink", err));
    }
    Arc::new(MockSource {
        latest_txs: Mutex::new(txs),
        ..Default::default()
    })
}

#[tokio::test]
async fn transaction_pages_respect_limit_and_filter_totals() {
    let source = listing_source();
    let ex = explorer(&source);
    ex.initialize().await;

    let all = TxFilter::default();
    for page in 1..=4 {
        let res = ex.fetch_transactions(page, 5, &all).await;
        assert!(res.transactions.len() <= 5);
        assert_eq!(res.total, 12);
    }
    let first = ex.fetch_transactions(1, 5, &all).await;
    assert_eq!(first.transactions[0].block_number, 111);

    let failed = TxFilter::default().with_status(TxStatus::Failed);
    let p1 = ex.fetch_transactions(1, 2, &failed).await;
    let p3 = ex.fetch_transactions(3, 2, &failed).await;
    assert_eq!(p1.total, 4);
    assert_eq!(p3.total, 4);
    assert!(p3.transactions.is_empty());
    assert!(p1.transactions.iter().all(|t| t.status == TxStatus::Failed));

    let by_signer = TxFilter::default().with_search("SIGNER1");
    // signer1, signer10, signer11
    assert_eq!(ex.fetch_transactions(1, 25, &by_signer).await.total, 3);
}

#[tokio::test]
async fn search_matches_loaded_data_only() {
    let source = Arc::new(MockSource {
        latest_txs: Mutex::new(vec![
            raw_tx("abc123xyz", 10, "walletA", "walletB", Value::Null),
            raw_tx("def456uvw", 11, "walletC", "walletD", Value::Null),
        ]),
        blocks: Mutex::new(vec![raw_block(11), raw_block(10)]),
        ..Default::default()
    });
    let ex = explorer(&source);
    ex.initialize().await;

    let res = ex.search("abc").await;
    assert_eq!(res.transactions.len(), 1);
    assert_eq!(res.transactions[0].signature, "abc123xyz");
    assert!(res.blocks.is_empty());
    assert!(res.addresses.is_empty());

    assert_eq!(ex.search("ABC").await.transactions.len(), 1);
    assert_eq!(ex.search("hash11").await.blocks.len(), 1);
    assert_eq!(ex.search("1").await.blocks.len(), 2);
    assert!(ex.search("   ").await.is_empty());
    assert!(ex.search("nothing-like-this").await.is_empty());
}

#[tokio::test]
async fn initialize_runs_once_and_loads_everything() {
    let source = listing_source();
    let ex = explorer(&source);
    assert_eq!(ex.state().await, SessionState::Uninitialized);

    ex.initialize().await;
    assert_eq!(ex.state().await, SessionState::Initialized);
    assert_eq!(ex.latest_transactions().await.len(), 12);
    assert_eq!(ex.fetch_l2_chains(&ChainFilter::default()).await.len(), 6);

    ex.initialize().await;
    assert_eq!(count(&source.calls.latest_transactions), 1);
    assert_eq!(count(&source.calls.overview), 1);
}

#[tokio::test]
async fn refresh_replaces_latest_but_keeps_keyed_cache() {
    let source = Arc::new(MockSource {
        latest_txs: Mutex::new(vec![raw_tx("old", 1, "A", "B", Value::Null)]),
        txs: HashMap::from([("detail".to_string(), raw_tx("detail", 2, "C", "D", Value::Null))]),
        ..Default::default()
    });
    let ex = explorer(&source);
    ex.initialize().await;
    ex.fetch_transaction("detail").await.unwrap();

    *source.latest_txs.lock().unwrap() = vec![raw_tx("new", 3, "E", "F", Value::Null)];
    ex.refresh_data().await;

    let latest = ex.latest_transactions().await;
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].signature, "new");

    ex.fetch_transaction("detail").await.unwrap();
    assert_eq!(count(&source.calls.transaction), 1);
    // previously loaded transactions stay searchable
    assert_eq!(ex.search("old").await.transactions.len(), 1);
}

#[tokio::test]
async fn address_falls_back_to_loaded_transactions() {
    let source = Arc::new(MockSource {
        latest_txs: Mutex::new(vec![
            raw_tx("t1", 5, "walletA", "walletB", Value::Null),
            raw_tx("t2", 6, "walletC", "walletD", Value::Null),
        ]),
        accounts: HashMap::from([(
            "walletB".to_string(),
            json!({ "value": { "lamports": 2_000_000_000u64, "owner": "11111111111111111111111111111111", "executable": false } }),
        )]),
        ..Default::default()
    });
    let ex = explorer(&source);
    ex.initialize().await;

    let addr = ex.fetch_address("walletB").await.unwrap();
    assert_eq!(addr.balance, "2.000000");
    assert_eq!(addr.transactions.len(), 1);
    assert_eq!(addr.transactions[0].signature, "t1");

    ex.fetch_address("walletB").await.unwrap();
    assert_eq!(count(&source.calls.account_info), 1);
    assert_eq!(ex.search("walletb").await.addresses, vec!["walletB".to_string()]);

    // nothing upstream: a zero view is returned but not cached
    let ghost = ex.fetch_address("ghost").await.unwrap();
    assert_eq!(ghost.balance, "0.000000");
    ex.fetch_address("ghost").await;
    assert_eq!(count(&source.calls.address_transactions), 3);
}

#[tokio::test]
async fn l2_filters_and_chart_data() {
    let source = Arc::new(MockSource::default());
    let ex = explorer(&source);

    let maintenance = ex
        .fetch_l2_chains(&ChainFilter {
            status: Some(ChainStatus::Maintenance),
            search: None,
        })
        .await;
    assert_eq!(maintenance.len(), 1);
    assert_eq!(maintenance[0].id, "starknet-gorb");

    let eth = ex
        .fetch_l2_chains(&ChainFilter {
            status: None,
            search: Some("eth".into()),
        })
        .await;
    assert_eq!(eth.len(), 2);

    assert_eq!(ex.fetch_l2_chain("base-gorb").await.map(|c| c.chain_id), Some(8453));
    assert!(ex.fetch_l2_chain("nope").await.is_none());

    let stats = ex.fetch_network_stats().await;
    assert_eq!(stats.current_slot, 30);

    let chart = ex.fetch_chart_data().await;
    assert_eq!(chart.network_activity.len(), 2);
    assert_eq!(chart.l2_performance.len(), 6);
    assert_eq!(chart.token_metrics.circulating_supply, 600.0);
    assert_eq!(chart.token_metrics.price, "N/A");
}

#[cfg(feature = "native")]
#[tokio::test]
async fn persisted_cache_survives_a_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cache.db");
    let source = Arc::new(MockSource {
        txs: HashMap::from([("kept".to_string(), raw_tx("kept", 9, "A", "B", Value::Null))]),
        ..Default::default()
    });

    let first = explorer(&source).with_cache_db(gorbx::CacheDb::open(&db_path).unwrap());
    first.fetch_transaction("kept").await.unwrap();
    assert!(first.persist().await);

    let second = explorer(&source).with_cache_db(gorbx::CacheDb::open(&db_path).unwrap());
    second.initialize().await;
    assert_eq!(second.fetch_transaction("kept").await.unwrap().signature, "kept");
    assert_eq!(count(&source.calls.transaction), 1);

    // without a database there is nothing to persist
    assert!(!explorer(&source).persist().await);
}

#[tokio::test]
async fn address_history_includes_any_account_key() {
    let mut tx = raw_tx("keyed", 8, "payer", "payee", Value::Null);
    tx["transaction"]["message"]["accountKeys"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "pubkey": "thirdKey", "signer": false, "writable": false }));
    let source = Arc::new(MockSource {
        latest_txs: Mutex::new(vec![tx, raw_tx("other", 9, "payer", "someoneElse", Value::Null)]),
        ..Default::default()
    });
    let ex = explorer(&source);
    ex.initialize().await;

    let addr = ex.fetch_address("thirdKey").await.unwrap();
    assert_eq!(addr.transactions.len(), 1);
    assert_eq!(addr.transactions[0].signature, "keyed");
}

#[tokio::test]
async fn token_lookups_are_cached_and_shared() {
    let source = Arc::new(MockSource {
        mints: HashMap::from([(
            "MintAAA".to_string(),
            json!({
                "mintAddress": "MintAAA",
                "decimals": 9,
                "supply": "5000000000",
                "metadata": { "tokenMetadata": { "name": "Gorb Coin", "symbol": "GC", "uri": "https://gc.example/meta.json" } }
            }),
        )]),
        delay: Duration::from_millis(20),
        ..Default::default()
    });
    let clock = Arc::new(ManualClock::new(0));
    let ex = Explorer::new(source.clone(), Config::default()).with_clock(clock.clone());

    let (a, b) = tokio::join!(ex.fetch_token("MintAAA"), ex.fetch_token("MintAAA"));
    let token = a.unwrap();
    assert_eq!(Some(&token), b.as_ref());
    assert_eq!(token.name, "Gorb Coin");
    assert_eq!(token.symbol, "GC");
    assert_eq!(token.supply_display, "5");
    assert_eq!(count(&source.calls.token_mint), 1);

    assert_eq!(ex.fetch_token(" MintAAA ").await, Some(token));
    assert_eq!(count(&source.calls.token_mint), 1);

    clock.advance(Config::default().cache_max_age_ms);
    ex.fetch_token("MintAAA").await.unwrap();
    assert_eq!(count(&source.calls.token_mint), 2);

    assert!(ex.fetch_token("").await.is_none());
    assert!(ex.fetch_token("NoSuchMint").await.is_none());
    assert_eq!(count(&source.calls.token_mint), 3);
}

#[tokio::test]
async fn clear_cache_forgets_transactions_and_addresses() {
    let source = Arc::new(MockSource {
        txs: HashMap::from([("t".to_string(), raw_tx("t", 4, "A", "B", Value::Null))]),
        accounts: HashMap::from([(
            "A".to_string(),
            json!({ "value": { "lamports": 1u64, "owner": "11111111111111111111111111111111" } }),
        )]),
        blocks: Mutex::new(vec![raw_block(4)]),
        ..Default::default()
    });
    let ex = explorer(&source);
    ex.initialize().await;
    ex.fetch_transaction("t").await.unwrap();
    ex.fetch_address("A").await.unwrap();

    ex.clear_cache().await;

    ex.fetch_transaction("t").await.unwrap();
    ex.fetch_address("A").await.unwrap();
    assert_eq!(count(&source.calls.transaction), 2);
    assert_eq!(count(&source.calls.account_info), 2);
    // blocks survive
    assert_eq!(ex.fetch_blocks(1, 10).await.total, 1);
}

#[cfg(feature = "native")]
#[tokio::test]
async fn clear_cache_empties_the_cache_db() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cache.db");
    let source = Arc::new(MockSource {
        txs: HashMap::from([("gone".to_string(), raw_tx("gone", 9, "A", "B", Value::Null))]),
        ..Default::default()
    });

    let ex = explorer(&source).with_cache_db(gorbx::CacheDb::open(&db_path).unwrap());
    ex.fetch_transaction("gone").await.unwrap();
    assert!(ex.persist().await);
    ex.clear_cache().await;

    let db = gorbx::CacheDb::open(&db_path).unwrap();
    assert_eq!(db.load().await.unwrap(), None);
}

#[tokio::test]
async fn concurrent_initialize_waits_for_the_first_load() {
    let source = Arc::new(MockSource {
        latest_txs: Mutex::new(vec![raw_tx("t1", 1, "A", "B", Value::Null)]),
        delay: Duration::from_millis(50),
        ..Default::default()
    });
    let ex = explorer(&source);

    let ((), seen) = tokio::join!(ex.initialize(), async {
        ex.initialize().await;
        (ex.state().await, ex.latest_transactions().await.len())
    });
    assert_eq!(seen, (SessionState::Initialized, 1));
    assert_eq!(count(&source.calls.latest_transactions), 1);
}
