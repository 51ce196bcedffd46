//! Static L2 chain catalog.

use crate::types::{ChainStatus, L2Chain};

struct Entry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    status: ChainStatus,
    chain_id: u64,
    native_token: &'static str,
    tvl: &'static str,
    daily_transactions: u64,
    total_blocks: u64,
    avg_block_time: &'static str,
    gas_price: &'static str,
    uptime: &'static str,
    commission: &'static str,
    delegators: u64,
    last_seen: &'static str,
    links: [&'static str; 4],
}

const CATALOG: &[Entry] = &[
    Entry {
        id: "arbitrum-gorb",
        name: "Arbitrum Gorb",
        description: "High-performance L2 optimistic rollup for DeFi applications",
        status: ChainStatus::Active,
        chain_id: 42161,
        native_token: "ARB",
        tvl: "2.1B",
        daily_transactions: 125_000,
        total_blocks: 15_420_847,
        avg_block_time: "0.25s",
        gas_price: "0.1 gwei",
        uptime: "99.8%",
        commission: "2.5%",
        delegators: 15_420,
        last_seen: "2 mins ago",
        links: [
            "https://arbitrum.gorb.chain",
            "https://arbiscan.gorb.chain",
            "https://bridge.arbitrum.gorb.chain",
            "/assets/arbitrum-logo.png",
        ],
    },
    Entry {
        id: "polygon-gorb",
        name: "Polygon Gorb",
        description: "Ethereum-compatible L2 with high throughput and low fees",
        status: ChainStatus::Active,
        chain_id: 137,
        native_token: "MATIC",
        tvl: "1.8B",
        daily_transactions: 98_000,
        total_blocks: 8_930_124,
        avg_block_time: "2.1s",
        gas_price: "30 gwei",
        uptime: "99.9%",
        commission: "3.0%",
        delegators: 12_840,
        last_seen: "1 min ago",
        links: [
            "https://polygon.gorb.chain",
            "https://polygonscan.gorb.chain",
            "https://wallet.polygon.gorb.chain",
            "/assets/polygon-logo.png",
        ],
    },
    Entry {
        id: "optimism-gorb",
        name: "Optimism Gorb",
        description: "Optimistic rollup L2 focusing on Ethereum compatibility",
        status: ChainStatus::Active,
        chain_id: 10,
        native_token: "OP",
        tvl: "950M",
        daily_transactions: 67_000,
        total_blocks: 5_420_689,
        avg_block_time: "2.0s",
        gas_price: "0.001 gwei",
        uptime: "99.7%",
        commission: "2.0%",
        delegators: 8_920,
        last_seen: "30 secs ago",
        links: [
            "https://optimism.gorb.chain",
            "https://optimistic.gorb.chain",
            "https://app.optimism.gorb.chain",
            "/assets/optimism-logo.png",
        ],
    },
    Entry {
        id: "base-gorb",
        name: "Base Gorb",
        description: "Coinbase L2 solution built on Optimism stack",
        status: ChainStatus::Active,
        chain_id: 8453,
        native_token: "ETH",
        tvl: "1.2B",
        daily_transactions: 89_000,
        total_blocks: 6_820_934,
        avg_block_time: "2.0s",
        gas_price: "0.01 gwei",
        uptime: "99.6%",
        commission: "1.5%",
        delegators: 11_200,
        last_seen: "45 secs ago",
        links: [
            "https://base.gorb.chain",
            "https://basescan.gorb.chain",
            "https://bridge.base.gorb.chain",
            "/assets/base-logo.png",
        ],
    },
    Entry {
        id: "zksync-gorb",
        name: "zkSync Gorb",
        description: "Zero-knowledge rollup with Ethereum-level security",
        status: ChainStatus::Active,
        chain_id: 324,
        native_token: "ETH",
        tvl: "780M",
        daily_transactions: 45_000,
        total_blocks: 3_920_847,
        avg_block_time: "1.0s",
        gas_price: "0.25 gwei",
        uptime: "99.4%",
        commission: "3.5%",
        delegators: 6_830,
        last_seen: "1 min ago",
        links: [
            "https://zksync.gorb.chain",
            "https://explorer.zksync.gorb.chain",
            "https://portal.zksync.gorb.chain",
            "/assets/zksync-logo.png",
        ],
    },
    Entry {
        id: "starknet-gorb",
        name: "Starknet Gorb",
        description: "STARK-based ZK-rollup for scalable computation",
        status: ChainStatus::Maintenance,
        chain_id: 23294,
        native_token: "STRK",
        tvl: "420M",
        daily_transactions: 23_000,
        total_blocks: 2_840_293,
        avg_block_time: "10s",
        gas_price: "1 gwei",
        uptime: "98.9%",
        commission: "4.0%",
        delegators: 4_920,
        last_seen: "2 hours ago",
        links: [
            "https://starknet.gorb.chain",
            "https://starkscan.gorb.chain",
            "https://starkgate.gorb.chain",
            "/assets/starknet-logo.png",
        ],
    },
];

/// Parses compact amounts such as `2.1B`, `950M`, `12K` or `$1,200`.
pub fn parse_compact(s: &str) -> Option<f64> {
    let s = s.trim().trim_start_matches('$').replace(',', "");
    let (num, mult) = match s.chars().last()?.to_ascii_uppercase() {
        'K' => (&s[..s.len() - 1], 1e3),
        'M' => (&s[..s.len() - 1], 1e6),
        'B' => (&s[..s.len() - 1], 1e9),
        'T' => (&s[..s.len() - 1], 1e12),
        _ => (s.as_str(), 1.0),
    };
    num.trim().parse::<f64>().ok().map(|n| n * mult)
}

/// `2100000000` → `$2,100,000,000`
pub fn usd_display(amount: f64) -> String {
    let digits = format!("{:.0}", amount.max(0.0));
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${out}")
}

/// Parses a percentage display string (`99.8%`) into its number.
pub fn parse_percent(s: &str) -> f64 {
    s.trim().trim_end_matches('%').parse().unwrap_or(0.0)
}

fn to_chain(e: &Entry) -> L2Chain {
    let tvl = parse_compact(e.tvl).unwrap_or(0.0);
    let [website, explorer, bridge, logo] = e.links;
    L2Chain {
        id: e.id.to_string(),
        name: e.name.to_string(),
        description: e.description.to_string(),
        status: e.status,
        chain_id: e.chain_id,
        native_token: e.native_token.to_string(),
        tvl,
        tvl_display: e.tvl.to_string(),
        tvl_usd: usd_display(tvl),
        daily_transactions: e.daily_transactions,
        total_blocks: e.total_blocks,
        avg_block_time: e.avg_block_time.to_string(),
        gas_price: e.gas_price.to_string(),
        uptime: e.uptime.to_string(),
        commission: e.commission.to_string(),
        delegators: e.delegators,
        last_seen: e.last_seen.to_string(),
        website: Some(website.to_string()),
        explorer: Some(explorer.to_string()),
        bridge: Some(bridge.to_string()),
        logo: Some(logo.to_string()),
    }
}

/// The full catalog, in display order.
pub fn l2_chains() -> Vec<L2Chain> {
    CATALOG.iter().map(to_chain).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_amounts() {
        assert_eq!(parse_compact("2.1B"), Some(2_100_000_000.0));
        assert_eq!(parse_compact("950M"), Some(950_000_000.0));
        assert_eq!(parse_compact("$1,200"), Some(1_200.0));
        assert_eq!(parse_compact("12k"), Some(12_000.0));
        assert_eq!(parse_compact(""), None);
        assert_eq!(parse_compact("lots"), None);
    }

    #[test]
    fn usd_grouping() {
        assert_eq!(usd_display(2_100_000_000.0), "$2,100,000,000");
        assert_eq!(usd_display(950.0), "$950");
        assert_eq!(usd_display(0.0), "$0");
    }

    #[test]
    fn catalog_is_complete_and_unique() {
        let chains = l2_chains();
        assert_eq!(chains.len(), 6);
        let mut ids: Vec<_> = chains.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);

        let starknet = chains.iter().find(|c| c.id == "starknet-gorb").unwrap();
        assert_eq!(starknet.status, ChainStatus::Maintenance);
        assert_eq!(starknet.tvl_usd, "$420,000,000");
        assert_eq!(parse_percent(&starknet.uptime), 98.9);
        assert!(chains.iter().filter(|c| c.id != "starknet-gorb").all(|c| c.status == ChainStatus::Active));
    }
}
