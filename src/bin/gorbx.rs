// Command-line front-end: renders explorer results as JSON on stdout

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use gorbx::{
    config::ConfigArgs,
    constants::messages,
    store::{parse_status_filter, ChainFilter, TxFilter},
    Config, Explorer,
};

/// gorbx - Gorbchain explorer data layer
///
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "gorbx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gorbchain blocks, transactions, addresses and tokens as JSON", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print the effective configuration to stderr before running
    #[arg(long, global = true)]
    show_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Page of blocks, newest first
    Blocks {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
    /// One block by number
    Block { number: u64 },
    /// Transactions of one block
    BlockTxs { number: u64 },
    /// Page of loaded transactions
    Txs {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 25)]
        limit: usize,
        /// success, failed, pending or all
        #[arg(long, default_value = "all")]
        status: String,
        /// Substring of signature, signer or recipient
        #[arg(long)]
        search: Option<String>,
    },
    /// One transaction by signature
    Tx { signature: String },
    /// Balance, holdings and history of an address
    Address { address: String },
    /// Token mint metadata
    Token { mint: String },
    /// L2 chain catalog
    Chains {
        /// active, inactive, maintenance or all
        #[arg(long, default_value = "all")]
        status: String,
        #[arg(long)]
        search: Option<String>,
    },
    /// One L2 chain by id
    Chain { id: String },
    /// Network statistics
    Stats,
    /// Dashboard chart series
    Chart,
    /// Daily transaction counts
    TxChart,
    /// Search loaded blocks, transactions and addresses
    Search { query: String },
    /// Drop cached transactions and addresses, including the cache db
    ClearCache,
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn emit_or<T: Serialize>(value: Option<T>, empty: &str) -> Result<()> {
    match value {
        Some(v) => emit(&v),
        None => {
            eprintln!("{empty}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let cfg = Config::from_args(cli.config).context("Failed to load configuration")?;
    if cli.show_config {
        cfg.print_summary();
    }

    let explorer = Explorer::from_config(cfg).context("Failed to start explorer")?;
    run(&explorer, cli.command).await?;
    explorer.persist().await;
    Ok(())
}

async fn run(explorer: &Explorer, command: Command) -> Result<()> {
    match command {
        Command::Blocks { page, limit } => {
            let res = explorer.fetch_blocks(page, limit).await;
            if res.blocks.is_empty() {
                eprintln!("{}", messages::NO_BLOCKS);
            }
            emit(&res)
        }
        Command::Block { number } => emit_or(explorer.fetch_block(number).await, messages::NO_BLOCKS),
        Command::BlockTxs { number } => {
            let txs = explorer.fetch_block_transactions(number).await;
            if txs.is_empty() {
                eprintln!("{}", messages::NO_TRANSACTIONS);
            }
            emit(&txs)
        }
        Command::Txs {
            page,
            limit,
            status,
            search,
        } => {
            let mut filter = TxFilter {
                status: parse_status_filter(&status)?,
                ..Default::default()
            };
            if let Some(needle) = search {
                filter = filter.with_search(needle);
            }
            explorer.initialize().await;
            let res = explorer.fetch_transactions(page, limit, &filter).await;
            if res.transactions.is_empty() {
                eprintln!("{}", messages::NO_TRANSACTIONS);
            }
            emit(&res)
        }
        Command::Tx { signature } => emit_or(
            explorer.fetch_transaction(&signature).await,
            messages::NO_TRANSACTION,
        ),
        Command::Address { address } => {
            explorer.initialize().await;
            emit_or(explorer.fetch_address(&address).await, messages::NO_ADDRESS)
        }
        Command::Token { mint } => {
            let (token, is_token) = tokio::join!(
                explorer.fetch_token(&mint),
                explorer.is_token_account(&mint)
            );
            emit_or(
                token.map(|t| json!({ "token": t, "isTokenAccount": is_token })),
                messages::NO_TOKEN,
            )
        }
        Command::Chains { status, search } => {
            let filter = ChainFilter {
                status: match status.trim() {
                    "" | "all" => None,
                    s => Some(s.parse()?),
                },
                search: search.filter(|s| !s.trim().is_empty()),
            };
            let chains = explorer.fetch_l2_chains(&filter).await;
            if chains.is_empty() {
                eprintln!("{}", messages::NO_CHAINS);
            }
            emit(&chains)
        }
        Command::Chain { id } => emit_or(explorer.fetch_l2_chain(&id).await, messages::NO_CHAINS),
        Command::Stats => emit(&explorer.fetch_network_stats().await),
        Command::Chart => emit(&explorer.fetch_chart_data().await),
        Command::TxChart => emit_or(explorer.fetch_tx_chart_data().await, messages::NO_TRANSACTIONS),
        Command::Search { query } => {
            explorer.initialize().await;
            let res = explorer.search(&query).await;
            if res.is_empty() {
                eprintln!("{}", messages::NO_RESULTS);
            }
            emit(&res)
        }
        Command::ClearCache => {
            explorer.clear_cache().await;
            eprintln!("Cache cleared");
            Ok(())
        }
    }
}
