//! View-model shapes handed to the UI.
//!
//! These are the normalized, stable forms of upstream records. They are plain
//! values: caches hold clones, never references into a mutable source.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub block_number: u64,
    pub timestamp: String,
    pub transaction_count: usize,
    pub validator: String,
    pub reward: String,
    pub gas_used: String,
    pub hash: String,
    pub parent_hash: String,
    pub size: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
    /// Only freshly submitted transactions are ever pending.
    Pending,
}

impl std::str::FromStr for TxStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "success" => Ok(TxStatus::Success),
            "failed" | "fail" | "error" => Ok(TxStatus::Failed),
            "pending" => Ok(TxStatus::Pending),
            _ => Err(anyhow::anyhow!(
                "Invalid status '{s}'. Valid options: success, failed, pending"
            )),
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Success => write!(f, "success"),
            TxStatus::Failed => write!(f, "failed"),
            TxStatus::Pending => write!(f, "pending"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Transfer,
    Swap,
    Stake,
    Vote,
    Contract,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub program_id: String,
    pub program_name: String,
    /// Instruction kind, e.g. `transfer`; empty when the source did not parse it
    pub instruction: String,
    pub data: String,
    pub accounts: Vec<AccountRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inner_instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub signature: String,
    pub block_number: u64,
    pub timestamp: String,
    pub block_time: String,
    pub status: TxStatus,
    pub signer: String,
    pub recipient: String,
    pub amount: String,
    #[serde(rename = "amountUSD")]
    pub amount_usd: String,
    pub token: String,
    pub fee: String,
    #[serde(rename = "feeUSD")]
    pub fee_usd: String,
    pub compute_units: u64,
    pub version: u8,
    pub recent_blockhash: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub instructions: Vec<Instruction>,
    /// Every account key of the message, in message order
    #[serde(default)]
    pub account_keys: Vec<AccountRef>,
}

impl Transaction {
    /// True when `address` signed the transaction or appears in any account list.
    pub fn involves(&self, address: &str) -> bool {
        if self.signer == address
            || self.recipient == address
            || self.account_keys.iter().any(|k| k.pubkey == address)
        {
            return true;
        }
        fn walk(ixs: &[Instruction], address: &str) -> bool {
            ixs.iter().any(|ix| {
                ix.accounts.iter().any(|a| a.pubkey == address)
                    || walk(&ix.inner_instructions, address)
            })
        }
        walk(&self.instructions, address)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    Wallet,
    Contract,
    Program,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub symbol: String,
    pub mint: String,
    /// Raw base-unit amount as reported upstream
    pub amount: String,
    pub ui_amount: String,
    #[serde(rename = "amountUSD")]
    pub usd_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMeta {
    pub owner: String,
    pub executable: bool,
    pub rent_epoch: u64,
    pub space: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address: String,
    pub balance: String,
    pub balance_lamports: u64,
    #[serde(rename = "balanceUSD")]
    pub balance_usd: String,
    pub token_holdings: Vec<TokenHolding>,
    pub transactions: Vec<Transaction>,
    /// `None` when the node had no account record
    pub account: Option<AccountMeta>,
    #[serde(rename = "type")]
    pub kind: AddressKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainStatus {
    Active,
    Inactive,
    Maintenance,
}

impl std::str::FromStr for ChainStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ChainStatus::Active),
            "inactive" => Ok(ChainStatus::Inactive),
            "maintenance" => Ok(ChainStatus::Maintenance),
            _ => Err(anyhow::anyhow!(
                "Invalid chain status '{s}'. Valid options: active, inactive, maintenance"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Chain {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ChainStatus,
    pub chain_id: u64,
    pub native_token: String,
    /// Raw TVL in USD
    pub tvl: f64,
    /// Compact TVL, e.g. `2.1B`
    pub tvl_display: String,
    #[serde(rename = "tvlUSD")]
    pub tvl_usd: String,
    pub daily_transactions: u64,
    pub total_blocks: u64,
    pub avg_block_time: String,
    pub gas_price: String,
    pub uptime: String,
    pub commission: String,
    pub delegators: u64,
    pub last_seen: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub current_slot: u64,
    pub tps: f64,
    pub success_rate: f64,
    pub block_time: f64,
    pub epoch: u64,
    pub epoch_progress: f64,
    pub total_supply: f64,
    pub circulating_supply: f64,
    pub active_wallets: u64,
    pub total_wallets: u64,
    pub total_transactions: u64,
    pub transactions_today: u64,
    pub token_count: u64,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTxCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxChartData {
    pub chart_data: Vec<DailyTxCount>,
    pub total_txns: u64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    pub date: String,
    pub transactions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Performance {
    pub chain_id: String,
    pub name: String,
    pub tps: f64,
    pub tvl: f64,
    pub uptime: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetrics {
    pub symbol: String,
    pub total_supply: f64,
    pub circulating_supply: f64,
    pub price: String,
    pub market_cap: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub network_activity: Vec<ActivityPoint>,
    pub l2_performance: Vec<L2Performance>,
    pub token_metrics: TokenMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub decimals: u8,
    /// Raw supply in base units
    pub supply: String,
    /// Supply divided by 10^decimals
    pub supply_display: String,
    pub mint_authority: String,
    pub freeze_authority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlocksPage {
    pub blocks: Vec<Block>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionsPage {
    pub transactions: Vec<Transaction>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub blocks: Vec<Block>,
    pub transactions: Vec<Transaction>,
    pub addresses: Vec<String>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.transactions.is_empty() && self.addresses.is_empty()
    }
}
