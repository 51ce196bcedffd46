//! Wire records → view-models.
//!
//! Every function here is pure and total: missing or malformed fields fall
//! back to a default instead of failing. One fallback per field type:
//!
//! | field type                      | fallback        |
//! |---------------------------------|-----------------|
//! | display-only string             | `"N/A"`         |
//! | identifier / address / hash     | `""`            |
//! | count / amount                  | `0` (`"0.000000"` when rendered) |
//! | list                            | empty           |
//!
//! Native amounts always use the fixed 10^9 divisor and six decimals.

use crate::constants::{chain, display::NOT_AVAILABLE};
use crate::types::*;
use crate::wire::{
    RawAccountIndex, RawAccountInfo, RawAccountKey, RawBlock, RawBlockPayload, RawInstruction,
    RawMeta, RawOverview, RawTokenMint, RawTransaction, RawTxChart,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Well-known program ids and their display names.
const KNOWN_PROGRAMS: &[(&str, &str)] = &[
    ("11111111111111111111111111111111", "System Program"),
    ("Vote111111111111111111111111111111111111111", "Vote Program"),
    ("Stake11111111111111111111111111111111111111", "Stake Program"),
    ("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA", "Token Program"),
    ("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb", "Token-2022 Program"),
    ("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL", "Associated Token Program"),
    ("ComputeBudget111111111111111111111111111111", "Compute Budget Program"),
    ("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr", "Memo Program"),
];

pub fn known_program_name(program_id: &str) -> Option<&'static str> {
    KNOWN_PROGRAMS
        .iter()
        .find(|(id, _)| *id == program_id)
        .map(|(_, name)| *name)
}

// ---------------------------------------------------------------------------
// Units and time

/// Renders base units as native units with six decimals, rounding half up.
///
/// Integer arithmetic only, so large balances keep their exact digits.
pub fn lamports_to_native(lamports: u64) -> String {
    let per = chain::LAMPORTS_PER_NATIVE;
    let scale = 10u64.pow(9 - chain::DISPLAY_DECIMALS as u32);
    let mut whole = lamports / per;
    let mut frac = ((lamports % per) + scale / 2) / scale;
    let limit = 10u64.pow(chain::DISPLAY_DECIMALS as u32);
    if frac >= limit {
        whole += 1;
        frac -= limit;
    }
    format!("{whole}.{frac:0width$}", width = chain::DISPLAY_DECIMALS)
}

/// Renders a raw token amount with `decimals` fractional digits, trailing zeros trimmed.
pub fn format_units(raw: &str, decimals: u8) -> String {
    let digits: String = raw.trim().chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return "0".to_string();
    }
    let decimals = decimals as usize;
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

fn datetime(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.filter(|s| *s > 0)
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
}

/// `2024-03-01 12:00:00 UTC`
pub fn format_timestamp(secs: Option<i64>) -> String {
    datetime(secs)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `Fri, 01 Mar 2024 12:00:00 GMT`
pub fn format_block_time(secs: Option<i64>) -> String {
    datetime(secs)
        .map(|t| t.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `Abcd...wxyz`, used as a symbol for unnamed mints.
pub fn short_key(key: &str) -> String {
    if key.chars().count() <= 12 {
        return key.to_string();
    }
    let head: String = key.chars().take(4).collect();
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("{head}...{tail}")
}

// ---------------------------------------------------------------------------
// Status

/// Success iff the record carries an error field that is exactly `null`.
/// An absent field or any non-null value (object, string, `false`, `0`) is a failure.
pub fn derive_status(meta: Option<&RawMeta>) -> TxStatus {
    match meta.and_then(|m| m.err.as_ref()) {
        Some(serde_json::Value::Null) => TxStatus::Success,
        _ => TxStatus::Failed,
    }
}

// ---------------------------------------------------------------------------
// Transactions

fn lookup<'a>(keys: &'a [RawAccountKey], pubkey: &str) -> Option<&'a RawAccountKey> {
    keys.iter().find(|k| k.pubkey() == pubkey)
}

fn account_ref(keys: &[RawAccountKey], pubkey: &str) -> AccountRef {
    let key = lookup(keys, pubkey);
    AccountRef {
        pubkey: pubkey.to_string(),
        is_signer: key.is_some_and(RawAccountKey::is_signer),
        is_writable: key.is_some_and(RawAccountKey::is_writable),
    }
}

fn normalize_instruction(ix: &RawInstruction, keys: &[RawAccountKey]) -> Instruction {
    let program_id = ix
        .program_id
        .clone()
        .or_else(|| {
            ix.program_id_index
                .and_then(|i| keys.get(i as usize))
                .map(|k| k.pubkey().to_string())
        })
        .unwrap_or_default();

    let program_name = ix
        .program
        .clone()
        .filter(|p| !p.is_empty())
        .or_else(|| known_program_name(&program_id).map(str::to_string))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let instruction = ix
        .parsed_type()
        .map(str::to_string)
        .or_else(|| ix.kind.clone())
        .unwrap_or_default();

    let mut accounts = Vec::new();
    for field in ["source", "destination"] {
        if let Some(pubkey) = ix.info_str(field) {
            accounts.push(account_ref(keys, pubkey));
        }
    }
    for acc in &ix.accounts {
        let pubkey = match acc {
            RawAccountIndex::Key(k) => Some(k.as_str()),
            RawAccountIndex::Index(i) => keys.get(*i).map(RawAccountKey::pubkey),
        };
        if let Some(pubkey) = pubkey {
            accounts.push(account_ref(keys, pubkey));
        }
    }

    Instruction {
        program_id,
        program_name,
        instruction,
        data: ix.data.clone().unwrap_or_default(),
        accounts,
        inner_instructions: Vec::new(),
    }
}

fn derive_kind(first: Option<&Instruction>) -> TxKind {
    let Some(ix) = first else {
        return TxKind::Transfer;
    };
    let name = ix.program_name.to_lowercase();
    let kind = ix.instruction.to_lowercase();
    if name.contains("vote") {
        TxKind::Vote
    } else if name.contains("stake") || kind.contains("delegate") {
        TxKind::Stake
    } else if name.contains("swap") || kind.contains("swap") {
        TxKind::Swap
    } else if kind.contains("transfer") || ix.program_id == chain::SYSTEM_PROGRAM_ID {
        TxKind::Transfer
    } else {
        TxKind::Contract
    }
}

fn version_of(raw: &RawTransaction) -> u8 {
    match &raw.version {
        Some(serde_json::Value::Number(n)) => n.as_u64().map(|v| v.min(u8::MAX as u64) as u8).unwrap_or(0),
        _ => 0,
    }
}

/// Normalizes one backend transaction record. `None` without a signature.
pub fn normalize_transaction(raw: &RawTransaction) -> Option<Transaction> {
    let signature = raw.signature()?.to_string();
    let keys: &[RawAccountKey] = raw.message().map(|m| m.account_keys.as_slice()).unwrap_or(&[]);
    let raw_ixs: &[RawInstruction] = raw.message().map(|m| m.instructions.as_slice()).unwrap_or(&[]);

    let mut instructions: Vec<Instruction> = raw_ixs
        .iter()
        .map(|ix| normalize_instruction(ix, keys))
        .collect();
    if let Some(meta) = &raw.meta {
        for group in &meta.inner_instructions {
            let Some(parent) = group.index.and_then(|i| instructions.get_mut(i as usize)) else {
                continue;
            };
            parent.inner_instructions = group
                .instructions
                .iter()
                .map(|ix| normalize_instruction(ix, keys))
                .collect();
        }
    }

    let first = raw_ixs.first();
    let signer = first
        .and_then(|ix| ix.info_str("source"))
        .or_else(|| keys.first().map(RawAccountKey::pubkey))
        .unwrap_or_default()
        .to_string();
    let recipient = first
        .and_then(|ix| ix.info_str("destination"))
        .or_else(|| keys.get(1).map(RawAccountKey::pubkey))
        .unwrap_or_default()
        .to_string();

    // Native transfers carry lamports; token transfers carry a ui amount and a mint.
    let token_amount = first.and_then(|ix| {
        ix.info("tokenAmount")
            .and_then(|t| t.get("uiAmountString"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    });
    let (amount, token) = match (first.and_then(|ix| ix.info_u64("lamports")), token_amount) {
        (Some(lamports), _) => (lamports_to_native(lamports), chain::NATIVE_SYMBOL.to_string()),
        (None, Some(ui)) => {
            let token = first
                .and_then(|ix| ix.info_str("mint"))
                .map(short_key)
                .unwrap_or_else(|| chain::NATIVE_SYMBOL.to_string());
            (ui, token)
        }
        (None, None) => (lamports_to_native(0), chain::NATIVE_SYMBOL.to_string()),
    };

    let meta = raw.meta.as_ref();
    let kind = derive_kind(instructions.first());
    Some(Transaction {
        signature,
        block_number: raw.slot.unwrap_or(0),
        timestamp: format_timestamp(raw.block_time),
        block_time: format_block_time(raw.block_time),
        status: derive_status(meta),
        signer,
        recipient,
        amount,
        amount_usd: NOT_AVAILABLE.to_string(),
        token,
        fee: lamports_to_native(meta.and_then(|m| m.fee).unwrap_or(0)),
        fee_usd: NOT_AVAILABLE.to_string(),
        compute_units: meta.and_then(|m| m.compute_units_consumed).unwrap_or(0),
        version: version_of(raw),
        recent_blockhash: raw
            .message()
            .and_then(|m| m.recent_blockhash.clone())
            .unwrap_or_default(),
        kind,
        instructions,
        account_keys: keys.iter().map(|k| account_ref(keys, k.pubkey())).collect(),
    })
}

/// Normalizes a list, dropping records without a signature and duplicate signatures.
pub fn normalize_transactions(raw: &[RawTransaction]) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(normalize_transaction)
        .filter(|tx| seen.insert(tx.signature.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Blocks

fn block_number_of(raw: &RawBlock) -> Option<u64> {
    raw.slot
        .or(raw.block_number)
        .or(raw.block_height)
        .or_else(|| raw.parent_slot.and_then(|p| p.checked_add(1)))
}

/// Normalizes one block record. `None` when no block number can be derived.
pub fn normalize_block(raw: &RawBlock) -> Option<Block> {
    let block_number = block_number_of(raw)?;
    let first_reward = raw.rewards.first();

    let transaction_count = if raw.transactions.is_empty() {
        raw.transaction_count.or(raw.tx_count).unwrap_or(0) as usize
    } else {
        raw.transactions.len()
    };

    let reward = first_reward
        .and_then(|r| r.lamports)
        .map(|l| lamports_to_native(l.max(0) as u64))
        .or_else(|| raw.reward.clone())
        .unwrap_or_else(|| lamports_to_native(0));

    let gas_used = raw.gas_used.clone().unwrap_or_else(|| {
        let units: u64 = raw
            .transactions
            .iter()
            .filter_map(|t| t.meta.as_ref().and_then(|m| m.compute_units_consumed))
            .sum();
        if units > 0 {
            units.to_string()
        } else {
            NOT_AVAILABLE.to_string()
        }
    });

    Some(Block {
        block_number,
        timestamp: format_timestamp(raw.block_time.or(raw.timestamp)),
        transaction_count,
        validator: raw
            .validator
            .clone()
            .or_else(|| raw.leader.clone())
            .or_else(|| first_reward.and_then(|r| r.pubkey.clone()))
            .unwrap_or_default(),
        reward,
        gas_used,
        hash: raw.blockhash.clone().or_else(|| raw.hash.clone()).unwrap_or_default(),
        parent_hash: raw
            .previous_blockhash
            .clone()
            .or_else(|| raw.parent_hash.clone())
            .unwrap_or_default(),
        size: raw.size.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        difficulty: raw.difficulty.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    })
}

/// Normalizes a list, keeping the first record per block number.
pub fn normalize_blocks(raw: &[RawBlock]) -> Vec<Block> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(normalize_block)
        .filter(|b| seen.insert(b.block_number))
        .collect()
}

/// Normalizes the block-detail payload for `slot` into the block and its transactions.
///
/// A bare transaction list yields a block assembled from the transactions
/// themselves; an empty list yields no block.
pub fn normalize_block_payload(payload: &RawBlockPayload, slot: u64) -> (Option<Block>, Vec<Transaction>) {
    match payload {
        RawBlockPayload::Block(raw) => {
            let mut block = normalize_block(raw);
            if let Some(b) = block.as_mut() {
                if raw.slot.is_none() && raw.block_number.is_none() {
                    b.block_number = slot;
                }
            }
            let mut txs = normalize_transactions(&raw.transactions);
            for tx in &mut txs {
                if tx.block_number == 0 {
                    tx.block_number = slot;
                }
            }
            (block, txs)
        }
        RawBlockPayload::Transactions(raw) => {
            let txs = normalize_transactions(raw);
            if txs.is_empty() {
                return (None, txs);
            }
            let block_time = raw.iter().find_map(|t| t.block_time);
            let units: u64 = txs.iter().map(|t| t.compute_units).sum();
            let block = Block {
                block_number: slot,
                timestamp: format_timestamp(block_time),
                transaction_count: txs.len(),
                validator: String::new(),
                reward: lamports_to_native(0),
                gas_used: if units > 0 { units.to_string() } else { NOT_AVAILABLE.to_string() },
                hash: String::new(),
                parent_hash: String::new(),
                size: NOT_AVAILABLE.to_string(),
                difficulty: NOT_AVAILABLE.to_string(),
            };
            (Some(block), txs)
        }
    }
}

// ---------------------------------------------------------------------------
// Addresses

pub fn address_kind(meta: Option<&AccountMeta>) -> AddressKind {
    match meta {
        Some(m) if m.executable => AddressKind::Program,
        Some(m) if !m.owner.is_empty() && m.owner != chain::SYSTEM_PROGRAM_ID => AddressKind::Contract,
        _ => AddressKind::Wallet,
    }
}

/// Latest post-transaction token balance per mint owned by `address`.
/// `raw_txs` is expected newest first; the first balance seen per mint wins.
fn token_holdings(address: &str, raw_txs: &[RawTransaction]) -> Vec<TokenHolding> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for balance in raw_txs
        .iter()
        .filter_map(|t| t.meta.as_ref())
        .flat_map(|m| m.post_token_balances.iter())
    {
        if balance.owner.as_deref() != Some(address) {
            continue;
        }
        let Some(mint) = balance.mint.clone() else {
            continue;
        };
        if !seen.insert(mint.clone()) {
            continue;
        }
        let ui = balance.ui_token_amount.as_ref();
        out.push(TokenHolding {
            symbol: short_key(&mint),
            amount: ui.and_then(|u| u.amount.clone()).unwrap_or_else(|| "0".to_string()),
            ui_amount: ui
                .and_then(|u| u.ui_amount_string.clone())
                .unwrap_or_else(|| "0".to_string()),
            usd_value: NOT_AVAILABLE.to_string(),
            mint,
        });
    }
    out
}

/// Builds an address view from the node's account record and the backend's
/// transaction history for it. The native balance is always the first holding.
pub fn normalize_address(
    address: &str,
    account: Option<&RawAccountInfo>,
    raw_txs: &[RawTransaction],
) -> Address {
    let value = account.and_then(|a| a.value.as_ref());
    let lamports = value.and_then(|v| v.lamports).unwrap_or(0);
    let meta = value.map(|v| AccountMeta {
        owner: v.owner.clone().unwrap_or_default(),
        executable: v.executable.unwrap_or(false),
        rent_epoch: v.rent_epoch.unwrap_or(0),
        space: v.space.unwrap_or(0),
    });
    let balance = lamports_to_native(lamports);

    let mut holdings = vec![TokenHolding {
        symbol: chain::NATIVE_SYMBOL.to_string(),
        mint: String::new(),
        amount: lamports.to_string(),
        ui_amount: balance.clone(),
        usd_value: NOT_AVAILABLE.to_string(),
    }];
    holdings.extend(token_holdings(address, raw_txs));

    Address {
        address: address.to_string(),
        balance,
        balance_lamports: lamports,
        balance_usd: NOT_AVAILABLE.to_string(),
        token_holdings: holdings,
        transactions: normalize_transactions(raw_txs),
        kind: address_kind(meta.as_ref()),
        account: meta,
    }
}

// ---------------------------------------------------------------------------
// Analytics and tokens

pub fn normalize_network_stats(raw: &RawOverview) -> NetworkStats {
    let health = raw.network_health.as_ref();
    let supply = raw.supply.as_ref();
    NetworkStats {
        current_slot: raw.current_slot.unwrap_or(0),
        tps: health.and_then(|h| h.tps).unwrap_or(0.0),
        success_rate: health.and_then(|h| h.success_rate).unwrap_or(0.0),
        block_time: health.and_then(|h| h.block_time).unwrap_or(0.0),
        epoch: health.and_then(|h| h.epoch).unwrap_or(0),
        epoch_progress: health.and_then(|h| h.epoch_progress).unwrap_or(0.0),
        total_supply: supply.and_then(|s| s.total).unwrap_or(0.0),
        circulating_supply: supply.and_then(|s| s.circulating).unwrap_or(0.0),
        active_wallets: raw.active_wallets_today.unwrap_or(0),
        total_wallets: raw.total_wallets.unwrap_or(0),
        total_transactions: raw.total_transactions.unwrap_or(0),
        transactions_today: raw.transactions_today.unwrap_or(0),
        token_count: raw.token_count.unwrap_or(0),
        last_updated: raw
            .metadata
            .as_ref()
            .and_then(|m| m.get("lastUpdated"))
            .and_then(crate::wire::lenient::as_string)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

/// Points without a date are dropped; the range falls back to the first and
/// last remaining points.
pub fn normalize_tx_chart(raw: &RawTxChart) -> TxChartData {
    let chart_data: Vec<DailyTxCount> = raw
        .chart_data
        .iter()
        .filter_map(|p| {
            Some(DailyTxCount {
                date: p.date.clone()?,
                count: p.count.unwrap_or(0),
            })
        })
        .collect();
    let total_txns = raw
        .total_txns
        .unwrap_or_else(|| chart_data.iter().map(|p| p.count).sum());
    TxChartData {
        start_date: raw
            .start_date
            .clone()
            .or_else(|| chart_data.first().map(|p| p.date.clone()))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        end_date: raw
            .end_date
            .clone()
            .or_else(|| chart_data.last().map(|p| p.date.clone()))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        total_txns,
        chart_data,
    }
}

pub fn normalize_token(mint: &str, raw: &RawTokenMint) -> TokenInfo {
    let metadata = raw.metadata.as_ref().and_then(|m| m.token_metadata.as_ref());
    let mint_info = raw.metadata.as_ref().and_then(|m| m.mint_info.as_ref());
    let from_mint_info = |key: &str| {
        mint_info
            .and_then(|i| i.get(key))
            .and_then(crate::wire::lenient::as_string)
    };

    let decimals = raw
        .decimals
        .or_else(|| mint_info.and_then(|i| i.get("decimals")).and_then(crate::wire::lenient::as_u64))
        .map(|d| d.min(u8::MAX as u64) as u8)
        .unwrap_or(0);
    let supply = raw
        .supply
        .clone()
        .or_else(|| from_mint_info("supply"))
        .unwrap_or_else(|| "0".to_string());

    TokenInfo {
        mint: raw.mint_address.clone().unwrap_or_else(|| mint.to_string()),
        name: metadata
            .and_then(|m| m.name.clone())
            .or_else(|| raw.name.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        symbol: metadata
            .and_then(|m| m.symbol.clone())
            .or_else(|| raw.symbol.clone())
            .unwrap_or_else(|| short_key(mint)),
        uri: metadata.and_then(|m| m.uri.clone()).unwrap_or_default(),
        decimals,
        supply_display: format_units(&supply, decimals),
        supply,
        mint_authority: raw
            .mint_authority
            .clone()
            .or_else(|| from_mint_info("mintAuthority"))
            .unwrap_or_default(),
        freeze_authority: raw
            .freeze_authority
            .clone()
            .or_else(|| from_mint_info("freezeAuthority"))
            .unwrap_or_default(),
    }
}
