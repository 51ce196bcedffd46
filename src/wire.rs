//! Upstream wire shapes.
//!
//! Every field is optional and every scalar is decoded leniently: a number
//! that arrives as a string still parses, and a value of the wrong type
//! decodes as absent instead of failing the whole record. Only structural
//! mismatches (an object where a list is required at the top level) are
//! rejected, and the gateway reports those as "no data".

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Field decoders that never fail on type mismatch.
pub mod lenient {
    use super::*;

    pub fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(as_u64(&Value::deserialize(d)?))
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(as_i64(&Value::deserialize(d)?))
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(as_f64(&Value::deserialize(d)?))
    }

    pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(Value::deserialize(d)?.as_bool())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(as_string(&Value::deserialize(d)?))
    }

    /// Distinguishes an explicit `null` (`Some(Value::Null)`) from an absent
    /// field (`None`, via `#[serde(default)]`).
    pub fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
        Value::deserialize(d).map(Some)
    }

    /// Decodes a list, dropping elements that do not fit `T`.
    /// Anything other than an array becomes an empty list.
    pub fn vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(list_of(Value::deserialize(d)?))
    }

    /// Decodes an object, treating a value of the wrong shape as absent.
    pub fn opt_obj<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let v = Value::deserialize(d)?;
        if v.is_object() {
            Ok(serde_json::from_value(v).ok())
        } else {
            Ok(None)
        }
    }

    pub fn as_u64(v: &Value) -> Option<u64> {
        match v {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s
                .trim()
                .parse::<u64>()
                .ok()
                .or_else(|| s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64)),
            _ => None,
        }
    }

    pub fn as_i64(v: &Value) -> Option<i64> {
        match v {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn as_f64(v: &Value) -> Option<f64> {
        match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_string(v: &Value) -> Option<String> {
        match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn list_of<T: DeserializeOwned>(v: Value) -> Vec<T> {
        match v {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Backends sometimes wrap payloads as `{ "data": ... }`.
pub fn unwrap_envelope(v: Value) -> Value {
    match v {
        Value::Object(mut map) if matches!(map.get("data"), Some(inner) if inner.is_object() || inner.is_array()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Accepts either a single record or a list of records.
pub fn one_or_many<T: DeserializeOwned>(v: Value) -> Vec<T> {
    match v {
        Value::Array(_) => lenient::list_of(v),
        Value::Object(_) => serde_json::from_value(v).ok().into_iter().collect(),
        _ => Vec::new(),
    }
}

/// First record of a payload that may be an object or an array.
pub fn first_of<T: DeserializeOwned>(v: Value) -> Option<T> {
    one_or_many(v).into_iter().next()
}

/// Safe nested getter over untyped JSON: `dig(v, &["parsed", "info", "lamports"])`.
pub fn dig<'a>(v: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(v, |cur, key| cur.get(*key))
}

// ---------------------------------------------------------------------------
// Blocks

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReward {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub pubkey: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub lamports: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub slot: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub block_number: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub block_height: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub parent_slot: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub blockhash: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hash: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub previous_blockhash: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub parent_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub block_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub transactions: Vec<RawTransaction>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub transaction_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub tx_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub rewards: Vec<RawReward>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub validator: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub leader: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub reward: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub gas_used: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub difficulty: Option<String>,
}

/// Payload of `GET /api/block/transactions/:slot`: either a block record or
/// a bare list of the block's transactions.
#[derive(Debug, Clone)]
pub enum RawBlockPayload {
    Block(RawBlock),
    Transactions(Vec<RawTransaction>),
}

impl RawBlockPayload {
    pub fn from_value(v: Value) -> Option<Self> {
        match v {
            Value::Array(_) => Some(RawBlockPayload::Transactions(lenient::list_of(v))),
            Value::Object(_) => serde_json::from_value(v).ok().map(RawBlockPayload::Block),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transactions

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAccountKey {
    Plain(String),
    Parsed {
        pubkey: String,
        #[serde(default, deserialize_with = "lenient::opt_bool")]
        signer: Option<bool>,
        #[serde(default, deserialize_with = "lenient::opt_bool")]
        writable: Option<bool>,
    },
}

impl RawAccountKey {
    pub fn pubkey(&self) -> &str {
        match self {
            RawAccountKey::Plain(k) => k,
            RawAccountKey::Parsed { pubkey, .. } => pubkey,
        }
    }

    pub fn is_signer(&self) -> bool {
        matches!(self, RawAccountKey::Parsed { signer: Some(true), .. })
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, RawAccountKey::Parsed { writable: Some(true), .. })
    }
}

/// Instruction account reference: a pubkey, or an index into the account keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAccountIndex {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstruction {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub program_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub program_id_index: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub program: Option<String>,
    /// `{ "type": ..., "info": {...} }` for parsed programs, a bare string for memos
    #[serde(default)]
    pub parsed: Option<Value>,
    #[serde(default, rename = "type", deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub accounts: Vec<RawAccountIndex>,
}

impl RawInstruction {
    pub fn parsed_type(&self) -> Option<&str> {
        self.parsed
            .as_ref()
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str)
    }

    pub fn info(&self, key: &str) -> Option<&Value> {
        self.parsed.as_ref().and_then(|p| dig(p, &["info", key]))
    }

    pub fn info_str(&self, key: &str) -> Option<&str> {
        self.info(key).and_then(Value::as_str)
    }

    pub fn info_u64(&self, key: &str) -> Option<u64> {
        self.info(key).and_then(lenient::as_u64)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInnerGroup {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub index: Option<u64>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub instructions: Vec<RawInstruction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUiTokenAmount {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub decimals: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ui_amount_string: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenBalance {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub mint: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_obj")]
    pub ui_token_amount: Option<RawUiTokenAmount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeta {
    /// `Some(Null)` = explicit success, `Some(_)` = error, `None` = absent
    #[serde(default, deserialize_with = "lenient::present")]
    pub err: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub fee: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub compute_units_consumed: Option<u64>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub inner_instructions: Vec<RawInnerGroup>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub post_token_balances: Vec<RawTokenBalance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub account_keys: Vec<RawAccountKey>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub instructions: Vec<RawInstruction>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub recent_blockhash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTxEnvelope {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub signatures: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_obj")]
    pub message: Option<RawMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub slot: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub block_time: Option<i64>,
    /// Some backends flatten the signature to the top level
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub signature: Option<String>,
    /// `"legacy"` or a numeric version
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_obj")]
    pub meta: Option<RawMeta>,
    #[serde(default, deserialize_with = "lenient::opt_obj")]
    pub transaction: Option<RawTxEnvelope>,
}

impl RawTransaction {
    pub fn message(&self) -> Option<&RawMessage> {
        self.transaction.as_ref().and_then(|t| t.message.as_ref())
    }

    pub fn signature(&self) -> Option<&str> {
        self.transaction
            .as_ref()
            .and_then(|t| t.signatures.first())
            .map(String::as_str)
            .or(self.signature.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// List payload: a bare array, or an object carrying the array under one of `keys`.
pub fn records<T: DeserializeOwned>(v: Value, keys: &[&str]) -> Vec<T> {
    match v {
        Value::Array(_) => lenient::list_of(v),
        Value::Object(mut map) => keys
            .iter()
            .find_map(|k| map.remove(*k))
            .map(lenient::list_of)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Accounts, tokens, analytics

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccountValue {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub lamports: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub executable: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub rent_epoch: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub space: Option<u64>,
}

/// Result of the node's `getAccountInfo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccountInfo {
    #[serde(default, deserialize_with = "lenient::opt_obj")]
    pub value: Option<RawAccountValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenMetadata {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenMintMeta {
    #[serde(default, deserialize_with = "lenient::opt_obj")]
    pub token_metadata: Option<RawTokenMetadata>,
    #[serde(default)]
    pub mint_info: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenMint {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub mint_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub decimals: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub supply: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub mint_authority: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub freeze_authority: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_obj")]
    pub metadata: Option<RawTokenMintMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNetworkHealth {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub tps: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub success_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub block_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub epoch: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub epoch_progress: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSupply {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub circulating: Option<f64>,
}

/// Payload of `GET /api/analytics/overview`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOverview {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub total_transactions: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub total_wallets: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub active_wallets_today: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub transactions_today: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub current_slot: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub token_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_obj")]
    pub network_health: Option<RawNetworkHealth>,
    #[serde(default, deserialize_with = "lenient::opt_obj")]
    pub supply: Option<RawSupply>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDailyCount {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub count: Option<u64>,
}

/// Payload of `GET /api/tx/chart-data` (after envelope unwrapping).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTxChart {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub chart_data: Vec<RawDailyCount>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub total_txns: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub end_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn err_field_distinguishes_null_from_absent() {
        let with_null: RawMeta = serde_json::from_value(json!({ "err": null })).unwrap();
        assert_eq!(with_null.err, Some(Value::Null));

        let absent: RawMeta = serde_json::from_value(json!({ "fee": 5000 })).unwrap();
        assert_eq!(absent.err, None);

        let failed: RawMeta =
            serde_json::from_value(json!({ "err": { "InstructionError": [0, "Custom"] } })).unwrap();
        assert!(matches!(failed.err, Some(Value::Object(_))));
    }

    #[test]
    fn scalars_decode_from_strings_and_wrong_types_become_absent() {
        let b: RawBlock = serde_json::from_value(json!({
            "slot": "12345",
            "blockTime": 1_700_000_000,
            "blockhash": 42,
            "transactions": "not a list",
            "parentSlot": { "nested": true }
        }))
        .unwrap();
        assert_eq!(b.slot, Some(12345));
        assert_eq!(b.block_time, Some(1_700_000_000));
        assert_eq!(b.blockhash.as_deref(), Some("42"));
        assert!(b.transactions.is_empty());
        assert_eq!(b.parent_slot, None);
    }

    #[test]
    fn account_keys_accept_both_shapes() {
        let m: RawMessage = serde_json::from_value(json!({
            "accountKeys": [
                "PlainKey1111",
                { "pubkey": "ParsedKey2222", "signer": true, "writable": false },
                17
            ]
        }))
        .unwrap();
        assert_eq!(m.account_keys.len(), 2);
        assert_eq!(m.account_keys[0].pubkey(), "PlainKey1111");
        assert!(m.account_keys[1].is_signer());
        assert!(!m.account_keys[1].is_writable());
    }

    #[test]
    fn envelope_and_list_helpers() {
        let wrapped = json!({ "success": true, "data": { "totalTxns": 3 } });
        let chart: RawTxChart = serde_json::from_value(unwrap_envelope(wrapped)).unwrap();
        assert_eq!(chart.total_txns, Some(3));

        let single = json!({ "slot": 7 });
        let list: Vec<RawTransaction> = one_or_many(json!([{ "slot": 1 }, { "slot": 2 }]));
        assert_eq!(list.len(), 2);
        assert_eq!(first_of::<RawTransaction>(single).and_then(|t| t.slot), Some(7));
        assert!(one_or_many::<RawTransaction>(Value::Null).is_empty());

        let by_all_tx: Vec<RawTransaction> = records(json!({ "allTx": [{ "slot": 9 }] }), &["allTx"]);
        assert_eq!(by_all_tx[0].slot, Some(9));
        assert!(records::<RawTransaction>(json!("nope"), &["allTx"]).is_empty());
        assert!(records::<RawTransaction>(json!({ "other": [] }), &["allTx"]).is_empty());
    }

    #[test]
    fn dig_walks_missing_levels_safely() {
        let v = json!({ "parsed": { "info": { "lamports": 10 } } });
        assert_eq!(dig(&v, &["parsed", "info", "lamports"]), Some(&json!(10)));
        assert_eq!(dig(&v, &["parsed", "missing", "lamports"]), None);
        assert_eq!(dig(&Value::Null, &["anything"]), None);
    }

    #[test]
    fn unread_upstream_keys_are_ignored() {
        let reward: RawReward =
            serde_json::from_value(json!({ "pubkey": "V", "lamports": 5, "rewardType": "Fee" })).unwrap();
        assert_eq!(reward.lamports, Some(5));

        let balance: RawTokenBalance =
            serde_json::from_value(json!({ "accountIndex": 2, "mint": "M", "owner": "O" })).unwrap();
        assert_eq!(balance.owner.as_deref(), Some("O"));

        let info: RawAccountInfo =
            serde_json::from_value(json!({ "context": { "slot": 1 }, "value": { "lamports": 9 } })).unwrap();
        assert_eq!(info.value.and_then(|v| v.lamports), Some(9));
    }
}
