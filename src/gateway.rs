//! Upstream access: backend REST API and JSON-RPC node.
//!
//! `ExplorerSource` is the seam the facade depends on. `HttpGateway` is the
//! network implementation; every transport error, non-2xx status, RPC error
//! object or undecodable body is logged and returned as "no data". No
//! retries, no backoff.

use crate::config::Config;
use crate::wire::{
    self, RawAccountInfo, RawBlock, RawBlockPayload, RawOverview, RawTokenMint, RawTransaction,
    RawTxChart,
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

#[async_trait]
pub trait ExplorerSource: Send + Sync {
    /// `GET /api/block/latest?limit=N`
    async fn latest_blocks(&self, limit: usize) -> Vec<RawBlock>;
    /// `GET /api/block/transactions/:slot`
    async fn block(&self, slot: u64) -> Option<RawBlockPayload>;
    /// `GET /api/tx/latest?limit=N`
    async fn latest_transactions(&self, limit: usize) -> Vec<RawTransaction>;
    /// `GET /api/tx/:signature`
    async fn transaction(&self, signature: &str) -> Option<RawTransaction>;
    /// `GET /api/tx/transactions/:address`
    async fn address_transactions(&self, address: &str) -> Vec<RawTransaction>;
    /// `GET /api/tx/chart-data`
    async fn tx_chart_data(&self) -> Option<RawTxChart>;
    /// `GET /api/tokens/mint/:address`
    async fn token_mint(&self, address: &str) -> Option<RawTokenMint>;
    /// `GET /api/analytics/overview`
    async fn analytics_overview(&self) -> Option<RawOverview>;
    /// RPC `getAccountInfo` with `jsonParsed` encoding
    async fn account_info(&self, address: &str) -> Option<RawAccountInfo>;

    /// True when the account exists and is owned by `program_id`.
    async fn is_token_mint(&self, address: &str, program_id: &str) -> bool {
        self.account_info(address)
            .await
            .and_then(|info| info.value)
            .and_then(|v| v.owner)
            .is_some_and(|owner| owner == program_id)
    }
}

pub struct HttpGateway {
    client: reqwest::Client,
    backend_url: String,
    rpc_url: String,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            backend_url: config.backend_url.trim_end_matches('/').to_string(),
            rpc_url: config.rpc_url.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
        })
    }

    /// GET a backend path and return the body with any `{ "data": ... }` envelope removed.
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.backend_url, path);
        log::debug!("[gateway] GET {url}");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| anyhow!("request to {url} failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("backend error ({status}) for {path}: {error_text}"));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| anyhow!("failed to parse response from {path}: {e}"))?;
        Ok(wire::unwrap_envelope(data))
    }

    /// POST a JSON-RPC call to the node and return its `result`.
    pub async fn rpc_post(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({ "jsonrpc": "2.0", "id": "gorbx", "method": method, "params": params });
        log::debug!("[gateway] RPC {method}");

        let res = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(anyhow!("http {}", res.status()));
        }
        let v: Value = res.json().await?;
        if let Some(err) = v.get("error") {
            let code = err.get("code").and_then(|c| c.as_i64()).unwrap_or_default();
            let msg = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("rpc error");
            return Err(anyhow!("rpc {code} {msg}"));
        }
        match v.get("result") {
            Some(r) => Ok(r.clone()),
            None => Err(anyhow!("invalid rpc payload (no result)")),
        }
    }

    /// Converts a failed call into "no data", logging why.
    fn absorb<T>(what: &str, res: Result<T>) -> Option<T> {
        match res {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("[gateway] {what}: {e:#}");
                None
            }
        }
    }

    async fn get_list<T: DeserializeOwned>(&self, what: &str, path: &str, keys: &[&str]) -> Vec<T> {
        Self::absorb(what, self.get_json(path).await)
            .map(|v| wire::records(v, keys))
            .unwrap_or_default()
    }

    async fn get_one<T: DeserializeOwned>(&self, what: &str, path: &str) -> Option<T> {
        let v = Self::absorb(what, self.get_json(path).await)?;
        let one = wire::first_of(v);
        if one.is_none() {
            log::warn!("[gateway] {what}: no record in response");
        }
        one
    }
}

fn seg(s: &str) -> String {
    urlencoding::encode(s.trim()).into_owned()
}

#[async_trait]
impl ExplorerSource for HttpGateway {
    async fn latest_blocks(&self, limit: usize) -> Vec<RawBlock> {
        self.get_list(
            "latest blocks",
            &format!("/api/block/latest?limit={limit}"),
            &["blocks"],
        )
        .await
    }

    async fn block(&self, slot: u64) -> Option<RawBlockPayload> {
        let v = Self::absorb(
            "block",
            self.get_json(&format!("/api/block/transactions/{slot}")).await,
        )?;
        RawBlockPayload::from_value(v)
    }

    async fn latest_transactions(&self, limit: usize) -> Vec<RawTransaction> {
        self.get_list(
            "latest transactions",
            &format!("/api/tx/latest?limit={limit}"),
            &["transactions"],
        )
        .await
    }

    async fn transaction(&self, signature: &str) -> Option<RawTransaction> {
        self.get_one("transaction", &format!("/api/tx/{}", seg(signature)))
            .await
    }

    async fn address_transactions(&self, address: &str) -> Vec<RawTransaction> {
        self.get_list(
            "address transactions",
            &format!("/api/tx/transactions/{}", seg(address)),
            &["allTx", "transactions"],
        )
        .await
    }

    async fn tx_chart_data(&self) -> Option<RawTxChart> {
        self.get_one("tx chart", "/api/tx/chart-data").await
    }

    async fn token_mint(&self, address: &str) -> Option<RawTokenMint> {
        self.get_one("token mint", &format!("/api/tokens/mint/{}", seg(address)))
            .await
    }

    async fn analytics_overview(&self) -> Option<RawOverview> {
        self.get_one("analytics overview", "/api/analytics/overview")
            .await
    }

    async fn account_info(&self, address: &str) -> Option<RawAccountInfo> {
        let v = Self::absorb(
            "account info",
            self.rpc_post(
                "getAccountInfo",
                json!([address.trim(), { "encoding": "jsonParsed" }]),
            )
            .await,
        )?;
        Self::absorb(
            "account info",
            serde_json::from_value(v).context("decode getAccountInfo result"),
        )
    }
}
