//! LiFi route, step and status shapes.
//!
//! Steps are sent back to the API verbatim, so every struct keeps the fields
//! it does not model in a flattened `extra` map.

use crate::http::{decode_hex, parse_quantity};
use alloy::primitives::{Address, Bytes, U256};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Route ranking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteOrder {
    #[default]
    Recommended,
    Fastest,
    Safest,
    Cheapest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptions {
    pub order: RouteOrder,
    /// Fraction, e.g. 0.03 for 3%
    pub slippage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrator: Option<String>,
}

/// Body of `POST /advanced/routes`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesRequest {
    pub from_chain_id: u64,
    pub to_chain_id: u64,
    pub from_token_address: Address,
    pub to_token_address: Address,
    /// Smallest unit of the source token
    pub from_amount: String,
    pub from_address: Address,
    pub to_address: Address,
    pub options: RouteOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    pub chain_id: u64,
    pub symbol: String,
    pub decimals: u8,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Token {
    pub fn address(&self) -> Result<Address> {
        Address::from_str(&self.address).with_context(|| format!("Invalid token address {}", self.address))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub from_chain_id: u64,
    pub to_chain_id: u64,
    pub from_token: Token,
    pub to_token: Token,
    pub from_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_amount_min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_duration: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// EVM transaction attached to a step by `stepTransaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub to: String,
    pub data: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub gas_price: Option<String>,
    #[serde(default)]
    pub gas_limit: Option<String>,
}

impl TransactionRequest {
    pub fn target(&self) -> Result<Address> {
        Address::from_str(&self.to).with_context(|| format!("Invalid transaction target {}", self.to))
    }

    pub fn calldata(&self) -> Result<Bytes> {
        Ok(Bytes::from(decode_hex(&self.data)?))
    }

    /// Native value; absent means zero.
    pub fn value(&self) -> Result<U256> {
        match &self.value {
            Some(v) => U256::from_str(v).with_context(|| format!("Invalid transaction value {}", v)),
            None => Ok(U256::ZERO),
        }
    }

    pub fn gas_limit(&self) -> Option<u64> {
        self.gas_limit
            .as_deref()
            .and_then(parse_quantity)
            .and_then(|g| u64::try_from(g).ok())
    }
}

/// Execution progress, as the SDK reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    ActionRequired,
    Pending,
    Failed,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessType {
    TokenAllowance,
    Swap,
    CrossChain,
    ReceivingChain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    #[serde(rename = "type")]
    pub kind: ProcessType,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub status: ExecutionStatus,
    pub process: Vec<Process>,
}

impl Execution {
    pub fn new() -> Self {
        Self {
            status: ExecutionStatus::Pending,
            process: Vec::new(),
        }
    }

    /// Append a process and return a handle to update it.
    pub fn start(&mut self, kind: ProcessType) -> &mut Process {
        self.status = ExecutionStatus::Pending;
        self.process.push(Process {
            kind,
            status: ExecutionStatus::Pending,
            started_at: Utc::now(),
            tx_hash: None,
            tx_link: None,
            message: None,
        });
        let last = self.process.len() - 1;
        &mut self.process[last]
    }
}

impl Default for Execution {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub tool: String,
    pub action: Action,
    pub estimate: Estimate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_request: Option<TransactionRequest>,
    /// Local progress record; never sent to the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<Execution>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub from_chain_id: u64,
    pub to_chain_id: u64,
    pub from_amount: String,
    pub to_amount: String,
    pub to_amount_min: String,
    pub from_token: Token,
    pub to_token: Token,
    #[serde(default, rename = "fromAmountUSD", skip_serializing_if = "Option::is_none")]
    pub from_amount_usd: Option<String>,
    #[serde(default, rename = "toAmountUSD", skip_serializing_if = "Option::is_none")]
    pub to_amount_usd: Option<String>,
    #[serde(default, rename = "gasCostUSD", skip_serializing_if = "Option::is_none")]
    pub gas_cost_usd: Option<String>,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RoutesResponse {
    pub routes: Vec<Route>,
}

/// Query of `GET /status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub tx_hash: String,
    pub bridge: String,
    pub from_chain: u64,
    pub to_chain: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    NotFound,
    Invalid,
    Pending,
    Done,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TransferStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferStatus::Done | TransferStatus::Failed | TransferStatus::Invalid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferLeg {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub tx_link: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: TransferStatus,
    #[serde(default)]
    pub substatus: Option<String>,
    #[serde(default)]
    pub substatus_message: Option<String>,
    #[serde(default)]
    pub sending: Option<TransferLeg>,
    #[serde(default)]
    pub receiving: Option<TransferLeg>,
    #[serde(default)]
    pub lifi_explorer_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
