//! Chainflip request and response shapes.

use alloy::primitives::{Address, Bytes, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Chains Chainflip settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Ethereum,
    Arbitrum,
    Bitcoin,
    Polkadot,
    Solana,
    Assethub,
}

impl Chain {
    /// EVM chains whose vault swaps are plain contract calls.
    pub fn is_evm(self) -> bool {
        matches!(self, Chain::Ethereum | Chain::Arbitrum)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Asset symbols as the backend spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Asset {
    ETH,
    FLIP,
    USDC,
    USDT,
    BTC,
    DOT,
    SOL,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An asset on a specific chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetAndChain {
    pub chain: Chain,
    pub asset: Asset,
}

impl AssetAndChain {
    pub fn new(chain: Chain, asset: Asset) -> Self {
        Self { chain, asset }
    }

    /// Decimals of the asset, `None` for pairs Chainflip does not list.
    pub fn decimals(&self) -> Option<u8> {
        use Asset::*;
        use Chain::*;
        match (self.chain, self.asset) {
            (Ethereum | Arbitrum, ETH) | (Ethereum, FLIP) => Some(18),
            (Ethereum | Arbitrum | Solana | Assethub, USDC) => Some(6),
            (Ethereum | Assethub, USDT) => Some(6),
            (Bitcoin, BTC) => Some(8),
            (Polkadot | Assethub, DOT) => Some(10),
            (Solana, SOL) => Some(9),
            _ => None,
        }
    }
}

impl fmt::Display for AssetAndChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.asset, self.chain)
    }
}

/// Parameters for `getQuoteV2`.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub src: AssetAndChain,
    pub dest: AssetAndChain,
    /// Amount in the source asset's smallest unit
    pub amount: String,
    pub is_vault_swap: bool,
    pub broker_commission_bps: Option<u16>,
}

/// Quote execution variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteType {
    /// Immediate execution
    Regular,
    /// Split into chunks over time
    Dca,
}

impl fmt::Display for QuoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteType::Regular => write!(f, "REGULAR"),
            QuoteType::Dca => write!(f, "DCA"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaParams {
    pub number_of_chunks: u32,
    pub chunk_interval_blocks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncludedFee {
    #[serde(rename = "type")]
    pub kind: String,
    pub chain: String,
    pub asset: String,
    pub amount: String,
}

/// A priced swap proposal returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "type")]
    pub kind: QuoteType,
    pub src_asset: AssetAndChain,
    pub dest_asset: AssetAndChain,
    pub deposit_amount: String,
    pub egress_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_amount: Option<String>,
    #[serde(default)]
    pub included_fees: Vec<IncludedFee>,
    /// Destination units per source unit, human-readable
    pub estimated_price: String,
    pub recommended_slippage_tolerance_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_liquidity_warning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dca_params: Option<DcaParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_vault_swap: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The backend has answered both a bare list and `{ quotes: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum QuoteResponse {
    List(Vec<Quote>),
    Wrapped { quotes: Vec<Quote> },
}

impl QuoteResponse {
    pub(crate) fn into_quotes(self) -> Vec<Quote> {
        match self {
            QuoteResponse::List(quotes) | QuoteResponse::Wrapped { quotes } => quotes,
        }
    }
}

/// Refund protection for a vault swap.
#[derive(Debug, Clone)]
pub struct FillOrKillParams {
    pub slippage_tolerance_percent: f64,
    pub refund_address: Address,
    /// Blocks to keep retrying before refunding (6 s per block)
    pub retry_duration_blocks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliate {
    pub account: String,
    pub commission_bps: u16,
}

/// Parameters for `encodeVaultSwapData`.
#[derive(Debug, Clone)]
pub struct VaultSwapRequest {
    pub quote: Quote,
    pub src_address: Address,
    pub dest_address: String,
    pub fill_or_kill: FillOrKillParams,
    pub broker_commission_bps: u16,
    pub affiliates: Vec<Affiliate>,
}

/// Encoded vault swap returned by the broker.
///
/// EVM chains carry `to`/`calldata`/`value`; other chains keep their
/// chain-specific payload in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSwapData {
    pub chain: Chain,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub calldata: Option<Bytes>,
    #[serde(default)]
    pub value: Option<U256>,
    #[serde(default)]
    pub source_token_address: Option<Address>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VaultSwapData {
    /// `(to, calldata, value)` when this is an EVM contract call.
    pub fn evm_call(&self) -> Option<(Address, Bytes, U256)> {
        if !self.chain.is_evm() {
            return None;
        }
        Some((
            self.to?,
            self.calldata.clone()?,
            self.value.unwrap_or(U256::ZERO),
        ))
    }
}

/// Swap lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapState {
    Waiting,
    Receiving,
    Swapping,
    Sending,
    Sent,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl SwapState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SwapState::Completed | SwapState::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositInfo {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub tx_ref: Option<String>,
    #[serde(default)]
    pub witnessed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Status record from `getStatusV2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapStatus {
    pub state: SwapState,
    #[serde(default)]
    pub src_chain: Option<Chain>,
    #[serde(default)]
    pub src_asset: Option<Asset>,
    #[serde(default)]
    pub dest_chain: Option<Chain>,
    #[serde(default)]
    pub dest_asset: Option<Asset>,
    #[serde(default)]
    pub dest_address: Option<String>,
    #[serde(default)]
    pub deposit: Option<DepositInfo>,
    #[serde(default)]
    pub estimated_duration_seconds: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimals() {
        assert_eq!(AssetAndChain::new(Chain::Ethereum, Asset::ETH).decimals(), Some(18));
        assert_eq!(AssetAndChain::new(Chain::Arbitrum, Asset::USDC).decimals(), Some(6));
        assert_eq!(AssetAndChain::new(Chain::Bitcoin, Asset::BTC).decimals(), Some(8));
        assert_eq!(AssetAndChain::new(Chain::Bitcoin, Asset::ETH).decimals(), None);
    }

    #[test]
    fn test_deserialize_quote_list() {
        let json = r#"[
            {
                "type": "REGULAR",
                "srcAsset": {"chain": "Ethereum", "asset": "ETH"},
                "destAsset": {"chain": "Arbitrum", "asset": "ETH"},
                "depositAmount": "40000000000000000",
                "egressAmount": "39800000000000000",
                "intermediateAmount": "100000000",
                "includedFees": [
                    {"type": "NETWORK", "chain": "Ethereum", "asset": "USDC", "amount": "40000"}
                ],
                "estimatedPrice": "0.995",
                "recommendedSlippageTolerancePercent": 1.5,
                "estimatedDurationSeconds": 144,
                "lowLiquidityWarning": false,
                "isVaultSwap": true,
                "poolInfo": []
            },
            {
                "type": "DCA",
                "srcAsset": {"chain": "Ethereum", "asset": "ETH"},
                "destAsset": {"chain": "Arbitrum", "asset": "ETH"},
                "depositAmount": "40000000000000000",
                "egressAmount": "39900000000000000",
                "estimatedPrice": "0.9975",
                "recommendedSlippageTolerancePercent": 1,
                "dcaParams": {"numberOfChunks": 4, "chunkIntervalBlocks": 2}
            }
        ]"#;

        let quotes = serde_json::from_str::<QuoteResponse>(json).unwrap().into_quotes();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].kind, QuoteType::Regular);
        assert_eq!(quotes[0].included_fees[0].kind, "NETWORK");
        assert!(quotes[0].extra.contains_key("poolInfo"));
        assert_eq!(quotes[1].dca_params.as_ref().unwrap().number_of_chunks, 4);
    }

    #[test]
    fn test_deserialize_wrapped_quotes() {
        let json = r#"{"quotes": []}"#;
        let quotes = serde_json::from_str::<QuoteResponse>(json).unwrap().into_quotes();
        assert!(quotes.is_empty());
    }

    #[test]
    fn test_vault_swap_evm_call() {
        let json = r#"{
            "chain": "Ethereum",
            "to": "0x36ead71325604dc15d35fae584d7b50646d81753",
            "calldata": "0xdd68734500",
            "value": "0x8e1bc9bf040000",
            "source_token_address": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
        }"#;
        let data: VaultSwapData = serde_json::from_str(json).unwrap();
        let (to, calldata, value) = data.evm_call().unwrap();

        assert_eq!(to, "0x36ead71325604dc15d35fae584d7b50646d81753".parse::<Address>().unwrap());
        assert_eq!(calldata.len(), 5);
        assert_eq!(value, U256::from(40_000_000_000_000_000u64));
    }

    #[test]
    fn test_vault_swap_non_evm() {
        let json = r#"{
            "chain": "Bitcoin",
            "nulldata_payload": "0x0001",
            "deposit_address": "tb1q..."
        }"#;
        let data: VaultSwapData = serde_json::from_str(json).unwrap();
        assert!(data.evm_call().is_none());
        assert!(data.extra.contains_key("deposit_address"));
    }

    #[test]
    fn test_deserialize_status() {
        let json = r#"{
            "state": "SWAPPING",
            "srcChain": "Ethereum",
            "srcAsset": "ETH",
            "destChain": "Arbitrum",
            "destAsset": "ETH",
            "destAddress": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "deposit": {
                "amount": "40000000000000000",
                "txRef": "0xf805",
                "witnessedAt": "2025-05-01T10:00:00.000Z",
                "witnessedBlockIndex": "123-4"
            }
        }"#;
        let status: SwapStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, SwapState::Swapping);
        assert!(!status.state.is_terminal());
        assert!(status.deposit.unwrap().witnessed_at.is_some());
    }

    #[test]
    fn test_unknown_state() {
        let status: SwapStatus = serde_json::from_str(r#"{"state": "BROADCAST_REQUESTED"}"#).unwrap();
        assert_eq!(status.state, SwapState::Unknown);
    }
}
