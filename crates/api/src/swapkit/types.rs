use super::asset::AssetId;
use crate::http::{decode_hex, parse_quantity};
use alloy::primitives::{Address, Bytes, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Body of `POST /quote`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub sell_asset: AssetId,
    /// Human units, e.g. "0.01"
    pub sell_amount: String,
    pub buy_asset: AssetId,
    pub source_address: String,
    pub destination_address: String,
    /// Percent
    pub slippage: f64,
    pub include_tx: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub asset: String,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_impact: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Unsigned EVM transaction from a quote with `includeTx`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmTx {
    pub to: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    pub data: String,
    #[serde(default)]
    pub gas: Option<String>,
    #[serde(default)]
    pub gas_price: Option<String>,
}

impl EvmTx {
    pub fn target(&self) -> Result<Address> {
        Address::from_str(&self.to).with_context(|| format!("Invalid swap target {}", self.to))
    }

    pub fn calldata(&self) -> Result<Bytes> {
        Ok(Bytes::from(decode_hex(&self.data)?))
    }

    pub fn value(&self) -> Result<U256> {
        match self.value.as_deref() {
            None | Some("") => Ok(U256::ZERO),
            Some(v) => U256::from_str(v).with_context(|| format!("Invalid swap value {}", v)),
        }
    }

    pub fn gas_limit(&self) -> Option<u64> {
        self.gas
            .as_deref()
            .and_then(parse_quantity)
            .and_then(|g| u64::try_from(g).ok())
    }

    pub fn gas_price(&self) -> Option<u128> {
        self.gas_price.as_deref().and_then(parse_quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRoute {
    pub providers: Vec<String>,
    pub sell_asset: AssetId,
    pub sell_amount: String,
    pub buy_asset: AssetId,
    pub expected_buy_amount: String,
    #[serde(default)]
    pub expected_buy_amount_max_slippage: Option<String>,
    #[serde(default)]
    pub fees: Vec<Fee>,
    #[serde(default)]
    pub target_address: Option<String>,
    #[serde(default)]
    pub inbound_address: Option<String>,
    #[serde(default)]
    pub meta: RouteMeta,
    /// Shape depends on the source chain
    #[serde(default)]
    pub tx: Option<Value>,
    #[serde(default)]
    pub estimated_time: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuoteRoute {
    pub fn primary_provider(&self) -> Option<&str> {
        self.providers.first().map(String::as_str)
    }

    /// The route's transaction, when it is an EVM call.
    pub fn evm_tx(&self) -> Result<EvmTx> {
        let tx = self
            .tx
            .as_ref()
            .context("Route has no transaction; request the quote with includeTx")?;
        serde_json::from_value(tx.clone()).context("Route transaction is not an EVM transaction")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderError {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(default)]
    pub quote_id: Option<String>,
    #[serde(default)]
    pub routes: Vec<QuoteRoute>,
    #[serde(default)]
    pub provider_errors: Vec<ProviderError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_evm_tx() {
        let route: QuoteRoute = serde_json::from_value(json!({
            "providers": ["ONEINCH"],
            "sellAsset": "ARB.USDC-0xaf88d065e77c8cc2239327c5edb3a432268e5831",
            "sellAmount": "0.01",
            "buyAsset": "ARB.USDT-0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9",
            "expectedBuyAmount": "0.00999",
            "fees": [{"type": "liquidity", "amount": "0.00001", "asset": "ARB.USDC"}],
            "meta": {"approvalAddress": "0x111111125421ca6dc452d289314280a0f8842a65", "tags": []},
            "tx": {
                "to": "0x111111125421ca6dc452d289314280a0f8842a65",
                "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "value": "0",
                "data": "0x07ed2379",
                "gas": "0x30d40",
                "gasPrice": "10000000"
            }
        }))
        .unwrap();

        assert_eq!(route.primary_provider(), Some("ONEINCH"));
        assert!(route.meta.approval_address.is_some());
        assert!(route.meta.extra.contains_key("tags"));

        let tx = route.evm_tx().unwrap();
        assert_eq!(tx.value().unwrap(), U256::ZERO);
        assert_eq!(tx.gas_limit(), Some(200_000));
        assert_eq!(tx.gas_price(), Some(10_000_000));
        assert_eq!(tx.calldata().unwrap().len(), 4);
    }

    #[test]
    fn test_route_without_tx() {
        let route: QuoteRoute = serde_json::from_value(json!({
            "providers": ["CHAINFLIP"],
            "sellAsset": "ARB.ETH",
            "sellAmount": "0.1",
            "buyAsset": "BTC.BTC",
            "expectedBuyAmount": "0.003"
        }))
        .unwrap();

        assert!(route.fees.is_empty());
        assert!(route.evm_tx().is_err());
    }

    #[test]
    fn test_quote_request_serialization() {
        let request = QuoteRequest {
            sell_asset: "ARB.USDC-0xaf88d065e77c8cc2239327c5edb3a432268e5831".parse().unwrap(),
            sell_amount: "0.01".to_string(),
            buy_asset: "ARB.ETH".parse().unwrap(),
            source_address: "0xabc".to_string(),
            destination_address: "0xabc".to_string(),
            slippage: 3.0,
            include_tx: true,
            providers: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["sellAsset"], "ARB.USDC-0xaf88d065e77c8cc2239327c5edb3a432268e5831");
        assert_eq!(json["includeTx"], true);
        assert!(json.get("providers").is_none());
    }
}
