//! Legacy gas pricing (single `gas_price` field).

use super::{GasParams, GasStrategy};
use alloy::network::TransactionBuilder;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Legacy gas pricing strategy.
///
/// Queries `eth_gasPrice` and caps the answer; falls back to the default
/// price when the node does not answer.
#[derive(Debug, Clone)]
pub struct LegacyGasStrategy {
    /// Fallback gas price in wei.
    default_gas_price: u128,
    /// Upper bound in wei.
    max_gas_price: u128,
}

impl LegacyGasStrategy {
    /// Create a new Legacy gas strategy (both values in wei).
    pub fn new(default_gas_price: u128, max_gas_price: u128) -> Self {
        Self {
            default_gas_price,
            max_gas_price,
        }
    }

    fn cap(&self, gas_price: u128) -> u128 {
        gas_price.min(self.max_gas_price)
    }
}

#[async_trait]
impl GasStrategy for LegacyGasStrategy {
    async fn fetch_params(&self, rpc_url: &str) -> Result<GasParams> {
        let provider = ProviderBuilder::new().on_http(rpc_url.parse()?);
        let quoted = provider
            .get_gas_price()
            .await
            .unwrap_or(self.default_gas_price);
        let gas_price = self.cap(quoted);

        debug!(quoted, gas_price, "Legacy gas price fetched");

        Ok(GasParams::Legacy { gas_price })
    }

    fn apply_gas(&self, tx: &mut TransactionRequest, params: &GasParams) {
        // EIP-1559 params collapse to their max fee
        tx.set_gas_price(params.effective_gas_price());
    }

    fn strategy_name(&self) -> &'static str {
        "Legacy"
    }
}
