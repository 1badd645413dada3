//! EIP-1559 gas pricing for Ethereum and the L2s the swap flows touch.

use super::{GasParams, GasStrategy};
use alloy::eips::BlockNumberOrTag;
use alloy::network::TransactionBuilder;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Base fee assumed when the latest block has none (30 gwei).
const FALLBACK_BASE_FEE: u128 = 30_000_000_000;

/// EIP-1559 gas pricing strategy.
///
/// `max_fee_per_gas = base_fee * max_fee_multiplier + priority_fee`, capped.
#[derive(Debug, Clone)]
pub struct Eip1559GasStrategy {
    /// Priority fee used when the node has no suggestion, in wei.
    default_priority_fee: u128,
    /// Headroom over the current base fee.
    max_fee_multiplier: f64,
    /// Upper bound on max_fee_per_gas, in wei.
    max_fee_cap: u128,
}

impl Eip1559GasStrategy {
    /// Create a strategy with a 500 gwei cap.
    pub fn new(default_priority_fee: u128, max_fee_multiplier: f64) -> Self {
        Self {
            default_priority_fee,
            max_fee_multiplier,
            max_fee_cap: 500_000_000_000,
        }
    }

    /// Override the max fee cap (wei).
    pub fn with_max_fee_cap(mut self, cap: u128) -> Self {
        self.max_fee_cap = cap;
        self
    }

    fn max_fee(&self, base_fee: u128, priority_fee: u128) -> u128 {
        let max_fee = ((base_fee as f64) * self.max_fee_multiplier) as u128 + priority_fee;
        max_fee.min(self.max_fee_cap)
    }
}

#[async_trait]
impl GasStrategy for Eip1559GasStrategy {
    async fn fetch_params(&self, rpc_url: &str) -> Result<GasParams> {
        let provider = ProviderBuilder::new().on_http(rpc_url.parse()?);

        let block = provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Latest block not available"))?;

        let base_fee = block
            .header
            .base_fee_per_gas
            .map(u128::from)
            .unwrap_or(FALLBACK_BASE_FEE);

        let priority_fee = provider
            .get_max_priority_fee_per_gas()
            .await
            .unwrap_or(self.default_priority_fee);

        let max_fee_per_gas = self.max_fee(base_fee, priority_fee);
        debug!(base_fee, priority_fee, max_fee_per_gas, "EIP-1559 fees fetched");

        Ok(GasParams::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas: priority_fee,
            base_fee,
        })
    }

    fn apply_gas(&self, tx: &mut TransactionRequest, params: &GasParams) {
        match params {
            GasParams::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
                ..
            } => {
                tx.set_max_fee_per_gas(*max_fee_per_gas);
                tx.set_max_priority_fee_per_gas(*max_priority_fee_per_gas);
            }
            GasParams::Legacy { gas_price } => {
                tx.set_max_fee_per_gas(*gas_price);
                tx.set_max_priority_fee_per_gas(self.default_priority_fee.min(*gas_price));
            }
        }
    }

    fn strategy_name(&self) -> &'static str {
        "EIP-1559"
    }
}
