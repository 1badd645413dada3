//! Gas pricing strategies for swap and approval transactions.
//!
//! Two strategies are provided: Legacy (single gas price) and EIP-1559
//! (base fee + priority fee). Both can be scaled by a speed multiplier,
//! which is how fee presets such as "fast" are expressed.
//!
//! # Example
//!
//! ```rust,ignore
//! use xswap_chain::gas::{create_gas_strategy, GasStrategy};
//!
//! let strategy = create_gas_strategy("eip1559", 0.1, 50.0, Some(0.01));
//! let params = strategy.fetch_params("https://arb1.arbitrum.io/rpc").await?;
//! let fast = params.scaled(1.5);
//! ```

mod eip1559;
mod legacy;

pub use eip1559::Eip1559GasStrategy;
pub use legacy::LegacyGasStrategy;

use alloy::rpc::types::TransactionRequest;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Gas parameters fetched from the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GasParams {
    /// Legacy gas pricing (pre-EIP-1559).
    Legacy {
        /// Gas price in wei.
        gas_price: u128,
    },
    /// EIP-1559 gas pricing.
    Eip1559 {
        /// Maximum fee per gas in wei.
        max_fee_per_gas: u128,
        /// Maximum priority fee per gas in wei.
        max_priority_fee_per_gas: u128,
        /// Current base fee (for reference).
        base_fee: u128,
    },
}

impl GasParams {
    /// Get the effective gas price for estimation purposes.
    pub fn effective_gas_price(&self) -> u128 {
        match self {
            GasParams::Legacy { gas_price } => *gas_price,
            GasParams::Eip1559 {
                max_fee_per_gas, ..
            } => *max_fee_per_gas,
        }
    }

    /// Scale the price fields by a speed multiplier (1.0 leaves them unchanged).
    pub fn scaled(&self, multiplier: f64) -> Self {
        let scale = |v: u128| ((v as f64) * multiplier) as u128;
        match self {
            GasParams::Legacy { gas_price } => GasParams::Legacy {
                gas_price: scale(*gas_price),
            },
            GasParams::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
                base_fee,
            } => GasParams::Eip1559 {
                max_fee_per_gas: scale(*max_fee_per_gas),
                max_priority_fee_per_gas: scale(*max_priority_fee_per_gas),
                base_fee: *base_fee,
            },
        }
    }
}

/// Trait for gas pricing strategies.
///
/// Implementations fetch gas prices from the chain and apply them to
/// transaction requests.
#[async_trait]
pub trait GasStrategy: Send + Sync + Debug {
    /// Fetch current gas parameters from the given RPC URL.
    async fn fetch_params(&self, rpc_url: &str) -> Result<GasParams>;

    /// Apply gas parameters to a transaction request.
    fn apply_gas(&self, tx: &mut TransactionRequest, params: &GasParams);

    /// Get the strategy name for logging/debugging.
    fn strategy_name(&self) -> &'static str;
}

/// Create a gas strategy from a pricing model name.
///
/// # Arguments
/// * `pricing_model` - "Legacy" or "Eip1559" (case-insensitive)
/// * `default_gas_price_gwei` - Default gas price in gwei (for Legacy)
/// * `max_gas_price_gwei` - Maximum gas price in gwei
/// * `priority_fee_gwei` - Priority fee in gwei (for EIP-1559)
pub fn create_gas_strategy(
    pricing_model: &str,
    default_gas_price_gwei: f64,
    max_gas_price_gwei: f64,
    priority_fee_gwei: Option<f64>,
) -> Box<dyn GasStrategy> {
    match pricing_model.to_lowercase().as_str() {
        "eip1559" | "eip-1559" => {
            let priority_fee = priority_fee_gwei.unwrap_or(0.01);
            Box::new(
                Eip1559GasStrategy::new((priority_fee * 1e9) as u128, 2.0)
                    .with_max_fee_cap((max_gas_price_gwei * 1e9) as u128),
            )
        }
        _ => Box::new(LegacyGasStrategy::new(
            (default_gas_price_gwei * 1e9) as u128,
            (max_gas_price_gwei * 1e9) as u128,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_params_effective_price() {
        let legacy = GasParams::Legacy {
            gas_price: 1_000_000_000,
        };
        assert_eq!(legacy.effective_gas_price(), 1_000_000_000);

        let eip1559 = GasParams::Eip1559 {
            max_fee_per_gas: 50_000_000_000,
            max_priority_fee_per_gas: 2_000_000_000,
            base_fee: 30_000_000_000,
        };
        assert_eq!(eip1559.effective_gas_price(), 50_000_000_000);
    }

    #[test]
    fn test_scaled_params() {
        let legacy = GasParams::Legacy { gas_price: 100 };
        assert_eq!(legacy.scaled(1.5), GasParams::Legacy { gas_price: 150 });
        assert_eq!(legacy.scaled(1.0), legacy);

        let eip1559 = GasParams::Eip1559 {
            max_fee_per_gas: 200,
            max_priority_fee_per_gas: 10,
            base_fee: 90,
        };
        assert_eq!(
            eip1559.scaled(2.0),
            GasParams::Eip1559 {
                max_fee_per_gas: 400,
                max_priority_fee_per_gas: 20,
                base_fee: 90,
            }
        );
    }

    #[test]
    fn test_create_gas_strategy() {
        let legacy = create_gas_strategy("Legacy", 1.0, 10.0, None);
        assert_eq!(legacy.strategy_name(), "Legacy");

        let eip1559 = create_gas_strategy("Eip1559", 0.1, 50.0, Some(0.01));
        assert_eq!(eip1559.strategy_name(), "EIP-1559");

        let unknown = create_gas_strategy("Unknown", 1.0, 10.0, None);
        assert_eq!(unknown.strategy_name(), "Legacy");
    }
}
