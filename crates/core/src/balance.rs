//! Base-unit <-> human amount conversion and balance reporting.

use crate::error::SwapError;
use alloy::primitives::{Address, U256};
use anyhow::Result;
use serde::Serialize;
use xswap_chain::ChainProvider;

fn pow10(decimals: u8) -> U256 {
    U256::from(10).pow(U256::from(decimals))
}

/// Render a base-unit amount with `decimals` fractional digits, trailing zeros trimmed.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let unit = pow10(decimals);
    let whole = value / unit;
    let frac = value % unit;

    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Parse a human amount ("0.01") into base units.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, SwapError> {
    let invalid = || SwapError::InvalidAmount(amount.to_string());
    let trimmed = amount.trim();

    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > decimals as usize {
        return Err(invalid());
    }

    let digits = format!("{}{:0<width$}", whole, frac, width = decimals as usize);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| invalid())
}

/// Native balances on the two chains of a cross-chain swap, in wei.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub eth_balance: String,
    pub arb_balance: String,
}

impl BalanceReport {
    pub fn new(eth: U256, arb: U256) -> Self {
        Self {
            eth_balance: eth.to_string(),
            arb_balance: arb.to_string(),
        }
    }
}

/// Query `wallet`'s native balance on both providers.
pub async fn get_balances(
    wallet: Address,
    eth: &ChainProvider,
    arb: &ChainProvider,
) -> Result<BalanceReport> {
    let eth_balance = eth.balance(wallet).await?;
    let arb_balance = arb.balance(wallet).await?;
    Ok(BalanceReport::new(eth_balance, arb_balance))
}
