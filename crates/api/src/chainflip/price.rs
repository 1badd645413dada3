//! Minimum-price encoding for fill-or-kill refund parameters.
//!
//! The broker expects the minimum accepted price as destination base units
//! per source base unit, in 128-bit fixed point, hex encoded.

use alloy::primitives::U256;
use anyhow::Result;

/// Fractional digits kept from the quoted price.
const MAX_PRICE_SCALE: usize = 24;

/// Split a decimal string into `(mantissa, scale)` so that value = mantissa / 10^scale.
fn parse_decimal(value: &str) -> Result<(U256, usize)> {
    let value = value.trim();
    let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
    let frac = &frac[..frac.len().min(MAX_PRICE_SCALE)];

    if whole.is_empty() && frac.is_empty() {
        anyhow::bail!("Empty price");
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        anyhow::bail!("Invalid price: {}", value);
    }

    let digits = format!("{}{}", whole, frac);
    let mantissa = U256::from_str_radix(&digits, 10)?;
    Ok((mantissa, frac.len()))
}

/// `floor(num * 2^128 / den)` without overflowing 256 bits.
fn div_x128(num: U256, den: U256) -> Result<U256> {
    let quotient = num / den;
    if quotient.bit_len() > 128 {
        anyhow::bail!("Price does not fit in 128.128 fixed point");
    }
    let remainder = num % den;

    let hi_num = remainder << 64;
    let hi = hi_num / den;
    let lo = ((hi_num % den) << 64) / den;

    Ok((quotient << 128) | (hi << 64) | lo)
}

/// Minimum acceptable price after slippage, as a 128.128 fixed-point value.
///
/// `estimated_price` is in human units (destination per source).
pub fn min_price_x128(
    estimated_price: &str,
    slippage_tolerance_percent: f64,
    src_decimals: u8,
    dest_decimals: u8,
) -> Result<U256> {
    if !(0.0..=100.0).contains(&slippage_tolerance_percent) {
        anyhow::bail!("Slippage out of range: {}%", slippage_tolerance_percent);
    }
    let (mantissa, scale) = parse_decimal(estimated_price)?;
    let keep_bps = U256::from(10_000 - (slippage_tolerance_percent * 100.0).round() as u64);

    let ten = U256::from(10);
    let num = mantissa * keep_bps * ten.pow(U256::from(dest_decimals));
    let den = ten.pow(U256::from(scale)) * U256::from(10_000) * ten.pow(U256::from(src_decimals));

    div_x128(num, den)
}

/// `0x`-prefixed lowercase hex, the quantity format the broker RPC uses.
pub fn to_hex_quantity(value: U256) -> String {
    format!("{:#x}", value)
}
