//! Shared response handling for the vendor clients.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Decode a JSON body, turning non-2xx answers into `"<Vendor> API error: <status> - <body>"`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    vendor: &str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        anyhow::bail!("{} API error: {} - {}", vendor, status, body);
    }

    serde_json::from_str(&body).with_context(|| format!("Failed to parse {} response", vendor))
}

/// Parse an integer that may be `0x`-prefixed hex or plain decimal.
pub(crate) fn parse_quantity(value: &str) -> Option<u128> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some(hex_digits) => u128::from_str_radix(hex_digits, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Decode `0x`-prefixed (or bare) hex calldata.
pub(crate) fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).context("Invalid hex data")
}
