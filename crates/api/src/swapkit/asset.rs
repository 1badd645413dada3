//! SwapKit asset identifiers: `CHAIN.SYMBOL` or `CHAIN.SYMBOL-0xCONTRACT`.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId {
    /// Chain code, e.g. `ARB`
    pub chain: String,
    pub symbol: String,
    /// Token contract; `None` for the gas asset
    pub contract: Option<Address>,
}

impl AssetId {
    pub fn is_gas_asset(&self) -> bool {
        self.contract.is_none()
    }
}

impl FromStr for AssetId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (chain, rest) = s
            .split_once('.')
            .with_context(|| format!("Invalid asset identifier: {}", s))?;
        if chain.is_empty() || rest.is_empty() {
            anyhow::bail!("Invalid asset identifier: {}", s);
        }

        let (symbol, contract) = match rest.split_once('-') {
            Some((symbol, contract)) => {
                let address = Address::from_str(contract)
                    .with_context(|| format!("Invalid contract in asset {}", s))?;
                (symbol, Some(address))
            }
            None => (rest, None),
        };

        Ok(Self {
            chain: chain.to_uppercase(),
            symbol: symbol.to_string(),
            contract,
        })
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.contract {
            Some(contract) => write!(
                f,
                "{}.{}-{}",
                self.chain,
                self.symbol,
                contract.to_string().to_lowercase()
            ),
            None => write!(f, "{}.{}", self.chain, self.symbol),
        }
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
