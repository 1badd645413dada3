//! Read-only chain access over HTTP JSON-RPC.
//! Uses Alloy providers for type-safe RPC interactions.

use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// HTTP provider handle for a single EVM chain.
///
/// Holds only the endpoint; an Alloy provider is built per call.
#[derive(Debug, Clone)]
pub struct ChainProvider {
    /// Human-readable chain name (for logs)
    name: String,
    /// HTTP RPC endpoint
    rpc_url: String,
}

impl ChainProvider {
    /// Create a provider handle. The URL is validated but not contacted.
    pub fn new(name: impl Into<String>, rpc_url: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let rpc_url = rpc_url.into();
        let _: Url = rpc_url
            .parse()
            .with_context(|| format!("Invalid RPC URL for {}", name))?;

        debug!(chain = %name, "Provider configured");
        Ok(Self { name, rpc_url })
    }

    /// Chain name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// HTTP RPC endpoint.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Native token balance in wei.
    pub async fn balance(&self, address: Address) -> Result<U256> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let balance = provider
            .get_balance(address)
            .await
            .with_context(|| format!("Failed to fetch {} balance", self.name))?;
        Ok(balance)
    }

    /// Current block number.
    pub async fn block_number(&self) -> Result<u64> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        Ok(provider.get_block_number().await?)
    }

    /// Chain ID reported by the node.
    pub async fn chain_id(&self) -> Result<u64> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        Ok(provider.get_chain_id().await?)
    }

    /// Check that the endpoint answers.
    pub async fn health_check(&self) -> Result<bool> {
        let block = self.block_number().await?;
        info!(chain = %self.name, block, "Provider connection verified");
        Ok(block > 0)
    }
}
