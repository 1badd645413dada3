//! ERC-20 reads and the allowance/approve dance that precedes router swaps.

use crate::signer::{SentTransaction, TransactionSender, TxDescriptor};
use alloy::primitives::{address, Address, Bytes, U256};
use alloy::providers::ProviderBuilder;
use alloy::sol;
use alloy::sol_types::SolCall;
use anyhow::{Context, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

sol! {
    /// Standard ERC20 interface (subset used by the swap flows)
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }
}

/// Placeholder many aggregators use for the chain's native token.
pub const NATIVE_TOKEN_PLACEHOLDER: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Whether `token` denotes the native asset rather than a contract.
pub fn is_native_token(token: Address) -> bool {
    token == Address::ZERO || token == NATIVE_TOKEN_PLACEHOLDER
}

/// Result of [`Erc20Client::ensure_allowance`].
#[derive(Debug, Clone)]
pub enum AllowanceOutcome {
    /// Existing allowance already covers the amount (or the token is native)
    AlreadyApproved,
    /// An approval transaction was sent
    Approved(SentTransaction),
}

/// ERC-20 read client for one chain with a decimals cache.
#[derive(Clone)]
pub struct Erc20Client {
    rpc_url: String,
    /// token -> decimals (immutable on-chain, safe to cache forever)
    decimals_cache: Arc<DashMap<Address, u8>>,
}

impl std::fmt::Debug for Erc20Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Erc20Client")
            .field("rpc_url", &self.rpc_url)
            .field("cached_tokens", &self.decimals_cache.len())
            .finish()
    }
}

impl Erc20Client {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            decimals_cache: Arc::new(DashMap::new()),
        }
    }

    /// Token decimals (native tokens are 18).
    pub async fn decimals(&self, token: Address) -> Result<u8> {
        if is_native_token(token) {
            return Ok(18);
        }
        if let Some(cached) = self.decimals_cache.get(&token) {
            return Ok(*cached);
        }

        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let decimals = IERC20::new(token, &provider)
            .decimals()
            .call()
            .await
            .with_context(|| format!("decimals() failed for {}", token))?
            ._0;

        self.decimals_cache.insert(token, decimals);
        Ok(decimals)
    }

    /// Amount `spender` may move on behalf of `owner`.
    pub async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        Ok(IERC20::new(token, &provider)
            .allowance(owner, spender)
            .call()
            .await
            .with_context(|| format!("allowance() failed for {}", token))?
            ._0)
    }

    /// Whether `owner` has approved at least `amount` to `spender`.
    pub async fn is_approved(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<bool> {
        if is_native_token(token) {
            return Ok(true);
        }
        let allowance = self.allowance(token, owner, spender).await?;
        debug!(token = %token, spender = %spender, allowance = %allowance, amount = %amount, "Allowance checked");
        Ok(allowance >= amount)
    }

    /// Approve `amount` when the current allowance is insufficient.
    pub async fn ensure_allowance(
        &self,
        sender: &TransactionSender,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<AllowanceOutcome> {
        if self.is_approved(token, sender.address, spender, amount).await? {
            return Ok(AllowanceOutcome::AlreadyApproved);
        }

        info!(token = %token, spender = %spender, amount = %amount, "Approving token allowance");
        let sent = sender
            .send_transaction(&approve_tx(token, spender, amount))
            .await
            .context("Approval transaction failed")?;
        Ok(AllowanceOutcome::Approved(sent))
    }
}

/// `approve(spender, amount)` call against `token`.
pub fn approve_tx(token: Address, spender: Address, amount: U256) -> TxDescriptor {
    let calldata = IERC20::approveCall { spender, amount }.abi_encode();
    TxDescriptor::new(token, Bytes::from(calldata), U256::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_token_detection() {
        assert!(is_native_token(Address::ZERO));
        assert!(is_native_token(NATIVE_TOKEN_PLACEHOLDER));
        assert!(!is_native_token(address!("af88d065e77c8cC2239327C5EDb3A432268e5831")));
    }

    #[test]
    fn test_approve_tx_encoding() {
        let token = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");
        let spender = Address::repeat_byte(0x11);
        let tx = approve_tx(token, spender, U256::from(10_000u64));

        assert_eq!(tx.to, token);
        assert_eq!(tx.value, U256::ZERO);
        // selector approve(address,uint256) = 0x095ea7b3
        assert_eq!(&tx.data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(tx.data.len(), 4 + 32 + 32);

        let decoded = IERC20::approveCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(decoded.spender, spender);
        assert_eq!(decoded.amount, U256::from(10_000u64));
    }

    #[tokio::test]
    async fn test_native_tokens_skip_rpc() {
        // Unreachable endpoint: these must not touch the network
        let client = Erc20Client::new("http://127.0.0.1:1");
        assert_eq!(client.decimals(Address::ZERO).await.unwrap(), 18);
        assert!(client
            .is_approved(NATIVE_TOKEN_PLACEHOLDER, Address::ZERO, Address::ZERO, U256::MAX)
            .await
            .unwrap());
    }
}
