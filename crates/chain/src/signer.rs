//! Transaction signing and submission for swap flows.
//! Uses Alloy providers for type-safe RPC interactions.
//!
//! Signers come from a raw private key or from a BIP-39 seed phrase
//! (first EVM account, `m/44'/60'/0'/0/0`). Gas pricing is delegated to a
//! [`GasStrategy`], optionally scaled by a speed multiplier.

use crate::gas::{GasParams, GasStrategy, LegacyGasStrategy};
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Parse a hex private key (with or without `0x` prefix).
pub fn signer_from_private_key(private_key: &str) -> Result<PrivateKeySigner> {
    let key_str = private_key.trim().trim_start_matches("0x");
    key_str
        .parse::<PrivateKeySigner>()
        .context("Invalid private key")
}

/// Derive the EVM account at `index` from a BIP-39 seed phrase.
pub fn signer_from_mnemonic(phrase: &str, index: u32) -> Result<PrivateKeySigner> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase.trim())
        .index(index)?
        .build()
        .context("Invalid seed phrase")
}

/// A transaction to submit: target, calldata and native value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxDescriptor {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    /// Gas limit supplied by the quote, if any (estimated otherwise)
    pub gas_limit: Option<u64>,
}

impl TxDescriptor {
    pub fn new(to: Address, data: Bytes, value: U256) -> Self {
        Self {
            to,
            data,
            value,
            gas_limit: None,
        }
    }

    pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
        self.gas_limit = gas_limit;
        self
    }
}

/// Outcome of a submitted transaction.
#[derive(Debug, Clone)]
pub struct SentTransaction {
    pub hash: B256,
    /// Receipt, if the node returned one after inclusion
    pub receipt: Option<TransactionReceipt>,
}

/// Builder for [`TransactionSender`].
pub struct TransactionSenderBuilder {
    rpc_url: String,
    chain_id: u64,
    gas_strategy: Option<Arc<dyn GasStrategy>>,
    fee_multiplier: f64,
}

impl TransactionSenderBuilder {
    /// Create a new builder.
    pub fn new(rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            gas_strategy: None,
            fee_multiplier: 1.0,
        }
    }

    /// Set the gas strategy.
    pub fn gas_strategy(mut self, strategy: Box<dyn GasStrategy>) -> Self {
        self.gas_strategy = Some(Arc::from(strategy));
        self
    }

    /// Scale fetched gas prices (e.g. 1.5 for a "fast" preset).
    pub fn fee_multiplier(mut self, multiplier: f64) -> Self {
        self.fee_multiplier = multiplier;
        self
    }

    /// Build the sender. Initial gas parameters are fetched best-effort.
    pub async fn build(self, signer: PrivateKeySigner) -> Result<TransactionSender> {
        let address = signer.address();
        let wallet = EthereumWallet::from(signer.clone());

        let gas_strategy = self.gas_strategy.unwrap_or_else(|| {
            Arc::new(LegacyGasStrategy::new(
                1_000_000_000,   // 1 gwei default
                100_000_000_000, // 100 gwei max
            ))
        });

        let initial_gas_params = gas_strategy.fetch_params(&self.rpc_url).await.ok();

        info!(
            address = %address,
            chain_id = self.chain_id,
            gas_strategy = gas_strategy.strategy_name(),
            fee_multiplier = self.fee_multiplier,
            "Transaction sender initialized"
        );

        Ok(TransactionSender {
            rpc_url: self.rpc_url,
            signer,
            wallet,
            address,
            chain_id: self.chain_id,
            gas_strategy,
            fee_multiplier: self.fee_multiplier,
            cached_gas_params: Arc::new(parking_lot::RwLock::new(initial_gas_params)),
        })
    }
}

/// Signs and sends transactions on one chain.
#[derive(Clone)]
pub struct TransactionSender {
    rpc_url: String,
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    /// Signer address
    pub address: Address,
    chain_id: u64,
    gas_strategy: Arc<dyn GasStrategy>,
    fee_multiplier: f64,
    /// Last successfully fetched gas parameters (unscaled)
    cached_gas_params: Arc<parking_lot::RwLock<Option<GasParams>>>,
}

impl TransactionSender {
    /// Sender with Legacy gas pricing.
    pub async fn new(signer: PrivateKeySigner, rpc_url: &str, chain_id: u64) -> Result<Self> {
        TransactionSenderBuilder::new(rpc_url, chain_id)
            .build(signer)
            .await
    }

    /// Same signer and gas settings, bound to another chain.
    pub fn switch_chain(&self, rpc_url: impl Into<String>, chain_id: u64) -> Self {
        let rpc_url = rpc_url.into();
        debug!(from = self.chain_id, to = chain_id, "Switching sender chain");
        Self {
            rpc_url,
            signer: self.signer.clone(),
            wallet: self.wallet.clone(),
            address: self.address,
            chain_id,
            gas_strategy: Arc::clone(&self.gas_strategy),
            fee_multiplier: self.fee_multiplier,
            cached_gas_params: Arc::new(parking_lot::RwLock::new(None)),
        }
    }

    /// Same sender with gas prices scaled by `multiplier`.
    pub fn with_fee_multiplier(&self, multiplier: f64) -> Self {
        Self {
            fee_multiplier: multiplier,
            ..self.clone()
        }
    }

    /// Chain the sender is bound to.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// RPC endpoint the sender broadcasts to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Current gas strategy name.
    pub fn gas_strategy_name(&self) -> &'static str {
        self.gas_strategy.strategy_name()
    }

    /// Fetch fresh gas parameters, falling back to the last good ones.
    async fn gas_params(&self) -> Result<GasParams> {
        match self.gas_strategy.fetch_params(&self.rpc_url).await {
            Ok(params) => {
                *self.cached_gas_params.write() = Some(params.clone());
                Ok(params)
            }
            Err(e) => {
                let cached = self.cached_gas_params.read().clone();
                match cached {
                    Some(params) => {
                        warn!(error = %e, "Gas fetch failed, using cached params");
                        Ok(params)
                    }
                    None => Err(e.context("No gas parameters available")),
                }
            }
        }
    }

    /// Sign, send and wait for inclusion.
    ///
    /// Returns the hash and the receipt (if the node has one). A reverted
    /// transaction is an error.
    pub async fn send_transaction(&self, tx: &TxDescriptor) -> Result<SentTransaction> {
        let total_start = Instant::now();

        let gas_params = self.gas_params().await?.scaled(self.fee_multiplier);

        let mut request = TransactionRequest::default()
            .with_from(self.address)
            .with_to(tx.to)
            .with_input(tx.data.clone())
            .with_value(tx.value)
            .with_chain_id(self.chain_id);
        if let Some(gas_limit) = tx.gas_limit {
            request.set_gas_limit(gas_limit);
        }
        self.gas_strategy.apply_gas(&mut request, &gas_params);

        info!(
            to = %tx.to,
            value = %tx.value,
            calldata_len = tx.data.len(),
            chain_id = self.chain_id,
            gas_price_gwei = gas_params.effective_gas_price() as f64 / 1e9,
            "Sending transaction"
        );

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .on_http(self.rpc_url.parse()?);

        let pending = provider
            .send_transaction(request)
            .await
            .context("Failed to submit transaction")?;
        let tx_hash = *pending.tx_hash();
        info!(tx_hash = %tx_hash, "Transaction submitted, waiting for confirmation");

        pending.watch().await?;
        let receipt = provider.get_transaction_receipt(tx_hash).await?;

        match &receipt {
            Some(r) if !r.status() => {
                warn!(tx_hash = %tx_hash, "Transaction reverted");
                anyhow::bail!("Transaction reverted: {}", tx_hash)
            }
            Some(r) => info!(
                tx_hash = %tx_hash,
                block = r.block_number.unwrap_or(0),
                gas_used = r.gas_used,
                total_ms = total_start.elapsed().as_millis(),
                "Transaction confirmed"
            ),
            None => warn!(tx_hash = %tx_hash, "Node returned no receipt"),
        }

        Ok(SentTransaction {
            hash: tx_hash,
            receipt,
        })
    }

    /// Native balance of the signer.
    pub async fn get_balance(&self) -> Result<U256> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        Ok(provider.get_balance(self.address).await?)
    }
}

impl std::fmt::Debug for TransactionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSender")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("gas_strategy", &self.gas_strategy.strategy_name())
            .field("fee_multiplier", &self.fee_multiplier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key and mnemonic (DO NOT USE IN PRODUCTION)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";
    const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn test_signer_from_private_key() {
        let with_prefix = signer_from_private_key(DEV_KEY).unwrap();
        let without_prefix = signer_from_private_key(DEV_KEY.trim_start_matches("0x")).unwrap();

        assert_eq!(with_prefix.address(), without_prefix.address());
        assert_eq!(format!("{:?}", with_prefix.address()).to_lowercase(), DEV_ADDRESS);
    }

    #[test]
    fn test_signer_from_invalid_key() {
        assert!(signer_from_private_key("0x1234").is_err());
    }

    #[test]
    fn test_signer_from_mnemonic() {
        let signer = signer_from_mnemonic(DEV_MNEMONIC, 0).unwrap();
        assert_eq!(format!("{:?}", signer.address()).to_lowercase(), DEV_ADDRESS);

        let second = signer_from_mnemonic(DEV_MNEMONIC, 1).unwrap();
        assert_ne!(second.address(), signer.address());
    }

    #[test]
    fn test_signer_from_invalid_mnemonic() {
        assert!(signer_from_mnemonic("not a real seed phrase", 0).is_err());
    }

    #[test]
    fn test_tx_descriptor_builder() {
        let tx = TxDescriptor::new(Address::ZERO, Bytes::from(vec![0xab]), U256::from(5))
            .with_gas_limit(Some(21_000));
        assert_eq!(tx.gas_limit, Some(21_000));
        assert_eq!(tx.value, U256::from(5));
    }

    #[tokio::test]
    async fn test_switch_chain_keeps_signer() {
        let signer = signer_from_private_key(DEV_KEY).unwrap();
        // Unreachable endpoint: initial gas fetch fails silently
        let sender = TransactionSender::new(signer, "http://127.0.0.1:1", 1).await.unwrap();
        let switched = sender.switch_chain("http://127.0.0.1:2", 42161);

        assert_eq!(switched.address, sender.address);
        assert_eq!(switched.chain_id(), 42161);
        assert_eq!(switched.rpc_url(), "http://127.0.0.1:2");
        assert_eq!(switched.gas_strategy_name(), "Legacy");
    }
}
