//! End-to-end swap flows, one per vendor.

pub mod chainflip;
pub mod lifi;
pub mod swapkit;
pub mod swapkit_steps;

use crate::config::{EvmChain, GasSettings};
use crate::error::SwapError;
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use serde::Serialize;
use xswap_chain::{create_gas_strategy, SentTransaction, TransactionSender, TransactionSenderBuilder};

/// Sender on `chain` priced by the configured gas strategy.
pub(crate) async fn build_sender(
    signer: PrivateKeySigner,
    chain: &EvmChain,
    rpc_url: &str,
    gas: &GasSettings,
) -> Result<TransactionSender> {
    TransactionSenderBuilder::new(rpc_url, chain.id)
        .gas_strategy(create_gas_strategy(
            &gas.model,
            gas.default_gwei,
            gas.max_gwei,
            gas.priority_gwei,
        ))
        .build(signer)
        .await
}

pub(crate) fn require_receipt(sent: SentTransaction) -> Result<TransactionReceipt, SwapError> {
    sent.receipt.ok_or(SwapError::NullReceipt)
}

/// Pretty JSON for logs; falls back to `Debug` if serialization fails.
pub(crate) fn pretty<T: Serialize + std::fmt::Debug>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{:?}", value))
}
