//! EVM chain interaction layer for the swap flows.
//!
//! This crate provides:
//! - Read-only providers (native balances, chain id, health)
//! - Transaction signing and sending from a private key or seed phrase
//! - ERC-20 reads, allowance checks and approvals
//! - Gas strategy abstraction (Legacy + EIP-1559) with speed multipliers

pub mod erc20;
pub mod gas;
mod provider;
mod signer;

pub use erc20::{approve_tx, is_native_token, AllowanceOutcome, Erc20Client, NATIVE_TOKEN_PLACEHOLDER};
pub use gas::{create_gas_strategy, Eip1559GasStrategy, GasParams, GasStrategy, LegacyGasStrategy};
pub use provider::ChainProvider;
pub use signer::{
    signer_from_mnemonic, signer_from_private_key, SentTransaction, TransactionSender,
    TransactionSenderBuilder, TxDescriptor,
};
