//! Cross-chain swap flows.
//!
//! This crate ties the vendor clients (`xswap-api`) to on-chain execution
//! (`xswap-chain`):
//! - Settings, environment checks and the EVM chain registry
//! - Chainflip vault swaps, LiFi route execution, SwapKit keystore swaps
//! - An interactive, step-driven SwapKit session
//! - Approval policy, unit conversion and status mapping shared by the flows

pub mod approval;
pub mod balance;
pub mod config;
mod error;
pub mod flows;
mod status;

pub use approval::{needs_approval, resolve_approval_address, NO_APPROVAL_PROVIDERS};
pub use balance::{format_units, get_balances, parse_units, BalanceReport};
pub use config::{init_settings, require_env, settings, SwapSettings};
pub use error::SwapError;
pub use flows::swapkit::FeeOption;
pub use status::SwapStatusKind;
