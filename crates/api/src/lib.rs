//! HTTP clients for the cross-chain swap vendors.
//!
//! - Chainflip: swap backend quotes/status and broker vault-swap encoding
//! - LiFi: advanced routes, step transactions and transfer status
//! - SwapKit: aggregated quotes with unsigned transactions

mod http;

pub mod chainflip;
pub mod lifi;
pub mod swapkit;

pub use chainflip::ChainflipClient;
pub use lifi::LifiClient;
pub use swapkit::SwapKitClient;
