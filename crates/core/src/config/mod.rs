//! Configuration: environment access, TOML settings and the chain registry.

pub mod chains;
mod env;
mod settings;

pub use chains::{chain_by_id, chain_by_name, chain_by_swapkit_code, EvmChain, CHAINS};
pub use env::{expand_env, optional_env, require_any_env, require_env};
pub use settings::{
    init_settings, settings, ChainflipSettings, GasSettings, LifiSettings, StatusPollSettings,
    SwapKitSettings, SwapSettings,
};
