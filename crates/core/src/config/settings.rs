//! Swap flow settings.
//!
//! Every value defaults to what the demo flows hard-code, so an empty (or
//! absent) TOML file reproduces them. Point `SWAP_CONFIG` at a file to
//! override any section.

use super::chains::EvmChain;
use super::env::{expand_env, optional_env, require_env};
use crate::error::SwapError;
use crate::flows::swapkit::FeeOption;
use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;
use xswap_api::chainflip::{Affiliate, Network};
use xswap_api::lifi::RouteOrder;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapSettings {
    #[serde(default = "default_profile_name")]
    pub profile: String,

    #[serde(default)]
    pub chainflip: ChainflipSettings,

    #[serde(default)]
    pub lifi: LifiSettings,

    #[serde(default)]
    pub swapkit: SwapKitSettings,

    #[serde(default)]
    pub status: StatusPollSettings,

    #[serde(default)]
    pub gas: GasSettings,

    /// RPC URL overrides keyed by chain name (`arbitrum = "https://…"`); `${VAR}` is expanded
    #[serde(default)]
    pub rpc: HashMap<String, String>,
}

fn default_profile_name() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainflipSettings {
    #[serde(default = "default_cf_network")]
    pub network: Network,

    #[serde(default = "default_true")]
    pub dca_enabled: bool,

    /// Ethereum-side RPC override; defaults to the Alchemy endpoint for `network`
    #[serde(default)]
    pub eth_rpc_url: Option<String>,

    /// Arbitrum-side RPC override; defaults to the Alchemy endpoint for `network`
    #[serde(default)]
    pub arb_rpc_url: Option<String>,

    /// Swap amount in wei
    #[serde(default = "default_cf_amount")]
    pub amount: String,

    #[serde(default = "default_retry_blocks")]
    pub retry_duration_blocks: u32,

    #[serde(default)]
    pub broker_commission_bps: u16,

    #[serde(default)]
    pub affiliates: Vec<Affiliate>,

    /// Previously submitted swap to report on after the run
    #[serde(default)]
    pub status_id: Option<String>,
}

fn default_cf_network() -> Network {
    Network::Perseverance
}
fn default_true() -> bool {
    true
}
fn default_cf_amount() -> String {
    "40000000000000000".to_string()
}
fn default_retry_blocks() -> u32 {
    100
}

impl Default for ChainflipSettings {
    fn default() -> Self {
        Self {
            network: default_cf_network(),
            dca_enabled: true,
            eth_rpc_url: None,
            arb_rpc_url: None,
            amount: default_cf_amount(),
            retry_duration_blocks: default_retry_blocks(),
            broker_commission_bps: 0,
            affiliates: Vec::new(),
            status_id: None,
        }
    }
}

const ALCHEMY_TOKEN_REF: &str = "${ALCHEMY_TOKEN}";

impl ChainflipSettings {
    /// Unexpanded Ethereum-side RPC URL.
    pub fn eth_rpc_template(&self) -> &str {
        self.eth_rpc_url.as_deref().unwrap_or(match self.network {
            Network::Perseverance => "https://eth-sepolia.g.alchemy.com/v2/${ALCHEMY_TOKEN}",
            Network::Mainnet => "https://eth-mainnet.g.alchemy.com/v2/${ALCHEMY_TOKEN}",
        })
    }

    /// Unexpanded Arbitrum-side RPC URL.
    pub fn arb_rpc_template(&self) -> &str {
        self.arb_rpc_url.as_deref().unwrap_or(match self.network {
            Network::Perseverance => "https://arb-sepolia.g.alchemy.com/v2/${ALCHEMY_TOKEN}",
            Network::Mainnet => "https://arb-mainnet.g.alchemy.com/v2/${ALCHEMY_TOKEN}",
        })
    }

    /// Expanded `(ethereum, arbitrum)` RPC URLs.
    ///
    /// `ALCHEMY_TOKEN` must be set only while a URL still references it.
    pub fn rpc_urls(&self) -> Result<(String, String), SwapError> {
        let (eth, arb) = (self.eth_rpc_template(), self.arb_rpc_template());
        if eth.contains(ALCHEMY_TOKEN_REF) || arb.contains(ALCHEMY_TOKEN_REF) {
            require_env("ALCHEMY_TOKEN")?;
        }
        Ok((expand_env(eth), expand_env(arb)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifiSettings {
    #[serde(default = "default_lifi_api")]
    pub api_url: String,

    #[serde(default = "default_integrator")]
    pub integrator: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Chain the wallet starts on before any step switches it
    #[serde(default = "default_lifi_client_chain")]
    pub default_chain_id: u64,

    #[serde(default = "default_arbitrum_id")]
    pub from_chain_id: u64,

    #[serde(default = "default_arbitrum_id")]
    pub to_chain_id: u64,

    #[serde(default = "default_lifi_from_token")]
    pub from_token: Address,

    #[serde(default = "default_lifi_to_token")]
    pub to_token: Address,

    /// Smallest unit of the source token
    #[serde(default = "default_lifi_amount")]
    pub from_amount: String,

    /// Fraction (0.03 = 3%)
    #[serde(default = "default_lifi_slippage")]
    pub slippage: f64,

    #[serde(default)]
    pub order: RouteOrder,
}

fn default_lifi_api() -> String {
    xswap_api::lifi::DEFAULT_API_URL.to_string()
}
fn default_integrator() -> String {
    "Lifi_test".to_string()
}
fn default_lifi_client_chain() -> u64 {
    1
}
fn default_arbitrum_id() -> u64 {
    42161
}
fn default_lifi_from_token() -> Address {
    address!("af88d065e77c8cC2239327C5EDb3A432268e5831")
}
fn default_lifi_to_token() -> Address {
    address!("Fd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9")
}
fn default_lifi_amount() -> String {
    "10000".to_string()
}
fn default_lifi_slippage() -> f64 {
    0.03
}

impl Default for LifiSettings {
    fn default() -> Self {
        Self {
            api_url: default_lifi_api(),
            integrator: default_integrator(),
            api_key: None,
            default_chain_id: default_lifi_client_chain(),
            from_chain_id: default_arbitrum_id(),
            to_chain_id: default_arbitrum_id(),
            from_token: default_lifi_from_token(),
            to_token: default_lifi_to_token(),
            from_amount: default_lifi_amount(),
            slippage: default_lifi_slippage(),
            order: RouteOrder::Recommended,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapKitSettings {
    #[serde(default = "default_swapkit_api")]
    pub api_url: String,

    /// Chain the keystore connects on
    #[serde(default = "default_arbitrum_id")]
    pub chain_id: u64,

    #[serde(default = "default_sell_asset")]
    pub sell_asset: String,

    #[serde(default = "default_buy_asset")]
    pub buy_asset: String,

    /// Human units
    #[serde(default = "default_sell_amount")]
    pub sell_amount: String,

    /// Percent
    #[serde(default = "default_swapkit_slippage")]
    pub slippage: f64,

    #[serde(default)]
    pub fee_option: FeeOption,

    /// BIP-44 address index under m/44'/60'/0'/0
    #[serde(default)]
    pub derivation_index: u32,
}

fn default_swapkit_api() -> String {
    xswap_api::swapkit::DEFAULT_API_URL.to_string()
}
fn default_sell_asset() -> String {
    "ARB.USDC-0xaf88d065e77c8cc2239327c5edb3a432268e5831".to_string()
}
fn default_buy_asset() -> String {
    "ARB.USDT-0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9".to_string()
}
fn default_sell_amount() -> String {
    "0.01".to_string()
}
fn default_swapkit_slippage() -> f64 {
    3.0
}

impl Default for SwapKitSettings {
    fn default() -> Self {
        Self {
            api_url: default_swapkit_api(),
            chain_id: default_arbitrum_id(),
            sell_asset: default_sell_asset(),
            buy_asset: default_buy_asset(),
            sell_amount: default_sell_amount(),
            slippage: default_swapkit_slippage(),
            fee_option: FeeOption::Fast,
            derivation_index: 0,
        }
    }
}

/// Status polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPollSettings {
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,
}

fn default_poll_interval() -> u64 {
    5
}
fn default_poll_attempts() -> u32 {
    120
}

impl StatusPollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for StatusPollSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            max_attempts: default_poll_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasSettings {
    /// "legacy" or "eip1559"
    #[serde(default = "default_gas_model")]
    pub model: String,

    #[serde(default = "default_gas_gwei")]
    pub default_gwei: f64,

    #[serde(default = "default_max_gas_gwei")]
    pub max_gwei: f64,

    #[serde(default)]
    pub priority_gwei: Option<f64>,
}

fn default_gas_model() -> String {
    "legacy".to_string()
}
fn default_gas_gwei() -> f64 {
    1.0
}
fn default_max_gas_gwei() -> f64 {
    100.0
}

impl Default for GasSettings {
    fn default() -> Self {
        Self {
            model: default_gas_model(),
            default_gwei: default_gas_gwei(),
            max_gwei: default_max_gas_gwei(),
            priority_gwei: None,
        }
    }
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            chainflip: ChainflipSettings::default(),
            lifi: LifiSettings::default(),
            swapkit: SwapKitSettings::default(),
            status: StatusPollSettings::default(),
            gas: GasSettings::default(),
            rpc: HashMap::new(),
        }
    }
}

impl SwapSettings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        Ok(settings)
    }

    /// `SWAP_CONFIG` file (or defaults) with env overrides applied.
    pub fn load() -> anyhow::Result<Self> {
        let mut settings = match optional_env("SWAP_CONFIG") {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(network) = optional_env("SWAP_NETWORK") {
            settings.chainflip.network = network.parse()?;
        }
        if let Some(id) = optional_env("CHAINFLIP_STATUS_ID") {
            settings.chainflip.status_id = Some(id);
        }
        Ok(settings)
    }

    /// Like [`load`](Self::load), falling back to defaults on error.
    pub fn from_env() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load swap settings, using defaults");
            Self::default()
        })
    }

    /// RPC URL for `chain`: override if configured, else the registry default.
    pub fn rpc_url(&self, chain: &EvmChain) -> String {
        let raw = self
            .rpc
            .get(chain.name)
            .map(String::as_str)
            .unwrap_or(chain.default_rpc);
        expand_env(raw)
    }

    /// Log resolved settings at startup.
    pub fn log_settings(&self) {
        tracing::info!(profile = %self.profile, "Swap settings loaded");
        tracing::info!(
            network = ?self.chainflip.network,
            amount = %self.chainflip.amount,
            retry_blocks = self.chainflip.retry_duration_blocks,
            dca = self.chainflip.dca_enabled,
            "Chainflip"
        );
        tracing::info!(
            api = %self.lifi.api_url,
            integrator = %self.lifi.integrator,
            from_chain = self.lifi.from_chain_id,
            to_chain = self.lifi.to_chain_id,
            amount = %self.lifi.from_amount,
            slippage = self.lifi.slippage,
            "LiFi"
        );
        tracing::info!(
            api = %self.swapkit.api_url,
            sell = %self.swapkit.sell_asset,
            buy = %self.swapkit.buy_asset,
            amount = %self.swapkit.sell_amount,
            slippage = self.swapkit.slippage,
            "SwapKit"
        );
        tracing::info!(
            model = %self.gas.model,
            poll_secs = self.status.interval_secs,
            poll_attempts = self.status.max_attempts,
            "Execution"
        );
    }
}

static GLOBAL_SETTINGS: OnceLock<SwapSettings> = OnceLock::new();

/// Initialize global settings. Later calls are ignored.
pub fn init_settings(settings: SwapSettings) {
    let _ = GLOBAL_SETTINGS.set(settings);
}

/// Global settings, loaded from the environment on first use if not initialized.
pub fn settings() -> &'static SwapSettings {
    GLOBAL_SETTINGS.get_or_init(SwapSettings::from_env)
}
