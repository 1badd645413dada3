//! Static registry of the EVM chains the flows can sign on.

/// One EVM network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmChain {
    pub id: u64,
    pub name: &'static str,
    /// SwapKit chain code (`ARB` in `ARB.USDC-0x…`); `None` when SwapKit does not route it
    pub swapkit_code: Option<&'static str>,
    pub native_symbol: &'static str,
    pub default_rpc: &'static str,
    /// Block explorer base URL, without trailing slash
    pub explorer: &'static str,
}

impl EvmChain {
    /// `{explorer}/tx/{hash}`
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer, tx_hash)
    }
}

pub const ETHEREUM: EvmChain = EvmChain {
    id: 1,
    name: "ethereum",
    swapkit_code: Some("ETH"),
    native_symbol: "ETH",
    default_rpc: "https://eth.llamarpc.com",
    explorer: "https://etherscan.io",
};

pub const ARBITRUM: EvmChain = EvmChain {
    id: 42161,
    name: "arbitrum",
    swapkit_code: Some("ARB"),
    native_symbol: "ETH",
    default_rpc: "https://arb1.arbitrum.io/rpc",
    explorer: "https://arbiscan.io",
};

pub const OPTIMISM: EvmChain = EvmChain {
    id: 10,
    name: "optimism",
    swapkit_code: Some("OP"),
    native_symbol: "ETH",
    default_rpc: "https://mainnet.optimism.io",
    explorer: "https://optimistic.etherscan.io",
};

pub const POLYGON: EvmChain = EvmChain {
    id: 137,
    name: "polygon",
    swapkit_code: Some("POL"),
    native_symbol: "POL",
    default_rpc: "https://polygon-rpc.com",
    explorer: "https://polygonscan.com",
};

pub const SCROLL: EvmChain = EvmChain {
    id: 534352,
    name: "scroll",
    swapkit_code: None,
    native_symbol: "ETH",
    default_rpc: "https://rpc.scroll.io",
    explorer: "https://scrollscan.com",
};

pub const BASE: EvmChain = EvmChain {
    id: 8453,
    name: "base",
    swapkit_code: Some("BASE"),
    native_symbol: "ETH",
    default_rpc: "https://mainnet.base.org",
    explorer: "https://basescan.org",
};

pub const SEPOLIA: EvmChain = EvmChain {
    id: 11155111,
    name: "sepolia",
    swapkit_code: None,
    native_symbol: "ETH",
    default_rpc: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer: "https://sepolia.etherscan.io",
};

pub const ARBITRUM_SEPOLIA: EvmChain = EvmChain {
    id: 421614,
    name: "arbitrum-sepolia",
    swapkit_code: None,
    native_symbol: "ETH",
    default_rpc: "https://sepolia-rollup.arbitrum.io/rpc",
    explorer: "https://sepolia.arbiscan.io",
};

pub static CHAINS: &[EvmChain] = &[
    ETHEREUM,
    ARBITRUM,
    OPTIMISM,
    POLYGON,
    SCROLL,
    BASE,
    SEPOLIA,
    ARBITRUM_SEPOLIA,
];

pub fn chain_by_id(id: u64) -> Option<&'static EvmChain> {
    CHAINS.iter().find(|c| c.id == id)
}

/// Case-insensitive lookup by registry name.
pub fn chain_by_name(name: &str) -> Option<&'static EvmChain> {
    CHAINS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

pub fn chain_by_swapkit_code(code: &str) -> Option<&'static EvmChain> {
    CHAINS
        .iter()
        .find(|c| c.swapkit_code.is_some_and(|s| s.eq_ignore_ascii_case(code)))
}
