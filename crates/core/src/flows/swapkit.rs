//! SwapKit swap from a seed-phrase keystore.

use super::build_sender;
use crate::approval::{needs_approval, resolve_approval_address};
use crate::balance::{format_units, parse_units};
use crate::config::{chain_by_id, chain_by_swapkit_code, require_env, EvmChain, SwapKitSettings, SwapSettings};
use crate::error::SwapError;
use alloy::primitives::{Address, B256, U256};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info};
use xswap_api::swapkit::{AssetId, QuoteRequest, QuoteRoute, SwapKitClient};
use xswap_chain::{
    signer_from_mnemonic, AllowanceOutcome, Erc20Client, TransactionSender, TxDescriptor,
    NATIVE_TOKEN_PLACEHOLDER,
};

/// Gas speed preset, applied as a multiplier on the network gas price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeOption {
    Average,
    #[default]
    Fast,
    Fastest,
}

impl FeeOption {
    pub fn multiplier(self) -> f64 {
        match self {
            FeeOption::Average => 1.0,
            FeeOption::Fast => 1.5,
            FeeOption::Fastest => 2.0,
        }
    }
}

static SWAPKIT_CLIENT: OnceLock<SwapKitClient> = OnceLock::new();

/// Shared client; the first call's key and URL win.
pub fn get_swapkit_client(api_key: &str, api_url: &str) -> Result<&'static SwapKitClient> {
    if let Some(client) = SWAPKIT_CLIENT.get() {
        return Ok(client);
    }
    let client = SwapKitClient::new(api_url, api_key)?;
    Ok(SWAPKIT_CLIENT.get_or_init(|| client))
}

/// Wallet derived from a seed phrase, bound to one EVM chain.
#[derive(Debug, Clone)]
pub struct KeystoreWallet {
    pub chain: &'static EvmChain,
    pub sender: TransactionSender,
    pub erc20: Erc20Client,
}

impl KeystoreWallet {
    pub async fn connect(seed_phrase: &str, chain: &'static EvmChain, settings: &SwapSettings) -> Result<Self> {
        let signer = signer_from_mnemonic(seed_phrase, settings.swapkit.derivation_index)?;
        let rpc_url = settings.rpc_url(chain);
        let sender = build_sender(signer, chain, &rpc_url, &settings.gas).await?;

        Ok(Self {
            chain,
            sender,
            erc20: Erc20Client::new(rpc_url),
        })
    }

    pub fn address(&self) -> Address {
        self.sender.address
    }

    pub async fn native_balance(&self) -> Result<U256> {
        self.sender.get_balance().await
    }

    pub fn explorer_tx_url(&self, tx_hash: &B256) -> String {
        self.chain.explorer_tx_url(&tx_hash.to_string())
    }
}

/// An asset amount resolved to base units on its chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetValue {
    pub asset: AssetId,
    pub chain: &'static EvmChain,
    pub decimals: u8,
    pub base_amount: U256,
}

impl AssetValue {
    /// Contract address, or the native placeholder for gas assets.
    pub fn token(&self) -> Address {
        self.asset.contract.unwrap_or(NATIVE_TOKEN_PLACEHOLDER)
    }
}

impl fmt::Display for AssetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_units(self.base_amount, self.decimals), self.asset)
    }
}

/// Resolve the route's sell side into an [`AssetValue`].
pub async fn build_sell_value(route: &QuoteRoute, erc20: &Erc20Client) -> Result<AssetValue> {
    let asset = route.sell_asset.clone();
    let chain = chain_by_swapkit_code(&asset.chain)
        .ok_or_else(|| SwapError::UnsupportedChain(asset.chain.clone()))?;
    let decimals = match asset.contract {
        Some(contract) => erc20.decimals(contract).await?,
        None => 18,
    };
    let base_amount = parse_units(&route.sell_amount, decimals)?;

    Ok(AssetValue {
        asset,
        chain,
        decimals,
        base_amount,
    })
}

pub fn quote_request(settings: &SwapKitSettings, address: Address) -> Result<QuoteRequest> {
    Ok(QuoteRequest {
        sell_asset: settings.sell_asset.parse()?,
        sell_amount: settings.sell_amount.clone(),
        buy_asset: settings.buy_asset.parse()?,
        source_address: address.to_string(),
        destination_address: address.to_string(),
        slippage: settings.slippage,
        include_tx: true,
        providers: Vec::new(),
    })
}

/// Best route for the configured pair.
pub async fn request_quote(
    client: &SwapKitClient,
    settings: &SwapKitSettings,
    address: Address,
) -> Result<QuoteRoute> {
    let quote = client.get_swap_quote(&quote_request(settings, address)?).await?;
    debug!(routes = ?quote.routes, "Routes");
    Ok(quote.routes.into_iter().next().ok_or(SwapError::NoRoute)?)
}

pub fn log_quote(route: &QuoteRoute) {
    info!("Quote Received");
    info!(provider = ?route.primary_provider(), "Expected Output: {}", route.expected_buy_amount);
    info!("Fees: {:?}", route.fees);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalResult {
    /// Provider takes deposits without an allowance
    NotNeeded,
    AlreadyApproved,
    Approved { tx_hash: B256, explorer_url: String },
}

/// Approve the route's spender for the sell amount unless it already can spend it.
pub async fn approve_if_needed(
    wallet: &KeystoreWallet,
    route: &QuoteRoute,
    sell_value: &AssetValue,
) -> Result<ApprovalResult> {
    if !needs_approval(route.primary_provider()) {
        return Ok(ApprovalResult::NotNeeded);
    }
    let spender = resolve_approval_address(route)?;

    let outcome = wallet
        .erc20
        .ensure_allowance(&wallet.sender, sell_value.token(), spender, sell_value.base_amount)
        .await?;

    Ok(match outcome {
        AllowanceOutcome::AlreadyApproved => ApprovalResult::AlreadyApproved,
        AllowanceOutcome::Approved(sent) => ApprovalResult::Approved {
            tx_hash: sent.hash,
            explorer_url: sell_value.chain.explorer_tx_url(&sent.hash.to_string()),
        },
    })
}

/// Sign and send the route's transaction with the fee preset applied.
pub async fn perform_swap(wallet: &KeystoreWallet, route: &QuoteRoute, fee_option: FeeOption) -> Result<B256> {
    let sell_chain = chain_by_swapkit_code(&route.sell_asset.chain)
        .ok_or_else(|| SwapError::UnsupportedChain(route.sell_asset.chain.clone()))?;
    if sell_chain.id != wallet.chain.id {
        return Err(SwapError::UnsupportedChain(format!(
            "{} (wallet is on {})",
            sell_chain.name, wallet.chain.name
        ))
        .into());
    }

    let tx = route.evm_tx()?;
    let descriptor =
        TxDescriptor::new(tx.target()?, tx.calldata()?, tx.value()?).with_gas_limit(tx.gas_limit());
    debug!(fee_option = ?fee_option, quoted_gas_price = ?tx.gas_price(), "Sending swap");

    let sent = wallet
        .sender
        .with_fee_multiplier(fee_option.multiplier())
        .send_transaction(&descriptor)
        .await?;
    Ok(sent.hash)
}

pub async fn run(settings: &SwapSettings) -> Result<()> {
    let sk = &settings.swapkit;
    let api_key = require_env("SWAPKIT_API")?;
    let seed_phrase = require_env("SEED_PHRASE")?;

    let client = get_swapkit_client(&api_key, &sk.api_url)?;

    let chain = chain_by_id(sk.chain_id).ok_or_else(|| SwapError::UnsupportedChain(sk.chain_id.to_string()))?;
    let wallet = KeystoreWallet::connect(&seed_phrase, chain, settings).await?;
    let balance = wallet.native_balance().await?;
    info!(
        balance = %format_units(balance, 18),
        symbol = chain.native_symbol,
        "Connected Address: {}",
        wallet.address()
    );

    let route = request_quote(client, sk, wallet.address()).await?;
    let sell_value = build_sell_value(&route, &wallet.erc20).await?;
    log_quote(&route);

    match approve_if_needed(&wallet, &route, &sell_value).await? {
        ApprovalResult::Approved { explorer_url, .. } => info!("Approval TX: {}", explorer_url),
        ApprovalResult::AlreadyApproved => info!("Already Approved"),
        ApprovalResult::NotNeeded => debug!(provider = ?route.primary_provider(), "No approval needed"),
    }

    let swap_tx = perform_swap(&wallet, &route, sk.fee_option).await?;
    info!("Swap TX: {}", wallet.explorer_tx_url(&swap_tx));
    Ok(())
}
