//! Chainflip vault swap: ETH on Ethereum to ETH on Arbitrum.
//!
//! Quote, pick the REGULAR variant, have the broker encode the vault call,
//! send it from the source chain and report the swap status.

use super::{build_sender, pretty, require_receipt};
use crate::balance::get_balances;
use crate::config::{chains, require_env, ChainflipSettings, EvmChain, SwapSettings};
use crate::error::SwapError;
use crate::status::SwapStatusKind;
use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::{debug, error, info};
use xswap_api::chainflip::{
    Asset, AssetAndChain, Chain, ChainflipClient, FillOrKillParams, Network, Quote, QuoteRequest,
    QuoteType, SwapStatus, VaultSwapRequest,
};
use xswap_chain::{signer_from_private_key, ChainProvider, TxDescriptor};

/// Read-only providers for the two legs of the swap.
#[derive(Debug, Clone)]
pub struct Providers {
    pub eth: ChainProvider,
    pub arb: ChainProvider,
}

pub fn initialize_providers(eth_url: &str, arb_url: &str) -> Result<Providers> {
    Ok(Providers {
        eth: ChainProvider::new("ethereum", eth_url)?,
        arb: ChainProvider::new("arbitrum", arb_url)?,
    })
}

/// First quote of `kind`.
pub fn select_quote(quotes: &[Quote], kind: QuoteType) -> Result<&Quote, SwapError> {
    quotes
        .iter()
        .find(|q| q.kind == kind)
        .ok_or_else(|| SwapError::NoMatchingQuote {
            kind: kind.to_string(),
        })
}

/// Vault swap parameters sending proceeds (and refunds) back to `wallet`.
pub fn vault_swap_request(
    quote: &Quote,
    wallet: Address,
    settings: &ChainflipSettings,
) -> VaultSwapRequest {
    VaultSwapRequest {
        quote: quote.clone(),
        src_address: wallet,
        dest_address: wallet.to_string(),
        fill_or_kill: FillOrKillParams {
            slippage_tolerance_percent: quote.recommended_slippage_tolerance_percent,
            refund_address: wallet,
            retry_duration_blocks: settings.retry_duration_blocks,
        },
        broker_commission_bps: settings.broker_commission_bps,
        affiliates: settings.affiliates.clone(),
    }
}

/// Registry chains of the Ethereum and Arbitrum legs on `network`.
pub fn leg_chains(network: Network) -> (&'static EvmChain, &'static EvmChain) {
    match network {
        Network::Perseverance => (&chains::SEPOLIA, &chains::ARBITRUM_SEPOLIA),
        Network::Mainnet => (&chains::ETHEREUM, &chains::ARBITRUM),
    }
}

/// Registry chain a vault call on `chain` is sent to.
pub fn source_chain(network: Network, chain: Chain) -> Option<&'static EvmChain> {
    let (eth, arb) = leg_chains(network);
    match chain {
        Chain::Ethereum => Some(eth),
        Chain::Arbitrum => Some(arb),
        _ => None,
    }
}

fn log_status(id: &str, status: &SwapStatus) {
    info!(
        id = %id,
        state = ?status.state,
        kind = ?SwapStatusKind::from(status.state),
        "Swap status"
    );
    debug!(status = %pretty(status), "Full status record");
}

pub async fn run(settings: &SwapSettings) -> Result<()> {
    let cf = &settings.chainflip;
    let secret_key = require_env("SECRET_KEY")?;
    let (eth_url, arb_url) = cf.rpc_urls()?;

    let client = ChainflipClient::new(cf.network).with_dca(cf.dca_enabled);
    let (eth_chain, arb_chain) = leg_chains(cf.network);

    let providers = initialize_providers(&eth_url, &arb_url)?;

    let signer = signer_from_private_key(&secret_key)?;
    let wallet = signer.address();

    let balances = get_balances(wallet, &providers.eth, &providers.arb).await?;
    info!(chain = eth_chain.name, balance_wei = %balances.eth_balance, "ETH balance");
    info!(chain = arb_chain.name, balance_wei = %balances.arb_balance, "ETH balance");
    info!(address = %wallet, "Wallet address");

    let quotes = client
        .get_quote_v2(&QuoteRequest {
            src: AssetAndChain::new(Chain::Ethereum, Asset::ETH),
            dest: AssetAndChain::new(Chain::Arbitrum, Asset::ETH),
            amount: cf.amount.clone(),
            is_vault_swap: true,
            broker_commission_bps: (cf.broker_commission_bps > 0).then_some(cf.broker_commission_bps),
        })
        .await?;

    let quote = select_quote(&quotes, QuoteType::Regular)?;
    info!(quote = %pretty(quote), "Selected quote");

    let data = client
        .encode_vault_swap_data(&vault_swap_request(quote, wallet, cf))
        .await?;
    info!(transaction_data = %pretty(&data), "Vault swap encoded");

    match (data.evm_call(), source_chain(cf.network, data.chain)) {
        (Some((to, calldata, value)), Some(chain)) => {
            let rpc_url = if data.chain == Chain::Ethereum { &eth_url } else { &arb_url };
            let sender = build_sender(signer, chain, rpc_url, &settings.gas).await?;

            let sent = sender
                .send_transaction(&TxDescriptor::new(to, calldata, value))
                .await
                .context("Vault swap transaction failed")?;
            let receipt = require_receipt(sent)?;
            debug!(receipt = ?receipt, "Receipt");

            let hash = receipt.transaction_hash.to_string();
            info!(receipt_hash = %hash, "Copy this hash to track the swap");

            let status = client.get_status_v2(&hash).await?;
            log_status(&hash, &status);
        }
        _ => error!("Unsupported chain for EVM transaction: {}", data.chain),
    }

    if let Some(id) = &cf.status_id {
        let status = client.get_status_v2(id).await?;
        log_status(id, &status);
    }

    Ok(())
}
