//! Interactive SwapKit session: connect, quote, approve and swap as separate
//! commands read from stdin. Route and sell value persist between commands.

use super::swapkit::{
    approve_if_needed, build_sell_value, get_swapkit_client, log_quote, perform_swap,
    request_quote, ApprovalResult, AssetValue, FeeOption, KeystoreWallet,
};
use crate::balance::format_units;
use crate::config::{chain_by_id, require_any_env, require_env, SwapSettings};
use crate::error::SwapError;
use alloy::primitives::B256;
use anyhow::{Context, Result};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use xswap_api::swapkit::{QuoteRoute, SwapKitClient};

pub const HELP: &str = "Commands: connect | quote | approve | swap | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Quote,
    Approve,
    Swap,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "connect" | "c" => Ok(Command::Connect),
            "quote" | "q" => Ok(Command::Quote),
            "approve" | "a" => Ok(Command::Approve),
            "swap" | "s" => Ok(Command::Swap),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => anyhow::bail!("Unknown command: {}", other),
        }
    }
}

/// State carried between commands.
pub struct SwapKitSession {
    client: &'static SwapKitClient,
    seed_phrase: String,
    settings: SwapSettings,
    fee_option: FeeOption,
    wallet: Option<KeystoreWallet>,
    route: Option<QuoteRoute>,
    sell_value: Option<AssetValue>,
}

impl SwapKitSession {
    pub fn new(client: &'static SwapKitClient, seed_phrase: String, settings: SwapSettings) -> Self {
        Self {
            client,
            seed_phrase,
            fee_option: settings.swapkit.fee_option,
            settings,
            wallet: None,
            route: None,
            sell_value: None,
        }
    }

    pub fn route(&self) -> Option<&QuoteRoute> {
        self.route.as_ref()
    }

    pub fn fee_option(&self) -> FeeOption {
        self.fee_option
    }

    pub fn is_connected(&self) -> bool {
        self.wallet.is_some()
    }

    fn wallet(&self) -> Result<&KeystoreWallet> {
        self.wallet
            .as_ref()
            .context("No wallet connected; run `connect` first")
    }

    pub async fn connect(&mut self) -> Result<()> {
        let chain_id = self.settings.swapkit.chain_id;
        let chain = chain_by_id(chain_id).ok_or_else(|| SwapError::UnsupportedChain(chain_id.to_string()))?;

        let wallet = KeystoreWallet::connect(&self.seed_phrase, chain, &self.settings).await?;
        info!("Wallet connected!");
        info!("Address: {}", wallet.address());
        let balance = wallet.native_balance().await?;
        info!("Balance: {} {}", format_units(balance, 18), chain.native_symbol);

        self.wallet = Some(wallet);
        Ok(())
    }

    pub async fn quote(&mut self) -> Result<()> {
        let wallet = self.wallet()?;
        let route = request_quote(self.client, &self.settings.swapkit, wallet.address()).await?;
        let sell_value = build_sell_value(&route, &wallet.erc20).await?;
        log_quote(&route);

        self.route = Some(route);
        self.sell_value = Some(sell_value);
        Ok(())
    }

    /// No-op without a stored route.
    pub async fn approve(&mut self) -> Result<Option<ApprovalResult>> {
        let (Some(route), Some(sell_value)) = (&self.route, &self.sell_value) else {
            return Ok(None);
        };
        let result = approve_if_needed(self.wallet()?, route, sell_value).await?;
        match &result {
            ApprovalResult::NotNeeded => info!("No approval needed"),
            ApprovalResult::AlreadyApproved => info!("Already approved"),
            ApprovalResult::Approved { explorer_url, .. } => info!("Approved: {}", explorer_url),
        }
        Ok(Some(result))
    }

    /// No-op without a stored route.
    pub async fn swap(&mut self) -> Result<Option<B256>> {
        let Some(route) = &self.route else {
            return Ok(None);
        };
        let wallet = self.wallet()?;
        let tx_hash = perform_swap(wallet, route, self.fee_option).await?;
        info!("Swap Successful: {}", wallet.explorer_tx_url(&tx_hash));
        Ok(Some(tx_hash))
    }

    /// Run one command; errors are logged and never end the session.
    /// Returns `false` when the session should stop.
    pub async fn handle(&mut self, command: Command) -> bool {
        let result = match command {
            Command::Connect => self
                .connect()
                .await
                .map_err(|e| e.context("Wallet connection failed")),
            Command::Quote => self.quote().await.map_err(|e| e.context("Quote failed")),
            Command::Approve => self
                .approve()
                .await
                .map(|_| ())
                .map_err(|e| e.context("Approval failed")),
            Command::Swap => self.swap().await.map(|_| ()).map_err(|e| e.context("Swap failed")),
            Command::Help => {
                info!("{}", HELP);
                Ok(())
            }
            Command::Quit => return false,
        };

        if let Err(e) = result {
            error!("{:#}", e);
        }
        true
    }
}

/// Read commands from stdin until `quit` or EOF.
pub async fn run_repl(settings: &SwapSettings) -> Result<()> {
    let api_key = require_any_env(&["SWAPKIT_API", "VITE_SWAPKIT_API"])?;
    let seed_phrase = require_env("SEED_PHRASE")?;
    let client = get_swapkit_client(&api_key, &settings.swapkit.api_url)?;

    let mut session = SwapKitSession::new(client, seed_phrase, settings.clone());
    info!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if !session.handle(command).await {
                    break;
                }
            }
            Err(e) => warn!("{}. {}", e, HELP),
        }
    }

    info!("Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SwapKitSession {
        let client = get_swapkit_client("test-key", "http://127.0.0.1:1").unwrap();
        SwapKitSession::new(
            client,
            "test test test test test test test test test test test junk".to_string(),
            SwapSettings::default(),
        )
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!("connect".parse::<Command>().unwrap(), Command::Connect);
        assert_eq!(" QUOTE ".parse::<Command>().unwrap(), Command::Quote);
        assert_eq!("a".parse::<Command>().unwrap(), Command::Approve);
        assert_eq!("swap".parse::<Command>().unwrap(), Command::Swap);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
        assert!("bridge".parse::<Command>().is_err());
    }

    #[test]
    fn test_session_fee_option_from_settings() {
        assert_eq!(session().fee_option(), FeeOption::Fast);

        let mut settings = SwapSettings::default();
        settings.swapkit.fee_option = FeeOption::Fastest;
        let client = get_swapkit_client("test-key", "http://127.0.0.1:1").unwrap();
        let session = SwapKitSession::new(client, "seed".to_string(), settings);
        assert_eq!(session.fee_option(), FeeOption::Fastest);
    }

    #[tokio::test]
    async fn test_approve_and_swap_without_route_are_noops() {
        let mut session = session();
        assert!(session.approve().await.unwrap().is_none());
        assert!(session.swap().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quote_requires_wallet() {
        let mut session = session();
        let err = session.quote().await.unwrap_err();
        assert!(err.to_string().contains("No wallet connected"));
        assert!(session.route().is_none());
    }

    #[tokio::test]
    async fn test_handle_keeps_session_alive_on_error() {
        let mut session = session();
        assert!(session.handle(Command::Quote).await);
        assert!(session.handle(Command::Help).await);
        assert!(!session.handle(Command::Quit).await);
        assert!(!session.is_connected());
    }
}
