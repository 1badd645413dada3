//! xswap
//!
//! Cross-chain swap runner. Each flow fetches a quote, approves the
//! sell token when needed, submits the swap and reports its status:
//! - `chainflip`: vault swap ETH (Ethereum) -> ETH (Arbitrum)
//! - `lifi`: route execution USDC -> USDT on Arbitrum
//! - `swapkit`: keystore swap USDC -> USDT on Arbitrum
//! - `swapkit-steps`: the same swap driven command by command from stdin

use std::str::FromStr;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xswap_core::flows::{chainflip, lifi, swapkit, swapkit_steps};
use xswap_core::{config::optional_env, init_settings, settings, SwapSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Chainflip,
    Lifi,
    SwapKit,
    SwapKitSteps,
}

impl FromStr for Flow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chainflip" => Ok(Flow::Chainflip),
            "lifi" => Ok(Flow::Lifi),
            "swapkit" => Ok(Flow::SwapKit),
            "swapkit-steps" | "swapkit_steps" => Ok(Flow::SwapKitSteps),
            other => anyhow::bail!(
                "Unknown flow '{}'. Expected one of: chainflip, lifi, swapkit, swapkit-steps",
                other
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,xswap_core=debug,xswap_chain=debug")),
        )
        .init();

    // SWAP_CONFIG selects a TOML file; SWAP_NETWORK overrides the Chainflip network
    let swap_settings = SwapSettings::load()?;
    swap_settings.log_settings();
    init_settings(swap_settings);

    let flow: Flow = std::env::args()
        .nth(1)
        .or_else(|| optional_env("SWAP_FLOW"))
        .ok_or_else(|| {
            anyhow::anyhow!("Usage: xswap <chainflip|lifi|swapkit|swapkit-steps> (or set SWAP_FLOW)")
        })?
        .parse()?;

    info!(flow = ?flow, "Starting swap flow");

    match flow {
        Flow::Chainflip => chainflip::run(settings()).await?,
        Flow::Lifi => lifi::run(settings()).await?,
        // A failed SwapKit run is reported, not propagated
        Flow::SwapKit => {
            if let Err(e) = swapkit::run(settings()).await {
                error!("Error: {:#}", e);
            }
        }
        Flow::SwapKitSteps => swapkit_steps::run_repl(settings()).await?,
    }

    info!(flow = ?flow, "Flow finished");
    Ok(())
}

fn print_banner() {
    println!(r#"
    ═╗ ╦┌─┐┬ ┬┌─┐┌─┐
    ╔╩╦╝└─┐│││├─┤├─┘
    ╩ ╚═└─┘└┴┘┴ ┴┴
    Cross-chain swap runner v0.1.0
    "#);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_parsing() {
        assert_eq!("chainflip".parse::<Flow>().unwrap(), Flow::Chainflip);
        assert_eq!("LiFi".parse::<Flow>().unwrap(), Flow::Lifi);
        assert_eq!("swapkit".parse::<Flow>().unwrap(), Flow::SwapKit);
        assert_eq!("swapkit-steps".parse::<Flow>().unwrap(), Flow::SwapKitSteps);
        assert!("uniswap".parse::<Flow>().is_err());
    }
}
