//! Chainflip swap backend and broker client.
//!
//! Covers the three calls a vault swap needs:
//! - `get_quote_v2`: REGULAR and DCA quotes from the swap backend
//! - `encode_vault_swap_data`: vault contract call built by the broker
//! - `get_status_v2`: lifecycle of a swap keyed by tx hash or swap id

mod price;
mod types;

pub use price::{min_price_x128, to_hex_quantity};
pub use types::{
    Affiliate, Asset, AssetAndChain, Chain, DcaParams, DepositInfo, FillOrKillParams, IncludedFee,
    Quote, QuoteRequest, QuoteType, SwapState, SwapStatus, VaultSwapData, VaultSwapRequest,
};

use crate::http::read_json;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::{debug, instrument};
use types::QuoteResponse;

/// Chainflip network selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Public testnet
    Perseverance,
    Mainnet,
}

impl Network {
    pub fn backend_url(self) -> &'static str {
        match self {
            Network::Perseverance => "https://chainflip-swap-perseverance.chainflip.io",
            Network::Mainnet => "https://chainflip-swap.chainflip.io",
        }
    }

    pub fn broker_url(self) -> &'static str {
        match self {
            Network::Perseverance => "https://perseverance.chainflip-broker.io",
            Network::Mainnet => "https://chainflip-broker.io",
        }
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "perseverance" | "testnet" => Ok(Network::Perseverance),
            "mainnet" => Ok(Network::Mainnet),
            other => anyhow::bail!("Unknown Chainflip network: {}", other),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Chainflip swap client.
#[derive(Debug, Clone)]
pub struct ChainflipClient {
    client: reqwest::Client,
    network: Network,
    backend_url: String,
    broker_url: String,
    /// Ask for DCA quotes alongside REGULAR ones
    dca_enabled: bool,
}

impl ChainflipClient {
    /// Client with the network's default endpoints and DCA enabled.
    pub fn new(network: Network) -> Self {
        Self {
            client: reqwest::Client::new(),
            network,
            backend_url: network.backend_url().to_string(),
            broker_url: network.broker_url().to_string(),
            dca_enabled: true,
        }
    }

    pub fn with_backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = backend_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_broker_url(mut self, broker_url: impl Into<String>) -> Self {
        self.broker_url = broker_url.into();
        self
    }

    pub fn with_dca(mut self, enabled: bool) -> Self {
        self.dca_enabled = enabled;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Fetch all quote variants for a swap.
    #[instrument(skip(self, request), fields(src = %request.src, dest = %request.dest, amount = %request.amount))]
    pub async fn get_quote_v2(&self, request: &QuoteRequest) -> Result<Vec<Quote>> {
        let url = format!("{}/v2/quote", self.backend_url);

        let mut query = vec![
            ("srcChain", request.src.chain.to_string()),
            ("srcAsset", request.src.asset.to_string()),
            ("destChain", request.dest.chain.to_string()),
            ("destAsset", request.dest.asset.to_string()),
            ("amount", request.amount.clone()),
            ("isVaultSwap", request.is_vault_swap.to_string()),
            ("dcaEnabled", self.dca_enabled.to_string()),
        ];
        if let Some(bps) = request.broker_commission_bps {
            query.push(("brokerCommissionBps", bps.to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let quotes = read_json::<QuoteResponse>("Chainflip", response)
            .await?
            .into_quotes();

        debug!(count = quotes.len(), "Received Chainflip quotes");
        Ok(quotes)
    }

    /// Ask the broker to encode the vault contract call for a quote.
    #[instrument(skip(self, request), fields(quote_type = %request.quote.kind, src_address = %request.src_address))]
    pub async fn encode_vault_swap_data(&self, request: &VaultSwapRequest) -> Result<VaultSwapData> {
        let params = Self::encoding_params(request)?;
        debug!(params = %params, "Requesting vault swap encoding");

        let result: VaultSwapData = self
            .rpc("broker_request_swap_parameter_encoding", params)
            .await?;

        debug!(chain = %result.chain, "Vault swap encoded");
        Ok(result)
    }

    /// Status of a swap by transaction hash or swap id.
    #[instrument(skip(self))]
    pub async fn get_status_v2(&self, id: &str) -> Result<SwapStatus> {
        let url = format!("{}/v2/swaps/{}", self.backend_url, id);
        let response = self.client.get(&url).send().await?;
        let status: SwapStatus = read_json("Chainflip", response).await?;

        debug!(state = ?status.state, "Swap status fetched");
        Ok(status)
    }

    /// Positional params of `broker_request_swap_parameter_encoding`.
    fn encoding_params(request: &VaultSwapRequest) -> Result<Value> {
        let quote = &request.quote;
        let src_decimals = quote
            .src_asset
            .decimals()
            .with_context(|| format!("Unknown decimals for {}", quote.src_asset))?;
        let dest_decimals = quote
            .dest_asset
            .decimals()
            .with_context(|| format!("Unknown decimals for {}", quote.dest_asset))?;

        let min_price = min_price_x128(
            &quote.estimated_price,
            request.fill_or_kill.slippage_tolerance_percent,
            src_decimals,
            dest_decimals,
        )?;
        let input_amount = alloy::primitives::U256::from_str_radix(&quote.deposit_amount, 10)
            .context("Invalid deposit amount in quote")?;

        let dca_parameters = match (&quote.kind, &quote.dca_params) {
            (QuoteType::Dca, Some(dca)) => json!({
                "number_of_chunks": dca.number_of_chunks,
                "chunk_interval": dca.chunk_interval_blocks,
            }),
            _ => Value::Null,
        };

        let affiliates: Vec<Value> = request
            .affiliates
            .iter()
            .map(|a| json!({ "account": a.account, "bps": a.commission_bps }))
            .collect();

        Ok(json!([
            quote.src_asset,
            quote.dest_asset,
            request.dest_address,
            request.broker_commission_bps,
            {
                "chain": quote.src_asset.chain,
                "input_amount": to_hex_quantity(input_amount),
                "refund_parameters": {
                    "retry_duration": request.fill_or_kill.retry_duration_blocks,
                    "refund_address": request.fill_or_kill.refund_address.to_string(),
                    "min_price": to_hex_quantity(min_price),
                },
            },
            Value::Null,
            0,
            affiliates,
            dca_parameters,
        ]))
    }

    async fn rpc<T: serde::de::DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self.client.post(&self.broker_url).json(&body).send().await?;
        let rpc: RpcResponse<T> = read_json("Chainflip broker", response).await?;

        if let Some(error) = rpc.error {
            anyhow::bail!("Chainflip broker error {}: {}", error.code, error.message);
        }
        rpc.result
            .ok_or_else(|| anyhow::anyhow!("Chainflip broker returned no result for {}", method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quote_json(kind: &str) -> Value {
        json!({
            "type": kind,
            "srcAsset": {"chain": "Ethereum", "asset": "ETH"},
            "destAsset": {"chain": "Arbitrum", "asset": "ETH"},
            "depositAmount": "40000000000000000",
            "egressAmount": "39800000000000000",
            "estimatedPrice": "0.995",
            "recommendedSlippageTolerancePercent": 1.5,
            "dcaParams": {"numberOfChunks": 3, "chunkIntervalBlocks": 2}
        })
    }

    fn sample_request(kind: &str) -> VaultSwapRequest {
        let wallet: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap();
        VaultSwapRequest {
            quote: serde_json::from_value(quote_json(kind)).unwrap(),
            src_address: wallet,
            dest_address: wallet.to_string(),
            fill_or_kill: FillOrKillParams {
                slippage_tolerance_percent: 1.5,
                refund_address: wallet,
                retry_duration_blocks: 100,
            },
            broker_commission_bps: 0,
            affiliates: vec![],
        }
    }

    #[test]
    fn test_network_parsing() {
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Perseverance);
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert!("backspin".parse::<Network>().is_err());
    }

    #[test]
    fn test_encoding_params_regular() {
        let params = ChainflipClient::encoding_params(&sample_request("REGULAR")).unwrap();

        assert_eq!(params[0], json!({"chain": "Ethereum", "asset": "ETH"}));
        assert_eq!(params[4]["input_amount"], "0x8e1bc9bf040000");
        assert_eq!(params[4]["refund_parameters"]["retry_duration"], 100);
        assert!(params[4]["refund_parameters"]["min_price"]
            .as_str()
            .unwrap()
            .starts_with("0x"));
        assert_eq!(params[8], Value::Null);
    }

    #[test]
    fn test_encoding_params_dca() {
        let params = ChainflipClient::encoding_params(&sample_request("DCA")).unwrap();
        assert_eq!(params[8], json!({"number_of_chunks": 3, "chunk_interval": 2}));
    }

    #[tokio::test]
    async fn test_get_quote_v2() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/quote"))
            .and(query_param("srcChain", "Ethereum"))
            .and(query_param("destAsset", "ETH"))
            .and(query_param("isVaultSwap", "true"))
            .and(query_param("dcaEnabled", "true"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([quote_json("REGULAR"), quote_json("DCA")])),
            )
            .mount(&server)
            .await;

        let client = ChainflipClient::new(Network::Perseverance).with_backend_url(server.uri());
        let quotes = client
            .get_quote_v2(&QuoteRequest {
                src: AssetAndChain::new(Chain::Ethereum, Asset::ETH),
                dest: AssetAndChain::new(Chain::Arbitrum, Asset::ETH),
                amount: "40000000000000000".to_string(),
                is_vault_swap: true,
                broker_commission_bps: None,
            })
            .await
            .unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].kind, QuoteType::Dca);
    }

    #[tokio::test]
    async fn test_get_quote_v2_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/quote"))
            .respond_with(ResponseTemplate::new(400).set_body_string("amount too low"))
            .mount(&server)
            .await;

        let client = ChainflipClient::new(Network::Perseverance).with_backend_url(server.uri());
        let err = client
            .get_quote_v2(&QuoteRequest {
                src: AssetAndChain::new(Chain::Ethereum, Asset::ETH),
                dest: AssetAndChain::new(Chain::Arbitrum, Asset::ETH),
                amount: "1".to_string(),
                is_vault_swap: true,
                broker_commission_bps: None,
            })
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Chainflip API error"));
        assert!(message.contains("amount too low"));
    }

    #[tokio::test]
    async fn test_encode_vault_swap_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "broker_request_swap_parameter_encoding"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "chain": "Ethereum",
                    "to": "0x36ead71325604dc15d35fae584d7b50646d81753",
                    "calldata": "0xdd687345",
                    "value": "0x8e1bc9bf040000",
                    "source_token_address": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
                }
            })))
            .mount(&server)
            .await;

        let client = ChainflipClient::new(Network::Perseverance).with_broker_url(server.uri());
        let data = client
            .encode_vault_swap_data(&sample_request("REGULAR"))
            .await
            .unwrap();

        assert_eq!(data.chain, Chain::Ethereum);
        assert!(data.evm_call().is_some());
    }

    #[tokio::test]
    async fn test_encode_vault_swap_rpc_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32603, "message": "Unsupported asset"}
            })))
            .mount(&server)
            .await;

        let client = ChainflipClient::new(Network::Perseverance).with_broker_url(server.uri());
        let err = client
            .encode_vault_swap_data(&sample_request("REGULAR"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported asset"));
    }

    #[tokio::test]
    async fn test_get_status_v2() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/swaps/0xf805"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "state": "COMPLETED",
                "srcChain": "Ethereum",
                "destChain": "Arbitrum"
            })))
            .mount(&server)
            .await;

        let client = ChainflipClient::new(Network::Perseverance).with_backend_url(server.uri());
        let status = client.get_status_v2("0xf805").await.unwrap();
        assert_eq!(status.state, SwapState::Completed);
        assert!(status.state.is_terminal());
    }
}
