//! LiFi aggregation API client.

mod types;

pub use types::{
    Action, Estimate, Execution, ExecutionStatus, Process, ProcessType, Route, RouteOptions,
    RouteOrder, RoutesRequest, StatusRequest, StatusResponse, Step, Token, TransactionRequest,
    TransferLeg, TransferStatus,
};

use crate::http::read_json;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument};
use types::RoutesResponse;

pub const DEFAULT_API_URL: &str = "https://li.quest/v1";

/// LiFi REST client.
#[derive(Debug, Clone)]
pub struct LifiClient {
    client: reqwest::Client,
    api_url: String,
    integrator: String,
}

impl LifiClient {
    /// Every request carries the integrator id in `x-lifi-integrator`.
    pub fn new(api_url: &str, integrator: &str, api_key: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-lifi-integrator",
            HeaderValue::from_str(integrator).context("Invalid integrator id")?,
        );
        if let Some(key) = api_key {
            headers.insert(
                "x-lifi-api-key",
                HeaderValue::from_str(key).context("Invalid LiFi API key")?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build LiFi HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            integrator: integrator.to_string(),
        })
    }

    pub fn integrator(&self) -> &str {
        &self.integrator
    }

    /// Candidate routes, best first.
    #[instrument(skip(self, request), fields(from_chain = request.from_chain_id, to_chain = request.to_chain_id, amount = %request.from_amount))]
    pub async fn get_routes(&self, request: &RoutesRequest) -> Result<Vec<Route>> {
        let url = format!("{}/advanced/routes", self.api_url);
        let response = self.client.post(&url).json(request).send().await?;
        let routes = read_json::<RoutesResponse>("LiFi", response).await?.routes;

        debug!(count = routes.len(), "Received LiFi routes");
        Ok(routes)
    }

    /// Populate `transaction_request` of a step.
    #[instrument(skip(self, step), fields(step_id = %step.id, tool = %step.tool))]
    pub async fn get_step_transaction(&self, step: &Step) -> Result<Step> {
        let url = format!("{}/advanced/stepTransaction", self.api_url);

        let mut outgoing = step.clone();
        outgoing.execution = None;
        outgoing.transaction_request = None;

        let response = self.client.post(&url).json(&outgoing).send().await?;
        let mut populated: Step = read_json("LiFi", response).await?;
        populated.execution = step.execution.clone();

        debug!(has_tx = populated.transaction_request.is_some(), "Step transaction fetched");
        Ok(populated)
    }

    /// Transfer status of a submitted step.
    #[instrument(skip(self, request), fields(tx_hash = %request.tx_hash, bridge = %request.bridge))]
    pub async fn get_status(&self, request: &StatusRequest) -> Result<StatusResponse> {
        let url = format!("{}/status", self.api_url);
        let query = [
            ("txHash", request.tx_hash.clone()),
            ("bridge", request.bridge.clone()),
            ("fromChain", request.from_chain.to_string()),
            ("toChain", request.to_chain.to_string()),
        ];

        let response = self.client.get(&url).query(&query).send().await?;
        let status: StatusResponse = read_json("LiFi", response).await?;

        debug!(status = ?status.status, substatus = ?status.substatus, "Transfer status");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USDC: &str = "0xaf88d065e77c8cC2239327C5EDb3A432268e5831";
    const USDT: &str = "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9";

    fn token_json(address: &str, symbol: &str) -> Value {
        json!({"address": address, "chainId": 42161, "symbol": symbol, "decimals": 6, "name": symbol})
    }

    fn step_json() -> Value {
        json!({
            "id": "step-1",
            "type": "swap",
            "tool": "1inch",
            "toolDetails": {"key": "1inch", "name": "1inch"},
            "action": {
                "fromChainId": 42161,
                "toChainId": 42161,
                "fromToken": token_json(USDC, "USDC"),
                "toToken": token_json(USDT, "USDT"),
                "fromAmount": "10000",
                "slippage": 0.03
            },
            "estimate": {
                "tool": "1inch",
                "approvalAddress": "0x1231DEB6f5749EF6cE6943a275A1D3E7486F4EaE",
                "toAmount": "9990",
                "toAmountMin": "9690"
            }
        })
    }

    fn route_json() -> Value {
        json!({
            "id": "route-1",
            "fromChainId": 42161,
            "toChainId": 42161,
            "fromAmount": "10000",
            "toAmount": "9990",
            "toAmountMin": "9690",
            "fromAmountUSD": "0.01",
            "fromToken": token_json(USDC, "USDC"),
            "toToken": token_json(USDT, "USDT"),
            "steps": [step_json()],
            "tags": ["RECOMMENDED"]
        })
    }

    fn request() -> RoutesRequest {
        let wallet = Address::repeat_byte(0x22);
        RoutesRequest {
            from_chain_id: 42161,
            to_chain_id: 42161,
            from_token_address: USDC.parse().unwrap(),
            to_token_address: USDT.parse().unwrap(),
            from_amount: "10000".to_string(),
            from_address: wallet,
            to_address: wallet,
            options: RouteOptions {
                order: RouteOrder::Recommended,
                slippage: 0.03,
                integrator: Some("Lifi_test".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_get_routes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/advanced/routes"))
            .and(header("x-lifi-integrator", "Lifi_test"))
            .and(body_partial_json(json!({"fromAmount": "10000", "options": {"slippage": 0.03}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"routes": [route_json()]})))
            .mount(&server)
            .await;

        let client = LifiClient::new(&server.uri(), "Lifi_test", None).unwrap();
        let routes = client.get_routes(&request()).await.unwrap();

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].steps[0].tool, "1inch");
        assert_eq!(routes[0].from_amount_usd.as_deref(), Some("0.01"));
    }

    #[tokio::test]
    async fn test_get_routes_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/advanced/routes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"routes": []})))
            .mount(&server)
            .await;

        let client = LifiClient::new(&server.uri(), "Lifi_test", None).unwrap();
        assert!(client.get_routes(&request()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_step_transaction_keeps_unknown_fields() {
        let server = MockServer::start().await;
        let mut populated = step_json();
        populated["transactionRequest"] = json!({
            "to": "0x1231DEB6f5749EF6cE6943a275A1D3E7486F4EaE",
            "data": "0x4630a0d8",
            "value": "0x0",
            "gasLimit": "0x61a80"
        });

        Mock::given(method("POST"))
            .and(path("/advanced/stepTransaction"))
            .and(body_partial_json(json!({"id": "step-1", "toolDetails": {"key": "1inch"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(populated))
            .mount(&server)
            .await;

        let client = LifiClient::new(&server.uri(), "Lifi_test", None).unwrap();
        let mut step: Step = serde_json::from_value(step_json()).unwrap();
        step.execution = Some(Execution::new());

        let step = client.get_step_transaction(&step).await.unwrap();
        let tx = step.transaction_request.unwrap();
        assert_eq!(tx.gas_limit(), Some(400_000));
        assert!(step.execution.is_some());
    }

    #[tokio::test]
    async fn test_get_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(query_param("txHash", "0xabc"))
            .and(query_param("bridge", "1inch"))
            .and(query_param("fromChain", "42161"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "DONE",
                "substatus": "COMPLETED",
                "sending": {"txHash": "0xabc", "chainId": 42161},
                "lifiExplorerLink": "https://scan.li.fi/tx/0xabc"
            })))
            .mount(&server)
            .await;

        let client = LifiClient::new(&server.uri(), "Lifi_test", None).unwrap();
        let status = client
            .get_status(&StatusRequest {
                tx_hash: "0xabc".to_string(),
                bridge: "1inch".to_string(),
                from_chain: 42161,
                to_chain: 42161,
            })
            .await
            .unwrap();

        assert_eq!(status.status, TransferStatus::Done);
        assert_eq!(status.substatus.as_deref(), Some("COMPLETED"));
    }

    #[tokio::test]
    async fn test_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid fromAmount"))
            .mount(&server)
            .await;

        let client = LifiClient::new(&server.uri(), "Lifi_test", None).unwrap();
        let err = client.get_routes(&request()).await.unwrap_err();
        assert!(err.to_string().contains("LiFi API error: 422"));
    }
}
