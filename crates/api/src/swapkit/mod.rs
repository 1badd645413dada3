//! SwapKit quote API client.

mod asset;
mod types;

pub use asset::AssetId;
pub use types::{EvmTx, Fee, ProviderError, QuoteRequest, QuoteResponse, QuoteRoute, RouteMeta};

use crate::http::read_json;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_URL: &str = "https://api.swapkit.dev";

#[derive(Debug, Clone)]
pub struct SwapKitClient {
    client: reqwest::Client,
    api_url: String,
}

impl SwapKitClient {
    pub fn new(api_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).context("Invalid SwapKit API key")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build SwapKit HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    #[instrument(skip(self, request), fields(sell = %request.sell_asset, buy = %request.buy_asset, amount = %request.sell_amount))]
    pub async fn get_swap_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse> {
        let url = format!("{}/quote", self.api_url);
        let response = self.client.post(&url).json(request).send().await?;
        let quote: QuoteResponse = read_json("SwapKit", response).await?;

        for error in &quote.provider_errors {
            warn!(
                provider = ?error.provider,
                code = ?error.error_code,
                message = ?error.message,
                "Provider could not quote"
            );
        }
        debug!(routes = quote.routes.len(), quote_id = ?quote.quote_id, "Received SwapKit quote");
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> QuoteRequest {
        QuoteRequest {
            sell_asset: "ARB.USDC-0xaf88d065e77c8cc2239327c5edb3a432268e5831".parse().unwrap(),
            sell_amount: "0.01".to_string(),
            buy_asset: "ARB.USDT-0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9".parse().unwrap(),
            source_address: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string(),
            destination_address: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string(),
            slippage: 3.0,
            include_tx: true,
            providers: vec![],
        }
    }

    #[tokio::test]
    async fn test_get_swap_quote() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/quote"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(json!({"sellAmount": "0.01", "slippage": 3.0, "includeTx": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quoteId": "q-1",
                "routes": [{
                    "providers": ["ONEINCH"],
                    "sellAsset": "ARB.USDC-0xaf88d065e77c8cc2239327c5edb3a432268e5831",
                    "sellAmount": "0.01",
                    "buyAsset": "ARB.USDT-0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9",
                    "expectedBuyAmount": "0.00998",
                    "targetAddress": "0x111111125421ca6dc452d289314280a0f8842a65"
                }],
                "providerErrors": [{"provider": "NEAR", "errorCode": "noQuote", "message": "no route"}]
            })))
            .mount(&server)
            .await;

        let client = SwapKitClient::new(&server.uri(), "test-key").unwrap();
        let quote = client.get_swap_quote(&request()).await.unwrap();

        assert_eq!(quote.quote_id.as_deref(), Some("q-1"));
        assert_eq!(quote.routes.len(), 1);
        assert_eq!(quote.provider_errors.len(), 1);
        assert_eq!(quote.routes[0].expected_buy_amount, "0.00998");
    }

    #[tokio::test]
    async fn test_get_swap_quote_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = SwapKitClient::new(&server.uri(), "bad").unwrap();
        let err = client.get_swap_quote(&request()).await.unwrap_err();
        assert!(err.to_string().contains("SwapKit API error: 401"));
    }
}
