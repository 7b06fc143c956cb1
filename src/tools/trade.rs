//! Trade execution tool
//!
//! Lets an agent place one trade on the competition API. The tool either
//! returns the transaction the API recorded or a plain-text failure; it never
//! retries on its own and never splits a trade.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{AgentTool, TOOL_EXECUTE_TRADE};
use crate::api::{TradeRequest, TradeResponse};
use crate::client::TradingClient;
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TradeToolInput {
    /// Address of the token to sell
    pub from_token: String,
    /// Address of the token to buy
    pub to_token: String,
    /// Amount of `fromToken` to sell, as a decimal string (e.g. "10.5")
    pub amount: String,
    /// Short explanation of why this trade is being made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<TradeToolInput> for TradeRequest {
    fn from(input: TradeToolInput) -> Self {
        let request = TradeRequest::new(input.from_token, input.to_token, input.amount);
        match input.reason {
            Some(reason) => request.with_reason(reason),
            None => request,
        }
    }
}

/// Result of one tool invocation, for callers that use the tool directly.
#[derive(Debug, Clone)]
pub enum TradeOutcome {
    Executed(TradeResponse),
    Failed(String),
}

impl TradeOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }
}

pub struct TradeTool {
    client: TradingClient,
}

impl TradeTool {
    pub fn new(client: TradingClient) -> Self {
        Self { client }
    }

    /// Execute a trade, folding any failure into text.
    pub async fn run(&self, input: TradeToolInput) -> TradeOutcome {
        match self.execute(input).await {
            Ok(response) => TradeOutcome::Executed(response),
            Err(e) => TradeOutcome::Failed(self.describe_failure(&e)),
        }
    }
}

#[async_trait]
impl AgentTool for TradeTool {
    const NAME: &'static str = TOOL_EXECUTE_TRADE;
    type Input = TradeToolInput;
    type Output = TradeResponse;

    fn description(&self) -> &'static str {
        "Execute a trade in the trading competition. Sells `amount` of `fromToken` for \
         `toToken` at the current price. Token values are contract addresses. Returns the \
         recorded transaction, or an error message if the trade was rejected."
    }

    async fn execute(&self, args: Self::Input) -> Result<Self::Output> {
        let request = TradeRequest::from(args);
        self.client.execute_trade(&request).await
    }

    fn describe_failure(&self, err: &Error) -> String {
        format!("Trade failed: {}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, RetryPolicy};
    use crate::tools::{DynTool, Toolbox};
    use secrecy::SecretString;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

    fn tool(server: &MockServer) -> TradeTool {
        let api = ApiClient::with_options(
            &server.uri(),
            SecretString::from("test-key".to_string()),
            Duration::from_secs(5),
            RetryPolicy::none(),
        )
        .unwrap();
        TradeTool::new(TradingClient::new(api))
    }

    fn input(amount: &str) -> TradeToolInput {
        TradeToolInput {
            from_token: USDC.to_string(),
            to_token: WETH.to_string(),
            amount: amount.to_string(),
            reason: Some("rebalance".to_string()),
        }
    }

    #[test]
    fn schema_requires_tokens_and_amount() {
        let api = ApiClient::new(
            "http://localhost:3000/api",
            SecretString::from("k".to_string()),
        )
        .unwrap();
        let definition = TradeTool::new(TradingClient::new(api)).definition();
        assert_eq!(definition.name, "execute_trade");

        let schema = definition.input_schema;
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"fromToken"));
        assert!(required.contains(&"toToken"));
        assert!(required.contains(&"amount"));
        assert!(!required.contains(&"reason"));
    }

    #[tokio::test]
    async fn executes_trade() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/trade/execute"))
            .and(body_json(json!({
                "fromToken": USDC,
                "toToken": WETH,
                "amount": "10",
                "reason": "rebalance"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "transaction": {
                    "id": "tx-1",
                    "fromToken": USDC,
                    "toToken": WETH,
                    "fromAmount": 10,
                    "toAmount": 0.004,
                    "timestamp": "2025-01-01T00:00:00Z"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        match tool(&server).run(input("10")).await {
            TradeOutcome::Executed(response) => {
                assert!(response.success);
                assert_eq!(response.transaction.id, "tx-1");
            }
            TradeOutcome::Failed(msg) => panic!("unexpected failure: {msg}"),
        }
    }

    #[tokio::test]
    async fn rejected_trade_is_described() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/trade/execute"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Insufficient balance"})),
            )
            .mount(&server)
            .await;

        let outcome = tool(&server).run(input("10")).await;
        let TradeOutcome::Failed(msg) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(
            msg,
            "Trade failed: execute_trade failed: HTTP 400: Insufficient balance"
        );
    }

    #[tokio::test]
    async fn invalid_amount_never_reaches_the_api() {
        let server = MockServer::start().await;

        let outcome = tool(&server).run(input("-1")).await;
        assert!(!outcome.is_executed());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toolbox_returns_failure_text() {
        let server = MockServer::start().await;
        let mut toolbox = Toolbox::new();
        toolbox.register(tool(&server)).unwrap();

        let output = toolbox
            .invoke(
                "execute_trade",
                json!({"fromToken": USDC, "toToken": USDC, "amount": "1"}),
            )
            .await;
        assert!(output.is_error);
        assert!(output.content.starts_with("Trade failed: execute_trade failed: Validation failed"));
    }
}
