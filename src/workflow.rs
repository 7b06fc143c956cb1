//! Single-step trading workflow
//!
//! Gives the agent one instruction plus the trade tool and returns whatever
//! the agent answers. No branching and no retries at this level.

use std::sync::Arc;
use tracing::info;

use crate::agent::Agent;
use crate::api::SpecificChain;
use crate::client::TradingClient;
use crate::tokens::registry;
use crate::tools::{Toolbox, TradeTool};
use crate::Result;

/// The instruction used when none is supplied: swap 10 USDC for WETH on Ethereum.
pub fn default_instruction() -> String {
    let reg = registry();
    let usdc = reg.resolve("USDC", SpecificChain::Eth);
    let weth = reg.resolve("WETH", SpecificChain::Eth);
    format!(
        "Execute a trade of 10 USDC ({usdc}) for WETH ({weth}) on Ethereum. \
         Use the execute_trade tool with fromToken {usdc}, toToken {weth} and amount \"10\", \
         and give a short reason. Report the resulting transaction id, or the error if the \
         trade was rejected."
    )
}

pub struct TradingWorkflow {
    agent: Arc<dyn Agent>,
    toolbox: Toolbox,
    instruction: String,
}

impl TradingWorkflow {
    /// Workflow offering the trade tool backed by `client`.
    pub fn new(agent: Arc<dyn Agent>, client: TradingClient) -> Result<Self> {
        let mut toolbox = Toolbox::new();
        toolbox.register(TradeTool::new(client))?;
        Ok(Self::with_toolbox(agent, toolbox))
    }

    pub fn with_toolbox(agent: Arc<dyn Agent>, toolbox: Toolbox) -> Self {
        Self {
            agent,
            toolbox,
            instruction: default_instruction(),
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    /// Run the agent once and return its final answer.
    pub async fn run(&self) -> Result<String> {
        info!(tools = ?self.toolbox.names(), "Starting trading workflow");
        let answer = self.agent.run(&self.instruction, &self.toolbox).await?;
        info!("Trading workflow finished");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, RetryPolicy};
    use crate::{Error, ErrorKind};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Calls the trade tool with fixed arguments and echoes what it got back.
    struct ScriptedAgent {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Agent for ScriptedAgent {
        async fn run(&self, instruction: &str, tools: &Toolbox) -> Result<String> {
            self.seen.lock().unwrap().push(instruction.to_string());
            let reg = registry();
            let output = tools
                .invoke(
                    "execute_trade",
                    json!({
                        "fromToken": reg.resolve("USDC", SpecificChain::Eth),
                        "toToken": reg.resolve("WETH", SpecificChain::Eth),
                        "amount": "10",
                        "reason": "scripted"
                    }),
                )
                .await;
            Ok(if output.is_error {
                format!("could not trade: {}", output.content)
            } else {
                format!("traded: {}", output.content)
            })
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl Agent for FailingAgent {
        async fn run(&self, _instruction: &str, _tools: &Toolbox) -> Result<String> {
            Err(Error::Agent("model unavailable".to_string()))
        }
    }

    fn client(server: &MockServer) -> TradingClient {
        ApiClient::with_options(
            &server.uri(),
            SecretString::from("test-key".to_string()),
            Duration::from_secs(5),
            RetryPolicy::none(),
        )
        .unwrap()
        .into()
    }

    #[test]
    fn default_instruction_names_both_tokens() {
        let text = default_instruction();
        assert!(text.contains("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
        assert!(text.contains("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));
        assert!(text.contains("execute_trade"));
    }

    #[tokio::test]
    async fn returns_agent_answer_after_trade() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/trade/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "transaction": {
                    "id": "tx-42",
                    "fromToken": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                    "toToken": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
                    "fromAmount": "10",
                    "toAmount": "0.0031",
                    "timestamp": "2025-03-01T12:00:00.000Z"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let agent = Arc::new(ScriptedAgent {
            seen: Mutex::new(Vec::new()),
        });
        let workflow = TradingWorkflow::new(agent.clone(), client(&server))
            .unwrap()
            .with_instruction("buy some WETH");

        let answer = tokio_test::assert_ok!(workflow.run().await);
        assert!(answer.starts_with("traded: "));
        assert!(answer.contains("tx-42"));
        assert_eq!(*agent.seen.lock().unwrap(), vec!["buy some WETH".to_string()]);
    }

    #[tokio::test]
    async fn trade_failures_reach_the_agent_as_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/trade/execute"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Competition not active"})))
            .mount(&server)
            .await;

        let agent = Arc::new(ScriptedAgent {
            seen: Mutex::new(Vec::new()),
        });
        let answer = TradingWorkflow::new(agent, client(&server))
            .unwrap()
            .run()
            .await
            .unwrap();
        assert!(answer.contains("could not trade"));
        assert!(answer.contains("Competition not active"));
    }

    #[tokio::test]
    async fn agent_errors_propagate() {
        let workflow = TradingWorkflow::with_toolbox(Arc::new(FailingAgent), Toolbox::new());
        let err = tokio_test::assert_err!(workflow.run().await);
        assert_eq!(err.kind(), ErrorKind::Agent);
    }
}
