//! OpenAI-compatible chat-completions agent
//!
//! Sends the instruction with the toolbox's function declarations, runs every
//! tool call the model asks for, feeds the results back, and stops when the
//! model answers in plain text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::Agent;
use crate::api::schema::{self, Issues, Schema};
use crate::api::{ApiClient, RetryPolicy};
use crate::config::{LlmConfig, LlmEndpoint};
use crate::tools::Toolbox;
use crate::{Error, Result};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

const SYSTEM_PROMPT: &str = "You are an autonomous trading agent taking part in a trading \
competition. Use the tools you are given to act on the user's instruction, then reply with a \
short summary of what you did and the outcome.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool_result(call_id: &str, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.to_string()),
            ..Self::text("tool", content)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded arguments
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl Schema for ChatResponse {
    const NAME: &'static str = "ChatCompletion";

    fn check(&self, issues: &mut Issues) {
        if self.choices.is_empty() {
            issues.push("choices", "must contain at least one choice");
        }
    }
}

/// Agent backed by an OpenAI-compatible `/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiAgent {
    api: ApiClient,
    model: String,
    max_tool_rounds: u32,
}

impl OpenAiAgent {
    pub fn new(endpoint: &LlmEndpoint, config: &LlmConfig) -> Result<Self> {
        let api = ApiClient::with_options(
            &endpoint.base_url,
            endpoint.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
            RetryPolicy::default(),
        )?;
        Ok(Self {
            api,
            model: config.model.clone(),
            max_tool_rounds: config.max_tool_rounds,
        })
    }

    /// Resolve the endpoint from the environment.
    pub fn from_env(config: &LlmConfig) -> Result<Self> {
        let endpoint = LlmEndpoint::from_env().ok_or_else(|| {
            Error::Config(
                "No LLM endpoint configured: set LLM_BASE_URL, OPENAI_API_KEY or OPENROUTER_API_KEY"
                    .to_string(),
            )
        })?;
        Self::new(&endpoint, config)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage], tools: &[Value]) -> Result<ChatMessage> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.to_vec());
        }

        let value = self.api.post(CHAT_COMPLETIONS_PATH, &body).await?;
        let response: ChatResponse = schema::decode(value)?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| Error::Agent("Model returned no choices".to_string()))
    }
}

#[async_trait]
impl Agent for OpenAiAgent {
    async fn run(&self, instruction: &str, tools: &Toolbox) -> Result<String> {
        let declarations: Vec<Value> = tools
            .definitions()
            .iter()
            .map(|d| d.to_function_spec())
            .collect();
        let mut messages = vec![
            ChatMessage::text("system", SYSTEM_PROMPT),
            ChatMessage::text("user", instruction),
        ];

        info!(model = %self.model, tools = declarations.len(), "Running agent");

        for round in 0..=self.max_tool_rounds {
            let reply = self.complete(&messages, &declarations).await?;

            let calls = match reply.tool_calls.clone() {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    debug!(round, "Agent produced final answer");
                    return reply
                        .content
                        .filter(|c| !c.trim().is_empty())
                        .ok_or_else(|| Error::Agent("Model returned an empty answer".to_string()));
                }
            };

            if round == self.max_tool_rounds {
                break;
            }

            messages.push(reply);
            for call in calls {
                debug!(round, tool = %call.function.name, "Model requested tool call");
                let output = match serde_json::from_str::<Value>(&call.function.arguments) {
                    Ok(args) => tools.invoke(&call.function.name, args).await.content,
                    Err(e) => format!("Invalid JSON arguments for {}: {}", call.function.name, e),
                };
                messages.push(ChatMessage::tool_result(&call.id, output));
            }
        }

        Err(Error::Agent(format!(
            "Model still requesting tools after {} rounds",
            self.max_tool_rounds
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::schema::ValidationError;
    use crate::tools::{AgentTool, ToolCallOutput};
    use crate::ErrorKind;
    use schemars::JsonSchema;
    use secrecy::SecretString;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Deserialize, JsonSchema)]
    struct PingInput {
        target: String,
    }

    struct PingTool;

    #[async_trait]
    impl AgentTool for PingTool {
        const NAME: &'static str = "ping";
        type Input = PingInput;
        type Output = String;

        fn description(&self) -> &'static str {
            "Ping a target"
        }

        async fn execute(&self, args: Self::Input) -> Result<Self::Output> {
            Ok(format!("pong from {}", args.target))
        }
    }

    fn agent(server: &MockServer, max_tool_rounds: u32) -> OpenAiAgent {
        let endpoint = LlmEndpoint::new(server.uri(), SecretString::from("llm-key".to_string()));
        let config = LlmConfig {
            model: "test-model".to_string(),
            max_tool_rounds,
            timeout_secs: 5,
        };
        OpenAiAgent::new(&endpoint, &config).unwrap()
    }

    fn toolbox() -> Toolbox {
        let mut toolbox = Toolbox::new();
        toolbox.register(PingTool).unwrap();
        toolbox
    }

    fn tool_call_reply() -> Value {
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "ping", "arguments": "{\"target\":\"api\"}"}
                    }]
                }
            }]
        })
    }

    fn text_reply(text: &str) -> Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": text}}]
        })
    }

    #[tokio::test]
    async fn answers_without_tools() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer llm-key"))
            .and(body_partial_json(json!({"model": "test-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Nothing to do")))
            .expect(1)
            .mount(&server)
            .await;

        let answer = agent(&server, 2).run("hello", &toolbox()).await.unwrap();
        assert_eq!(answer, "Nothing to do");
    }

    #[tokio::test]
    async fn runs_requested_tools_then_answers() {
        let server = MockServer::start().await;
        // The follow-up request carries the tool result
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system"},
                    {"role": "user", "content": "ping the api"},
                    {"role": "assistant"},
                    {"role": "tool", "tool_call_id": "call_1", "content": "\"pong from api\""}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Pinged the api")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_reply()))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        let answer = agent(&server, 2).run("ping the api", &toolbox()).await.unwrap();
        assert_eq!(answer, "Pinged the api");

        let requests = server.received_requests().await.unwrap();
        let first: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(first["tools"][0]["function"]["name"], "ping");
    }

    #[tokio::test]
    async fn gives_up_after_max_rounds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_reply()))
            .mount(&server)
            .await;

        let err = agent(&server, 1).run("loop", &toolbox()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Agent);
        // one round with tool calls allowed, then the final request
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_completion_is_a_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = agent(&server, 1).run("hi", &toolbox()).await.unwrap_err();
        let validation: &ValidationError = err.validation().unwrap();
        assert!(validation.mentions("choices"));
    }

    #[test]
    fn tool_messages_serialize_without_empty_fields() {
        let msg = ChatMessage::tool_result("call_9", ToolCallOutput::success("ok").content);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"role": "tool", "content": "ok", "tool_call_id": "call_9"})
        );
    }
}
