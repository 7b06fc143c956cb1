//! Tools the trading agent can invoke
//!
//! A tool implements [`AgentTool`] with a typed input (whose JSON Schema is
//! derived with `schemars`) and a typed output. The [`Toolbox`] erases tools
//! behind [`DynTool`] so an agent can list their declarations and invoke them
//! by name with raw JSON arguments. Tool failures come back as text, never as
//! errors, so the agent decides how to react.

mod trade;
mod types;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{Error, Result};

pub use trade::{TradeOutcome, TradeTool, TradeToolInput};
pub use types::{ToolCallOutput, ToolDefinition};

pub const TOOL_EXECUTE_TRADE: &str = "execute_trade";

/// A typed capability an agent may call.
#[async_trait]
pub trait AgentTool: Send + Sync + 'static {
    const NAME: &'static str;
    type Input: DeserializeOwned + JsonSchema + Send + 'static;
    type Output: Serialize + Send + 'static;

    fn description(&self) -> &'static str;

    async fn execute(&self, args: Self::Input) -> Result<Self::Output>;

    fn input_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Input)).unwrap_or(Value::Bool(true))
    }

    /// Text handed back to the agent when `execute` fails.
    fn describe_failure(&self, err: &Error) -> String {
        format!("{} failed: {}", Self::NAME, err)
    }
}

/// Object-safe view of an [`AgentTool`].
#[async_trait]
pub trait DynTool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn call(&self, args: Value) -> ToolCallOutput;
}

#[async_trait]
impl<T: AgentTool> DynTool for T {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: T::NAME.to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }

    async fn call(&self, args: Value) -> ToolCallOutput {
        let input: T::Input = match serde_json::from_value(args) {
            Ok(input) => input,
            Err(e) => {
                return ToolCallOutput::error(format!("Invalid arguments for {}: {}", T::NAME, e))
            }
        };

        match self.execute(input).await {
            Ok(output) => match serde_json::to_string(&output) {
                Ok(text) => ToolCallOutput::success(text),
                Err(e) => ToolCallOutput::error(format!("{} produced unserializable output: {}", T::NAME, e)),
            },
            Err(e) => ToolCallOutput::error(self.describe_failure(&e)),
        }
    }
}

/// Registry of tools offered to an agent, keyed by tool name
#[derive(Clone, Default)]
pub struct Toolbox {
    tools: Vec<(&'static str, Arc<dyn DynTool>)>,
}

impl std::fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolbox").field("tools", &self.names()).finish()
    }
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register<T: AgentTool>(&mut self, tool: T) -> Result<()> {
        if self.get(T::NAME).is_some() {
            return Err(Error::Config(format!("Tool already registered: {}", T::NAME)));
        }
        self.tools.push((T::NAME, Arc::new(tool)));
        tracing::debug!(tool = T::NAME, "Registered tool");
        Ok(())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|(_, t)| t.definition()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|(name, _)| *name).collect()
    }

    fn get(&self, name: &str) -> Option<&Arc<dyn DynTool>> {
        self.tools
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, tool)| tool)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name. Unknown names produce an error result, not a panic.
    pub async fn invoke(&self, name: &str, args: Value) -> ToolCallOutput {
        let Some(tool) = self.get(name) else {
            tracing::warn!(tool = name, "Agent requested unknown tool");
            return ToolCallOutput::error(format!("Unknown tool: {}", name));
        };

        tracing::info!(tool = name, "Invoking tool");
        let output = tool.call(args).await;
        if output.is_error {
            tracing::warn!(tool = name, error = %output.content, "Tool call failed");
        }
        output
    }
}
