//! Agent interface
//!
//! The workflow hands an instruction and a [`Toolbox`] to an [`Agent`] and
//! waits for its final answer. Any decision-maker can sit behind the trait;
//! [`OpenAiAgent`] drives an OpenAI-compatible chat endpoint.

mod openai;

use async_trait::async_trait;

use crate::tools::Toolbox;
use crate::Result;

pub use openai::OpenAiAgent;

#[async_trait]
pub trait Agent: Send + Sync {
    /// Act on `instruction`, calling tools from `tools` as needed, and return
    /// the final text response.
    async fn run(&self, instruction: &str, tools: &Toolbox) -> Result<String>;
}
