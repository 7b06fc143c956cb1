//! Competition Trading Agent
//!
//! A typed client for a trading-competition REST API and an LLM agent that
//! trades through it:
//! - Validated request/response records for portfolio, prices, trades,
//!   agent info and leaderboards
//! - An authenticated HTTP transport with retry and exponential backoff
//! - A trade tool any function-calling agent can invoke
//! - A single-step workflow that lets the agent place one trade
//!
//! # Error Model
//!
//! - Malformed input or responses surface as [`ErrorKind::Validation`]
//! - Transport failures and non-2xx responses keep their cause and status
//! - [`TradingClient`] wraps every failure with the operation that failed

pub mod agent;
pub mod api;
pub mod client;
pub mod config;
pub mod tokens;
pub mod tools;
pub mod workflow;

mod error;

// Re-export commonly used types
pub use agent::{Agent, OpenAiAgent};
pub use api::{ApiClient, RetryPolicy, TradeRequest, TradeResponse, ValidationError};
pub use client::TradingClient;
pub use config::{Config, LlmEndpoint, API_KEY_ENV, API_URL_ENV};
pub use error::{Error, ErrorKind, Result};
pub use tools::{TradeTool, Toolbox};
pub use workflow::TradingWorkflow;
