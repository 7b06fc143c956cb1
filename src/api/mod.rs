//! Typed client for the competition REST API
//!
//! - `http`: authenticated transport with retry/backoff
//! - `schema`: validating decoders for every payload
//! - `types`: request and response records
//! - `endpoints`: one function per remote operation

pub mod endpoints;
pub mod http;
pub mod schema;
pub mod types;

pub use http::{is_retryable_status, ApiClient, RetryPolicy};
pub use schema::{FieldIssue, ValidationError};
pub use types::{
    AgentBalances, AgentDetails, AgentInfo, AgentProfile, AgentStats, BlockchainType,
    CompetitionSummary, Leaderboard, LeaderboardEntry, OwnerInfo, Portfolio, SpecificChain,
    TokenBalance, TokenHolding, TokenPrice, TradeRequest, TradeResponse, Transaction,
};
