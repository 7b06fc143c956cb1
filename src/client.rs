//! Trading client facade
//!
//! Groups the endpoint functions under one type. Every failure is wrapped as
//! [`Error::Facade`] naming the operation, with the original error kept as
//! its source. Retries happen only inside the [`ApiClient`].

use crate::api::endpoints;
use crate::api::{
    AgentBalances, AgentDetails, AgentProfile, ApiClient, BlockchainType, Leaderboard, Portfolio,
    SpecificChain, TokenPrice, TradeRequest, TradeResponse,
};
use crate::config::ApiConfig;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct TradingClient {
    api: ApiClient,
}

impl TradingClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Build from config, reading the API key from the environment.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(config.client_from_env()?))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn get_portfolio(&self) -> Result<Portfolio> {
        endpoints::get_portfolio(&self.api)
            .await
            .map_err(|e| e.in_operation("get_portfolio"))
    }

    pub async fn get_token_price(
        &self,
        token: &str,
        chain: Option<BlockchainType>,
        specific_chain: Option<SpecificChain>,
    ) -> Result<TokenPrice> {
        endpoints::get_token_price(&self.api, token, chain, specific_chain)
            .await
            .map_err(|e| e.in_operation("get_token_price"))
    }

    pub async fn execute_trade(&self, request: &TradeRequest) -> Result<TradeResponse> {
        endpoints::execute_trade(&self.api, request)
            .await
            .map_err(|e| e.in_operation("execute_trade"))
    }

    pub async fn get_agent_profile(&self) -> Result<AgentProfile> {
        endpoints::get_agent_profile(&self.api)
            .await
            .map_err(|e| e.in_operation("get_agent_profile"))
    }

    pub async fn get_agent_details(&self) -> Result<AgentDetails> {
        endpoints::get_agent_details(&self.api)
            .await
            .map_err(|e| e.in_operation("get_agent_details"))
    }

    pub async fn get_agent_balances(&self, competition_id: &str) -> Result<AgentBalances> {
        endpoints::get_agent_balances(&self.api, competition_id)
            .await
            .map_err(|e| e.in_operation("get_agent_balances"))
    }

    pub async fn get_leaderboard(&self, competition_id: Option<&str>) -> Result<Leaderboard> {
        endpoints::get_leaderboard(&self.api, competition_id)
            .await
            .map_err(|e| e.in_operation("get_leaderboard"))
    }
}

impl From<ApiClient> for TradingClient {
    fn from(api: ApiClient) -> Self {
        Self::new(api)
    }
}

/// Operation name carried by a facade error, if any.
pub fn failed_operation(err: &Error) -> Option<&'static str> {
    match err {
        Error::Facade { operation, .. } => Some(*operation),
        _ => None,
    }
}
