//! Wire types for the competition API
//!
//! Field names follow the API's camelCase JSON. Every response record
//! implements [`Schema`] so it can only be constructed through
//! [`decode`](crate::api::schema::decode).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::schema::{self, Issues, Schema};

/// Chain family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockchainType {
    Evm,
    Svm,
}

impl BlockchainType {
    pub fn name(&self) -> &'static str {
        match self {
            BlockchainType::Evm => "evm",
            BlockchainType::Svm => "svm",
        }
    }
}

impl std::str::FromStr for BlockchainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "evm" => Ok(BlockchainType::Evm),
            "svm" | "solana" => Ok(BlockchainType::Svm),
            other => Err(format!("unknown chain type: {}", other)),
        }
    }
}

/// Concrete network within a chain family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecificChain {
    Eth,
    Polygon,
    Bsc,
    Arbitrum,
    Optimism,
    Avalanche,
    Base,
    Linea,
    Zksync,
    Scroll,
    Mantle,
    Svm,
}

impl SpecificChain {
    pub fn name(&self) -> &'static str {
        match self {
            SpecificChain::Eth => "eth",
            SpecificChain::Polygon => "polygon",
            SpecificChain::Bsc => "bsc",
            SpecificChain::Arbitrum => "arbitrum",
            SpecificChain::Optimism => "optimism",
            SpecificChain::Avalanche => "avalanche",
            SpecificChain::Base => "base",
            SpecificChain::Linea => "linea",
            SpecificChain::Zksync => "zksync",
            SpecificChain::Scroll => "scroll",
            SpecificChain::Mantle => "mantle",
            SpecificChain::Svm => "svm",
        }
    }

    pub fn blockchain_type(&self) -> BlockchainType {
        match self {
            SpecificChain::Svm => BlockchainType::Svm,
            _ => BlockchainType::Evm,
        }
    }
}

impl std::str::FromStr for SpecificChain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chain = match s.to_lowercase().as_str() {
            "eth" | "ethereum" | "mainnet" => SpecificChain::Eth,
            "polygon" => SpecificChain::Polygon,
            "bsc" => SpecificChain::Bsc,
            "arbitrum" => SpecificChain::Arbitrum,
            "optimism" => SpecificChain::Optimism,
            "avalanche" => SpecificChain::Avalanche,
            "base" => SpecificChain::Base,
            "linea" => SpecificChain::Linea,
            "zksync" => SpecificChain::Zksync,
            "scroll" => SpecificChain::Scroll,
            "mantle" => SpecificChain::Mantle,
            "svm" | "solana" => SpecificChain::Svm,
            other => return Err(format!("unknown chain: {}", other)),
        };
        Ok(chain)
    }
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// One token position in a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    /// Token address
    #[serde(alias = "address")]
    pub token: String,
    #[serde(default)]
    pub symbol: Option<String>,
    pub chain: BlockchainType,
    #[serde(default)]
    pub specific_chain: Option<String>,
    #[serde(deserialize_with = "schema::number")]
    pub amount: f64,
    #[serde(deserialize_with = "schema::number")]
    pub price: f64,
    #[serde(deserialize_with = "schema::number")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(deserialize_with = "schema::number")]
    pub total_value: f64,
    #[serde(default)]
    pub tokens: Vec<TokenHolding>,
    /// Where the valuation came from (e.g. live prices or a snapshot)
    #[serde(default)]
    pub source: Option<String>,
}

impl Portfolio {
    /// Sum of the individual holding values.
    pub fn holdings_total(&self) -> f64 {
        self.tokens.iter().map(|t| t.value).sum()
    }

    /// Whether `total_value` matches the holdings within `tolerance`.
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        (self.total_value - self.holdings_total()).abs() <= tolerance
    }
}

impl Schema for Portfolio {
    const NAME: &'static str = "Portfolio";

    fn check(&self, issues: &mut Issues) {
        issues.finite("totalValue", self.total_value);
        for (i, holding) in self.tokens.iter().enumerate() {
            issues.address(
                format!("tokens[{}].token", i),
                &holding.token,
                Some(holding.chain),
            );
            issues.finite(format!("tokens[{}].amount", i), holding.amount);
            issues.finite(format!("tokens[{}].price", i), holding.price);
            issues.finite(format!("tokens[{}].value", i), holding.value);
        }
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub chain: Option<BlockchainType>,
    #[serde(default)]
    pub specific_chain: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(deserialize_with = "schema::number")]
    pub price: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Schema for TokenPrice {
    const NAME: &'static str = "TokenPrice";

    fn check(&self, issues: &mut Issues) {
        issues.finite("price", self.price);
        if let Some(token) = &self.token {
            issues.address("token", token, self.chain);
        }
    }
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

/// Arguments for `POST /trade/execute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub from_token: String,
    pub to_token: String,
    /// Human-readable decimal amount of `from_token` to sell
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_chain: Option<BlockchainType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_chain: Option<BlockchainType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_specific_chain: Option<SpecificChain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_specific_chain: Option<SpecificChain>,
}

impl TradeRequest {
    pub fn new(
        from_token: impl Into<String>,
        to_token: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            from_token: from_token.into(),
            to_token: to_token.into(),
            amount: amount.into(),
            reason: None,
            from_chain: None,
            to_chain: None,
            from_specific_chain: None,
            to_specific_chain: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Hint the source chain; the family is derived from the specific chain.
    pub fn with_from_chain(mut self, chain: SpecificChain) -> Self {
        self.from_chain = Some(chain.blockchain_type());
        self.from_specific_chain = Some(chain);
        self
    }

    /// Hint the destination chain; the family is derived from the specific chain.
    pub fn with_to_chain(mut self, chain: SpecificChain) -> Self {
        self.to_chain = Some(chain.blockchain_type());
        self.to_specific_chain = Some(chain);
        self
    }
}

/// Transaction record returned for an executed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub competition_id: Option<String>,
    pub from_token: String,
    pub to_token: String,
    #[serde(deserialize_with = "schema::number")]
    pub from_amount: f64,
    #[serde(deserialize_with = "schema::number")]
    pub to_amount: f64,
    #[serde(default, deserialize_with = "schema::optional_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "schema::optional_number")]
    pub trade_amount_usd: Option<f64>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub from_chain: Option<BlockchainType>,
    #[serde(default)]
    pub to_chain: Option<BlockchainType>,
    #[serde(default)]
    pub from_specific_chain: Option<String>,
    #[serde(default)]
    pub to_specific_chain: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    pub success: bool,
    pub transaction: Transaction,
}

impl Schema for TradeResponse {
    const NAME: &'static str = "TradeResponse";

    fn check(&self, issues: &mut Issues) {
        let tx = &self.transaction;
        issues.non_empty("transaction.id", &tx.id);
        issues.address("transaction.fromToken", &tx.from_token, tx.from_chain);
        issues.address("transaction.toToken", &tx.to_token, tx.to_chain);
        issues.finite("transaction.fromAmount", tx.from_amount);
        issues.finite("transaction.toAmount", tx.to_amount);
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AgentInfo {
    fn check(&self, prefix: &str, issues: &mut Issues) {
        issues.non_empty(format!("{}.id", prefix), &self.id);
        if let Some(wallet) = &self.wallet_address {
            issues.address(format!("{}.walletAddress", prefix), wallet, None);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// Competition performance summary for the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    #[serde(default)]
    pub completed_competitions: u64,
    #[serde(default)]
    pub total_trades: u64,
    #[serde(default)]
    pub best_placement: Option<u64>,
    #[serde(default, deserialize_with = "schema::optional_number")]
    pub total_pnl_usd: Option<f64>,
    #[serde(default, deserialize_with = "schema::optional_number")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub agent: AgentInfo,
    #[serde(default)]
    pub owner: Option<OwnerInfo>,
    #[serde(default)]
    pub stats: Option<AgentStats>,
}

impl Schema for AgentProfile {
    const NAME: &'static str = "AgentProfile";

    fn check(&self, issues: &mut Issues) {
        self.agent.check("agent", issues);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetails {
    pub agent: AgentInfo,
    pub owner: OwnerInfo,
}

impl Schema for AgentDetails {
    const NAME: &'static str = "AgentDetails";

    fn check(&self, issues: &mut Issues) {
        self.agent.check("agent", issues);
        issues.non_empty("owner.id", &self.owner.id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub token_address: String,
    #[serde(deserialize_with = "schema::number")]
    pub amount: f64,
    #[serde(default)]
    pub symbol: Option<String>,
    pub chain: BlockchainType,
    #[serde(default)]
    pub specific_chain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBalances {
    #[serde(default)]
    pub agent_id: Option<String>,
    pub balances: Vec<TokenBalance>,
}

impl AgentBalances {
    pub fn get(&self, token_address: &str) -> Option<&TokenBalance> {
        self.balances
            .iter()
            .find(|b| b.token_address.eq_ignore_ascii_case(token_address))
    }
}

impl Schema for AgentBalances {
    const NAME: &'static str = "AgentBalances";

    fn check(&self, issues: &mut Issues) {
        for (i, balance) in self.balances.iter().enumerate() {
            issues.address(
                format!("balances[{}].tokenAddress", i),
                &balance.token_address,
                Some(balance.chain),
            );
            issues.finite(format!("balances[{}].amount", i), balance.amount);
        }
    }
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u64,
    pub agent_id: String,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(deserialize_with = "schema::number")]
    pub portfolio_value: f64,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub deactivation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    #[serde(default)]
    pub competition: Option<CompetitionSummary>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn entry_for(&self, agent_id: &str) -> Option<&LeaderboardEntry> {
        self.leaderboard.iter().find(|e| e.agent_id == agent_id)
    }
}

impl Schema for Leaderboard {
    const NAME: &'static str = "Leaderboard";

    fn check(&self, issues: &mut Issues) {
        for (i, entry) in self.leaderboard.iter().enumerate() {
            issues.non_empty(format!("leaderboard[{}].agentId", i), &entry.agent_id);
            issues.finite(format!("leaderboard[{}].portfolioValue", i), entry.portfolio_value);
        }
    }
}
