//! One function per remote operation
//!
//! Each function checks its arguments, calls the [`ApiClient`], and decodes
//! the response through its schema. Argument checks that fail never reach the
//! network.

use rust_decimal::Decimal;
use tracing::info;

use crate::api::http::ApiClient;
use crate::api::schema::{address_family, decode, Issues};
use crate::api::types::{
    AgentBalances, AgentDetails, AgentProfile, BlockchainType, Leaderboard, Portfolio,
    SpecificChain, TokenPrice, TradeRequest, TradeResponse,
};
use crate::Result;

pub const PATH_PORTFOLIO: &str = "/agent/portfolio";
pub const PATH_PROFILE: &str = "/agent/profile";
pub const PATH_DETAILS: &str = "/agent/details";
pub const PATH_BALANCES: &str = "/agent/balances";
pub const PATH_PRICE: &str = "/price";
pub const PATH_TRADE: &str = "/trade/execute";
pub const PATH_LEADERBOARD: &str = "/competition/leaderboard";

pub async fn get_portfolio(api: &ApiClient) -> Result<Portfolio> {
    let body = api.get(PATH_PORTFOLIO, &[]).await?;
    Ok(decode(body)?)
}

pub async fn get_agent_profile(api: &ApiClient) -> Result<AgentProfile> {
    let body = api.get(PATH_PROFILE, &[]).await?;
    Ok(decode(body)?)
}

pub async fn get_agent_details(api: &ApiClient) -> Result<AgentDetails> {
    let body = api.get(PATH_DETAILS, &[]).await?;
    Ok(decode(body)?)
}

pub async fn get_agent_balances(api: &ApiClient, competition_id: &str) -> Result<AgentBalances> {
    let mut issues = Issues::new("AgentBalancesQuery");
    issues.non_empty("competitionId", competition_id);
    issues.finish()?;

    let query = [("competitionId", competition_id.to_string())];
    let body = api.get(PATH_BALANCES, &query).await?;
    Ok(decode(body)?)
}

/// Current price of `token`.
///
/// `chain` and `specific_chain` are forwarded only when given; otherwise the
/// service infers the chain from the address format.
pub async fn get_token_price(
    api: &ApiClient,
    token: &str,
    chain: Option<BlockchainType>,
    specific_chain: Option<SpecificChain>,
) -> Result<TokenPrice> {
    let mut issues = Issues::new("PriceQuery");
    let family = chain.or(specific_chain.map(|c| c.blockchain_type()));
    issues.address("token", token, family);
    if let (Some(chain), Some(specific)) = (chain, specific_chain) {
        if specific.blockchain_type() != chain {
            issues.push(
                "specificChain",
                format!("{} is not a {} chain", specific.name(), chain.name()),
            );
        }
    }
    issues.finish()?;

    let mut query = vec![("token", token.to_string())];
    if let Some(chain) = chain {
        query.push(("chain", chain.name().to_string()));
    }
    if let Some(specific) = specific_chain {
        query.push(("specificChain", specific.name().to_string()));
    }

    let body = api.get(PATH_PRICE, &query).await?;
    Ok(decode(body)?)
}

/// Check a trade before it is sent.
///
/// Token addresses must be well formed (and match any chain hint), the two
/// tokens must differ, and `amount` must be a strictly positive decimal.
pub fn validate_trade_request(request: &TradeRequest) -> Result<()> {
    let mut issues = Issues::new("TradeRequest");

    let from_family = request
        .from_chain
        .or(request.from_specific_chain.map(|c| c.blockchain_type()));
    let to_family = request
        .to_chain
        .or(request.to_specific_chain.map(|c| c.blockchain_type()));
    issues.address("fromToken", &request.from_token, from_family);
    issues.address("toToken", &request.to_token, to_family);

    if same_token(&request.from_token, &request.to_token) {
        issues.push("toToken", "must differ from fromToken");
    }

    check_amount(&mut issues, &request.amount);

    if let Some(reason) = &request.reason {
        issues.non_empty("reason", reason);
    }

    issues.finish()?;
    Ok(())
}

/// `amount` must be digits with an optional fractional part, exactly
/// representable, and strictly positive. It is sent as written.
fn check_amount(issues: &mut Issues, amount: &str) {
    if !is_plain_decimal(amount) {
        issues.push(
            "amount",
            format!("expected a positive decimal string like \"10.5\", got {:?}", amount),
        );
        return;
    }
    match Decimal::from_str_exact(amount) {
        Ok(value) if value > Decimal::ZERO => {}
        Ok(value) => issues.push("amount", format!("must be greater than zero, got {}", value)),
        Err(e) => issues.push("amount", format!("{:?} cannot be represented exactly: {}", amount, e)),
    }
}

fn is_plain_decimal(value: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match value.split_once('.') {
        Some((whole, fraction)) => digits(whole) && digits(fraction),
        None => digits(value),
    }
}

/// EVM addresses compare case-insensitively; base58 addresses are exact.
fn same_token(a: &str, b: &str) -> bool {
    match (address_family(a), address_family(b)) {
        (Some(BlockchainType::Evm), Some(BlockchainType::Evm)) => a.eq_ignore_ascii_case(b),
        _ => a == b,
    }
}

/// Execute a trade. Exactly one POST is issued when the request is valid.
///
/// A 2xx response that fails validation is surfaced as a validation error;
/// whether the trade executed is then unknown to the client.
/// A 5xx reply is retried by the transport; a timed-out POST is not, so the
/// trade is never resent after the server may have received it.
pub async fn execute_trade(api: &ApiClient, request: &TradeRequest) -> Result<TradeResponse> {
    validate_trade_request(request)?;

    info!(
        from_token = %request.from_token,
        to_token = %request.to_token,
        amount = %request.amount,
        "Executing trade"
    );

    let body = api.post(PATH_TRADE, request).await?;
    let response: TradeResponse = decode(body)?;

    info!(
        transaction_id = %response.transaction.id,
        success = response.success,
        to_amount = response.transaction.to_amount,
        "Trade executed"
    );
    Ok(response)
}

/// Ranked entries for the active competition, or for `competition_id` when given.
pub async fn get_leaderboard(api: &ApiClient, competition_id: Option<&str>) -> Result<Leaderboard> {
    let query: Vec<(&str, String)> = competition_id
        .map(|id| vec![("competitionId", id.to_string())])
        .unwrap_or_default();
    let body = api.get(PATH_LEADERBOARD, &query).await?;
    Ok(decode(body)?)
}
