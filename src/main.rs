//! Competition Trading Agent CLI
//!
//! Command-line interface for the competition API and the trading agent.

use clap::{Parser, Subcommand};
use competition_trading_agent::api::{BlockchainType, SpecificChain};
use competition_trading_agent::tokens::registry;
use competition_trading_agent::{
    Config, LlmEndpoint, OpenAiAgent, Result, TradeRequest, TradingClient, TradingWorkflow,
    API_KEY_ENV,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "trade-agent")]
#[command(about = "Trading-competition API client and AI trading agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the agent's portfolio
    Portfolio,

    /// Get the current price of a token
    Price {
        /// Token address or well-known symbol (e.g. USDC)
        token: String,

        /// Chain family (evm, svm)
        #[arg(long)]
        chain: Option<BlockchainType>,

        /// Specific chain (eth, base, arbitrum, svm, ...)
        #[arg(long)]
        specific_chain: Option<SpecificChain>,
    },

    /// Execute a trade
    Trade {
        /// Token to sell (address or well-known symbol)
        #[arg(long)]
        from: String,

        /// Token to buy (address or well-known symbol)
        #[arg(long)]
        to: String,

        /// Amount of the sold token, as a decimal
        #[arg(long)]
        amount: String,

        /// Reason recorded with the trade
        #[arg(long)]
        reason: Option<String>,

        /// Chain of the sold token
        #[arg(long)]
        from_chain: Option<SpecificChain>,

        /// Chain of the bought token
        #[arg(long)]
        to_chain: Option<SpecificChain>,
    },

    /// Show the agent profile
    Profile,

    /// Show agent and owner details
    Details,

    /// Show token balances in a competition
    Balances {
        /// Competition id
        competition_id: String,
    },

    /// Show a competition leaderboard
    Leaderboard {
        /// Competition id (defaults to the active competition)
        #[arg(long)]
        competition: Option<String>,
    },

    /// Let the agent decide and place a trade
    Run {
        /// Instruction for the agent (defaults to a 10 USDC -> WETH trade)
        #[arg(short, long)]
        instruction: Option<String>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    // stdout carries command output, logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    if let Commands::Config = cli.command {
        return show_config(&config);
    }

    let client = TradingClient::from_config(&config.api)?;

    match cli.command {
        Commands::Portfolio => print_json(&client.get_portfolio().await?),
        Commands::Price {
            token,
            chain,
            specific_chain,
        } => {
            let token = registry().resolve(&token, specific_chain.unwrap_or(SpecificChain::Eth));
            print_json(&client.get_token_price(&token, chain, specific_chain).await?)
        }
        Commands::Trade {
            from,
            to,
            amount,
            reason,
            from_chain,
            to_chain,
        } => {
            let tokens = registry();
            let mut request = TradeRequest::new(
                tokens.resolve(&from, from_chain.unwrap_or(SpecificChain::Eth)),
                tokens.resolve(&to, to_chain.unwrap_or(SpecificChain::Eth)),
                amount,
            );
            if let Some(reason) = reason {
                request = request.with_reason(reason);
            }
            if let Some(chain) = from_chain {
                request = request.with_from_chain(chain);
            }
            if let Some(chain) = to_chain {
                request = request.with_to_chain(chain);
            }
            print_json(&client.execute_trade(&request).await?)
        }
        Commands::Profile => print_json(&client.get_agent_profile().await?),
        Commands::Details => print_json(&client.get_agent_details().await?),
        Commands::Balances { competition_id } => {
            print_json(&client.get_agent_balances(&competition_id).await?)
        }
        Commands::Leaderboard { competition } => {
            print_json(&client.get_leaderboard(competition.as_deref()).await?)
        }
        Commands::Run { instruction } => run_workflow(&config, client, instruction).await,
        Commands::Config => show_config(&config),
    }
}

async fn run_workflow(
    config: &Config,
    client: TradingClient,
    instruction: Option<String>,
) -> Result<()> {
    let agent = OpenAiAgent::from_env(&config.llm)?;
    tracing::info!(model = %agent.model(), api = %client.api().base_url(), "Starting trading agent");

    let mut workflow = TradingWorkflow::new(Arc::new(agent), client)?;
    if let Some(instruction) = instruction {
        workflow = workflow.with_instruction(instruction);
    }

    let answer = workflow.run().await?;
    println!("{}", answer);
    Ok(())
}

/// Print the effective configuration. Keys are reported as set or not, never shown.
fn show_config(config: &Config) -> Result<()> {
    let api_key_set = std::env::var(API_KEY_ENV)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);
    let llm_endpoint = LlmEndpoint::from_env().map(|e| e.base_url);

    print_json(&serde_json::json!({
        "config": config,
        "secrets": {
            API_KEY_ENV: if api_key_set { "<redacted>" } else { "<unset>" },
        },
        "llm_endpoint": llm_endpoint,
    }))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
