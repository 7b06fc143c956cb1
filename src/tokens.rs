//! Well-known competition tokens
//!
//! Addresses of the tokens agents usually trade, so callers can refer to
//! them by symbol. EVM addresses are kept as alloy [`Address`] constants and
//! rendered in checksummed form; Solana mints are plain base58 strings.

use alloy::primitives::{address, Address};
use std::collections::HashMap;

use crate::api::schema::is_evm_address;
use crate::api::SpecificChain;

/// Token metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// Token symbol (e.g., "USDC", "WETH")
    pub symbol: &'static str,
    pub chain: SpecificChain,
    /// Contract address or mint, as the API expects it
    pub address: String,
    pub decimals: u8,
    /// Whether this is a stablecoin (pegged to $1)
    pub is_stablecoin: bool,
}

/// Well-known token addresses per chain
pub mod addresses {
    use super::*;

    // === Ethereum Mainnet ===
    pub const USDC_ETH: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    pub const USDT_ETH: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");
    pub const DAI_ETH: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
    pub const WETH_ETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    pub const WBTC_ETH: Address = address!("2260fac5e5542a773aa44fbcfedf7c193bc2c599");

    // === Polygon ===
    pub const USDC_POLYGON: Address = address!("3c499c542cef5e3811e1192ce70d8cc03d5c3359");
    pub const WETH_POLYGON: Address = address!("7ceb23fd6bc0add59e62ac25578270cff1b9f619");

    // === Arbitrum ===
    pub const USDC_ARB: Address = address!("af88d065e77c8cc2239327c5edb3a432268e5831");
    pub const WETH_ARB: Address = address!("82af49447d8a07e3bd95bd0d56f35241523fbab1");

    // === Optimism ===
    pub const USDC_OPT: Address = address!("0b2c639c533813f4aa9d7837caf62653d097ff85");
    pub const WETH_OPT: Address = address!("4200000000000000000000000000000000000006");

    // === Base ===
    pub const USDC_BASE: Address = address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913");
    pub const WETH_BASE: Address = address!("4200000000000000000000000000000000000006");

    // === Solana ===
    pub const USDC_SVM: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    pub const SOL_SVM: &str = "So11111111111111111111111111111111111111112";
}

/// Token registry providing lookups by symbol or address
pub struct TokenRegistry {
    tokens: Vec<TokenInfo>,
    by_symbol: HashMap<(SpecificChain, String), usize>,
}

impl TokenRegistry {
    /// Create a new token registry with all known tokens
    pub fn new() -> Self {
        use addresses::*;

        let evm = |symbol, chain, addr: Address, decimals, is_stablecoin| TokenInfo {
            symbol,
            chain,
            address: addr.to_string(),
            decimals,
            is_stablecoin,
        };

        let tokens = vec![
            evm("USDC", SpecificChain::Eth, USDC_ETH, 6, true),
            evm("USDT", SpecificChain::Eth, USDT_ETH, 6, true),
            evm("DAI", SpecificChain::Eth, DAI_ETH, 18, true),
            evm("WETH", SpecificChain::Eth, WETH_ETH, 18, false),
            evm("WBTC", SpecificChain::Eth, WBTC_ETH, 8, false),
            evm("USDC", SpecificChain::Polygon, USDC_POLYGON, 6, true),
            evm("WETH", SpecificChain::Polygon, WETH_POLYGON, 18, false),
            evm("USDC", SpecificChain::Arbitrum, USDC_ARB, 6, true),
            evm("WETH", SpecificChain::Arbitrum, WETH_ARB, 18, false),
            evm("USDC", SpecificChain::Optimism, USDC_OPT, 6, true),
            evm("WETH", SpecificChain::Optimism, WETH_OPT, 18, false),
            evm("USDC", SpecificChain::Base, USDC_BASE, 6, true),
            evm("WETH", SpecificChain::Base, WETH_BASE, 18, false),
            TokenInfo {
                symbol: "USDC",
                chain: SpecificChain::Svm,
                address: USDC_SVM.to_string(),
                decimals: 6,
                is_stablecoin: true,
            },
            TokenInfo {
                symbol: "SOL",
                chain: SpecificChain::Svm,
                address: SOL_SVM.to_string(),
                decimals: 9,
                is_stablecoin: false,
            },
        ];

        let by_symbol = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| ((t.chain, t.symbol.to_ascii_uppercase()), i))
            .collect();

        Self { tokens, by_symbol }
    }

    /// Look up a token by symbol on a chain (symbol is case-insensitive)
    pub fn by_symbol(&self, symbol: &str, chain: SpecificChain) -> Option<&TokenInfo> {
        self.by_symbol
            .get(&(chain, symbol.to_ascii_uppercase()))
            .map(|&i| &self.tokens[i])
    }

    /// Look up a token by address. EVM addresses compare case-insensitively
    /// and may be shared across chains, so the first match wins.
    pub fn by_address(&self, address: &str) -> Option<&TokenInfo> {
        if is_evm_address(address) {
            self.tokens
                .iter()
                .find(|t| t.address.eq_ignore_ascii_case(address))
        } else {
            self.tokens.iter().find(|t| t.address == address)
        }
    }

    pub fn on_chain(&self, chain: SpecificChain) -> impl Iterator<Item = &TokenInfo> {
        self.tokens.iter().filter(move |t| t.chain == chain)
    }

    /// Turn a symbol into its address on `chain`; anything that is not a
    /// known symbol is returned unchanged for the API to validate.
    pub fn resolve(&self, token: &str, chain: SpecificChain) -> String {
        self.by_symbol(token, chain)
            .map(|t| t.address.clone())
            .unwrap_or_else(|| token.to_string())
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global token registry (lazy initialized)
static REGISTRY: std::sync::OnceLock<TokenRegistry> = std::sync::OnceLock::new();

/// Get the global token registry
pub fn registry() -> &'static TokenRegistry {
    REGISTRY.get_or_init(TokenRegistry::new)
}
