//! Configuration management
//! Load settings from a .env file into a validated `BotConfig`.
//!
//! Every setting below is read once at startup. Missing or malformed required
//! settings are fatal: the scan loop never starts on a bad configuration.

use crate::error::ConfigError;
use crate::types::Asset;
use alloy::primitives::{address, Address};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

// Re-export BotConfig for external access
pub use crate::types::BotConfig;

/// 0x Exchange v3 on Ethereum mainnet
pub const DEFAULT_ZRX_EXCHANGE: Address = address!("61935cbdd02287b511119ddb11aeb42f1593b7ef");

pub const DEFAULT_ZRX_API_URL: &str = "https://api.0x.org";
pub const DEFAULT_ONEINCH_API_URL: &str = "https://api.1inch.exchange";

/// Default scan interval (3 seconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

/// How long to wait for the settlement receipt before giving up
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 300;

/// Gas is paid in ETH, so profit must be measured in its wrapped form
pub const WRAPPED_NATIVE_SYMBOL: &str = "WETH";

/// Assets the bot can trade: symbol → (mainnet address, decimals)
static ASSETS: Lazy<HashMap<&'static str, (Address, u8)>> = Lazy::new(|| {
    HashMap::from([
        ("DAI", (address!("6b175474e89094c44da98b954eedeac495271d0f"), 18)),
        ("WETH", (address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"), 18)),
        ("USDC", (address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"), 6)),
    ])
});

/// Look up an asset by symbol (case-insensitive)
pub fn asset(symbol: &str) -> Result<Asset, ConfigError> {
    let symbol = symbol.trim().to_uppercase();
    ASSETS
        .get(symbol.as_str())
        .map(|(addr, decimals)| Asset::new(&symbol, *addr, *decimals))
        .ok_or(ConfigError::UnknownAsset(symbol))
}

/// Load from `.env` in the working directory (or the process environment)
pub fn load_config() -> Result<BotConfig> {
    dotenv::dotenv().ok();
    let config = config_from_env()?;
    Ok(config)
}

/// Load from a specific env file. The file must exist.
pub fn load_config_from_file(path: &str) -> Result<BotConfig> {
    dotenv::from_filename(path).with_context(|| format!("Failed to load env file {}", path))?;
    let config = config_from_env()?;
    Ok(config)
}

/// Build and validate a config from the current process environment
pub fn config_from_env() -> Result<BotConfig, ConfigError> {
    config_from_lookup(|key| std::env::var(key).ok())
}

/// Build and validate a config from an arbitrary key lookup
pub fn config_from_lookup<F>(lookup: F) -> Result<BotConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &'static str| -> Result<String, ConfigError> {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(key))
    };
    let optional = |key: &'static str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let config = BotConfig {
        rpc_url: required("RPC_URL")?,
        private_key: required("PRIVATE_KEY")?,

        settlement_contract: parse_address("CONTRACT_ADDRESS", &required("CONTRACT_ADDRESS")?)?,
        zrx_exchange: match optional("ZRX_EXCHANGE_ADDRESS") {
            Some(v) => parse_address("ZRX_EXCHANGE_ADDRESS", &v)?,
            None => DEFAULT_ZRX_EXCHANGE,
        },

        zrx_api_url: optional("ZRX_API_URL").unwrap_or_else(|| DEFAULT_ZRX_API_URL.to_string()),
        oneinch_api_url: optional("ONEINCH_API_URL")
            .unwrap_or_else(|| DEFAULT_ONEINCH_API_URL.to_string()),
        http_timeout_ms: parse_or("HTTP_TIMEOUT_MS", optional("HTTP_TIMEOUT_MS"), 5_000)?,
        orderbook_page_size: parse_or("ORDERBOOK_PAGE_SIZE", optional("ORDERBOOK_PAGE_SIZE"), 1_000)?,

        base_asset: asset(&optional("BASE_ASSET").unwrap_or_else(|| "WETH".to_string()))?,
        quote_asset: asset(&optional("QUOTE_ASSET").unwrap_or_else(|| "DAI".to_string()))?,

        estimated_gas: parse_required("ESTIMATED_GAS", &required("ESTIMATED_GAS")?)?,
        gas_price_wei: gwei_to_wei("GAS_PRICE", &required("GAS_PRICE")?)?,
        gas_limit: parse_required("GAS_LIMIT", &required("GAS_LIMIT")?)?,

        flash_amount_tokens: parse_or("FLASH_AMOUNT", optional("FLASH_AMOUNT"), 10)?,

        poll_interval_ms: parse_or(
            "POLLING_INTERVAL",
            optional("POLLING_INTERVAL"),
            DEFAULT_POLL_INTERVAL_MS,
        )?,

        receipt_timeout_secs: parse_or(
            "RECEIPT_TIMEOUT_SECS",
            optional("RECEIPT_TIMEOUT_SECS"),
            DEFAULT_RECEIPT_TIMEOUT_SECS,
        )?,

        live_mode: parse_or("LIVE_MODE", optional("LIVE_MODE"), false)?,
    };

    validate(&config)?;
    Ok(config)
}

/// Reject configurations that would make the scan loop meaningless or unsafe
pub fn validate(config: &BotConfig) -> Result<(), ConfigError> {
    if config.base_asset == config.quote_asset {
        return Err(ConfigError::Inconsistent(format!(
            "BASE_ASSET and QUOTE_ASSET are both {}",
            config.base_asset.symbol
        )));
    }

    // Gas cost is in wei; profit is in base-asset units. Only comparable for WETH.
    if config.base_asset.symbol != WRAPPED_NATIVE_SYMBOL {
        return Err(ConfigError::NonNativeBase(config.base_asset.symbol.clone()));
    }
    if config.base_asset.decimals != 18 {
        return Err(ConfigError::UnsupportedDecimals {
            symbol: config.base_asset.symbol.clone(),
            decimals: config.base_asset.decimals,
        });
    }

    if !(config.rpc_url.starts_with("ws://") || config.rpc_url.starts_with("wss://")) {
        return Err(ConfigError::Invalid {
            key: "RPC_URL",
            value: config.rpc_url.clone(),
            reason: "a ws:// or wss:// endpoint is required for event subscriptions".to_string(),
        });
    }

    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Invalid {
            key: "POLLING_INTERVAL",
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    if config.receipt_timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            key: "RECEIPT_TIMEOUT_SECS",
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    if config.gas_limit < config.estimated_gas {
        return Err(ConfigError::Inconsistent(format!(
            "GAS_LIMIT ({}) is below ESTIMATED_GAS ({})",
            config.gas_limit, config.estimated_gas
        )));
    }

    if config.flash_amount_tokens == 0 {
        return Err(ConfigError::Invalid {
            key: "FLASH_AMOUNT",
            value: "0".to_string(),
            reason: "flash loan size must be positive".to_string(),
        });
    }

    Ok(())
}

fn parse_address(key: &'static str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value).map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_required<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => parse_required(key, &v),
        None => Ok(default),
    }
}

/// Gas price in gwei (decimals allowed, e.g. "1.5") → wei
pub fn gwei_to_wei(key: &'static str, value: &str) -> Result<u128, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let gwei = Decimal::from_str(value).map_err(|e| invalid(&e.to_string()))?;
    if gwei.is_sign_negative() {
        return Err(invalid("must not be negative"));
    }
    let wei = gwei
        .checked_mul(Decimal::from(1_000_000_000u64))
        .ok_or_else(|| invalid("overflow"))?;
    if wei.fract() != Decimal::ZERO {
        return Err(invalid("finer than 1 wei"));
    }
    wei.to_u128().ok_or_else(|| invalid("out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("RPC_URL", "wss://mainnet.example/ws"),
            ("PRIVATE_KEY", "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"),
            ("CONTRACT_ADDRESS", "0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            ("ESTIMATED_GAS", "1000000"),
            ("GAS_PRICE", "50"),
            ("GAS_LIMIT", "3000000"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<BotConfig, ConfigError> {
        config_from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.base_asset.symbol, "WETH");
        assert_eq!(config.quote_asset.symbol, "DAI");
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.flash_amount_tokens, 10);
        assert_eq!(config.zrx_exchange, DEFAULT_ZRX_EXCHANGE);
        assert!(!config.live_mode);
        assert_eq!(config.receipt_timeout_secs, DEFAULT_RECEIPT_TIMEOUT_SECS);
        assert_eq!(config.gas_price_wei, 50_000_000_000);
    }

    #[test]
    fn test_gas_cost_is_units_times_price() {
        let config = load(&base_env()).unwrap();
        assert_eq!(
            config.estimated_gas_cost_wei(),
            alloy::primitives::U256::from(1_000_000u64 * 50_000_000_000u64)
        );
    }

    #[test]
    fn test_missing_required_is_fatal() {
        let mut env = base_env();
        env.remove("CONTRACT_ADDRESS");
        assert!(matches!(load(&env), Err(ConfigError::Missing("CONTRACT_ADDRESS"))));
    }

    #[test]
    fn test_malformed_number_is_fatal() {
        let mut env = base_env();
        env.insert("ESTIMATED_GAS", "lots");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { key: "ESTIMATED_GAS", .. })
        ));
    }

    #[test]
    fn test_non_18_decimal_base_asset_rejected() {
        let mut env = base_env();
        env.insert("BASE_ASSET", "USDC");
        assert!(matches!(load(&env), Err(ConfigError::NonNativeBase(_))));

        let mut config = load(&base_env()).unwrap();
        config.base_asset.decimals = 6;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::UnsupportedDecimals { decimals: 6, .. })
        ));
    }

    #[test]
    fn test_non_native_base_asset_rejected() {
        let mut env = base_env();
        env.insert("BASE_ASSET", "DAI");
        env.insert("QUOTE_ASSET", "WETH");
        assert!(matches!(load(&env), Err(ConfigError::NonNativeBase(symbol)) if symbol == "DAI"));
    }

    #[test]
    fn test_zero_receipt_timeout_rejected() {
        let mut env = base_env();
        env.insert("RECEIPT_TIMEOUT_SECS", "0");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { key: "RECEIPT_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn test_unknown_asset_rejected() {
        let mut env = base_env();
        env.insert("QUOTE_ASSET", "SHIB");
        assert!(matches!(load(&env), Err(ConfigError::UnknownAsset(_))));
    }

    #[test]
    fn test_http_rpc_rejected() {
        let mut env = base_env();
        env.insert("RPC_URL", "https://mainnet.example");
        assert!(matches!(load(&env), Err(ConfigError::Invalid { key: "RPC_URL", .. })));
    }

    #[test]
    fn test_gas_limit_below_estimate_rejected() {
        let mut env = base_env();
        env.insert("GAS_LIMIT", "21000");
        assert!(matches!(load(&env), Err(ConfigError::Inconsistent(_))));
    }

    #[test]
    fn test_fractional_gwei() {
        assert_eq!(gwei_to_wei("GAS_PRICE", "1.5").unwrap(), 1_500_000_000);
        assert!(gwei_to_wei("GAS_PRICE", "0.0000000001").is_err());
        assert!(gwei_to_wei("GAS_PRICE", "-1").is_err());
    }

    #[test]
    fn test_asset_lookup_case_insensitive() {
        let dai = asset("dai").unwrap();
        assert_eq!(dai.symbol, "DAI");
        assert_eq!(dai.decimals, 18);
    }
}
