//! Order-Book Arbitrage Bot
//!
//! Polls the 0x order book for WETH/DAI bids, checks each fee-less, unfilled
//! order against a zero-slippage 1inch quote for the reverse swap, and settles
//! the first profitable one through the flash-loan contract.
//!
//! Startup: CLI args → .env → validated BotConfig → WS provider with signer
//! Run: ScanLoop ticks until one opportunity claims the gate, or SIGINT/SIGTERM
//!
//! Created: 2026-10-16

use alloy::network::EthereumWallet;
use alloy::providers::{ProviderBuilder, WsConnect};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use orderbook_arb_bot::arbitrage::{
    ChainSettlement, ExecutionCoordinator, OpportunityGate, ProfitabilityEvaluator, ScanLoop, SeenOrders,
};
use orderbook_arb_bot::config::{load_config, load_config_from_file};
use orderbook_arb_bot::logging::setup_logging;
use orderbook_arb_bot::orderbook::ZrxOrderSource;
use orderbook_arb_bot::quote::OneInchClient;
use orderbook_arb_bot::units::{format_units, to_base_units};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Order-book ↔ aggregator flash arbitrage bot
#[derive(Parser, Debug)]
#[command(name = "orderbook-arb-bot")]
struct Args {
    /// Env file with bot settings
    #[arg(long, env = "ENV_FILE", default_value = ".env")]
    env_file: String,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format (compact, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "compact")]
    log_format: String,

    /// Force dry run regardless of LIVE_MODE
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level, args.log_format.eq_ignore_ascii_case("json"));

    info!("===========================================");
    info!("   Order-Book Arbitrage Bot (0x v3 ↔ 1inch)");
    info!("===========================================");

    let mut config = if Path::new(&args.env_file).exists() {
        info!("Env file: {}", args.env_file);
        load_config_from_file(&args.env_file)?
    } else {
        warn!("Env file {} not found, using process environment", args.env_file);
        load_config()?
    };
    if args.dry_run {
        config.live_mode = false;
    }

    let pair = config.asset_pair();
    info!("Market: {} | route {}", pair, pair.route());
    info!(
        "Gas: {} units @ {} wei (limit {}) = {} {} per attempt",
        config.estimated_gas,
        config.gas_price_wei,
        config.gas_limit,
        format_units(config.estimated_gas_cost_wei(), pair.base.decimals),
        pair.base.symbol
    );
    info!("Flash loan: {} {}", config.flash_amount_tokens, pair.base.symbol);
    info!("Settlement contract: {}", config.settlement_contract);

    let signer: PrivateKeySigner = config
        .private_key
        .trim_start_matches("0x")
        .parse()
        .context("Invalid PRIVATE_KEY")?;
    info!("Wallet loaded: {}", signer.address());

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_ws(WsConnect::new(&config.rpc_url))
        .await
        .with_context(|| format!("Failed to connect to {}", config.rpc_url))?;
    let provider = Arc::new(provider);
    info!("Connected to {}", config.rpc_url);

    let http_timeout = Duration::from_millis(config.http_timeout_ms);
    let orders = Arc::new(ZrxOrderSource::new(
        provider.clone(),
        config.zrx_exchange,
        &config.zrx_api_url,
        config.orderbook_page_size,
        http_timeout,
    )?);
    let quotes = Arc::new(OneInchClient::new(&config.oneinch_api_url, http_timeout)?);
    let settlement = Arc::new(ChainSettlement::new(
        provider.clone(),
        config.settlement_contract,
        Duration::from_secs(config.receipt_timeout_secs),
    ));

    let registry = Arc::new(SeenOrders::new());
    let gate = Arc::new(OpportunityGate::new());
    let evaluator = Arc::new(ProfitabilityEvaluator::new(
        orders.clone(),
        quotes,
        registry.clone(),
        gate.clone(),
        config.settlement_contract,
        config.estimated_gas_cost_wei(),
        to_base_units(config.flash_amount_tokens, pair.base.decimals),
    ));
    let coordinator = Arc::new(ExecutionCoordinator::new(
        settlement,
        !config.live_mode,
        config.flash_amount_tokens,
        config.gas_limit,
        config.gas_price_wei,
    ));
    let scanner = Arc::new(ScanLoop::new(
        orders,
        evaluator,
        coordinator.clone(),
        gate.clone(),
        pair,
        Duration::from_millis(config.poll_interval_ms),
    ));

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;
    let signals_handle = signals.handle();

    let interrupted = tokio::select! {
        _ = scanner.clone().run() => false,
        sig = signals.next() => {
            log_signal(sig);
            true
        }
    };

    if !interrupted {
        // Let the winning evaluation finish its settlement, but stay interruptible
        tokio::select! {
            _ = scanner.drain() => {
                if coordinator.has_executed() && !coordinator.is_dry_run() {
                    info!("Watching settlement events (Ctrl+C to exit)");
                    signals.next().await;
                }
            }
            sig = signals.next() => {
                log_signal(sig);
                warn!("Exiting with settlement still pending; check the transaction on-chain");
            }
        }
    }

    info!("Orders evaluated: {} | opportunity claimed: {}", registry.len(), gate.is_claimed());

    signals_handle.close();
    info!("Bot stopped");
    Ok(())
}

fn log_signal(sig: Option<i32>) {
    match sig {
        Some(sig) => info!("Received signal {} - shutting down", sig),
        None => error!("Signal stream closed"),
    }
}
