//! Order-Book Arbitrage Bot Library
//!
//! Scans 0x SRA v3 bids for fee-less orders that can be filled and swapped back
//! through 1inch at a profit, then settles the first one found in a single
//! flash-loan transaction.
//!
//! Created: 2026-10-16

pub mod arbitrage;
pub mod config;
pub mod contracts;
pub mod error;
pub mod logging;
pub mod orderbook;
pub mod quote;
pub mod types;
pub mod units;

// Re-export commonly used types
pub use config::{load_config, load_config_from_file};
pub use error::{ConfigError, ExecutionError, OrderSourceError};
pub use types::{Asset, AssetPair, BotConfig, Opportunity, Order, OrderState, OrderStatus, Quote};
