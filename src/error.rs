//! Error types
//!
//! Failure kinds the core distinguishes. Bootstrap and adapter plumbing use
//! `anyhow` with context; these enums exist where callers branch on the kind.

use alloy::primitives::B256;
use thiserror::Error;

/// Fatal startup errors. Any of these prevents the scan loop from starting.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown asset symbol: {0}")]
    UnknownAsset(String),

    #[error("base asset {0} is not WETH; gas cost in wei cannot be netted against it")]
    NonNativeBase(String),

    #[error("{symbol} has {decimals} decimals; profit asset must use 18 to be comparable with gas cost in wei")]
    UnsupportedDecimals { symbol: String, decimals: u8 },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

/// Order-book and order-status lookup failures (transient; the unit of work is skipped).
#[derive(Error, Debug)]
pub enum OrderSourceError {
    #[error("order book request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("order book API responded with {status}")]
    Status { status: u16 },

    #[error("order book response undecodable: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("order status call failed: {0}")]
    Rpc(String),
}

/// Failures of the single settlement attempt. None of them are retried.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("settlement already attempted in this process")]
    AlreadyExecuted,

    #[error("transaction submission failed: {0}")]
    Submission(String),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    #[error("receipt unavailable for {tx_hash}: {reason}")]
    Confirmation { tx_hash: B256, reason: String },

    #[error("event subscription failed: {0}")]
    Subscription(String),
}
