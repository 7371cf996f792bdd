//! Swap quote sources
//!
//! A quote prices the aggregator leg of an opportunity and carries the swap
//! calldata the settlement contract replays. Any failure means "no quote".

pub mod oneinch;

pub use oneinch::OneInchClient;

use crate::types::Quote;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Quote swapping `amount` of `from` into `to`, executed by `from_address`.
    /// Returns `None` when the aggregator cannot or will not quote.
    async fn fetch_quote(&self, from: Address, to: Address, from_address: Address, amount: U256) -> Option<Quote>;
}
