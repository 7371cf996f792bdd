//! Order Source
//!
//! Resting orders from the primary venue (0x SRA v3 order book) and their
//! on-chain status. The core only sees the `OrderSource` trait.

pub mod zrx;

pub use zrx::{erc20_asset_data, ZrxOrderSource};

use crate::error::OrderSourceError;
use crate::types::{Asset, Order, OrderStatus};
use async_trait::async_trait;

#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Bids for `base/quote` (maker pays quote, taker pays base). Read-only snapshot.
    async fn fetch_order_book(&self, base: &Asset, quote: &Asset) -> Result<Vec<Order>, OrderSourceError>;

    /// On-chain status and filled amount of a single order
    async fn fetch_order_status(&self, order: &Order) -> Result<OrderStatus, OrderSourceError>;
}
