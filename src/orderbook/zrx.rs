//! 0x SRA v3 Order Source
//!
//! Order book: `GET {api}/sra/v3/orderbook?baseAssetData=..&quoteAssetData=..&perPage=N`
//! Order status: `Exchange.getOrderInfo(order)` over RPC.
//!
//! Bids are sorted by the API in descending price order. Records that fail to
//! decode are skipped, not fatal for the whole snapshot.

use super::OrderSource;
use crate::contracts::IZrxExchange;
use crate::error::OrderSourceError;
use crate::types::{Asset, Order, OrderState, OrderStatus};
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// ERC20Token(address) asset proxy id
const ERC20_PROXY_ID: [u8; 4] = [0xf4, 0x72, 0x61, 0xb0];

/// Encode an ERC-20 token as 0x v3 asset data: proxy id ++ left-padded address
pub fn erc20_asset_data(token: Address) -> Bytes {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&ERC20_PROXY_ID);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(token.as_slice());
    Bytes::from(data)
}

#[derive(Debug, Deserialize)]
struct OrderbookResponse {
    bids: OrderbookPage,
}

#[derive(Debug, Deserialize)]
struct OrderbookPage {
    #[serde(default)]
    records: Vec<OrderRecord>,
}

#[derive(Debug, Deserialize)]
struct OrderRecord {
    order: serde_json::Value,
}

/// Decode the bid side of an SRA order book response
pub fn parse_bids(body: &str) -> Result<Vec<Order>, serde_json::Error> {
    let book: OrderbookResponse = serde_json::from_str(body)?;
    let total = book.bids.records.len();

    let orders: Vec<Order> = book
        .bids
        .records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Order>(record.order) {
            Ok(order) => Some(order),
            Err(e) => {
                debug!("Skipping undecodable order record: {}", e);
                None
            }
        })
        .collect();

    if orders.len() < total {
        warn!("Order book: decoded {}/{} bid records", orders.len(), total);
    }
    Ok(orders)
}

/// Order source backed by the 0x REST API and the Exchange contract
pub struct ZrxOrderSource<P> {
    provider: Arc<P>,
    exchange: Address,
    client: reqwest::Client,
    api_url: String,
    page_size: u32,
}

impl<P: Provider + 'static> ZrxOrderSource<P> {
    pub fn new(
        provider: Arc<P>,
        exchange: Address,
        api_url: &str,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, OrderSourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            provider,
            exchange,
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            page_size,
        })
    }
}

#[async_trait]
impl<P: Provider + 'static> OrderSource for ZrxOrderSource<P> {
    async fn fetch_order_book(&self, base: &Asset, quote: &Asset) -> Result<Vec<Order>, OrderSourceError> {
        let url = format!("{}/sra/v3/orderbook", self.api_url);
        let base_data = erc20_asset_data(base.address).to_string();
        let quote_data = erc20_asset_data(quote.address).to_string();
        let per_page = self.page_size.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("baseAssetData", base_data.as_str()),
                ("quoteAssetData", quote_data.as_str()),
                ("perPage", per_page.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(OrderSourceError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().await?;
        let orders = parse_bids(&body)?;
        debug!("Order book {}/{}: {} bids", base.symbol, quote.symbol, orders.len());
        Ok(orders)
    }

    async fn fetch_order_status(&self, order: &Order) -> Result<OrderStatus, OrderSourceError> {
        let exchange = IZrxExchange::new(self.exchange, self.provider.clone());
        let info = exchange
            .getOrderInfo(order.to_exchange_order())
            .call()
            .await
            .map_err(|e| OrderSourceError::Rpc(e.to_string()))?;

        Ok(OrderStatus {
            state: OrderState::from_code(info.orderStatus),
            taker_asset_filled_amount: info.orderTakerAssetFilledAmount,
        })
    }
}
