//! Profitability Evaluator
//!
//! Per-order pipeline: dedup → fee filter → flash-loan size → on-chain status
//! → aggregator quote → net profit → gate claim.
//!
//! Trade shape (WETH/DAI bid, base = WETH, quote = DAI):
//!     1. Fill the maker's bid: pay `takerAssetAmount` WETH, receive `makerAssetAmount` DAI
//!     2. Swap all of that DAI back to WETH through the aggregator
//!     net = WETH out of step 2 - WETH into step 1 - gas_units * gas_price_wei
//!
//! The registry mark happens before the first await so a concurrent pass can
//! never evaluate the same order twice. All arithmetic is integer.

use super::gate::OpportunityGate;
use super::registry::SeenOrders;
use crate::orderbook::OrderSource;
use crate::quote::QuoteSource;
use crate::types::{AssetPair, Opportunity, Order, OrderState};
use alloy::primitives::{Address, I256, U256};
use chrono::Local;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Why an order did not become an opportunity. None of these are failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("already evaluated")]
    AlreadySeen,

    #[error("maker fee")]
    HasMakerFee,

    #[error("taker fee")]
    HasTakerFee,

    #[error("fill needs {required}, flash loan provides {available}")]
    ExceedsFlashLoan { required: U256, available: U256 },

    #[error("status lookup failed: {0}")]
    StatusUnavailable(String),

    #[error("order {0}")]
    NotFillable(OrderState),

    #[error("partially filled ({filled})")]
    PartiallyFilled { filled: U256 },

    #[error("no quote")]
    NoQuote,

    #[error("quote reports {reported} decimals, expected {expected}")]
    UnitMismatch { expected: u8, reported: u8 },

    #[error("unprofitable ({net_profit})")]
    Unprofitable { net_profit: I256 },

    #[error("opportunity slot already claimed")]
    GateClaimed,
}

#[derive(Debug)]
pub enum Evaluation {
    Accepted(Box<Opportunity>),
    Rejected(Rejection),
}

impl Evaluation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Evaluation::Accepted(_))
    }
}

/// `output - input - gas_cost` in signed 256-bit arithmetic.
/// Inputs beyond `I256::MAX` saturate, which no real token amount reaches.
pub fn net_profit(output: U256, input: U256, gas_cost: U256) -> I256 {
    let to_signed = |v: U256| I256::try_from(v).unwrap_or(I256::MAX);
    to_signed(output)
        .saturating_sub(to_signed(input))
        .saturating_sub(to_signed(gas_cost))
}

pub struct ProfitabilityEvaluator {
    orders: Arc<dyn OrderSource>,
    quotes: Arc<dyn QuoteSource>,
    registry: Arc<SeenOrders>,
    gate: Arc<OpportunityGate>,
    /// Swap executor address passed to the aggregator (the settlement contract)
    settlement_contract: Address,
    gas_cost_wei: U256,
    /// Base asset borrowed for the fill, in base units
    flash_amount: U256,
}

impl ProfitabilityEvaluator {
    pub fn new(
        orders: Arc<dyn OrderSource>,
        quotes: Arc<dyn QuoteSource>,
        registry: Arc<SeenOrders>,
        gate: Arc<OpportunityGate>,
        settlement_contract: Address,
        gas_cost_wei: U256,
        flash_amount: U256,
    ) -> Self {
        Self {
            orders,
            quotes,
            registry,
            gate,
            settlement_contract,
            gas_cost_wei,
            flash_amount,
        }
    }

    pub fn registry(&self) -> &SeenOrders {
        &self.registry
    }

    pub fn gate(&self) -> &OpportunityGate {
        &self.gate
    }

    pub async fn evaluate(&self, order: Order, pair: &AssetPair) -> Evaluation {
        match self.run(order, pair).await {
            Ok(opportunity) => Evaluation::Accepted(Box::new(opportunity)),
            Err(rejection) => Evaluation::Rejected(rejection),
        }
    }

    async fn run(&self, order: Order, pair: &AssetPair) -> Result<Opportunity, Rejection> {
        if !self.registry.check_and_mark(order.identity()) {
            return Err(Rejection::AlreadySeen);
        }

        if !order.maker_fee.is_zero() {
            return Err(Rejection::HasMakerFee);
        }
        if !order.taker_fee.is_zero() {
            return Err(Rejection::HasTakerFee);
        }

        // The fill is paid from the loan; a larger order reverts on-chain
        if order.taker_asset_amount > self.flash_amount {
            return Err(Rejection::ExceedsFlashLoan {
                required: order.taker_asset_amount,
                available: self.flash_amount,
            });
        }

        let status = self
            .orders
            .fetch_order_status(&order)
            .await
            .map_err(|e| Rejection::StatusUnavailable(e.to_string()))?;

        if !status.taker_asset_filled_amount.is_zero() {
            return Err(Rejection::PartiallyFilled {
                filled: status.taker_asset_filled_amount,
            });
        }
        if !status.state.is_fillable() {
            return Err(Rejection::NotFillable(status.state));
        }

        // Sell everything the maker pays us (quote asset) back into the base asset
        let quote = self
            .quotes
            .fetch_quote(
                pair.quote.address,
                pair.base.address,
                self.settlement_contract,
                order.maker_asset_amount,
            )
            .await
            .ok_or(Rejection::NoQuote)?;

        if let Some(reported) = quote.to_token_decimals {
            if reported != pair.base.decimals {
                return Err(Rejection::UnitMismatch {
                    expected: pair.base.decimals,
                    reported,
                });
            }
        }

        let input_amount = order.taker_asset_amount;
        let output_amount = quote.to_amount;
        let profit = net_profit(output_amount, input_amount, self.gas_cost_wei);
        debug!(
            "Order {}: in {} out {} gas {} net {}",
            order.identity(),
            input_amount,
            output_amount,
            self.gas_cost_wei,
            profit
        );

        if profit <= I256::ZERO {
            return Err(Rejection::Unprofitable { net_profit: profit });
        }

        if !self.gate.try_claim() {
            return Err(Rejection::GateClaimed);
        }

        Ok(Opportunity {
            order,
            quote,
            pair: pair.clone(),
            input_amount,
            output_amount,
            gas_cost_wei: self.gas_cost_wei,
            net_profit: profit,
            detected_at: Local::now(),
        })
    }
}
