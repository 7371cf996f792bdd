//! Execution Coordinator
//!
//! Turns the single accepted opportunity into one flash-loan settlement
//! transaction: `Trader.getFlashloan(flashToken, flashAmount, arbToken, zrxData, oneInchData)`.
//!
//! Inside the transaction the contract borrows `flashAmount` of the base asset,
//! fills the 0x order with `zrxData`, swaps the proceeds back with the
//! aggregator calldata, and repays. If any leg fails the whole thing reverts,
//! so there is no partial state to clean up here.
//!
//! Safety: DRY RUN by default. Only `live_mode = true` sends a transaction.
//! Either way the coordinator accepts exactly one `execute` call per process.

use crate::contracts::{ITrader, IZrxExchange};
use crate::error::ExecutionError;
use crate::types::{Opportunity, Order, SettlementEvent, SettlementReceipt};
use crate::units::to_base_units;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Lazy stream of balance checkpoints from the settlement contract
pub type SettlementEventStream = Pin<Box<dyn Stream<Item = SettlementEvent> + Send>>;

/// Arguments of `getFlashloan`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementCall {
    pub flash_token: Address,
    pub flash_amount: U256,
    pub arb_token: Address,
    pub zrx_data: Bytes,
    pub one_inch_data: Bytes,
}

impl SettlementCall {
    /// Full calldata for the settlement contract
    pub fn calldata(&self) -> Bytes {
        ITrader::getFlashloanCall {
            flashToken: self.flash_token,
            flashAmount: self.flash_amount,
            arbToken: self.arb_token,
            zrxData: self.zrx_data.clone(),
            oneInchData: self.one_inch_data.clone(),
        }
        .abi_encode()
        .into()
    }
}

/// Transaction submission + event subscription against the settlement contract
#[async_trait]
pub trait SettlementSubmitter: Send + Sync {
    async fn submit(
        &self,
        call: &SettlementCall,
        gas_limit: u64,
        gas_price_wei: u128,
    ) -> Result<SettlementReceipt, ExecutionError>;

    async fn subscribe_events(&self) -> Result<SettlementEventStream, ExecutionError>;
}

/// `fillOrder(order, takerAssetFillAmount = takerAssetAmount, signature)`
pub fn encode_fill_order(order: &Order) -> Bytes {
    IZrxExchange::fillOrderCall {
        order: order.to_exchange_order(),
        takerAssetFillAmount: order.taker_asset_amount,
        signature: order.signature.clone(),
    }
    .abi_encode()
    .into()
}

/// Flash-borrow the base asset, arbitrage through the quote asset
pub fn build_settlement_call(opportunity: &Opportunity, flash_amount_tokens: u64) -> SettlementCall {
    let pair = &opportunity.pair;
    SettlementCall {
        flash_token: pair.base.address,
        flash_amount: to_base_units(flash_amount_tokens, pair.base.decimals),
        arb_token: pair.quote.address,
        zrx_data: encode_fill_order(&opportunity.order),
        one_inch_data: opportunity.quote.tx_data.clone(),
    }
}

/// Log every checkpoint until the stream ends. Returns the number logged.
pub fn spawn_event_logger(mut events: SettlementEventStream) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut count = 0usize;
        while let Some(event) = events.next().await {
            count += 1;
            info!(
                "📍 {} = {} (block {:?}, tx {:?})",
                event.name, event.balance, event.block_number, event.tx_hash
            );
        }
        count
    })
}

pub struct ExecutionCoordinator {
    submitter: Arc<dyn SettlementSubmitter>,
    dry_run: bool,
    flash_amount_tokens: u64,
    gas_limit: u64,
    gas_price_wei: u128,
    executed: AtomicBool,
}

impl ExecutionCoordinator {
    pub fn new(
        submitter: Arc<dyn SettlementSubmitter>,
        dry_run: bool,
        flash_amount_tokens: u64,
        gas_limit: u64,
        gas_price_wei: u128,
    ) -> Self {
        if dry_run {
            info!("Executor in DRY RUN mode - settlement will be simulated");
        } else {
            warn!("⚠️ Executor in LIVE mode - settlement transaction will be sent!");
        }

        Self {
            submitter,
            dry_run,
            flash_amount_tokens,
            gas_limit,
            gas_price_wei,
            executed: AtomicBool::new(false),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn has_executed(&self) -> bool {
        self.executed.load(Ordering::Acquire)
    }

    /// Build and submit the settlement transaction. No retry.
    pub async fn execute(&self, opportunity: &Opportunity) -> Result<SettlementReceipt, ExecutionError> {
        if self.executed.swap(true, Ordering::AcqRel) {
            return Err(ExecutionError::AlreadyExecuted);
        }

        let call = build_settlement_call(opportunity, self.flash_amount_tokens);

        if self.dry_run {
            info!("🔬 DRY RUN: settlement call not sent");
            info!(
                "   getFlashloan(flashToken={}, flashAmount={}, arbToken={})",
                call.flash_token, call.flash_amount, call.arb_token
            );
            info!(
                "   zrxData {} bytes | oneInchData {} bytes | gas limit {} @ {} wei",
                call.zrx_data.len(),
                call.one_inch_data.len(),
                self.gas_limit,
                self.gas_price_wei
            );
            info!("   calldata: {}", call.calldata());
            return Ok(SettlementReceipt::simulated());
        }

        // Subscribe first so the checkpoints of our own transaction are not missed
        match self.submitter.subscribe_events().await {
            Ok(events) => {
                spawn_event_logger(events);
            }
            Err(e) => warn!("Settlement events unavailable: {}", e),
        }

        info!(
            "🚀 Submitting getFlashloan: flash {} {} | gas limit {} @ {} wei",
            call.flash_amount, opportunity.pair.base.symbol, self.gas_limit, self.gas_price_wei
        );

        match self.submitter.submit(&call, self.gas_limit, self.gas_price_wei).await {
            Ok(receipt) => {
                info!(
                    "✅ Settlement confirmed: {:?} | block {:?} | gas used {:?}",
                    receipt.tx_hash, receipt.block_number, receipt.gas_used
                );
                Ok(receipt)
            }
            Err(e) => {
                error!(
                    "❌ Settlement failed for order {} ({}): {}",
                    opportunity.order.identity(),
                    opportunity.pair,
                    e
                );
                Err(e)
            }
        }
    }
}
