//! Scan Loop
//!
//! Fixed-interval driver. Each admitted tick fetches the bid side of the
//! configured pair and fans every order out to the evaluator as its own task,
//! then returns to idle without waiting for them. A tick that fires while the
//! previous fetch is still running is dropped.
//!
//! The loop ends once the opportunity gate is claimed; whichever evaluation
//! claimed it runs the (single) settlement from inside its own task.

use super::evaluator::{Evaluation, ProfitabilityEvaluator, Rejection};
use super::executor::ExecutionCoordinator;
use super::gate::OpportunityGate;
use crate::orderbook::OrderSource;
use crate::types::{AssetPair, Opportunity, Order};
use crate::units::{format_signed_units, format_units};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Previous tick still fetching
    Dropped,
    /// Gate already claimed; nothing scheduled
    Halted,
    FetchFailed,
    /// Number of orders handed to the evaluator
    Dispatched(usize),
}

/// Clears the scanning flag however the tick exits
struct ScanGuard<'a>(&'a AtomicBool);

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ScanLoop {
    orders: Arc<dyn OrderSource>,
    evaluator: Arc<ProfitabilityEvaluator>,
    coordinator: Arc<ExecutionCoordinator>,
    gate: Arc<OpportunityGate>,
    pair: AssetPair,
    interval: Duration,
    scanning: AtomicBool,
    tasks: Mutex<JoinSet<()>>,
}

impl ScanLoop {
    pub fn new(
        orders: Arc<dyn OrderSource>,
        evaluator: Arc<ProfitabilityEvaluator>,
        coordinator: Arc<ExecutionCoordinator>,
        gate: Arc<OpportunityGate>,
        pair: AssetPair,
        interval: Duration,
    ) -> Self {
        Self {
            orders,
            evaluator,
            coordinator,
            gate,
            pair,
            interval,
            scanning: AtomicBool::new(false),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    /// One pass over the order book
    pub async fn tick(self: &Arc<Self>) -> TickOutcome {
        if self.gate.is_claimed() {
            return TickOutcome::Halted;
        }
        if self
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Previous scan still running, tick dropped");
            return TickOutcome::Dropped;
        }
        let _guard = ScanGuard(&self.scanning);

        let orders = match self
            .orders
            .fetch_order_book(&self.pair.base, &self.pair.quote)
            .await
        {
            Ok(orders) => orders,
            Err(e) => {
                warn!("Order book fetch failed for {}: {}", self.pair, e);
                return TickOutcome::FetchFailed;
            }
        };

        // Claimed while the fetch was in flight: the book is no longer needed
        if self.gate.is_claimed() {
            return TickOutcome::Halted;
        }

        let count = orders.len();
        let mut tasks = self.tasks.lock().await;
        // Reap finished evaluations so the set does not grow across ticks
        while tasks.try_join_next().is_some() {}

        for order in orders {
            let this = Arc::clone(self);
            tasks.spawn(async move { this.evaluate_and_execute(order).await });
        }

        debug!("Dispatched {} orders ({} in flight)", count, tasks.len());
        TickOutcome::Dispatched(count)
    }

    async fn evaluate_and_execute(&self, order: Order) {
        let opportunity = match self.evaluator.evaluate(order, &self.pair).await {
            Evaluation::Accepted(opportunity) => opportunity,
            Evaluation::Rejected(Rejection::AlreadySeen) => return,
            Evaluation::Rejected(reason) => {
                debug!("Order rejected: {}", reason);
                return;
            }
        };

        log_opportunity(&opportunity);

        match self.coordinator.execute(&opportunity).await {
            Ok(receipt) if receipt.simulated => info!("Dry run complete, no transaction sent"),
            Ok(receipt) => info!("🏁 Arbitrage settled in tx {:?}", receipt.tx_hash),
            Err(e) => error!("Arbitrage execution failed: {}", e),
        }
    }

    /// Tick until the gate is claimed. Ticks run as their own tasks so a slow
    /// fetch shows up as dropped ticks instead of a stalled timer.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = IntervalStream::new(interval);

        info!(
            "🔄 Scanning {} bids every {}ms",
            self.pair,
            self.interval.as_millis()
        );

        while ticks.next().await.is_some() {
            if self.gate.is_claimed() {
                info!("Opportunity claimed - scan loop stopped");
                break;
            }
            let this = Arc::clone(&self);
            tokio::spawn(async move {
                this.tick().await;
            });
        }
    }

    /// Wait for every dispatched evaluation (and the execution, if any) to finish
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().await);
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!("Evaluation task failed: {}", e);
            }
        }
    }
}

/// Prominent summary of the one accepted opportunity
pub fn log_opportunity(opportunity: &Opportunity) {
    let base = &opportunity.pair.base;
    let quote = &opportunity.pair.quote;

    info!("════════════════════════════════════════════════════════════");
    info!("🎯 OPPORTUNITY: {} | route {}", opportunity.pair, opportunity.pair.route());
    info!(
        "   Fill:   pay {} {} for {} {}",
        format_units(opportunity.input_amount, base.decimals),
        base.symbol,
        format_units(opportunity.order.maker_asset_amount, quote.decimals),
        quote.symbol
    );
    info!(
        "   Swap:   {} {} -> {} {}",
        format_units(opportunity.quote.from_amount, quote.decimals),
        quote.symbol,
        format_units(opportunity.output_amount, base.decimals),
        base.symbol
    );
    info!(
        "   Gas:    {} {} | Net profit: {} {}",
        format_units(opportunity.gas_cost_wei, base.decimals),
        base.symbol,
        format_signed_units(opportunity.net_profit, base.decimals),
        base.symbol
    );
    info!("   Order:  {}", opportunity.order.identity());
    info!("   Time:   {}", opportunity.detected_at.format("%Y-%m-%d %H:%M:%S%.3f"));
    info!("════════════════════════════════════════════════════════════");
}
