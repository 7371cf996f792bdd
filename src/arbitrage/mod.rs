//! Arbitrage Module
//!
//! Order dedup, profit evaluation, the single-claim opportunity gate,
//! settlement execution, and the scan loop that drives them.

pub mod evaluator;
pub mod executor;
pub mod gate;
pub mod registry;
pub mod scanner;
pub mod settlement;

pub use evaluator::{net_profit, Evaluation, ProfitabilityEvaluator, Rejection};
pub use executor::{
    build_settlement_call, encode_fill_order, spawn_event_logger, ExecutionCoordinator, SettlementCall,
    SettlementEventStream, SettlementSubmitter,
};
pub use gate::OpportunityGate;
pub use registry::SeenOrders;
pub use scanner::{log_opportunity, ScanLoop, TickOutcome};
pub use settlement::{decode_checkpoint, ChainSettlement};
