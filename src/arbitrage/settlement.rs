//! On-chain settlement via the flash-loan contract
//!
//! Sends `getFlashloan` through a signing alloy provider and waits for the
//! receipt for at most `receipt_timeout`. Balance checkpoint events come from a
//! WS log subscription on the contract address.

use super::executor::{SettlementCall, SettlementEventStream, SettlementSubmitter};
use crate::contracts::ITrader;
use crate::error::ExecutionError;
use crate::types::{SettlementEvent, SettlementReceipt};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// topic0 → event name for every checkpoint the contract emits
const CHECKPOINTS: [(B256, &str); 12] = [
    (ITrader::StartBalance::SIGNATURE_HASH, "StartBalance"),
    (ITrader::EndBalance::SIGNATURE_HASH, "EndBalance"),
    (ITrader::ZRXBeforeDAIBalance::SIGNATURE_HASH, "ZRXBeforeDAIBalance"),
    (ITrader::ZRXAfterDAIBalance::SIGNATURE_HASH, "ZRXAfterDAIBalance"),
    (ITrader::ZRXBeforeWETHBalance::SIGNATURE_HASH, "ZRXBeforeWETHBalance"),
    (ITrader::ZRXAfterWETHBalance::SIGNATURE_HASH, "ZRXAfterWETHBalance"),
    (ITrader::OneInchBeforeWETHBalance::SIGNATURE_HASH, "OneInchBeforeWETHBalance"),
    (ITrader::OneInchAfterWETHBalance::SIGNATURE_HASH, "OneInchAfterWETHBalance"),
    (ITrader::OneInchBeforeDAIBalance::SIGNATURE_HASH, "OneInchBeforeDAIBalance"),
    (ITrader::OneInchAfterDAIBalance::SIGNATURE_HASH, "OneInchAfterDAIBalance"),
    (ITrader::FlashTokenBeforeBalance::SIGNATURE_HASH, "FlashTokenBeforeBalance"),
    (ITrader::FlashTokenAfterBalance::SIGNATURE_HASH, "FlashTokenAfterBalance"),
];

/// Match a log against the checkpoint events. All of them carry a single
/// non-indexed `uint256 balance`.
pub fn decode_checkpoint(topic0: B256, data: &[u8]) -> Option<(&'static str, U256)> {
    let name = CHECKPOINTS
        .iter()
        .find(|(hash, _)| *hash == topic0)
        .map(|(_, name)| *name)?;
    let word = data.get(..32)?;
    Some((name, U256::from_be_slice(word)))
}

/// Bound a receipt wait. Expiry is reported as a confirmation failure; the
/// transaction itself may still be mined later.
pub async fn confirm_within<F, T, E>(tx_hash: B256, timeout: Duration, wait: F) -> Result<T, ExecutionError>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(timeout, wait).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ExecutionError::Confirmation {
            tx_hash,
            reason: e.to_string(),
        }),
        Err(_) => Err(ExecutionError::Confirmation {
            tx_hash,
            reason: format!("no receipt after {}s", timeout.as_secs_f64()),
        }),
    }
}

fn to_settlement_event(log: &Log) -> Option<SettlementEvent> {
    let topic0 = *log.topics().first()?;
    let (name, balance) = decode_checkpoint(topic0, &log.data().data)?;
    Some(SettlementEvent {
        name,
        balance,
        tx_hash: log.transaction_hash,
        block_number: log.block_number,
    })
}

pub struct ChainSettlement<P> {
    provider: Arc<P>,
    contract: Address,
    receipt_timeout: Duration,
}

impl<P: Provider + 'static> ChainSettlement<P> {
    pub fn new(provider: Arc<P>, contract: Address, receipt_timeout: Duration) -> Self {
        Self {
            provider,
            contract,
            receipt_timeout,
        }
    }
}

#[async_trait]
impl<P: Provider + 'static> SettlementSubmitter for ChainSettlement<P> {
    async fn submit(
        &self,
        call: &SettlementCall,
        gas_limit: u64,
        gas_price_wei: u128,
    ) -> Result<SettlementReceipt, ExecutionError> {
        let trader = ITrader::new(self.contract, self.provider.clone());

        let pending = trader
            .getFlashloan(
                call.flash_token,
                call.flash_amount,
                call.arb_token,
                call.zrx_data.clone(),
                call.one_inch_data.clone(),
            )
            .gas(gas_limit)
            .gas_price(gas_price_wei)
            .send()
            .await
            .map_err(|e| ExecutionError::Submission(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        info!("Settlement tx submitted: {:?}", tx_hash);

        let receipt = confirm_within(tx_hash, self.receipt_timeout, pending.get_receipt()).await?;

        if !receipt.status() {
            return Err(ExecutionError::Reverted { tx_hash });
        }

        Ok(SettlementReceipt {
            tx_hash: Some(tx_hash),
            block_number: receipt.block_number,
            gas_used: Some(receipt.gas_used),
            simulated: false,
        })
    }

    async fn subscribe_events(&self) -> Result<SettlementEventStream, ExecutionError> {
        let filter = Filter::new().address(self.contract);
        let subscription = self
            .provider
            .subscribe_logs(&filter)
            .await
            .map_err(|e| ExecutionError::Subscription(e.to_string()))?;

        let events = subscription
            .into_stream()
            .filter_map(|log| futures::future::ready(to_settlement_event(&log)));
        Ok(Box::pin(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_checkpoint() {
        let mut data = [0u8; 32];
        data[31] = 0x2a;
        let decoded = decode_checkpoint(ITrader::EndBalance::SIGNATURE_HASH, &data);
        assert_eq!(decoded, Some(("EndBalance", U256::from(42))));
    }

    #[test]
    fn test_unknown_topic_ignored() {
        assert_eq!(decode_checkpoint(B256::repeat_byte(0x11), &[0u8; 32]), None);
    }

    #[test]
    fn test_short_data_ignored() {
        assert_eq!(
            decode_checkpoint(ITrader::StartBalance::SIGNATURE_HASH, &[0u8; 16]),
            None
        );
    }

    #[tokio::test]
    async fn test_receipt_wait_times_out() {
        let tx_hash = B256::repeat_byte(0x42);
        let never_mined = futures::future::pending::<Result<(), String>>();

        let result = confirm_within(tx_hash, Duration::from_millis(20), never_mined).await;
        assert!(matches!(
            result,
            Err(ExecutionError::Confirmation { tx_hash: h, .. }) if h == tx_hash
        ));
    }

    #[tokio::test]
    async fn test_receipt_error_mapped() {
        let tx_hash = B256::repeat_byte(0x43);
        let failed = async { Err::<(), _>("transport closed") };

        match confirm_within(tx_hash, Duration::from_secs(1), failed).await {
            Err(ExecutionError::Confirmation { reason, .. }) => assert_eq!(reason, "transport closed"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            confirm_within(tx_hash, Duration::from_secs(1), async { Ok::<_, String>(7u64) })
                .await
                .unwrap(),
            7
        );
    }

    #[test]
    fn test_checkpoint_hashes_distinct() {
        for (i, (a, _)) in CHECKPOINTS.iter().enumerate() {
            for (b, _) in CHECKPOINTS.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
