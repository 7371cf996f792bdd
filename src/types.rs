//! Core data structures
//!
//! Orders as served by the 0x SRA v3 API, swap quotes, accepted opportunities,
//! settlement receipts/events, and the bot configuration.

use crate::contracts::IZrxExchange;
use alloy::primitives::{keccak256, Address, Bytes, B256, I256, U256};
use alloy::sol_types::SolValue;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An asset known to the bot (symbol, ERC-20 address, decimals)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
}

impl Asset {
    pub fn new(symbol: &str, address: Address, decimals: u8) -> Self {
        Self {
            symbol: symbol.to_string(),
            address,
            decimals,
        }
    }
}

/// Market being scanned.
///
/// Orders are bids on `base/quote`: the maker pays `quote`, the taker pays `base`.
/// Profit is realised in `base` (quote → base on the aggregator leg).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPair {
    pub base: Asset,
    pub quote: Asset,
}

impl AssetPair {
    pub fn new(base: Asset, quote: Asset) -> Self {
        Self { base, quote }
    }

    /// Leg order as logged: base → quote → base (e.g. "WETH, DAI, WETH")
    pub fn route(&self) -> String {
        format!("{}, {}, {}", self.base.symbol, self.quote.symbol, self.base.symbol)
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.base.symbol, self.quote.symbol)
    }
}

/// Serde helper: uint256 amounts arrive as decimal strings in the SRA API
pub mod dec_u256 {
    use alloy::primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        let parsed = match raw.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(raw, 10),
        };
        parsed.map_err(|e| de::Error::custom(format!("invalid uint256 {:?}: {}", raw, e)))
    }
}

/// A signed 0x v3 limit order. Read-only once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub maker_address: Address,
    pub taker_address: Address,
    pub fee_recipient_address: Address,
    pub sender_address: Address,
    #[serde(with = "dec_u256")]
    pub maker_asset_amount: U256,
    #[serde(with = "dec_u256")]
    pub taker_asset_amount: U256,
    #[serde(with = "dec_u256")]
    pub maker_fee: U256,
    #[serde(with = "dec_u256")]
    pub taker_fee: U256,
    #[serde(with = "dec_u256")]
    pub expiration_time_seconds: U256,
    #[serde(with = "dec_u256")]
    pub salt: U256,
    pub maker_asset_data: Bytes,
    pub taker_asset_data: Bytes,
    pub maker_fee_asset_data: Bytes,
    pub taker_fee_asset_data: Bytes,
    pub signature: Bytes,
}

impl Order {
    /// The order in the exchange's `LibOrder.Order` tuple shape
    pub fn to_exchange_order(&self) -> IZrxExchange::Order {
        IZrxExchange::Order {
            makerAddress: self.maker_address,
            takerAddress: self.taker_address,
            feeRecipientAddress: self.fee_recipient_address,
            senderAddress: self.sender_address,
            makerAssetAmount: self.maker_asset_amount,
            takerAssetAmount: self.taker_asset_amount,
            makerFee: self.maker_fee,
            takerFee: self.taker_fee,
            expirationTimeSeconds: self.expiration_time_seconds,
            salt: self.salt,
            makerAssetData: self.maker_asset_data.clone(),
            takerAssetData: self.taker_asset_data.clone(),
            makerFeeAssetData: self.maker_fee_asset_data.clone(),
            takerFeeAssetData: self.taker_fee_asset_data.clone(),
        }
    }

    /// Canonical identity: keccak256 over the ABI-encoded order tuple followed by
    /// the signature. Field order is fixed by the tuple, not by the JSON source.
    pub fn identity(&self) -> B256 {
        let mut encoded = self.to_exchange_order().abi_encode();
        encoded.extend_from_slice(&self.signature);
        keccak256(encoded)
    }
}

/// Exchange order status (LibOrder.OrderStatus)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderState {
    Invalid,
    InvalidMakerAssetAmount,
    InvalidTakerAssetAmount,
    Fillable,
    Expired,
    FullyFilled,
    Cancelled,
}

impl OrderState {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => OrderState::InvalidMakerAssetAmount,
            2 => OrderState::InvalidTakerAssetAmount,
            3 => OrderState::Fillable,
            4 => OrderState::Expired,
            5 => OrderState::FullyFilled,
            6 => OrderState::Cancelled,
            _ => OrderState::Invalid,
        }
    }

    pub fn is_fillable(&self) -> bool {
        matches!(self, OrderState::Fillable)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            OrderState::Invalid => "INVALID",
            OrderState::InvalidMakerAssetAmount => "INVALID_MAKER_ASSET_AMOUNT",
            OrderState::InvalidTakerAssetAmount => "INVALID_TAKER_ASSET_AMOUNT",
            OrderState::Fillable => "FILLABLE",
            OrderState::Expired => "EXPIRED",
            OrderState::FullyFilled => "FULLY_FILLED",
            OrderState::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

/// On-chain order status as reported by `getOrderInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStatus {
    pub state: OrderState,
    pub taker_asset_filled_amount: U256,
}

impl OrderStatus {
    pub fn fillable_unfilled() -> Self {
        Self {
            state: OrderState::Fillable,
            taker_asset_filled_amount: U256::ZERO,
        }
    }
}

/// Swap quote from the aggregator. Fetched per evaluation, never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub from_token: Address,
    pub to_token: Address,
    pub from_amount: U256,
    /// Expected output in the to-token's smallest unit
    pub to_amount: U256,
    /// Decimals of the to-token as reported by the aggregator, if any
    pub to_token_decimals: Option<u8>,
    /// Encoded swap calldata for the settlement contract
    pub tx_data: Bytes,
}

/// Profitable order/quote combination that won the opportunity gate
#[derive(Debug, Clone)]
pub struct Opportunity {
    pub order: Order,
    pub quote: Quote,
    pub pair: AssetPair,
    /// Base asset paid to the maker (order's taker-asset amount)
    pub input_amount: U256,
    /// Base asset received from the aggregator leg
    pub output_amount: U256,
    pub gas_cost_wei: U256,
    pub net_profit: I256,
    pub detected_at: DateTime<Local>,
}

/// Result of the single settlement attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub tx_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    /// No transaction was sent (dry run)
    pub simulated: bool,
}

impl SettlementReceipt {
    pub fn simulated() -> Self {
        Self {
            tx_hash: None,
            block_number: None,
            gas_used: None,
            simulated: true,
        }
    }
}

/// Balance checkpoint emitted by the settlement contract. Observability only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementEvent {
    pub name: &'static str,
    pub balance: U256,
    pub tx_hash: Option<B256>,
    pub block_number: Option<u64>,
}

/// Bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    // Network
    pub rpc_url: String,

    // Wallet
    pub private_key: String,

    // Contracts
    pub settlement_contract: Address,
    pub zrx_exchange: Address,

    // Upstream APIs
    pub zrx_api_url: String,
    pub oneinch_api_url: String,
    pub http_timeout_ms: u64,
    pub orderbook_page_size: u32,

    // Market
    pub base_asset: Asset,
    pub quote_asset: Asset,

    // Execution cost
    pub estimated_gas: u64,
    pub gas_price_wei: u128,
    pub gas_limit: u64,

    /// Flash loan size in whole base-asset tokens
    pub flash_amount_tokens: u64,

    // Performance
    pub poll_interval_ms: u64,
    /// Upper bound on waiting for the settlement receipt
    pub receipt_timeout_secs: u64,

    /// Submit transactions (false = dry run)
    pub live_mode: bool,
}

impl BotConfig {
    pub fn asset_pair(&self) -> AssetPair {
        AssetPair::new(self.base_asset.clone(), self.quote_asset.clone())
    }

    /// gas units × gas price, in wei
    pub fn estimated_gas_cost_wei(&self) -> U256 {
        U256::from(self.estimated_gas).saturating_mul(U256::from(self.gas_price_wei))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "makerAddress": "0x1111111111111111111111111111111111111111",
        "takerAddress": "0x0000000000000000000000000000000000000000",
        "feeRecipientAddress": "0x2222222222222222222222222222222222222222",
        "senderAddress": "0x0000000000000000000000000000000000000000",
        "makerAssetAmount": "2500000000000000000000",
        "takerAssetAmount": "1000000000000000000",
        "makerFee": "0",
        "takerFee": "0",
        "expirationTimeSeconds": "1600000000",
        "salt": "42",
        "makerAssetData": "0xf47261b00000000000000000000000006b175474e89094c44da98b954eedeac495271d0f",
        "takerAssetData": "0xf47261b0000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
        "makerFeeAssetData": "0x",
        "takerFeeAssetData": "0x",
        "signature": "0x1b01",
        "exchangeAddress": "0x61935cbdd02287b511119ddb11aeb42f1593b7ef",
        "chainId": 1
    }"#;

    #[test]
    fn test_order_parses_sra_json() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.taker_asset_amount, U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(order.salt, U256::from(42));
        assert!(order.maker_fee.is_zero() && order.taker_fee.is_zero());
        assert_eq!(order.signature.len(), 2);
    }

    #[test]
    fn test_identity_ignores_json_key_order() {
        let a: Order = serde_json::from_str(ORDER_JSON).unwrap();
        let b: Order = serde_json::from_str(
            r#"{
            "signature": "0x1b01",
            "salt": "42",
            "takerFeeAssetData": "0x",
            "makerFeeAssetData": "0x",
            "takerAssetData": "0xf47261b0000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            "makerAssetData": "0xf47261b00000000000000000000000006b175474e89094c44da98b954eedeac495271d0f",
            "expirationTimeSeconds": "1600000000",
            "takerFee": "0",
            "makerFee": "0",
            "takerAssetAmount": "1000000000000000000",
            "makerAssetAmount": "2500000000000000000000",
            "senderAddress": "0x0000000000000000000000000000000000000000",
            "feeRecipientAddress": "0x2222222222222222222222222222222222222222",
            "takerAddress": "0x0000000000000000000000000000000000000000",
            "makerAddress": "0x1111111111111111111111111111111111111111"
        }"#,
        )
        .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_identity_changes_with_any_field() {
        let a: Order = serde_json::from_str(ORDER_JSON).unwrap();
        let mut b = a.clone();
        b.salt = U256::from(43);
        assert_ne!(a.identity(), b.identity());

        let mut c = a.clone();
        c.signature = Bytes::from(vec![0x1b, 0x02]);
        assert_ne!(a.identity(), c.identity());
    }

    #[test]
    fn test_order_state_codes() {
        assert_eq!(OrderState::from_code(3), OrderState::Fillable);
        assert_eq!(OrderState::from_code(5), OrderState::FullyFilled);
        assert_eq!(OrderState::from_code(99), OrderState::Invalid);
        assert!(!OrderState::Expired.is_fillable());
    }
}
