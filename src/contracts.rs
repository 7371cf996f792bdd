//! Centralized Contract Definitions
//!
//! Solidity interfaces used by the bot, defined with alloy's `sol!` macro.
//! `#[sol(rpc)]` generates contract instance types usable with any alloy Provider.
//!
//! - `IZrxExchange`: 0x v3 Exchange (order status lookup + fillOrder calldata)
//! - `ITrader`: flash-loan settlement contract (getFlashloan + balance checkpoints)

use alloy::sol;

// ── 0x Exchange v3 ───────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IZrxExchange {
        struct Order {
            address makerAddress;
            address takerAddress;
            address feeRecipientAddress;
            address senderAddress;
            uint256 makerAssetAmount;
            uint256 takerAssetAmount;
            uint256 makerFee;
            uint256 takerFee;
            uint256 expirationTimeSeconds;
            uint256 salt;
            bytes makerAssetData;
            bytes takerAssetData;
            bytes makerFeeAssetData;
            bytes takerFeeAssetData;
        }

        struct OrderInfo {
            uint8 orderStatus;
            bytes32 orderHash;
            uint256 orderTakerAssetFilledAmount;
        }

        struct FillResults {
            uint256 makerAssetFilledAmount;
            uint256 takerAssetFilledAmount;
            uint256 makerFeePaid;
            uint256 takerFeePaid;
            uint256 protocolFeePaid;
        }

        function getOrderInfo(Order memory order) external view returns (OrderInfo memory orderInfo);
        function fillOrder(Order memory order, uint256 takerAssetFillAmount, bytes memory signature) external payable returns (FillResults memory fillResults);
    }
}

// ── Flash-loan settlement contract ───────────────────────────────────

sol! {
    #[sol(rpc)]
    interface ITrader {
        function getFlashloan(address flashToken, uint256 flashAmount, address arbToken, bytes calldata zrxData, bytes calldata oneInchData) external;

        event StartBalance(uint256 balance);
        event EndBalance(uint256 balance);
        event ZRXBeforeDAIBalance(uint256 balance);
        event ZRXAfterDAIBalance(uint256 balance);
        event ZRXBeforeWETHBalance(uint256 balance);
        event ZRXAfterWETHBalance(uint256 balance);
        event OneInchBeforeWETHBalance(uint256 balance);
        event OneInchAfterWETHBalance(uint256 balance);
        event OneInchBeforeDAIBalance(uint256 balance);
        event OneInchAfterDAIBalance(uint256 balance);
        event FlashTokenBeforeBalance(uint256 balance);
        event FlashTokenAfterBalance(uint256 balance);
    }
}
