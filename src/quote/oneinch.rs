//! 1inch v2.0 swap client
//!
//! `GET {api}/v2.0/swap?fromTokenAddress=..&toTokenAddress=..&fromAddress=..&amount=..&slippage=0&disableEstimate=true`
//!
//! Zero slippage: the quoted output is the amount the settlement contract must
//! receive. Estimation is disabled because `fromAddress` is the settlement
//! contract, which holds no balance until the flash loan lands.

use super::QuoteSource;
use crate::types::{dec_u256, Quote};
use alloy::primitives::{Address, Bytes, U256};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    to_token: Option<TokenInfo>,
    #[serde(with = "dec_u256")]
    to_token_amount: U256,
    #[serde(default, with = "opt_dec_u256")]
    from_token_amount: Option<U256>,
    tx: SwapTx,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    decimals: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct SwapTx {
    data: Bytes,
}

mod opt_dec_u256 {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "crate::types::dec_u256")] U256);
        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
    }
}

/// Turn a swap response body into a [`Quote`]
pub fn parse_swap(body: &str, from: Address, to: Address, amount: U256) -> Result<Quote> {
    let resp: SwapResponse = serde_json::from_str(body).context("Failed to decode swap response")?;
    if resp.tx.data.is_empty() {
        bail!("swap response carries no calldata");
    }

    Ok(Quote {
        from_token: from,
        to_token: to,
        from_amount: resp.from_token_amount.unwrap_or(amount),
        to_amount: resp.to_token_amount,
        to_token_decimals: resp.to_token.and_then(|t| t.decimals),
        tx_data: resp.tx.data,
    })
}

pub struct OneInchClient {
    client: reqwest::Client,
    api_url: String,
}

impl OneInchClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn request(&self, from: Address, to: Address, from_address: Address, amount: U256) -> Result<Quote> {
        let url = format!("{}/v2.0/swap", self.api_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("fromTokenAddress", from.to_string()),
                ("toTokenAddress", to.to_string()),
                ("fromAddress", from_address.to_string()),
                ("amount", amount.to_string()),
                ("slippage", "0".to_string()),
                ("disableEstimate", "true".to_string()),
            ])
            .send()
            .await
            .context("Swap request failed")?;

        let status = resp.status();
        let body = resp.text().await.context("Failed to read swap response")?;
        if !status.is_success() {
            bail!("swap API responded with {}: {}", status, body.chars().take(200).collect::<String>());
        }

        parse_swap(&body, from, to, amount)
    }
}

#[async_trait]
impl QuoteSource for OneInchClient {
    async fn fetch_quote(&self, from: Address, to: Address, from_address: Address, amount: U256) -> Option<Quote> {
        match self.request(from, to, from_address, amount).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                debug!("No quote for {} {} -> {}: {:#}", amount, from, to, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const DAI: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
    const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

    #[test]
    fn test_parse_swap_response() {
        let body = r#"{
            "fromToken": { "symbol": "DAI", "address": "0x6b175474e89094c44da98b954eedeac495271d0f", "decimals": 18 },
            "toToken": { "symbol": "WETH", "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "decimals": 18 },
            "fromTokenAmount": "2500000000000000000000",
            "toTokenAmount": "1010000000000000000",
            "protocols": [],
            "tx": {
                "from": "0x3333333333333333333333333333333333333333",
                "to": "0x11111254369792b2ca5d084ab5eea397ca8fa48b",
                "data": "0x90411a32deadbeef",
                "value": "0",
                "gasPrice": "50000000000",
                "gas": 0
            }
        }"#;

        let amount = U256::from(2_500_000_000_000_000_000_000u128);
        let quote = parse_swap(body, DAI, WETH, amount).unwrap();
        assert_eq!(quote.to_amount, U256::from(1_010_000_000_000_000_000u128));
        assert_eq!(quote.from_amount, amount);
        assert_eq!(quote.to_token_decimals, Some(18));
        assert_eq!(quote.tx_data.len(), 8);
    }

    #[test]
    fn test_parse_swap_error_payload() {
        let body = r#"{ "statusCode": 400, "error": "Bad Request", "message": "insufficient liquidity" }"#;
        assert!(parse_swap(body, DAI, WETH, U256::from(1)).is_err());
    }

    #[test]
    fn test_unreachable_api_yields_no_quote() {
        let client = OneInchClient::new("http://127.0.0.1:9/", Duration::from_millis(500)).unwrap();
        let quote = tokio_test::block_on(client.fetch_quote(DAI, WETH, Address::ZERO, U256::from(1)));
        assert!(quote.is_none());
    }

    #[test]
    fn test_parse_swap_requires_calldata() {
        let body = r#"{ "toTokenAmount": "5", "tx": { "data": "0x" } }"#;
        assert!(parse_swap(body, DAI, WETH, U256::from(1)).is_err());
    }
}
