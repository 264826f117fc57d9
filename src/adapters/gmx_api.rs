//! GMX infra REST client: signed oracle prices and the token list.

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::chain::parse_address;
use crate::domain::{PriceQuote, PriceTable, TokenInfo};
use crate::error::{Result, TraderError};
use crate::exchange::PriceOracle;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedPricesResponse {
    signed_prices: Vec<SignedPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedPrice {
    token_address: String,
    min_price_full: String,
    max_price_full: String,
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    tokens: Vec<TokenEntry>,
}

#[derive(Debug, Deserialize)]
struct TokenEntry {
    symbol: String,
    address: String,
    decimals: u8,
}

#[derive(Clone)]
pub struct GmxApiClient {
    http: Client,
    base_url: String,
}

impl GmxApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent("gmx-trader/0.1")
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Latest signed min/max prices, keyed by token address
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn signed_prices(&self) -> Result<PriceTable> {
        let body: SignedPricesResponse = self.get_json("/signed_prices/latest").await?;
        price_table_from(body)
    }

    /// Token list with symbols and decimals
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn tokens(&self) -> Result<Vec<TokenInfo>> {
        let body: TokensResponse = self.get_json("/tokens").await?;
        tokens_from(body)
    }
}

fn price_table_from(body: SignedPricesResponse) -> Result<PriceTable> {
    let mut table = PriceTable::default();
    for entry in body.signed_prices {
        let token = match parse_address("tokenAddress", &entry.token_address) {
            Ok(token) => token,
            Err(e) => {
                warn!("Skipping signed price with bad token address: {}", e);
                continue;
            }
        };
        let quote = PriceQuote::from_decimal_strings(&entry.min_price_full, &entry.max_price_full)?;
        table.insert(token, quote);
    }

    if table.is_empty() {
        return Err(TraderError::InvalidMarketData(
            "signed price feed returned no prices".into(),
        ));
    }
    Ok(table)
}

fn tokens_from(body: TokensResponse) -> Result<Vec<TokenInfo>> {
    body.tokens
        .into_iter()
        .map(|t| {
            let address: Address = parse_address(&t.symbol, &t.address)?;
            Ok(TokenInfo {
                address,
                symbol: t.symbol,
                decimals: t.decimals,
            })
        })
        .collect()
}

#[async_trait]
impl PriceOracle for GmxApiClient {
    async fn recent_prices(&self) -> Result<PriceTable> {
        self.signed_prices().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, U256};

    #[test]
    fn test_parses_signed_prices_payload() {
        let body: SignedPricesResponse = serde_json::from_str(
            r#"{
                "signedPrices": [
                    {
                        "id": "1",
                        "tokenSymbol": "ARB",
                        "tokenAddress": "0x912CE59144191C1204E64559FE8253a0e49E6548",
                        "minPriceFull": "1199000000000",
                        "maxPriceFull": "1201000000000",
                        "oracleDecimals": 30
                    },
                    {
                        "tokenAddress": "not-an-address",
                        "minPriceFull": "1",
                        "maxPriceFull": "1"
                    }
                ]
            }"#,
        )
        .unwrap();

        let table = price_table_from(body).unwrap();
        assert_eq!(table.len(), 1);
        let quote = table
            .get(address!("912CE59144191C1204E64559FE8253a0e49E6548"))
            .unwrap();
        assert_eq!(quote.max_price, U256::from(1_201_000_000_000u64));
    }

    #[test]
    fn test_empty_price_feed_is_an_error() {
        let body = SignedPricesResponse {
            signed_prices: vec![],
        };
        assert!(matches!(
            price_table_from(body),
            Err(TraderError::InvalidMarketData(_))
        ));
    }

    #[test]
    fn test_parses_token_list() {
        let body: TokensResponse = serde_json::from_str(
            r#"{"tokens": [
                {"symbol": "USDC", "address": "0xaf88d065e77c8cC2239327C5EDb3A432268e5831", "decimals": 6},
                {"symbol": "WETH", "address": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", "decimals": 18, "synthetic": false}
            ]}"#,
        )
        .unwrap();

        let tokens = tokens_from(body).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].symbol, "WETH");
        assert_eq!(tokens[1].decimals, 18);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GmxApiClient::new("https://arbitrum-api.gmxinfra.io/").unwrap();
        assert_eq!(client.base_url(), "https://arbitrum-api.gmxinfra.io");
    }
}
