use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{CoinDirectory, HistoryFeed};
use crate::error::{Error, Result};
use crate::types::{Coin, HistoryPoint};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PRO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";
const SERVICE: &str = "CoinGecko";

/// Lookback of the history feed, in days.
pub const HISTORY_DAYS: u32 = 30;

pub struct CoinGeckoClient {
    client: Client,
    api_key: String,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(f64, Option<f64>)>,
}

impl CoinGeckoClient {
    pub fn new(api_key: &str, limit: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("coinverter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Network { service: SERVICE, source })?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            limit,
        })
    }

    fn base_url(&self) -> &str {
        if self.api_key.is_empty() {
            BASE_URL
        } else {
            PRO_BASE_URL
        }
    }

    fn apply_key(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            url.to_string()
        } else {
            let sep = if url.contains('?') { "&" } else { "?" };
            format!("{}{}x_cg_pro_api_key={}", url, sep, self.api_key)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let url = self.apply_key(url);
        debug!(url = %url.split('?').next().unwrap_or(""), "requesting");

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| Error::Network { service: SERVICE, source })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status { service: SERVICE, status, body });
        }

        let text = resp
            .text()
            .await
            .map_err(|source| Error::Network { service: SERVICE, source })?;
        serde_json::from_str(&text).map_err(|e| Error::Decode {
            service: SERVICE,
            detail: format!("{} | response: {}", e, text.chars().take(300).collect::<String>()),
        })
    }

    pub async fn fetch_markets(&self) -> Result<Vec<Coin>> {
        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1&sparkline=false",
            self.base_url(),
            self.limit
        );
        self.get_json(&url).await
    }

    pub async fn fetch_price_history(&self, coin_id: &str) -> Result<Vec<HistoryPoint>> {
        let url = format!(
            "{}/coins/{}/market_chart?vs_currency=usd&days={}&interval=daily",
            self.base_url(),
            coin_id,
            HISTORY_DAYS
        );
        let chart: MarketChart = self.get_json(&url).await?;
        Ok(into_history(chart))
    }
}

fn into_history(chart: MarketChart) -> Vec<HistoryPoint> {
    chart
        .prices
        .into_iter()
        .filter_map(|(ts, price)| {
            let price = price.filter(|p| p.is_finite())?;
            Some(HistoryPoint {
                timestamp_ms: ts as i64,
                price,
            })
        })
        .collect()
}

#[async_trait]
impl CoinDirectory for CoinGeckoClient {
    async fn fetch_coins(&self) -> Result<Vec<Coin>> {
        self.fetch_markets().await
    }
}

#[async_trait]
impl HistoryFeed for CoinGeckoClient {
    async fn fetch_history(&self, coin_id: &str) -> Result<Vec<HistoryPoint>> {
        self.fetch_price_history(coin_id).await
    }
}
