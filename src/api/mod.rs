mod coingecko;
mod gemini;

pub use coingecko::CoinGeckoClient;
pub use gemini::GeminiClient;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::types::{Coin, HistoryPoint};

/// Ordered coin list with live USD prices, highest market cap first.
#[async_trait]
pub trait CoinDirectory: Send + Sync {
    async fn fetch_coins(&self) -> Result<Vec<Coin>>;
}

/// Daily USD price series for one coin over the fixed lookback window.
#[async_trait]
pub trait HistoryFeed: Send + Sync {
    async fn fetch_history(&self, coin_id: &str) -> Result<Vec<HistoryPoint>>;
}

/// Free-form text generation from a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, json: bool) -> Result<String>;
}

/// One fetch attempt; any failure reads as an empty directory.
pub async fn load_coins(directory: &dyn CoinDirectory) -> Vec<Coin> {
    match directory.fetch_coins().await {
        Ok(coins) => coins,
        Err(e) => {
            warn!(error = %e, "coin directory unavailable");
            Vec::new()
        }
    }
}

/// One fetch attempt; any failure reads as an empty history.
pub async fn load_history(feed: &dyn HistoryFeed, coin_id: &str) -> Vec<HistoryPoint> {
    match feed.fetch_history(coin_id).await {
        Ok(history) => history,
        Err(e) => {
            warn!(error = %e, coin_id, "price history unavailable");
            Vec::new()
        }
    }
}
