//! Background network work. Each operation runs as its own tokio task and
//! reports back to the UI loop through an [`AppEvent`].

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::api::{self, CoinDirectory, HistoryFeed};
use crate::narrative::{Notice, PanelUpdate, RequestToken};
use crate::narrator::{Narration, Narrator};
use crate::types::{Coin, TrendReport};

const HISTORY_FAILED: &str = "Could not fetch the price history. Please try again.";
const NO_FORECAST: &str = "The AI could not generate a price prediction. Please try again.";

#[derive(Debug)]
pub enum AppEvent {
    CoinsLoaded(Vec<Coin>),
    InfoSettled {
        token: RequestToken,
        update: PanelUpdate<String>,
    },
    TrendSettled {
        token: RequestToken,
        update: PanelUpdate<TrendReport>,
    },
}

#[derive(Clone)]
pub struct Tasks {
    directory: Arc<dyn CoinDirectory>,
    history: Arc<dyn HistoryFeed>,
    narrator: Narrator,
    tx: UnboundedSender<AppEvent>,
}

impl Tasks {
    pub fn new(
        directory: Arc<dyn CoinDirectory>,
        history: Arc<dyn HistoryFeed>,
        narrator: Narrator,
        tx: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            directory,
            history,
            narrator,
            tx,
        }
    }

    pub fn load_coins(&self) {
        let directory = Arc::clone(&self.directory);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let coins = api::load_coins(directory.as_ref()).await;
            debug!(count = coins.len(), "coin directory loaded");
            let _ = tx.send(AppEvent::CoinsLoaded(coins));
        });
    }

    pub fn coin_info(&self, token: RequestToken, coin_name: String) {
        let narrator = self.narrator.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let update = narrator.coin_info(&coin_name).await.into();
            let _ = tx.send(AppEvent::InfoSettled { token, update });
        });
    }

    pub fn market_trend(&self, token: RequestToken, coin_id: String, coin_name: String) {
        let feed = Arc::clone(&self.history);
        let narrator = self.narrator.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let update = trend_report(feed.as_ref(), &narrator, &coin_id, &coin_name).await;
            let _ = tx.send(AppEvent::TrendSettled { token, update });
        });
    }
}

/// History fetch followed by the trend request.
pub async fn trend_report(
    feed: &dyn HistoryFeed,
    narrator: &Narrator,
    coin_id: &str,
    coin_name: &str,
) -> PanelUpdate<TrendReport> {
    if !narrator.is_enabled() {
        return Narration::Disabled.into();
    }

    let history = api::load_history(feed, coin_id).await;
    if history.is_empty() {
        return PanelUpdate {
            content: None,
            notice: Some(Notice::failed(HISTORY_FAILED)),
        };
    }

    match narrator.market_trend(coin_name, &history).await {
        Narration::Ready(prediction) => {
            let notice = prediction
                .predicted_prices
                .is_empty()
                .then(|| Notice::failed(NO_FORECAST));
            PanelUpdate {
                content: Some(TrendReport {
                    coin_name: coin_name.to_string(),
                    history,
                    prediction,
                }),
                notice,
            }
        }
        Narration::Disabled => Narration::Disabled.into(),
        Narration::Unavailable(msg) => Narration::Unavailable(msg).into(),
    }
}
