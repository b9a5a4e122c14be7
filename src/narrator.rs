//! Prompt construction and outcome mapping for the AI text service.

use std::sync::Arc;

use chrono::DateTime;
use tracing::{error, warn};

use crate::api::TextGenerator;
use crate::chart::MAX_FORECAST;
use crate::types::{HistoryPoint, TrendPrediction};

pub const DISABLED_MESSAGE: &str =
    "The Gemini API key is not configured. Set GEMINI_API_KEY to use this feature.";

/// What a narration request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Narration<T> {
    Ready(T),
    /// No credentials were configured at startup.
    Disabled,
    /// The request failed; carries the apology shown in place of content.
    Unavailable(String),
}

/// AI text service with an explicit present/absent client.
#[derive(Clone, Default)]
pub struct Narrator {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Narrator {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn coin_info(&self, coin_name: &str) -> Narration<String> {
        let Some(generator) = &self.generator else {
            return Narration::Disabled;
        };
        match generator.generate(&info_prompt(coin_name), false).await {
            Ok(text) => Narration::Ready(text.trim().to_string()),
            Err(e) => {
                error!(error = %e, coin = coin_name, "coin info request failed");
                Narration::Unavailable(format!(
                    "Sorry, I couldn't get information about {} right now. Please try again later.",
                    coin_name
                ))
            }
        }
    }

    pub async fn market_trend(
        &self,
        coin_name: &str,
        history: &[HistoryPoint],
    ) -> Narration<TrendPrediction> {
        let Some(generator) = &self.generator else {
            return Narration::Disabled;
        };
        match generator.generate(&trend_prompt(coin_name, history), true).await {
            Ok(text) => Narration::Ready(parse_trend(&text)),
            Err(e) => {
                error!(error = %e, coin = coin_name, "trend request failed");
                Narration::Unavailable(
                    "Sorry, I couldn't get the prediction right now. Please try again later."
                        .to_string(),
                )
            }
        }
    }
}

pub fn info_prompt(coin_name: &str) -> String {
    format!(
        "Explain what {coin_name} is in a simple way for a beginner. The answer must:\n\
         1. Be in English.\n\
         2. Describe its main purpose and underlying technology simply.\n\
         3. Briefly mention its history or an interesting fact.\n\
         4. Keep a friendly, educational tone.\n\
         5. Fit in a single paragraph of under 120 words."
    )
}

/// One `Date: YYYY-MM-DD, Price: $X.XX` line per point.
pub fn serialize_history(history: &[HistoryPoint]) -> String {
    history
        .iter()
        .map(|p| {
            let date = DateTime::from_timestamp_millis(p.timestamp_ms)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| p.timestamp_ms.to_string());
            format!("Date: {}, Price: ${:.2}", date, p.price)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn trend_prompt(coin_name: &str, history: &[HistoryPoint]) -> String {
    format!(
        "Based on the following daily prices of {coin_name} over the last 30 days:\n\
         {history}\n\n\
         Analyse the data and predict the trend for the next {days} days. Reply with JSON only, \
         shaped as {{\"analysis\": string, \"predictedPrices\": [{days} numbers]}}. The analysis must:\n\
         1. Be in English.\n\
         2. State whether the likely trend is bullish, bearish or stable.\n\
         3. Briefly justify the prediction from the data.\n\
         4. Stay concise and beginner friendly.\n\
         5. Warn that crypto markets are volatile and this is not financial advice.\n\
         predictedPrices holds one USD closing price per day, in order.",
        history = serialize_history(history),
        days = MAX_FORECAST,
    )
}

/// Reads the model's JSON reply; prose that is not JSON becomes the analysis
/// with no projected prices.
pub fn parse_trend(text: &str) -> TrendPrediction {
    let body = strip_code_fence(text.trim());
    match serde_json::from_str::<TrendPrediction>(body) {
        Ok(mut p) => {
            p.predicted_prices.retain(|v| v.is_finite());
            p.predicted_prices.truncate(MAX_FORECAST);
            p.analysis = p.analysis.trim().to_string();
            p
        }
        Err(e) => {
            warn!(error = %e, "trend reply was not JSON");
            TrendPrediction {
                analysis: text.trim().to_string(),
                predicted_prices: Vec::new(),
            }
        }
    }
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
