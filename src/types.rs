use serde::{Deserialize, Deserializer, Serialize};

fn f64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Option::<f64>::deserialize(d).map(|v| v.unwrap_or(0.0))
}

/// A coin as listed by the market directory. Replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub current_price: f64,
}

impl Coin {
    pub fn ticker(&self) -> String {
        self.symbol.to_uppercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendPrediction {
    #[serde(default)]
    pub analysis: String,
    #[serde(default, rename = "predictedPrices")]
    pub predicted_prices: Vec<f64>,
}

/// Everything the trend view needs once a trend request settles.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub coin_name: String,
    pub history: Vec<HistoryPoint>,
    pub prediction: TrendPrediction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Tools,
    Ai,
}

impl Menu {
    pub fn label(self) -> &'static str {
        match self {
            Menu::Tools => "Tools",
            Menu::Ai => "AI Analysis",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Menu::Tools => Menu::Ai,
            Menu::Ai => Menu::Tools,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiSection {
    Info,
    Prediction,
}

impl AiSection {
    pub fn label(self) -> &'static str {
        match self {
            AiSection::Info => "Coin Info",
            AiSection::Prediction => "Trend Prediction",
        }
    }

    pub fn next(self) -> Self {
        match self {
            AiSection::Info => AiSection::Prediction,
            AiSection::Prediction => AiSection::Info,
        }
    }
}
