use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::Config;
use crate::converter::{AmountEntry, Key};
use crate::narrative::NarrativePanel;
use crate::selector::CoinSelector;
use crate::tasks::{AppEvent, Tasks};
use crate::theme::{self, Theme, THEME_NAMES};
use crate::types::*;

/// Coins offered as one-key shortcuts in the trend section.
pub const QUICK_TREND: [(&str, &str); 2] = [("bitcoin", "Bitcoin"), ("ethereum", "Ethereum")];

pub struct App {
    pub menu: Menu,
    pub ai_section: AiSection,
    pub entry: AmountEntry,
    pub selector: CoinSelector,
    pub coins_loading: bool,
    pub last_refresh: Option<Instant>,
    pub info: NarrativePanel<String>,
    pub trend: NarrativePanel<TrendReport>,
    pub ai_enabled: bool,
    pub config: Config,
    pub theme: Theme,
    pub quit: bool,
}

impl App {
    pub fn new(config: Config, ai_enabled: bool) -> Self {
        let theme = theme::by_name(&config.theme);
        Self {
            menu: Menu::Tools,
            ai_section: AiSection::Info,
            entry: AmountEntry::new(),
            selector: CoinSelector::new(),
            coins_loading: false,
            last_refresh: None,
            info: NarrativePanel::new(),
            trend: NarrativePanel::new(),
            ai_enabled,
            config,
            theme,
            quit: false,
        }
    }

    pub fn selected_coin(&self) -> Option<&Coin> {
        self.selector.selected()
    }

    pub fn reference_price(&self) -> Option<f64> {
        self.selector.reference_price()
    }

    pub fn converted_display(&self) -> String {
        self.entry.converted_display(self.reference_price())
    }

    /// `(from, to)` labels for the display box.
    pub fn currency_labels(&self) -> (String, String) {
        let ticker = self.selected_coin().map(Coin::ticker);
        self.entry.labels(ticker.as_deref())
    }

    pub fn press(&mut self, key: Key) {
        let price = self.reference_price();
        self.entry.press(key, price);
        // A swap into USD -> coin pins the coin.
        if key == Key::Swap {
            self.selector.close();
        }
    }

    pub fn toggle_selector(&mut self) {
        self.selector.toggle(self.entry.direction());
    }

    pub fn select_highlighted(&mut self) {
        let direction = self.entry.direction();
        self.selector.select_highlighted(direction);
    }

    pub fn next_menu(&mut self) {
        self.menu = self.menu.next();
        self.selector.close();
    }

    pub fn cycle_theme(&mut self) {
        let idx = THEME_NAMES
            .iter()
            .position(|t| *t == self.config.theme)
            .unwrap_or(0);
        let name = THEME_NAMES[(idx + 1) % THEME_NAMES.len()];
        self.config.theme = name.to_string();
        self.theme = theme::by_name(name);
    }

    pub fn refresh_due(&self, now: Instant) -> bool {
        if self.coins_loading {
            return false;
        }
        match self.last_refresh {
            Some(last) => {
                now.duration_since(last) >= Duration::from_secs(self.config.refresh_interval_secs)
            }
            None => true,
        }
    }

    pub fn start_refresh(&mut self, tasks: &Tasks) {
        if self.coins_loading {
            return;
        }
        self.coins_loading = true;
        tasks.load_coins();
    }

    /// Asks for a description of the selected coin. No-op without a selection.
    pub fn request_info(&mut self, tasks: &Tasks) {
        let name = match self.selected_coin() {
            Some(c) => c.name.clone(),
            None => return,
        };
        let token = self.info.begin(name.clone());
        tasks.coin_info(token, name);
    }

    pub fn request_trend(&mut self, tasks: &Tasks, coin_id: &str, coin_name: &str) {
        let name = self
            .selector
            .find(coin_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| coin_name.to_string());
        let token = self.trend.begin(name.clone());
        tasks.market_trend(token, coin_id.to_string(), name);
    }

    pub fn request_trend_for_selected(&mut self, tasks: &Tasks) {
        let (id, name) = match self.selected_coin() {
            Some(c) => (c.id.clone(), c.name.clone()),
            None => return,
        };
        self.request_trend(tasks, &id, &name);
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::CoinsLoaded(coins) => {
                self.coins_loading = false;
                self.last_refresh = Some(Instant::now());
                if coins.is_empty() && !self.selector.coins().is_empty() {
                    warn!("refresh returned no coins; keeping the previous list");
                    return;
                }
                info!(count = coins.len(), "coin list updated");
                self.selector.set_coins(coins, self.entry.direction());
            }
            AppEvent::InfoSettled { token, update } => {
                self.info.finish(token, update);
            }
            AppEvent::TrendSettled { token, update } => {
                self.trend.finish(token, update);
            }
        }
    }

    pub fn last_refresh_display(&self) -> String {
        match self.last_refresh {
            Some(inst) => {
                let secs = inst.elapsed().as_secs();
                if secs < 60 {
                    format!("{}s ago", secs)
                } else {
                    format!("{}m ago", secs / 60)
                }
            }
            None => String::new(),
        }
    }
}
