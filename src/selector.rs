use crate::converter::Direction;
use crate::types::Coin;

/// Filterable single choice over the coin directory.
///
/// The dropdown only opens, and a selection only takes effect, while the
/// converter runs coin -> USD. In the other direction the coin side is pinned
/// so a swap can always be undone against the same reference price.
#[derive(Debug, Default)]
pub struct CoinSelector {
    coins: Vec<Coin>,
    selected: Option<Coin>,
    filter: String,
    open: bool,
    cursor: usize,
}

impl CoinSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the directory wholesale.
    ///
    /// The current selection is kept (with its refreshed price) when the coin
    /// is still listed. Otherwise the first coin becomes selected, unless the
    /// direction pins the coin: then the previous coin and price stay put.
    pub fn set_coins(&mut self, coins: Vec<Coin>, direction: Direction) {
        let refreshed = self
            .selected
            .as_ref()
            .and_then(|s| coins.iter().find(|c| c.id == s.id).cloned());
        self.selected = match (refreshed, direction) {
            (Some(coin), _) => Some(coin),
            (None, Direction::UsdToCoin) if self.selected.is_some() => self.selected.take(),
            (None, _) => coins.first().cloned(),
        };
        self.coins = coins;
        self.clamp_cursor();
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn selected(&self) -> Option<&Coin> {
        self.selected.as_ref()
    }

    /// USD price of the selected coin.
    pub fn reference_price(&self) -> Option<f64> {
        self.selected.as_ref().map(|c| c.current_price)
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
        self.cursor = 0;
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.cursor = 0;
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
        self.cursor = 0;
    }

    /// Coins whose name or symbol contains the filter, case-insensitively, in
    /// directory order.
    pub fn visible_coins(&self) -> Vec<&Coin> {
        let needle = self.filter.to_lowercase();
        if needle.is_empty() {
            return self.coins.iter().collect();
        }
        self.coins
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle) || c.symbol.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self, direction: Direction) {
        if self.open {
            self.close();
        } else if direction == Direction::CoinToUsd && !self.coins.is_empty() {
            self.open = true;
            self.cursor = 0;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Selects `coin`, clears the filter and closes the dropdown. Returns
    /// `false` without touching anything when the direction pins the coin.
    pub fn select(&mut self, coin: &Coin, direction: Direction) -> bool {
        if direction != Direction::CoinToUsd {
            return false;
        }
        self.selected = Some(coin.clone());
        self.filter.clear();
        self.cursor = 0;
        self.open = false;
        true
    }

    pub fn select_highlighted(&mut self, direction: Direction) -> bool {
        let coin = match self.visible_coins().get(self.cursor) {
            Some(c) => (*c).clone(),
            None => return false,
        };
        self.select(&coin, direction)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible_coins().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Looks up a listed coin by id.
    pub fn find(&self, id: &str) -> Option<&Coin> {
        self.coins.iter().find(|c| c.id == id)
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_coins().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, symbol: &str, name: &str, price: f64) -> Coin {
        Coin {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            image: String::new(),
            current_price: price,
        }
    }

    fn directory() -> Vec<Coin> {
        vec![
            coin("bitcoin", "btc", "Bitcoin", 97_500.0),
            coin("ethereum", "eth", "Ethereum", 3_450.0),
            coin("wrapped-bitcoin", "wbtc", "Wrapped Bitcoin", 97_400.0),
            coin("solana", "sol", "Solana", 195.0),
        ]
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let mut s = CoinSelector::new();
        s.set_coins(directory(), Direction::CoinToUsd);
        let ids: Vec<_> = s.visible_coins().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["bitcoin", "ethereum", "wrapped-bitcoin", "solana"]);
    }

    #[test]
    fn filter_matches_symbol_case_insensitively() {
        let mut s = CoinSelector::new();
        s.set_coins(
            vec![coin("bitcoin", "BTC", "Bitcoin", 1.0), coin("ethereum", "ETH", "Ethereum", 1.0)],
            Direction::CoinToUsd,
        );
        s.set_filter("btc");
        let ids: Vec<_> = s.visible_coins().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["bitcoin"]);
    }

    #[test]
    fn filter_matches_name_and_keeps_order() {
        let mut s = CoinSelector::new();
        s.set_coins(directory(), Direction::CoinToUsd);
        s.set_filter("BITCOIN");
        assert_eq!(s.filter(), "BITCOIN");
        let ids: Vec<_> = s.visible_coins().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["bitcoin", "wrapped-bitcoin"]);
    }

    #[test]
    fn first_coin_selected_after_load() {
        let mut s = CoinSelector::new();
        assert!(s.selected().is_none());
        assert_eq!(s.reference_price(), None);
        s.set_coins(directory(), Direction::CoinToUsd);
        assert_eq!(s.selected().map(|c| c.id.as_str()), Some("bitcoin"));
        assert_eq!(s.reference_price(), Some(97_500.0));
    }

    #[test]
    fn refresh_keeps_selection_with_new_price() {
        let mut s = CoinSelector::new();
        s.set_coins(directory(), Direction::CoinToUsd);
        let eth = s.find("ethereum").cloned().unwrap();
        assert!(s.select(&eth, Direction::CoinToUsd));

        let mut refreshed = directory();
        refreshed[1].current_price = 3_500.0;
        s.set_coins(refreshed, Direction::CoinToUsd);
        assert_eq!(s.selected().map(|c| c.id.as_str()), Some("ethereum"));
        assert_eq!(s.reference_price(), Some(3_500.0));
    }

    #[test]
    fn pinned_coin_survives_refresh_without_it() {
        let mut s = CoinSelector::new();
        s.set_coins(directory(), Direction::CoinToUsd);
        let pinned: Vec<Coin> = directory().into_iter().skip(1).collect();
        s.set_coins(pinned.clone(), Direction::UsdToCoin);
        assert_eq!(s.selected().map(|c| c.id.as_str()), Some("bitcoin"));
        assert_eq!(s.reference_price(), Some(97_500.0));
        assert_eq!(s.coins().len(), 3);

        s.set_coins(pinned, Direction::CoinToUsd);
        assert_eq!(s.selected().map(|c| c.id.as_str()), Some("ethereum"));
    }

    #[test]
    fn select_clears_filter_and_closes() {
        let mut s = CoinSelector::new();
        s.set_coins(directory(), Direction::CoinToUsd);
        s.toggle(Direction::CoinToUsd);
        assert!(s.is_open());
        s.set_filter("sol");
        assert!(s.select_highlighted(Direction::CoinToUsd));
        assert_eq!(s.selected().map(|c| c.id.as_str()), Some("solana"));
        assert_eq!(s.filter(), "");
        assert!(!s.is_open());
    }

    #[test]
    fn selection_is_pinned_in_reverse_direction() {
        let mut s = CoinSelector::new();
        s.set_coins(directory(), Direction::CoinToUsd);
        s.toggle(Direction::UsdToCoin);
        assert!(!s.is_open());
        let sol = s.find("solana").cloned().unwrap();
        assert!(!s.select(&sol, Direction::UsdToCoin));
        assert_eq!(s.selected().map(|c| c.id.as_str()), Some("bitcoin"));
    }

    #[test]
    fn cannot_open_without_coins() {
        let mut s = CoinSelector::new();
        s.set_coins(Vec::new(), Direction::CoinToUsd);
        s.toggle(Direction::CoinToUsd);
        assert!(!s.is_open());
        assert!(s.visible_coins().is_empty());
        assert!(!s.select_highlighted(Direction::CoinToUsd));
    }

    #[test]
    fn cursor_is_clamped_to_visible_list() {
        let mut s = CoinSelector::new();
        s.set_coins(directory(), Direction::CoinToUsd);
        s.move_cursor(10);
        assert_eq!(s.cursor(), 3);
        s.move_cursor(-10);
        assert_eq!(s.cursor(), 0);
        s.move_cursor(2);
        s.set_filter("eth");
        assert_eq!(s.cursor(), 0);
    }
}
