//! Keypad-driven amount entry and coin/USD conversion.
//!
//! The amount is kept as a decimal literal under construction rather than a
//! number so that transient states like `"1."` or `"0.000"` survive between
//! keystrokes. Every mutation keeps the buffer inside the grammar
//! `0 | [1-9][0-9]* | (0|[1-9][0-9]*)\.[0-9]*` and at most
//! [`MAX_BUFFER_LEN`] characters long.

pub const MAX_BUFFER_LEN: usize = 15;

const USD: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    CoinToUsd,
    UsdToCoin,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::CoinToUsd => Direction::UsdToCoin,
            Direction::UsdToCoin => Direction::CoinToUsd,
        }
    }

    /// Display precision of the converted amount.
    pub fn decimals(self) -> usize {
        match self {
            Direction::CoinToUsd => 2,
            Direction::UsdToCoin => 6,
        }
    }
}

/// A keypad press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Decimal,
    Backspace,
    Clear,
    Swap,
}

impl Key {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Key::Digit(c as u8 - b'0')),
            '.' | ',' => Some(Key::Decimal),
            'c' | 'C' => Some(Key::Clear),
            's' | 'S' | 'x' => Some(Key::Swap),
            _ => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            Key::Digit(d) => d.to_string(),
            Key::Decimal => ".".into(),
            Key::Backspace => "\u{2190}".into(),
            Key::Clear => "C".into(),
            Key::Swap => "\u{21c5}".into(),
        }
    }
}

/// Keypad rows as laid out on screen.
pub const KEYPAD: [&[Key]; 4] = [
    &[Key::Digit(7), Key::Digit(8), Key::Digit(9), Key::Clear],
    &[Key::Digit(4), Key::Digit(5), Key::Digit(6), Key::Backspace],
    &[Key::Digit(1), Key::Digit(2), Key::Digit(3), Key::Swap],
    &[Key::Digit(0), Key::Decimal],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountEntry {
    buffer: String,
    direction: Direction,
}

impl Default for AmountEntry {
    fn default() -> Self {
        Self {
            buffer: "1".to_string(),
            direction: Direction::default(),
        }
    }
}

impl AmountEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn press(&mut self, key: Key, reference_price: Option<f64>) {
        match key {
            Key::Digit(d) => self.append_digit(d),
            Key::Decimal => self.append_decimal_point(),
            Key::Backspace => self.backspace(),
            Key::Clear => self.clear(),
            Key::Swap => self.swap(reference_price),
        }
    }

    pub fn append_digit(&mut self, digit: u8) {
        if digit > 9 || self.buffer.len() >= MAX_BUFFER_LEN {
            return;
        }
        let c = char::from(b'0' + digit);
        if self.buffer == "0" {
            self.buffer.clear();
        }
        self.buffer.push(c);
    }

    pub fn append_decimal_point(&mut self) {
        if self.buffer.contains('.') || self.buffer.len() >= MAX_BUFFER_LEN {
            return;
        }
        self.buffer.push('.');
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
        if self.buffer.is_empty() {
            self.buffer.push('0');
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.buffer.push('0');
    }

    /// Converted amount rounded to the direction's precision.
    ///
    /// Returns `0.0` whenever the buffer, the price or the quotient is not a
    /// usable finite number.
    pub fn converted_amount(&self, reference_price: Option<f64>) -> f64 {
        match self.raw_conversion(reference_price) {
            Some(v) => round_to(v, self.direction.decimals()),
            None => 0.0,
        }
    }

    /// The converted amount as shown next to the "to" label.
    pub fn converted_display(&self, reference_price: Option<f64>) -> String {
        match self.raw_conversion(reference_price) {
            Some(v) => {
                let d = self.direction.decimals();
                format!("{:.*}", d, round_to(v, d))
            }
            None => "0".to_string(),
        }
    }

    /// Carries the displayed converted value over as the new input and flips
    /// the direction. The previous input is discarded.
    pub fn swap(&mut self, reference_price: Option<f64>) {
        let mut next = self.converted_display(reference_price);
        if next.len() > MAX_BUFFER_LEN {
            if let Some(dot) = next.find('.') {
                next.truncate(MAX_BUFFER_LEN.max(dot));
                if next.ends_with('.') {
                    next.pop();
                }
            }
        }
        if next.len() > MAX_BUFFER_LEN {
            tracing::debug!(value = %next, "swap refused: converted amount too wide for the buffer");
            return;
        }
        self.buffer = next;
        self.direction = self.direction.flipped();
    }

    /// `(from, to)` currency labels.
    pub fn labels(&self, coin_ticker: Option<&str>) -> (String, String) {
        let coin = coin_ticker.unwrap_or("").to_uppercase();
        match self.direction {
            Direction::CoinToUsd => (coin, USD.to_string()),
            Direction::UsdToCoin => (USD.to_string(), coin),
        }
    }

    fn raw_conversion(&self, reference_price: Option<f64>) -> Option<f64> {
        let price = reference_price.filter(|p| p.is_finite() && *p > 0.0)?;
        let amount = self.buffer.parse::<f64>().ok().filter(|a| a.is_finite())?;
        let value = match self.direction {
            Direction::CoinToUsd => amount * price,
            Direction::UsdToCoin => amount / price,
        };
        value.is_finite().then_some(value)
    }
}

fn round_to(v: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (v * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_grammar(s: &str) -> bool {
        if s.is_empty() || s.len() > MAX_BUFFER_LEN {
            return false;
        }
        let (int, frac) = match s.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (s, None),
        };
        let int_ok = int == "0"
            || (!int.is_empty()
                && !int.starts_with('0')
                && int.chars().all(|c| c.is_ascii_digit()));
        let frac_ok = frac.map_or(true, |f| f.chars().all(|c| c.is_ascii_digit()));
        int_ok && frac_ok
    }

    #[test]
    fn starts_at_one_converting_coin_to_usd() {
        let e = AmountEntry::new();
        assert_eq!(e.buffer(), "1");
        assert_eq!(e.direction(), Direction::CoinToUsd);
    }

    #[test]
    fn leading_zero_is_replaced() {
        let mut e = AmountEntry::new();
        e.clear();
        e.append_digit(0);
        assert_eq!(e.buffer(), "0");
        e.append_digit(7);
        assert_eq!(e.buffer(), "7");
    }

    #[test]
    fn zero_after_decimal_point_is_kept() {
        let mut e = AmountEntry::new();
        e.clear();
        e.append_decimal_point();
        e.append_digit(0);
        e.append_digit(0);
        assert_eq!(e.buffer(), "0.00");
    }

    #[test]
    fn only_one_decimal_point() {
        let mut e = AmountEntry::new();
        e.append_decimal_point();
        e.append_digit(5);
        e.append_decimal_point();
        assert_eq!(e.buffer(), "1.5");
    }

    #[test]
    fn buffer_is_capped_at_fifteen_chars() {
        let mut e = AmountEntry::new();
        for _ in 0..30 {
            e.append_digit(9);
        }
        assert_eq!(e.buffer().len(), MAX_BUFFER_LEN);
        e.append_decimal_point();
        assert_eq!(e.buffer().len(), MAX_BUFFER_LEN);
        assert!(!e.buffer().contains('.'));
    }

    #[test]
    fn backspace_floors_at_zero() {
        let mut e = AmountEntry::new();
        e.backspace();
        assert_eq!(e.buffer(), "0");
        e.backspace();
        assert_eq!(e.buffer(), "0");
    }

    #[test]
    fn clear_is_idempotent() {
        let mut e = AmountEntry::new();
        e.append_digit(4);
        e.clear();
        assert_eq!(e.buffer(), "0");
        e.clear();
        assert_eq!(e.buffer(), "0");
    }

    #[test]
    fn key_sequences_stay_in_grammar() {
        let keys = [
            Key::Digit(0),
            Key::Decimal,
            Key::Digit(3),
            Key::Backspace,
            Key::Backspace,
            Key::Backspace,
            Key::Digit(0),
            Key::Digit(0),
            Key::Decimal,
            Key::Decimal,
            Key::Digit(9),
            Key::Clear,
            Key::Digit(1),
        ];
        let mut e = AmountEntry::new();
        // Cycle through the keys with varying strides to mix orderings.
        for stride in 1..keys.len() {
            for i in 0..60 {
                e.press(keys[(i * stride) % keys.len()], Some(2.0));
                assert!(matches_grammar(e.buffer()), "bad buffer {:?}", e.buffer());
            }
        }
    }

    #[test]
    fn coin_to_usd_rounds_to_cents() {
        let mut e = AmountEntry::new();
        e.clear();
        e.append_digit(3);
        assert_eq!(e.converted_amount(Some(1.337)), 4.01);
        assert_eq!(e.converted_display(Some(1.337)), "4.01");
        assert_eq!(e.converted_display(Some(100.0)), "300.00");
    }

    #[test]
    fn half_cent_ties_round_up_in_display_and_swap() {
        let mut e = AmountEntry::new();
        e.clear();
        e.append_decimal_point();
        e.append_digit(5);
        assert_eq!(e.buffer(), "0.5");
        assert_eq!(e.converted_amount(Some(0.25)), 0.13);
        assert_eq!(e.converted_display(Some(0.25)), "0.13");
        e.swap(Some(0.25));
        assert_eq!(e.buffer(), "0.13");
    }

    #[test]
    fn non_positive_price_converts_to_zero_without_sign() {
        for price in [0.0, -0.0, -2.0] {
            let mut e = AmountEntry::new();
            assert_eq!(e.converted_display(Some(price)), "0");
            assert_eq!(e.converted_amount(Some(price)), 0.0);
            e.swap(Some(price));
            assert_eq!(e.buffer(), "0");
            assert!(!e.buffer().starts_with('-'));
        }
    }

    #[test]
    fn usd_to_coin_rounds_to_six_places() {
        let mut e = AmountEntry::new();
        e.swap(Some(1.0));
        assert_eq!(e.direction(), Direction::UsdToCoin);
        assert_eq!(e.buffer(), "1.00");
        assert_eq!(e.converted_amount(Some(3.0)), 0.333333);
        assert_eq!(e.converted_display(Some(3.0)), "0.333333");
    }

    #[test]
    fn zero_price_never_yields_infinity() {
        let mut e = AmountEntry::new();
        e.swap(Some(1.0));
        assert_eq!(e.converted_amount(Some(0.0)), 0.0);
        assert_eq!(e.converted_display(Some(0.0)), "0");
        assert_eq!(e.converted_display(Some(f64::NAN)), "0");
        assert_eq!(e.converted_display(None), "0");
    }

    #[test]
    fn trailing_decimal_point_still_converts() {
        let mut e = AmountEntry::new();
        e.append_decimal_point();
        assert_eq!(e.buffer(), "1.");
        assert_eq!(e.converted_display(Some(2.5)), "2.50");
    }

    #[test]
    fn swap_carries_converted_value_and_flips() {
        let mut e = AmountEntry::new();
        e.clear();
        e.append_digit(2);
        e.swap(Some(3.0));
        assert_eq!(e.buffer(), "6.00");
        assert_eq!(e.direction(), Direction::UsdToCoin);
        assert_eq!(e.converted_amount(Some(3.0)), 2.0);

        e.swap(Some(3.0));
        assert_eq!(e.buffer(), "2.000000");
        assert_eq!(e.direction(), Direction::CoinToUsd);
    }

    #[test]
    fn swap_round_trip_requantizes() {
        let mut e = AmountEntry::new();
        e.clear();
        for d in [1, 2, 3] {
            e.append_digit(d);
        }
        let price = 7.3;
        let usd = e.converted_amount(Some(price));
        e.swap(Some(price));
        let back = e.converted_amount(Some(price));
        e.swap(Some(price));
        assert_eq!(e.buffer().parse::<f64>().unwrap(), back);
        assert_eq!(back, round_to(usd / price, 6));
    }

    #[test]
    fn swap_without_price_resets_to_zero() {
        let mut e = AmountEntry::new();
        e.swap(None);
        assert_eq!(e.buffer(), "0");
        assert_eq!(e.direction(), Direction::UsdToCoin);
    }

    #[test]
    fn swap_trims_fraction_to_fit() {
        let mut e = AmountEntry::new();
        e.clear();
        for _ in 0..13 {
            e.append_digit(9);
        }
        e.swap(Some(1.0));
        assert!(e.buffer().len() <= MAX_BUFFER_LEN);
        assert!(matches_grammar(e.buffer()));
        assert_eq!(e.direction(), Direction::UsdToCoin);
    }

    #[test]
    fn swap_refused_when_integer_part_overflows() {
        let mut e = AmountEntry::new();
        e.clear();
        for _ in 0..MAX_BUFFER_LEN {
            e.append_digit(9);
        }
        let before = e.clone();
        e.swap(Some(1000.0));
        assert_eq!(e, before);
    }

    #[test]
    fn labels_follow_direction() {
        let mut e = AmountEntry::new();
        assert_eq!(e.labels(Some("btc")), ("BTC".to_string(), "USD".to_string()));
        e.swap(Some(1.0));
        assert_eq!(e.labels(Some("btc")), ("USD".to_string(), "BTC".to_string()));
    }

    #[test]
    fn key_from_char() {
        assert_eq!(Key::from_char('7'), Some(Key::Digit(7)));
        assert_eq!(Key::from_char(','), Some(Key::Decimal));
        assert_eq!(Key::from_char('C'), Some(Key::Clear));
        assert_eq!(Key::from_char('z'), None);
    }
}
