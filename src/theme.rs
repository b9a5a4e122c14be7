use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub fg: Color,
    pub bg: Color,
    pub dim: Color,
    pub border: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub accent: Color,
    pub input_accent: Color,
    pub title: Color,
    pub error: Color,
    pub key_bg: Color,
    pub key_action_bg: Color,
    pub history_line: Color,
    pub forecast_line: Color,
    pub grid: Color,
}

impl Default for Theme {
    fn default() -> Self {
        dark()
    }
}

pub const THEME_NAMES: &[&str] = &["dark", "light", "no-color"];

pub fn by_name(name: &str) -> Theme {
    match name {
        "light" => light(),
        "no-color" => no_color(),
        _ => dark(),
    }
}

pub fn dark() -> Theme {
    Theme {
        fg: Color::Indexed(253),
        bg: Color::Reset,
        dim: Color::Indexed(243),
        border: Color::Indexed(240),
        highlight_bg: Color::Indexed(237),
        highlight_fg: Color::Indexed(255),
        accent: Color::Indexed(141),        // purple
        input_accent: Color::Indexed(220), // gold
        title: Color::Indexed(99),         // indigo
        error: Color::Indexed(196),
        key_bg: Color::Indexed(238),
        key_action_bg: Color::Indexed(54), // dark purple
        history_line: Color::Indexed(63),  // indigo
        forecast_line: Color::Indexed(135), // violet
        grid: Color::Indexed(236),
    }
}

pub fn light() -> Theme {
    Theme {
        fg: Color::Indexed(234),
        bg: Color::Indexed(231),
        dim: Color::Indexed(246),
        border: Color::Indexed(251),
        highlight_bg: Color::Indexed(253),
        highlight_fg: Color::Indexed(232),
        accent: Color::Indexed(91),
        input_accent: Color::Indexed(130),
        title: Color::Indexed(55),
        error: Color::Indexed(124),
        key_bg: Color::Indexed(254),
        key_action_bg: Color::Indexed(183),
        history_line: Color::Indexed(62),
        forecast_line: Color::Indexed(128),
        grid: Color::Indexed(253),
    }
}

pub fn no_color() -> Theme {
    Theme {
        fg: Color::Reset,
        bg: Color::Reset,
        dim: Color::Reset,
        border: Color::Reset,
        highlight_bg: Color::Reset,
        highlight_fg: Color::Reset,
        accent: Color::Reset,
        input_accent: Color::Reset,
        title: Color::Reset,
        error: Color::Reset,
        key_bg: Color::Reset,
        key_action_bg: Color::Reset,
        history_line: Color::Reset,
        forecast_line: Color::Reset,
        grid: Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_falls_back_to_dark() {
        assert_eq!(by_name("sepia"), dark());
        for name in THEME_NAMES {
            let _ = by_name(name);
        }
        assert_eq!(by_name("light"), light());
    }
}
