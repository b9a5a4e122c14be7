use chrono::DateTime;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

use crate::app::{App, QUICK_TREND};
use crate::chart::{map_prediction, ChartFrame, ChartGeometry};
use crate::converter::{self, Key, KEYPAD};
use crate::format::format_price;
use crate::narrative::{NarrativePanel, Notice, NoticeKind};
use crate::theme::Theme;
use crate::types::*;

pub fn draw(f: &mut Frame, app: &App) {
    // Fill background
    let bg_block = Block::default().style(Style::default().bg(app.theme.bg));
    f.render_widget(bg_block, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // top bar
            Constraint::Min(5),   // main
            Constraint::Length(1), // bottom bar
        ])
        .split(f.area());

    draw_top_bar(f, app, chunks[0]);
    match app.menu {
        Menu::Tools => draw_converter(f, app, chunks[1]),
        Menu::Ai => draw_ai(f, app, chunks[1]),
    }
    draw_bottom_bar(f, app, chunks[2]);

    if app.menu == Menu::Tools && app.selector.is_open() {
        draw_selector(f, app);
    }
}

// -- Top bar --

fn draw_top_bar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;

    let mut spans: Vec<Span> = vec![
        Span::styled(
            " coinverter ",
            Style::default().fg(t.title).add_modifier(Modifier::BOLD),
        ),
        Span::styled("\u{2689} ", Style::default().fg(t.dim)),
    ];

    for (i, menu) in [Menu::Tools, Menu::Ai].iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" \u{b7} ", Style::default().fg(t.dim)));
        }
        let style = if *menu == app.menu {
            Style::default().fg(t.title).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.dim)
        };
        spans.push(Span::styled(menu.label(), style));
    }

    // Right-align refresh info
    let refresh_info = if app.coins_loading {
        "loading...".to_string()
    } else {
        app.last_refresh_display()
    };

    if !refresh_info.is_empty() {
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let pad = (area.width as usize).saturating_sub(used + refresh_info.len() + 1);
        if pad > 0 {
            spans.push(Span::raw(" ".repeat(pad)));
        }
        spans.push(Span::styled(refresh_info, Style::default().fg(t.dim)));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(t.border)),
    );
    f.render_widget(bar, area);
}

// -- Converter --

fn draw_converter(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;

    let w = 40_u16.min(area.width);
    let h = 19_u16.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    let card = Rect::new(x, y, w, h);

    let block = Block::default()
        .title(" Converter ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border));
    let inner = block.inner(card);
    f.render_widget(block, card);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // display
            Constraint::Length(1), // coin picker
            Constraint::Length(1), // blank
            Constraint::Min(4),   // keypad
        ])
        .split(inner);

    draw_display(f, app, chunks[0]);
    draw_coin_line(f, app, chunks[1]);
    draw_keypad(f, t, chunks[3]);
}

fn draw_display(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let (from, to) = app.currency_labels();
    let width = area.width.saturating_sub(2) as usize;

    let row = |label: &str, value: String, value_style: Style| {
        let pad = width.saturating_sub(label.len() + value.chars().count() + 2);
        Line::from(vec![
            Span::styled(format!(" {}", label), Style::default().fg(t.dim)),
            Span::raw(" ".repeat(pad)),
            Span::styled(value, value_style),
            Span::raw(" "),
        ])
    };

    let lines = vec![
        row(
            &from,
            app.entry.buffer().to_string(),
            Style::default().fg(t.input_accent).add_modifier(Modifier::BOLD),
        ),
        row(&to, app.converted_display(), Style::default().fg(t.accent)),
    ];

    let display = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.border)),
    );
    f.render_widget(display, area);
}

fn draw_coin_line(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let line = match app.selected_coin() {
        None => Line::from(Span::styled(
            " Loading market data...",
            Style::default().fg(t.dim),
        )),
        Some(coin) => {
            let pinned = app.entry.direction() == converter::Direction::UsdToCoin;
            let mut spans = vec![
                Span::styled(" Coin: ", Style::default().fg(t.dim)),
                Span::styled(
                    coin.name.clone(),
                    Style::default().fg(t.fg).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" ({}) ", coin.ticker()), Style::default().fg(t.dim)),
                Span::styled(
                    format!("${}", format_price(coin.current_price)),
                    Style::default().fg(t.accent),
                ),
            ];
            if pinned {
                spans.push(Span::styled(" pinned", Style::default().fg(t.dim)));
            } else {
                spans.push(Span::styled(" \u{25be}", Style::default().fg(t.dim)));
            }
            Line::from(spans)
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_keypad(f: &mut Frame, t: &Theme, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(KEYPAD.iter().map(|_| Constraint::Ratio(1, KEYPAD.len() as u32)))
        .split(area);

    for (row_area, keys) in rows.iter().zip(KEYPAD.iter()) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(*row_area);

        for (col, key) in cols.iter().zip(keys.iter()) {
            let bg = match key {
                Key::Digit(_) | Key::Decimal => t.key_bg,
                _ => t.key_action_bg,
            };
            let cell = Rect::new(col.x + 1, col.y, col.width.saturating_sub(2), col.height.saturating_sub(1).max(1));
            let inner_y = cell.height.saturating_sub(1) / 2;
            let mut lines = vec![Line::raw(""); inner_y as usize];
            lines.push(Line::from(key.label()));
            let button = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().fg(t.fg).bg(bg).add_modifier(Modifier::BOLD));
            f.render_widget(button, cell);
        }
    }
}

// -- Coin selector popup --

fn draw_selector(f: &mut Frame, app: &App) {
    let t = &app.theme;
    let area = centered_rect(50, 70, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Select coin ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // filter
            Constraint::Length(1), // blank
            Constraint::Min(1),   // list
        ])
        .split(inner);

    let filter = Paragraph::new(format!("  / {}_", app.selector.filter()))
        .style(Style::default().fg(t.input_accent));
    f.render_widget(filter, chunks[0]);

    let visible = app.selector.visible_coins();
    if visible.is_empty() {
        let msg = Paragraph::new("  No coins match.").style(Style::default().fg(t.dim));
        f.render_widget(msg, chunks[2]);
        return;
    }

    let height = chunks[2].height as usize;
    let cursor = app.selector.cursor();
    let offset = cursor.saturating_sub(height.saturating_sub(1));
    let selected_id = app.selected_coin().map(|c| c.id.as_str());

    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, coin)| {
            let is_cursor = i == cursor;
            let marker = if Some(coin.id.as_str()) == selected_id { "\u{2713} " } else { "  " };
            let name_style = if is_cursor {
                Style::default().fg(t.highlight_fg).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(t.fg)
            };
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(t.accent)),
                Span::styled(coin.name.clone(), name_style),
                Span::styled(format!(" ({})", coin.ticker()), Style::default().fg(t.dim)),
                Span::styled(
                    format!("  ${}", format_price(coin.current_price)),
                    Style::default().fg(t.dim),
                ),
            ]);
            if is_cursor {
                line.style(Style::default().bg(t.highlight_bg))
            } else {
                line
            }
        })
        .collect();

    f.render_widget(Paragraph::new(lines), chunks[2]);
}

// -- AI --

fn draw_ai(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // sections
            Constraint::Min(3),   // panel
        ])
        .split(area);

    let mut spans = vec![Span::raw(" ")];
    for (i, section) in [AiSection::Info, AiSection::Prediction].iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" \u{2502} ", Style::default().fg(t.dim)));
        }
        let style = if *section == app.ai_section {
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(t.dim)
        };
        spans.push(Span::styled(section.label(), style));
    }
    if !app.ai_enabled {
        spans.push(Span::styled("   (AI disabled: no API key)", Style::default().fg(t.dim)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    match app.ai_section {
        AiSection::Info => draw_info(f, app, chunks[1]),
        AiSection::Prediction => draw_trend(f, app, chunks[1]),
    }
}

fn draw_info(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let block = Block::default()
        .title(" Coin Info ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let coin = match app.selected_coin() {
        Some(c) => c,
        None => {
            let msg = Paragraph::new("  Select a coin in the converter to learn more about it.")
                .style(Style::default().fg(t.dim));
            f.render_widget(msg, inner);
            return;
        }
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {}", coin.name),
                Style::default().fg(t.fg).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {}", coin.ticker()), Style::default().fg(t.dim)),
        ]),
        Line::raw(""),
    ];

    if let Some(line) = status_line(t, &app.info, "Thinking...") {
        lines.push(line);
    } else if let Some(text) = app.info.content() {
        lines.extend(text.lines().map(|l| Line::from(format!(" {}", l))));
    } else {
        lines.push(Line::from(Span::styled(
            format!(" Press Enter to learn about {}.", coin.name),
            Style::default().fg(t.dim),
        )));
    }

    let p = Paragraph::new(lines)
        .style(Style::default().fg(t.fg))
        .wrap(Wrap { trim: false });
    f.render_widget(p, inner);
}

fn draw_trend(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let title = match app.trend.subject() {
        Some(name) => format!(" Trend Prediction: {} ", name),
        None => " Trend Prediction ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let report = app.trend.content();
    let geometry = report.and_then(|r| {
        map_prediction(&r.history, &r.prediction.predicted_prices, ChartFrame::default())
    });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // analysis
            Constraint::Min(3),   // chart
            Constraint::Length(1), // legend
        ])
        .split(inner);

    let mut lines = Vec::new();
    if let Some(line) = status_line(t, &app.trend, "Analyzing market trend...") {
        lines.push(line);
    }
    if let Some(report) = report {
        lines.push(Line::from(format!(" {}", report.prediction.analysis)));
    } else if !app.trend.is_loading() && app.trend.notice().is_none() {
        let quick = QUICK_TREND
            .iter()
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(" or ");
        lines.push(Line::from(Span::styled(
            format!(" Press Enter for the selected coin, or b/e for {}.", quick),
            Style::default().fg(t.dim),
        )));
    }
    let analysis = Paragraph::new(lines)
        .style(Style::default().fg(t.fg))
        .wrap(Wrap { trim: false });
    f.render_widget(analysis, chunks[0]);

    if let Some(geo) = geometry.filter(|g| g.forecast.points.len() > 1) {
        draw_chart(f, t, &geo, chunks[1]);

        let legend = Line::from(vec![
            Span::styled(" \u{2500}\u{2500} ", Style::default().fg(t.history_line)),
            Span::styled("Price history (30 days)  ", Style::default().fg(t.dim)),
            Span::styled("\u{2504}\u{2504} ", Style::default().fg(t.forecast_line)),
            Span::styled(
                format!("AI prediction {}", forecast_span(&geo.forecast_timestamps)),
                Style::default().fg(t.dim),
            ),
        ]);
        f.render_widget(Paragraph::new(legend), chunks[2]);
    }
}

fn forecast_span(timestamps: &[i64]) -> String {
    let day = |ms: i64| {
        DateTime::from_timestamp_millis(ms)
            .map(|d| d.format("%b %-d").to_string())
            .unwrap_or_default()
    };
    match (timestamps.first(), timestamps.last()) {
        (Some(&a), Some(&b)) if a != b => format!("({} - {})", day(a), day(b)),
        (Some(&a), _) => format!("({})", day(a)),
        _ => String::new(),
    }
}

/// Loading indicator or notice for a panel, if either applies.
fn status_line<T>(t: &Theme, panel: &NarrativePanel<T>, loading: &str) -> Option<Line<'static>> {
    if panel.is_loading() {
        return Some(Line::from(Span::styled(
            format!(" {}", loading),
            Style::default().fg(t.dim).add_modifier(Modifier::ITALIC),
        )));
    }
    panel.notice().map(|n| notice_line(t, n))
}

fn notice_line(t: &Theme, notice: &Notice) -> Line<'static> {
    let color = match notice.kind {
        NoticeKind::Disabled => t.input_accent,
        NoticeKind::Failed => t.error,
    };
    Line::from(Span::styled(format!(" {}", notice.message), Style::default().fg(color)))
}

fn draw_chart(f: &mut Frame, t: &Theme, geo: &ChartGeometry, area: Rect) {
    let frame = geo.frame;
    // Geometry is top-left based; the canvas grows upwards.
    let flip = |y: f64| frame.height - y;

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, frame.width])
        .y_bounds([0.0, frame.height])
        .paint(|ctx| {
            for line in &geo.grid {
                ctx.draw(&CanvasLine::new(
                    frame.left,
                    flip(line.y),
                    frame.width - frame.right,
                    flip(line.y),
                    t.grid,
                ));
            }
            ctx.layer();
            for (a, b) in geo.history.segments() {
                ctx.draw(&CanvasLine::new(a.x, flip(a.y), b.x, flip(b.y), t.history_line));
            }
            for (a, b) in geo.forecast.segments() {
                ctx.draw(&CanvasLine::new(a.x, flip(a.y), b.x, flip(b.y), t.forecast_line));
            }
            for line in &geo.grid {
                ctx.print(
                    0.0,
                    flip(line.y),
                    Span::styled(line.label.clone(), Style::default().fg(t.dim)),
                );
            }
        });
    f.render_widget(canvas, area);
}

// -- Bottom bar --

fn draw_bottom_bar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;

    let hints = match app.menu {
        Menu::Tools if app.selector.is_open() => {
            " type to filter | \u{2191}/\u{2193} move | Enter select | Esc close "
        }
        Menu::Tools => {
            " 0-9 . enter | \u{232b} del | c clear | s swap | Enter coin | r refresh | t theme | Tab \u{21c6} | q quit "
        }
        Menu::Ai => match app.ai_section {
            AiSection::Info => " \u{2190}/\u{2192} section | Enter ask | Tab \u{21c6} | q quit ",
            AiSection::Prediction => {
                " \u{2190}/\u{2192} section | Enter selected | b Bitcoin | e Ethereum | Tab \u{21c6} | q quit "
            }
        },
    };

    let bar = Paragraph::new(Line::from(Span::styled(hints, Style::default().fg(t.dim))));
    f.render_widget(bar, area);
}

// -- Helpers --

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    let x = (r.width.saturating_sub(popup_width)) / 2;
    let y = (r.height.saturating_sub(popup_height)) / 2;
    Rect::new(r.x + x, r.y + y, popup_width, popup_height)
}
