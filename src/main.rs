mod api;
mod app;
mod chart;
mod config;
mod converter;
mod error;
mod format;
mod logging;
mod narrative;
mod narrator;
mod selector;
mod tasks;
mod theme;
mod types;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{error, info, warn};

use api::{CoinGeckoClient, GeminiClient, TextGenerator};
use app::{App, QUICK_TREND};
use config::Config;
use converter::Key;
use narrator::Narrator;
use tasks::{AppEvent, Tasks};
use types::*;

/// Terminal crypto/USD converter with AI market commentary.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Colour theme: dark, light or no-color
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load(Some(&config_path))?;
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }

    if let Err(e) = logging::init(&config.log_level, &Config::log_path()) {
        eprintln!("Logging disabled: {}", e);
    }
    info!(config = %config_path.display(), "starting coinverter");

    let coingecko = Arc::new(CoinGeckoClient::new(&config.coingecko_api_key, config.coin_limit)?);
    let narrator = match config::gemini_api_key() {
        Some(key) => {
            let gemini = GeminiClient::new(&key, &config.ai_model)?;
            info!(model = gemini.model(), "AI narration enabled");
            let client: Arc<dyn TextGenerator> = Arc::new(gemini);
            Narrator::new(Some(client))
        }
        None => {
            warn!("no Gemini API key found; AI features disabled");
            Narrator::disabled()
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(config, narrator.is_enabled());
    let tasks = Tasks::new(coingecko.clone(), coingecko, narrator, tx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &tasks, rx, &config_path).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        error!(error = %e, "fatal");
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tasks: &Tasks,
    mut rx: UnboundedReceiver<AppEvent>,
    config_path: &Path,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        terminal.draw(|f| ui::draw(f, &*app))?;

        // Auto-refresh
        if app.refresh_due(Instant::now()) {
            app.start_refresh(tasks);
        }

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, tasks, key, config_path);
                }
            }
        }

        if app.quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, tasks: &Tasks, key: KeyEvent, config_path: &Path) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    if app.menu == Menu::Tools && app.selector.is_open() {
        match key.code {
            KeyCode::Esc => app.selector.close(),
            KeyCode::Enter => app.select_highlighted(),
            KeyCode::Down => app.selector.move_cursor(1),
            KeyCode::Up => app.selector.move_cursor(-1),
            KeyCode::PageDown => app.selector.move_cursor(10),
            KeyCode::PageUp => app.selector.move_cursor(-10),
            KeyCode::Backspace => app.selector.pop_filter(),
            KeyCode::Char(c) => app.selector.push_filter(c),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit = true;
            return;
        }
        KeyCode::Tab => {
            app.next_menu();
            return;
        }
        _ => {}
    }

    match app.menu {
        Menu::Tools => match key.code {
            KeyCode::Enter => app.toggle_selector(),
            KeyCode::Backspace => app.press(Key::Backspace),
            KeyCode::Delete => app.press(Key::Clear),
            KeyCode::Char('r') => app.start_refresh(tasks),
            KeyCode::Char('t') => {
                app.cycle_theme();
                if let Err(e) = app.config.save(config_path) {
                    warn!(error = %e, "could not persist theme");
                }
            }
            KeyCode::Char(c) => {
                if let Some(k) = Key::from_char(c) {
                    app.press(k);
                }
            }
            _ => {}
        },
        Menu::Ai => match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::BackTab => {
                app.ai_section = app.ai_section.next();
            }
            KeyCode::Char('1') => app.ai_section = AiSection::Info,
            KeyCode::Char('2') => app.ai_section = AiSection::Prediction,
            KeyCode::Enter | KeyCode::Char('g') => match app.ai_section {
                AiSection::Info => app.request_info(tasks),
                AiSection::Prediction => app.request_trend_for_selected(tasks),
            },
            KeyCode::Char(c @ ('b' | 'e')) if app.ai_section == AiSection::Prediction => {
                let (id, name) = if c == 'b' { QUICK_TREND[0] } else { QUICK_TREND[1] };
                app.request_trend(tasks, id, name);
            }
            _ => {}
        },
    }
}
