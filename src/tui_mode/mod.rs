pub mod app;
mod helpers;
mod ui;
mod worker;

use anyhow::Result;
use app::App;
use crossterm::{
    cursor::{SetCursorStyle, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sci_calc::ai::service_from_config;
use sci_calc::config::AppConfig;
use sci_calc::session::Session;
use std::io;
use tracing::{info, warn};
use worker::AiWorker;

pub(crate) fn run_tui(config: &AppConfig) -> Result<()> {
    let session = Session::new()
        .with_history_limit(config.history_limit)
        .with_plot_range(config.domain, config.steps);

    let ai_worker = match AiWorker::spawn(service_from_config(&config.ai)) {
        Ok(worker) => Some(worker),
        Err(e) => {
            warn!("AI worker unavailable: {}", e);
            None
        }
    };

    let mut app = App::new(session, ai_worker);
    let mut terminal = setup_terminal()?;
    info!("TUI started");

    let outcome = ui::run_ui_loop(&mut terminal, &mut app);

    restore_terminal(&mut terminal)?;
    outcome
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, SetCursorStyle::BlinkingBar)?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(Into::into)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show, SetCursorStyle::DefaultUserShape)?;
    Ok(())
}
