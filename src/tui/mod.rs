//! Terminal User Interface (TUI) for filling in and submitting the form

pub mod app;
pub mod components;
pub mod form_screen;
pub mod ui;

pub use app::App;
pub use form_screen::{FocusItem, FormScreen, ScreenAction};

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{error, info};

use crate::api::CollectionApi;
use crate::config::Config;

/// Set up the terminal, run the form until the user quits, then restore the terminal
pub async fn run_tui(config: &Config, api: Box<dyn CollectionApi>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, api);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match &result {
        Ok(()) => info!("TUI exited successfully"),
        Err(e) => error!("TUI encountered an error: {}", e),
    }
    result
}
