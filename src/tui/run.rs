//! TUI entry point and terminal setup.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::ai::{self, GeminiAssistant};
use crate::config::Config;
use crate::db::Database;
use crate::tui::app::App;

/// Initialise the terminal, run the interface until the user quits, then
/// restore the terminal even when the app failed.
pub fn run_tui(db: Database, config: &Config) -> io::Result<()> {
    let runtime = ai::runtime()?;
    let assistant = GeminiAssistant::new(config.api_key.clone(), &config.model);
    let mut app = App::new(db, Box::new(assistant), runtime);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
