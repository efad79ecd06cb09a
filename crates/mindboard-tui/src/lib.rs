//! mindboard-tui - TUI frontend for mindboard using Ratatui
//!
//! Draws each widget's retained scene on a braille canvas and turns mouse
//! and keyboard input into pointer events on the dashboard.

pub mod app;
pub mod theme;
pub mod ui;

pub use app::App;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mindboard_core::{CoreError, Dashboard, DashboardConfig, LoadReport};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::info;

type LoadResult = Result<(Dashboard, LoadReport), CoreError>;

/// Run the TUI application
pub async fn run(config: DashboardConfig, csv_path: PathBuf) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Starts in loading mode
    let mut app = App::new(&csv_path);
    let mut ui = ui::Ui::new();

    let (load_tx, mut load_rx) = oneshot::channel();

    // Parse the survey off the UI loop
    tokio::spawn(async move {
        let result = Dashboard::open(config, &csv_path).await;
        let _ = load_tx.send(result);
    });

    let result = run_loop_with_loading(&mut terminal, &mut app, &mut ui, &mut load_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop_with_loading<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    ui: &mut ui::Ui,
    load_rx: &mut oneshot::Receiver<LoadResult>,
) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    loop {
        if app.is_loading {
            if let Ok(result) = load_rx.try_recv() {
                if let Ok((dashboard, report)) = &result {
                    info!(
                        rows = dashboard.store().len(),
                        dropped = report.rows_dropped(),
                        "Survey ready"
                    );
                }
                app.complete_loading(result);
            }
        }

        app.poll_events();

        // Loading screen or dashboard, depending on app state
        terminal.draw(|f| ui.render(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key.code, key.modifiers);
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
