use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_subscriber::EnvFilter;

use expense_tracker::api::ExpenseApi;
use expense_tracker::api::client::{ApiClient, DEFAULT_BASE_URL};
use expense_tracker::store::session::SessionStore;
use expense_tracker::ui::app::{App, AppEvent};
use expense_tracker::ui::render;

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| render::render(f, &app))?;

        // Apply whatever the background requests finished since last frame.
        while let Ok(event) = rx.try_recv() {
            app.on_event(event);
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the alternate screen stays clean; redirect it to
    // a file to capture them.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let base_url = args
        .get(1)
        .cloned()
        .or_else(|| std::env::var("EXPENSE_TRACKER_API").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    tracing::info!("Using backend at {base_url}");

    let store = SessionStore::new()?;
    let session = store.load();
    let api: Arc<dyn ExpenseApi> = Arc::new(ApiClient::new(base_url));
    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(api, store, session, tx);
    app.start();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}
