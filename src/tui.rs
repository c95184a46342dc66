use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, EventStream,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};

use crate::app_state::AppState;
use crate::dispatcher::Dispatcher;
use crate::events::{handle_key_event, handle_mouse_event, handle_paste, Action};
use crate::query_client::QueryClient;
use crate::ui::draw_ui;

const SPINNER_TICK: Duration = Duration::from_millis(120);

/// Raw mode and the alternate screen, undone on drop whatever way the UI exits.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        // From here on the guard owns the cleanup, even if the next step fails
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)
            .context("Failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal(&mut io::stdout()) {
            error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Runs every restore step; the first failure is reported after the rest have run.
fn restore_terminal<W: Write>(out: &mut W) -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(
        out,
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste,
        Show
    );
    raw.and(screen)
}

pub async fn run(client: QueryClient) -> Result<()> {
    info!(endpoint = client.endpoint(), "Starting terminal UI");

    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppState::new();
    let mut dispatcher = Dispatcher::new(client);

    let result = run_app(&mut terminal, &mut app, &mut dispatcher).await;

    if let Err(e) = &result {
        error!("Terminal UI stopped with error: {:?}", e);
    }
    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    dispatcher: &mut Dispatcher,
) -> Result<()> {
    let mut reader = EventStream::new();
    let mut tick = tokio::time::interval(SPINNER_TICK);

    loop {
        terminal.draw(|f| draw_ui(f, app))?;

        tokio::select! {
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        tracing::debug!("Key event: {:?} with modifiers: {:?}", key.code, key.modifiers);
                        match handle_key_event(app, key) {
                            Action::Quit => break,
                            Action::Dispatch(query) => {
                                app.begin_request();
                                dispatcher.dispatch(query);
                            }
                            Action::None => {}
                        }
                    }
                    Some(Ok(Event::Mouse(mouse))) => handle_mouse_event(app, mouse.kind),
                    Some(Ok(Event::Paste(data))) => handle_paste(app, &data),
                    Some(Ok(_)) => {
                        // Resize and focus events only need a redraw
                    }
                    Some(Err(e)) => error!("Event error: {}", e),
                    None => break,
                }
            }
            Some(done) = dispatcher.next() => {
                info!(request_id = %done.request_id, query = %done.query, "Rendering completion");
                app.apply_outcome(done.outcome);
                // Anything else that resolved meanwhile lands in the same frame
                while let Some(done) = dispatcher.try_next() {
                    info!(request_id = %done.request_id, query = %done.query, "Rendering completion");
                    app.apply_outcome(done.outcome);
                }
            }
            _ = tick.tick() => app.tick(),
        }
    }

    info!("Terminal UI closed");
    Ok(())
}
