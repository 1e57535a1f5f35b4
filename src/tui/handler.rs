//! Async event handler for the playground.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use super::{
    app::{App, Phase},
    events::TuiEvent,
    ui::render_ui,
};
use crate::bootstrap::{Bootstrapper, CorePolicy, PackageList};
use crate::execution::ExecutionSession;
use crate::process::python::{PythonEngine, PythonLoader};

pub struct PlaygroundOptions {
    pub packages: PackageList,
    pub policy: CorePolicy,
    pub executable: Option<String>,
    pub snippet: String,
}

/// Run the interactive playground until the user quits.
pub async fn run_playground(opts: PlaygroundOptions) -> Result<()> {
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("the playground requires a proper terminal environment"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&opts.snippet);
    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();
    spawn_bootstrap(opts, event_tx.clone());

    let stop = Arc::new(AtomicBool::new(false));
    spawn_input(event_tx.clone(), stop.clone());

    let result = run_app(&mut terminal, &mut app, event_tx, event_rx).await;
    stop.store(true, Ordering::Relaxed);

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(session) = result? {
        shutdown(session).await;
    }
    Ok(())
}

/// Start the bootstrap and forward its progress into the event channel.
fn spawn_bootstrap(opts: PlaygroundOptions, tx: mpsc::UnboundedSender<TuiEvent>) {
    let (boot, mut progress_rx) = Bootstrapper::new(opts.packages, opts.policy);

    let progress_tx = tx.clone();
    tokio::spawn(async move {
        loop {
            let progress = progress_rx.borrow_and_update().clone();
            if progress_tx.send(TuiEvent::Progress(progress)).is_err() {
                break;
            }
            if progress_rx.changed().await.is_err() {
                break;
            }
        }
    });

    let loader = PythonLoader::new(opts.executable);
    tokio::spawn(async move {
        // Failures already reached the status line through the progress channel.
        if let Ok(ready) = boot.run(loader).await {
            let _ = tx.send(TuiEvent::Ready {
                session: Arc::new(ready.session),
                version: ready.version,
                skipped: ready.skipped,
                warning: ready.warning,
            });
        }
    });
}

fn spawn_input(tx: mpsc::UnboundedSender<TuiEvent>, stop: Arc<AtomicBool>) {
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                continue;
            }
            let ev = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => TuiEvent::Key(key),
                Ok(Event::Paste(text)) => TuiEvent::Paste(text),
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("terminal input error: {e}");
                    break;
                }
            };
            if tx.send(ev).is_err() {
                break; // Channel closed
            }
        }
    });
}

/// Main application loop. Returns the session, if one was ever published.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<Option<Arc<ExecutionSession<PythonEngine>>>> {
    let mut session: Option<Arc<ExecutionSession<PythonEngine>>> = None;

    loop {
        terminal.draw(|frame| render_ui(frame, app))?;

        while let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => {
                    if handle_key_event(app, key, session.as_ref(), &event_tx) {
                        return Ok(session);
                    }
                }
                TuiEvent::Paste(text) => {
                    if app.phase == Phase::Ready {
                        app.editor.insert_str(&text);
                    }
                }
                TuiEvent::Progress(progress) => app.update_progress(progress),
                TuiEvent::Ready {
                    session: s,
                    version,
                    skipped,
                    warning,
                } => {
                    app.set_ready(version, &skipped, warning);
                    session = Some(s);
                }
                TuiEvent::RunFinished(result) => app.finish_run(result),
            }
        }

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
}

/// Handle keyboard events. Returns true when the user asked to quit.
fn handle_key_event(
    app: &mut App,
    key: KeyEvent,
    session: Option<&Arc<ExecutionSession<PythonEngine>>>,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Esc => return true,
        _ => {}
    }

    let Some(session) = session.filter(|_| app.phase == Phase::Ready) else {
        return key.code == KeyCode::Char('q');
    };

    if app.show_help {
        app.toggle_help();
        return false;
    }

    match key.code {
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::F(5) => start_run(app, session, event_tx),
        KeyCode::Char('r') if ctrl => start_run(app, session, event_tx),
        KeyCode::Char('l') if ctrl => app.clear_result(),
        KeyCode::PageUp => app.scroll_result_up(),
        KeyCode::PageDown => app.scroll_result_down(),
        KeyCode::Enter => app.editor.newline(),
        KeyCode::Tab => app.editor.insert_str("    "),
        KeyCode::Backspace => app.editor.backspace(),
        KeyCode::Delete => app.editor.delete(),
        KeyCode::Left => app.editor.move_left(),
        KeyCode::Right => app.editor.move_right(),
        KeyCode::Up => app.editor.move_up(),
        KeyCode::Down => app.editor.move_down(),
        KeyCode::Home => app.editor.move_home(),
        KeyCode::End => app.editor.move_end(),
        KeyCode::Char(c) if !ctrl => app.editor.insert_char(c),
        _ => {}
    }
    false
}

fn start_run(
    app: &mut App,
    session: &Arc<ExecutionSession<PythonEngine>>,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) {
    if session.is_busy() || !app.begin_run() {
        return;
    }
    let code = app.editor.text();
    let session = session.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let shown = session.run_display(&code).await;
        let _ = tx.send(TuiEvent::RunFinished(shown));
    });
}

async fn shutdown(session: Arc<ExecutionSession<PythonEngine>>) {
    match Arc::try_unwrap(session) {
        Ok(session) => session.into_engine().shutdown().await,
        // A run is still in flight; the child is killed when its handle drops.
        Err(_) => tracing::debug!("session still in use at exit"),
    }
}
