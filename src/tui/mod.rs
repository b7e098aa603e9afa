//! Terminal User Interface module for getem.
//!
//! Provides the Search and Manage tabs using ratatui for rendering and
//! crossterm for terminal management.

use std::io;
use std::panic;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::models::{OptionKey, OptionValue};
use crate::service::{DeletionRequest, NoteService};
use crate::storage::KeyValueStore;
use crate::validation::ValidationError;

mod app;
pub mod event;
mod ui;

pub use app::{App, Command, Focus};

/// Initializes the terminal for TUI rendering.
///
/// Enables raw mode and enters the alternate screen.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Must run before exiting the TUI, even in error cases.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Minimal terminal restoration for the panic hook. Errors are ignored.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Installs a panic hook that restores the terminal before the original hook runs.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs `command` against the service and refreshes `app`.
///
/// Validation failures become a status message; anything else is returned.
pub fn apply_command<S: KeyValueStore>(
    app: &mut App,
    service: &mut NoteService<S>,
    command: Command,
) -> Result<()> {
    let result = match command {
        Command::SwitchTab(tab) => {
            service.update_option(OptionKey::ActiveMainTabKey, OptionValue::Tab(tab))
        }
        Command::MoveNote { active, over } => service.reorder_notes(&active, &over),
        Command::RequestDelete(id) => {
            service
                .request_note_deletion(&id)
                .map(|request| match request {
                    DeletionRequest::NeedsConfirmation(id) => app.open_delete_confirm(id),
                    DeletionRequest::Deleted => app.set_status("Note deleted"),
                })
        }
        Command::ConfirmDelete(id) => service
            .delete_note(&id)
            .map(|()| app.set_status("Note deleted")),
        Command::GenerateDemo => service.generate_demo().map(|summary| {
            app.dismiss_demo_prompt();
            app.set_status(format!(
                "Added {} demo notes and {} tags",
                summary.notes_created, summary.tags_created
            ));
        }),
        Command::HideDemoPermanently => {
            service.update_option(OptionKey::HideDemoPerm, OptionValue::Bool(true))
        }
    };

    match result {
        Ok(()) => {}
        Err(e) if e.downcast_ref::<ValidationError>().is_some() => app.set_status(e.to_string()),
        Err(e) => return Err(e),
    }

    app.sync(service);
    Ok(())
}

/// Runs the main event loop for the TUI.
///
/// Terminal state is always restored, even on error.
pub fn run_event_loop<S: KeyValueStore>(app: &mut App, service: &mut NoteService<S>) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, service, &mut terminal);

    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

fn run_event_loop_internal<S: KeyValueStore>(
    app: &mut App,
    service: &mut NoteService<S>,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        if crossterm_event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
        {
            if event::handle_key_event(app, key) {
                break;
            }
            for command in app.take_commands() {
                apply_command(app, service, command)?;
            }
            if app.take_refresh() {
                app.sync(service);
            }
        }
    }

    Ok(())
}

/// Entry point for the TUI application.
///
/// # Errors
///
/// Returns an error if terminal setup, a storage write or the event loop fails.
pub fn run<S: KeyValueStore>(service: &mut NoteService<S>) -> Result<()> {
    init_panic_hook();

    let mut app = App::from_service(service);
    run_event_loop(&mut app, service).context("TUI event loop failed")?;

    Ok(())
}
