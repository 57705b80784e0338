// TUI event loop and terminal management
use crate::{App, InputMode};
use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use exactmails_api::HistoryService;
use exactmails_core::records_from_wire;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::debug;

pub async fn run_tui(
    mut app: App,
    history_service: HistoryService,
    mouse_enabled: bool,
) -> anyhow::Result<()> {
    // Initial history fetch before the terminal takes over the screen.
    app.loading = true;
    match history_service.search_history().await {
        Ok(records) => {
            app.absorb_history(records_from_wire(records), Utc::now());
        }
        Err(e) => {
            app.error_message = Some(format!("Failed to fetch search history: {}", e));
        }
    }
    app.loading = false;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse_enabled {
        execute!(io::stdout(), EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &history_service).await;

    // Restore terminal whatever happened in the loop
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    if mouse_enabled {
        execute!(io::stdout(), DisableMouseCapture)?;
    }
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    history_service: &HistoryService,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| crate::ui::render(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // A fresh keypress clears last turn's notices.
            if app.input_mode == InputMode::Normal {
                app.status_message = None;
                app.error_message = None;
            }

            match app.input_mode {
                InputMode::ConfirmingDelete => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => {
                        if let Some(id) = app.pending_delete {
                            // The row disappears only once the backend
                            // confirms; a failed call leaves it in place.
                            match history_service.delete(id).await {
                                Ok(()) => app.finish_delete(id, Utc::now()),
                                Err(e) => {
                                    debug!("delete failed: {}", e);
                                    app.fail_delete();
                                }
                            }
                        } else {
                            app.cancel_delete();
                        }
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        app.cancel_delete();
                    }
                    _ => {}
                },
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        app.should_quit = true;
                    }
                    KeyCode::Tab => {
                        app.next_tab();
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        app.next_row();
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        app.previous_row();
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        app.toggle_selected();
                    }
                    KeyCode::Char('d') => {
                        app.request_delete();
                    }
                    KeyCode::Char('c') => match app.copy_target() {
                        Some(email) => copy_to_clipboard(app, &email),
                        None => {
                            app.error_message = Some("No email to copy".to_string());
                        }
                    },
                    KeyCode::Char('C') => match app.copy_verified_target() {
                        Some(emails) => copy_to_clipboard(app, &emails),
                        None => {
                            app.error_message = Some("No verified emails to copy".to_string());
                        }
                    },
                    KeyCode::Char('o') => match app.open_target() {
                        Some(url) => {
                            if open::that(&url).is_err() {
                                app.error_message = Some("Failed to open browser".to_string());
                            }
                        }
                        None => {
                            app.error_message = Some("No profile URL on this record".to_string());
                        }
                    },
                    KeyCode::Char('r') => {
                        app.loading = true;
                        match history_service.search_history().await {
                            Ok(records) => {
                                app.absorb_history(records_from_wire(records), Utc::now());
                                app.status_message = Some("History refreshed".to_string());
                            }
                            Err(e) => {
                                app.error_message =
                                    Some(format!("Failed to fetch search history: {}", e));
                            }
                        }
                        app.loading = false;
                    }
                    _ => {}
                },
            }
        }
    }
}

fn copy_to_clipboard(app: &mut App, text: &str) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => {
            app.status_message = Some("Copied!".to_string());
        }
        Err(e) => {
            debug!("clipboard error: {}", e);
            app.error_message = Some("Failed to copy to clipboard".to_string());
        }
    }
}
