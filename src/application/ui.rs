use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::ProfileName;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

fn paste(textarea: &mut tui_textarea::TextArea, text: &str) {
    for char in text.chars() {
        let key = match char {
            '\n' => Key::Enter,
            '\r' => continue,
            char => Key::Char(char),
        };

        textarea.input(Input {
            key,
            ctrl: false,
            alt: false,
        });
    }
}

fn draw<B: Backend>(
    frame: &mut Frame<B>,
    app_state: &mut AppState,
    textarea: &tui_textarea::TextArea,
) {
    let banner = app_state.failure_banner();
    let banner_height = match &banner {
        Some(_) => 4,
        None => 0,
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Min(1),
            Constraint::Length(banner_height),
            Constraint::Length(1),
            Constraint::Max(4),
        ])
        .split(frame.size());

    let transcript_rect = layout[0].inner(&Margin {
        vertical: 0,
        horizontal: 1,
    });
    if transcript_rect.width != app_state.last_known_width
        || transcript_rect.height != app_state.last_known_height
    {
        app_state.set_rect(transcript_rect);
    }

    frame.render_widget(
        Paragraph::new(app_state.lines.join("\n")).scroll((app_state.scroll.position, 0)),
        transcript_rect,
    );
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        layout[0],
        &mut app_state.scroll.scrollbar_state,
    );

    if let Some(text) = banner {
        frame.render_widget(
            Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::Red))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .title("Error"),
                ),
            layout[1],
        );
    }

    frame.render_widget(
        Paragraph::new(app_state.status_line()).style(Style::default().fg(Color::DarkGray)),
        layout[2],
    );

    if app_state.is_busy() {
        app_state
            .loading
            .render(frame, layout[3], &app_state.model());
    } else {
        frame.render_widget(textarea.widget(), layout[3]);
    }
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    let mut profile = ProfileName::Fast;
    let mut textarea = TextArea::new(profile);

    #[cfg(feature = "dev")]
    {
        paste(
            &mut textarea,
            "Explain how a hash map handles collisions. Keep it short and add a code example.",
        );
    }

    loop {
        if let Some(view) = &app_state.chat {
            if view.profile != profile {
                profile = view.profile;
                let lines = textarea.lines().join("\n");
                textarea = TextArea::new(profile);
                paste(&mut textarea, &lines);
            }
        }

        terminal.draw(|frame| {
            draw(frame, app_state, &textarea);
        })?;

        match events.next().await? {
            Event::ChatUpdated(view) => {
                app_state.handle_chat_updated(view);
            }
            Event::KeyboardCharInput(input) => {
                textarea.input(input);
            }
            Event::KeyboardPaste(text) => {
                paste(&mut textarea, &text);
            }
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardCTRLR() => {
                app_state.handle_retry(&tx)?;
            }
            Event::KeyboardCTRLT() => {
                app_state.handle_toggle_profile(&tx)?;
            }
            Event::KeyboardEnter() => {
                let input_str = textarea.lines().join("\n");
                let (should_break, should_continue) =
                    app_state.handle_slash_commands(&input_str, &tx)?;
                if should_break {
                    break;
                }
                if should_continue {
                    textarea = TextArea::new(profile);
                    continue;
                }

                if app_state.handle_message(&input_str, &tx)? {
                    textarea = TextArea::new(profile);
                }
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            Event::UITick() => {
                app_state.loading.tick();
            }
        }
    }

    return Ok(());
}

/// Restores the terminal. Failures are ignored since this also runs while
/// panicking.
pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste,
        cursor::Show
    );
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;
    let mut app_state = AppState::new();

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
