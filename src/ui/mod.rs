//! User interface components.
//!
//! Provides TUI widgets and drawing functions for the application's
//! terminal-based user interface using ratatui.

mod lyrics;
mod song_list;

pub use lyrics::{draw_lyrics, lyric_lines};
pub use song_list::{draw_song_list, truncate_title};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::constants::ui::SONG_PANE_PERCENT;
use crate::tracker::TrackerPhase;

/// Render the full application UI to the terminal frame.
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3), // Command/status bar at bottom
        ])
        .split(f.size());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(SONG_PANE_PERCENT),
            Constraint::Percentage(100 - SONG_PANE_PERCENT),
        ])
        .split(chunks[0]);

    draw_song_list(f, app, panes[0]);
    draw_lyrics(f, app, panes[1]);
    draw_command_bar(f, app, chunks[1]);

    if app.is_loading() {
        draw_loading_indicator(f);
    }

    // Error modal blocks everything else
    if let Some(error) = &app.error_message {
        draw_error_message(f, error);
        return;
    }

    if app.show_help {
        draw_help_modal(f);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn draw_command_bar(f: &mut Frame, app: &App, area: Rect) {
    let (title, border_color) = if app.search_active {
        ("Search Songs", Color::Cyan)
    } else {
        ("Commands/Status", Color::Yellow)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(title, Style::default().fg(border_color)));

    f.render_widget(block, area);

    let inner_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1)])
        .margin(1)
        .split(area)[0];

    if app.search_active {
        let search = Paragraph::new(format!(" /{}", app.search_query))
            .style(Style::default().fg(Color::Cyan));
        f.render_widget(search, inner_area);
        f.set_cursor(inner_area.left() + app.search_query.len() as u16 + 2, inner_area.top());
        return;
    }

    let mut text = create_help_text(&[
        ("Enter", "Load"),
        ("p", "Play"),
        ("Space", "Pause"),
        ("s", "Sync"),
        ("/", "Search"),
        ("q", "Quit"),
    ]);

    if app.session.song().is_some() {
        let phase = match app.session.phase() {
            TrackerPhase::Idle => "not synced",
            TrackerPhase::Armed => "synced",
            TrackerPhase::Tracking => "tracking",
        };
        text.push(Span::styled(
            format!(" | {} {phase}", format_position(app.position)),
            Style::default().fg(Color::Gray),
        ));
    }
    if let Some(status) = &app.status_message {
        text.push(Span::styled(format!(" | {status}"), Style::default().fg(Color::Cyan)));
    }

    let status_bar = Paragraph::new(Line::from(text)).style(Style::default().fg(Color::Gray));
    f.render_widget(status_bar, inner_area);
}

/// `m:ss.t` rendering of a playback position.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_position(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    format!("{}:{:02}.{}", tenths / 600, (tenths / 10) % 60, tenths % 10)
}

/// Build styled help text spans from key-description pairs for the command bar.
pub fn create_help_text<'a>(commands: &[(&'a str, &'a str)]) -> Vec<Span<'a>> {
    let mut text = vec![Span::raw(" ")];

    for (i, (key, description)) in commands.iter().enumerate() {
        text.push(Span::styled(*key, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
        text.push(Span::raw(format!(": {description}")));

        if i < commands.len() - 1 {
            text.push(Span::raw(" | "));
        }
    }

    text
}

/// Create a bordered block with a title, highlighted when focused.
pub fn create_titled_block(title: &str, is_focused: bool) -> Block<'_> {
    let (title_style, border_style) = if is_focused {
        (
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Yellow),
        )
    } else {
        (Style::default(), Style::default())
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn centered(size: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: (size.width.saturating_sub(width)) / 2,
        y: (size.height.saturating_sub(height)) / 2,
        width: width.min(size.width),
        height: height.min(size.height),
    }
}

// Non-blocking: the lyrics stay visible while the pipeline runs
fn draw_loading_indicator(f: &mut Frame) {
    let size = f.size();
    let area = Rect { y: 1, ..centered(size, 26, 3) };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let text = Paragraph::new("Synchronizing...")
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let inner_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1)])
        .margin(1)
        .split(area)[0];

    f.render_widget(text, inner_area);
}

fn draw_error_message(f: &mut Frame, message: &str) {
    let size = f.size();
    let area = centered(size, 60.min(size.width.saturating_sub(4)), 8);

    let block = Block::default()
        .title(Span::styled("Error", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .style(Style::default().bg(Color::Black));

    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let inner_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(area);

    f.render_widget(text, inner_area[1]);

    let hint = Paragraph::new("Press any key to dismiss")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);

    f.render_widget(hint, inner_area[2]);
}

fn draw_help_modal(f: &mut Frame) {
    let size = f.size();
    let area = centered(
        size,
        50.min(size.width.saturating_sub(4)),
        16.min(size.height.saturating_sub(4)),
    );

    let block = Block::default()
        .title(Span::styled(" Help - Keybindings ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let inner_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1)])
        .margin(1)
        .split(area)[0];

    let help_text: Vec<Line> = HELP_LINES
        .iter()
        .map(|(key, desc, is_header)| {
            if *is_header {
                Line::from(Span::styled(*key, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)))
            } else {
                Line::from(vec![
                    Span::styled(format!("{key:>12}"), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    Span::styled(*desc, Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    f.render_widget(Paragraph::new(help_text).wrap(Wrap { trim: true }), inner_area);
}

const HELP_LINES: &[(&str, &str, bool)] = &[
    ("── Songs ──", "", true),
    ("↑/↓ or j/k", "Select song", false),
    ("Enter", "Load song and lyrics", false),
    ("/", "Search songs", false),
    ("", "", false),
    ("── Playback ──", "", true),
    ("p", "Play / resume", false),
    ("Space", "Pause", false),
    ("s", "Synchronize lyrics", false),
    ("", "", false),
    ("q / Esc", "Quit", false),
    ("", "", false),
    ("Press any key to close", "", true),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_position() {
        assert_eq!(format_position(0.0), "0:00.0");
        assert_eq!(format_position(61.25), "1:01.3");
        assert_eq!(format_position(-3.0), "0:00.0");
    }

    #[test]
    fn test_help_text_separators() {
        let spans = create_help_text(&[("a", "One"), ("b", "Two")]);
        // padding, key, desc, separator, key, desc
        assert_eq!(spans.len(), 6);
        assert_eq!(spans[3].content, " | ");
    }
}
