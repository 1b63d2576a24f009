use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::constants::ui::MAX_TITLE_WIDTH;
use crate::ui::create_titled_block;

/// Left pane: the (filtered) song list.
pub fn draw_song_list(f: &mut Frame, app: &mut App, area: Rect) {
    let loaded = app.session.song().map(|s| s.id.clone());
    let selected = app.song_list_state.selected();
    let songs = app.library.songs();

    let items: Vec<ListItem> = app
        .visible
        .iter()
        .filter_map(|&idx| songs.get(idx))
        .enumerate()
        .map(|(i, song)| {
            let is_loaded = loaded.as_ref() == Some(&song.id);
            let prefix = if is_loaded { "♪ " } else { "  " };
            let text_style = if Some(i) == selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if is_loaded {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled(truncate_title(&song.title, MAX_TITLE_WIDTH), text_style),
            ]))
        })
        .collect();

    let title = if app.search_query.is_empty() {
        format!("Songs ({})", app.visible.len())
    } else {
        format!("Songs ({}/{})", app.visible.len(), songs.len())
    };

    let list = List::new(items)
        .block(create_titled_block(&title, true))
        .highlight_style(Style::default().bg(Color::Rgb(80, 80, 120)).add_modifier(Modifier::BOLD))
        .highlight_symbol("");

    f.render_stateful_widget(list, area, &mut app.song_list_state);
}

/// Cut `title` to at most `max_width` display columns, marking the cut with `…`.
pub fn truncate_title(title: &str, max_width: usize) -> String {
    let total: usize = title.chars().filter_map(UnicodeWidthChar::width).sum();
    if total <= max_width {
        return title.to_string();
    }

    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for c in title.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
