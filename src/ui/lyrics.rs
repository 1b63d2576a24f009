use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::document::LyricsDocument;
use crate::ui::create_titled_block;

/// Split the document into display lines with the highlighted span styled.
///
/// Also returns the line the highlight starts on, for scrolling.
pub fn lyric_lines(document: &LyricsDocument) -> (Vec<Line<'_>>, Option<usize>) {
    let (before, highlighted, after) = document.segments();
    let plain = Style::default().fg(Color::White);
    let marked = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut highlight_line = None;

    for (part, style) in [(before, plain), (highlighted, marked), (after, plain)] {
        if style == marked && !part.is_empty() {
            highlight_line = Some(lines.len());
        }
        let mut pieces = part.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                current.push(Span::styled(piece, style));
            }
            if pieces.peek().is_some() {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
        }
    }
    lines.push(Line::from(current));

    (lines, highlight_line)
}

/// Right pane: the loaded lyrics, scrolled to the highlight.
#[allow(clippy::cast_possible_truncation)]
pub fn draw_lyrics(f: &mut Frame, app: &App, area: Rect) {
    let title = app
        .session
        .song()
        .map_or_else(|| "Lyrics".to_string(), |song| format!("Lyrics - {}", song.title));
    let block = create_titled_block(&title, false);

    if app.session.song().is_none() {
        let hint = Paragraph::new("Select a song and press Enter")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(hint, area);
        return;
    }

    let (lines, highlight_line) = lyric_lines(app.session.document());

    // Keep the current word roughly a third of the way down
    let visible = usize::from(area.height.saturating_sub(2));
    let scroll = highlight_line
        .map_or(0, |line| line.saturating_sub(visible / 3))
        .min(usize::from(u16::MAX)) as u16;

    let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_lines_without_highlight() {
        let doc = LyricsDocument::new("one two\nthree");
        let (lines, highlight_line) = lyric_lines(&doc);
        assert_eq!(lines.len(), 2);
        assert_eq!(highlight_line, None);
    }

    #[test]
    fn test_highlight_on_second_line() {
        let mut doc = LyricsDocument::new("one two\nthree four");
        doc.highlight_span(14, 4);
        let (lines, highlight_line) = lyric_lines(&doc);
        assert_eq!(highlight_line, Some(1));

        let spans = &lines[1].spans;
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].content, "three ");
        assert_eq!(spans[1].content, "four");
        assert_eq!(spans[1].style.bg, Some(Color::Yellow));
    }
}
