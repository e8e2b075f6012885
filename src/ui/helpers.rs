use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const STYLE_USER: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const STYLE_AGENT: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
pub const STYLE_TEXT: Style = Style::new().fg(Color::White);
pub const STYLE_MUTED: Style = Style::new().fg(Color::DarkGray);
pub const STYLE_CHOICE: Style = Style::new().fg(Color::Cyan);
pub const STYLE_CHOICE_FOCUSED: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
pub const STYLE_CARD_TITLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
pub const STYLE_CARD_BORDER: Style = Style::new().fg(Color::DarkGray);
pub const STYLE_WARNING: Style = Style::new().fg(Color::Yellow);
pub const STYLE_ERROR: Style = Style::new().fg(Color::Red);

/// Braille spinner frames
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// One activatable entry. `number` is 1-based and global across the view.
pub fn choice_line(indent: &str, number: usize, label: &str, focused: bool) -> Line<'static> {
    let (marker, style) = if focused {
        ("▶ ", STYLE_CHOICE_FOCUSED)
    } else {
        ("  ", STYLE_CHOICE)
    };
    Line::from(vec![
        Span::raw(indent.to_string()),
        Span::styled(marker, STYLE_CHOICE),
        Span::styled(format!("[{}] {}", number, label), style),
    ])
}

/// Word-wraps `text` so each row, indent included, fits in `width` columns.
/// A `width` of 0 leaves lines unwrapped.
pub fn text_lines(indent: &str, text: &str, style: Style, width: usize) -> Vec<Line<'static>> {
    let available = width.saturating_sub(indent.width()).max(1);
    text.lines()
        .flat_map(|line| {
            if width == 0 {
                vec![line.to_string()]
            } else {
                textwrap::wrap(line, available)
                    .into_iter()
                    .map(|segment| segment.into_owned())
                    .collect()
            }
        })
        .map(|segment| {
            Line::from(vec![
                Span::raw(indent.to_string()),
                Span::styled(segment, style),
            ])
        })
        .collect()
}

/// Splits a line into rows no wider than `width` columns, keeping span styles.
pub fn hard_wrap(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line];
    }

    let mut rows = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for span in line.spans {
        let mut chunk = String::new();
        for ch in span.content.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && used > 0 {
                if !chunk.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                rows.push(Line::from(std::mem::take(&mut current)));
                used = 0;
            }
            chunk.push(ch);
            used += w;
        }
        if !chunk.is_empty() {
            current.push(Span::styled(chunk, span.style));
        }
    }
    if !current.is_empty() {
        rows.push(Line::from(current));
    }
    rows
}
