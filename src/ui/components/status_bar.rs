use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::config::Keybinds;
use crate::conversation::Phase;

pub struct StatusBarWidget<'a> {
    phase: Phase,
    keybinds: &'a Keybinds,
    endpoint: &'a str,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(phase: Phase, keybinds: &'a Keybinds, endpoint: &'a str) -> Self {
        Self {
            phase,
            keybinds,
            endpoint,
        }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let shortcuts = [
            (&self.keybinds.focus_next, "choices"),
            (&self.keybinds.scroll_up, "scroll"),
            (&self.keybinds.toggle_logs, "logs"),
            (&self.keybinds.toggle_help, "help"),
            (&self.keybinds.quit, "quit"),
        ];

        let (state, state_color) = match self.phase {
            Phase::Idle => ("ready", Color::Green),
            Phase::AwaitingReply { .. } => ("waiting", Color::Yellow),
        };

        let mut spans: Vec<Span> = vec![
            Span::styled(
                format!(" {} ", state),
                Style::default()
                    .fg(state_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} ", self.endpoint),
                Style::default().fg(Color::DarkGray),
            ),
        ];

        for (keybind, action) in shortcuts {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("[{}]", keybind.display_short()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(action, Style::default().fg(Color::White)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

pub struct InputBarWidget<'a> {
    input: &'a str,
    awaiting: bool,
}

impl<'a> InputBarWidget<'a> {
    pub fn new(input: &'a str, awaiting: bool) -> Self {
        Self { input, awaiting }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let text_color = if self.awaiting {
            Color::DarkGray
        } else {
            Color::White
        };

        let line = if self.input.is_empty() {
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    "Ask a question or state a goal...",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else {
            // Keep the cursor end visible
            let width = area.width.saturating_sub(5) as usize;
            let count = self.input.chars().count();
            let visible: String = self.input.chars().skip(count.saturating_sub(width)).collect();
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Yellow)),
                Span::styled(visible, Style::default().fg(text_color)),
                Span::styled("█", Style::default().fg(text_color)),
            ])
        };

        let border_color = if self.awaiting {
            Color::DarkGray
        } else {
            Color::Yellow
        };

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
        frame.render_widget(paragraph, area);
    }
}
