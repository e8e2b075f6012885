use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::config::Keybinds;
use crate::ui::helpers::centered_rect;

pub struct HelpOverlay<'a> {
    keybinds: &'a Keybinds,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(keybinds: &'a Keybinds) -> Self {
        Self { keybinds }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup_area);

        let heading = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let mut help_text = vec![
            Line::from(Span::styled(
                "Agentive",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled("Conversation", heading)),
            Line::from("  Enter        Send message, or activate the focused choice"),
            Line::from("  Esc          Clear focus, then clear input"),
            Line::from(""),
            Line::from(Span::styled("Keys", heading)),
        ];

        help_text.extend(
            self.keybinds
                .all_keybinds()
                .into_iter()
                .map(|(name, kb)| Line::from(format!("  {:12} {}", kb.display(), name))),
        );

        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        )));

        let paragraph = Paragraph::new(help_text).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        frame.render_widget(paragraph, popup_area);
    }
}
