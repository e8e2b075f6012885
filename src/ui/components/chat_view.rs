use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::widget_card::WidgetCard;
use crate::conversation::{Conversation, HistoryEntry, Sender};
use crate::render::RenderBlock;
use crate::ui::helpers::{
    choice_line, hard_wrap, text_lines, SPINNER_FRAMES, STYLE_AGENT, STYLE_MUTED, STYLE_TEXT,
    STYLE_USER,
};

const BODY_INDENT: &str = "  ";

pub struct ChatViewWidget<'a> {
    conversation: &'a Conversation,
    focused: Option<usize>,
    scroll: usize,
    animation_frame: usize,
    /// Columns available for text; 0 leaves lines unwrapped.
    width: usize,
}

impl<'a> ChatViewWidget<'a> {
    pub fn new(conversation: &'a Conversation) -> Self {
        Self {
            conversation,
            focused: None,
            scroll: 0,
            animation_frame: 0,
            width: 0,
        }
    }

    pub fn with_focus(mut self, focused: Option<usize>) -> Self {
        self.focused = focused;
        self
    }

    pub fn with_scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_animation_frame(mut self, frame: usize) -> Self {
        self.animation_frame = frame;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Every line of the conversation, oldest first. With a width set, rows
    /// are already wrapped to it.
    pub fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let mut next_choice = 0;

        for entry in self.conversation.history() {
            if entry.plan.is_empty() {
                continue;
            }
            lines.extend(self.entry_lines(entry, &mut next_choice));
            lines.push(Line::from(""));
        }

        if self.conversation.is_awaiting_reply() {
            let spinner = SPINNER_FRAMES[self.animation_frame % SPINNER_FRAMES.len()];
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", spinner), STYLE_AGENT),
                Span::styled("Agent is thinking...", STYLE_MUTED),
            ]));
        }

        lines
            .into_iter()
            .flat_map(|line| hard_wrap(line, self.width))
            .collect()
    }

    fn entry_lines(&self, entry: &HistoryEntry, next_choice: &mut usize) -> Vec<Line<'static>> {
        let header_style = match entry.turn.sender {
            Sender::User => STYLE_USER,
            Sender::Agent => STYLE_AGENT,
        };
        let mut lines = vec![Line::from(Span::styled(
            entry.turn.sender.display_name(),
            header_style,
        ))];

        for block in &entry.plan.blocks {
            match block {
                RenderBlock::Text(text) => {
                    lines.extend(text_lines(BODY_INDENT, text, STYLE_TEXT, self.width))
                }
                RenderBlock::Choices(choices) => {
                    for choice in choices {
                        lines.push(self.choice(next_choice, &choice.label));
                    }
                }
                RenderBlock::Steps(steps) => {
                    for step in steps {
                        lines.push(self.choice(next_choice, &step.title));
                        if !step.description.is_empty() {
                            lines.extend(text_lines(
                                "        ",
                                &step.description,
                                STYLE_MUTED,
                                self.width,
                            ));
                        }
                    }
                }
                RenderBlock::Panel(views) => {
                    for view in views {
                        lines.extend(WidgetCard::new(view, self.focused).lines(next_choice));
                    }
                }
            }
        }

        lines
    }

    fn choice(&self, next_choice: &mut usize, label: &str) -> Line<'static> {
        let index = *next_choice;
        *next_choice += 1;
        choice_line(BODY_INDENT, index + 1, label, self.focused == Some(index))
    }

    pub fn render(mut self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;
        self.width = area.width.saturating_sub(2) as usize;

        let lines = if self.conversation.is_empty() {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  Ask a question or state a goal to get started",
                    STYLE_MUTED,
                )),
            ]
        } else {
            self.lines()
        };

        // Pinned to the newest row unless scrolled up. Rows are pre-wrapped so
        // the count matches what is drawn.
        let total_lines = lines.len();
        let start = if total_lines > visible_height {
            total_lines
                .saturating_sub(visible_height)
                .saturating_sub(self.scroll)
        } else {
            0
        };
        let visible_lines: Vec<Line> = lines.into_iter().skip(start).take(visible_height).collect();

        let title = if self.scroll > 0 {
            format!(" CONVERSATION (↑{}) ", self.scroll)
        } else {
            " CONVERSATION ".to_string()
        };

        let paragraph = Paragraph::new(visible_lines).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{
        AgentReply, ConversationResponse, PlanStep, WidgetPayload, TRANSPORT_FAILURE_TEXT,
    };
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn exchange(conversation: &mut Conversation, text: &str, reply: AgentReply) {
        let pending = conversation.begin_turn(text).unwrap();
        conversation.complete_turn(pending.turn_id, Ok(ConversationResponse::reply(reply)));
    }

    #[test]
    fn test_choice_numbers_follow_actions() {
        let mut conversation = Conversation::default();
        exchange(
            &mut conversation,
            "dinner",
            AgentReply::clarification("Cuisine?", vec!["Italian".into(), "Thai".into()]),
        );
        exchange(
            &mut conversation,
            "Thai",
            AgentReply::plan(None, vec![PlanStep::new("Find places", "Nearby")]),
        );

        let lines = plain(&ChatViewWidget::new(&conversation).with_focus(Some(2)).lines());
        assert!(lines.contains(&"    [1] Italian".to_string()));
        assert!(lines.contains(&"  ▶ [3] Find places".to_string()));
        assert!(lines.contains(&"        Nearby".to_string()));
        assert_eq!(conversation.actions()[2].reply, "Find places");
    }

    #[test]
    fn test_canvas_hides_text_and_shows_cards() {
        let mut conversation = Conversation::default();
        exchange(
            &mut conversation,
            "weather",
            AgentReply::canvas(vec![WidgetPayload::from_value(
                json!({ "widget_type": "weather", "location": "Paris" }),
            )
            .unwrap()])
            .with_text("should not show"),
        );

        let lines = plain(&ChatViewWidget::new(&conversation).lines());
        assert!(!lines.iter().any(|l| l.contains("should not show")));
        assert!(lines.contains(&"  ┌ Weather for Paris".to_string()));
        assert!(lines.contains(&"  │ Fetching data...".to_string()));
    }

    fn screen(conversation: &Conversation, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| ChatViewWidget::new(conversation).render(frame, frame.area()))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_long_replies_keep_newest_turn_visible() {
        let mut conversation = Conversation::default();
        for question in ["q1", "q2", "q3"] {
            exchange(
                &mut conversation,
                question,
                AgentReply::answer("lorem ipsum dolor sit amet ".repeat(11)),
            );
        }
        exchange(
            &mut conversation,
            "q4",
            AgentReply::clarification("Which?", vec!["NEWEST_OPTION".into()]),
        );

        let text = screen(&conversation, 40, 20);
        assert!(text.contains("NEWEST_OPTION"));
        assert!(text.contains("Which?"));
    }

    #[test]
    fn test_wrapped_rows_fit_width() {
        let mut conversation = Conversation::default();
        exchange(
            &mut conversation,
            "tell me",
            AgentReply::answer(format!("{} {}", "word ".repeat(30), "x".repeat(50))),
        );
        let lines = ChatViewWidget::new(&conversation).with_width(30).lines();
        assert!(lines.iter().all(|line| line.width() <= 30));
        assert!(lines.len() > 6);
    }

    #[test]
    fn test_awaiting_shows_spinner_and_failure_text() {
        let mut conversation = Conversation::default();
        let pending = conversation.begin_turn("hello").unwrap();
        let lines = plain(&ChatViewWidget::new(&conversation).lines());
        assert!(lines.last().unwrap().ends_with("Agent is thinking..."));

        conversation.complete_turn(pending.turn_id, Err(anyhow::anyhow!("down")));
        let lines = plain(&ChatViewWidget::new(&conversation).lines());
        assert!(lines.contains(&format!("  {}", TRANSPORT_FAILURE_TEXT)));
        assert!(!lines.iter().any(|l| l.contains("thinking")));
    }
}
