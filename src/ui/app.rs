use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{AppState, LogLevel};

use super::components::{ChatViewWidget, HelpOverlay, InputBarWidget, StatusBarWidget, ToastWidget};

const LOG_PANEL_HEIGHT: u16 = 6;

pub struct AppWidget<'a> {
    state: &'a AppState,
}

impl<'a> AppWidget<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub fn render(self, frame: &mut Frame) {
        let size = frame.area();

        let show_banner = self.state.config.ui.show_banner;
        let show_logs = self.state.show_logs;

        let mut constraints: Vec<Constraint> = Vec::new();
        if show_banner {
            constraints.push(Constraint::Length(2));
        }
        constraints.push(Constraint::Min(6));
        if show_logs {
            constraints.push(Constraint::Length(LOG_PANEL_HEIGHT));
        }
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(size);

        let mut chunk_idx = 0;

        if show_banner {
            self.render_banner(frame, chunks[chunk_idx]);
            chunk_idx += 1;
        }

        ChatViewWidget::new(&self.state.conversation)
            .with_focus(self.state.focused_choice)
            .with_scroll(self.state.chat_scroll)
            .with_animation_frame(self.state.animation_frame)
            .render(frame, chunks[chunk_idx]);
        chunk_idx += 1;

        if show_logs {
            self.render_logs(frame, chunks[chunk_idx]);
            chunk_idx += 1;
        }

        InputBarWidget::new(
            &self.state.input_buffer,
            self.state.conversation.is_awaiting_reply(),
        )
        .render(frame, chunks[chunk_idx]);
        chunk_idx += 1;

        StatusBarWidget::new(
            self.state.conversation.phase(),
            &self.state.config.keybinds,
            &self.state.config.server.endpoint,
        )
        .render(frame, chunks[chunk_idx]);

        if self.state.show_help {
            HelpOverlay::new(&self.state.config.keybinds).render(frame, size);
        }

        if let Some(toast) = &self.state.toast {
            ToastWidget::new(toast).render(frame);
        }
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect) {
        let conversation = &self.state.conversation;
        let lines = vec![
            Line::from(vec![
                Span::styled(
                    " agentive ",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("v{}", env!("CARGO_PKG_VERSION")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    " {} turns · {} history · {} context keys",
                    conversation.len(),
                    conversation.mode().display_name(),
                    conversation.shared_context().len()
                ),
                Style::default().fg(Color::DarkGray),
            )),
        ];

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_logs(&self, frame: &mut Frame, area: Rect) {
        let visible_lines = (area.height.saturating_sub(2)) as usize;

        let lines: Vec<Line> = self
            .state
            .logs
            .iter()
            .rev()
            .take(visible_lines)
            .map(|entry| {
                let time = entry.timestamp.format("%H:%M:%S");
                let (level_str, level_color) = match entry.level {
                    LogLevel::Info => ("INFO", Color::Green),
                    LogLevel::Warn => ("WARN", Color::Yellow),
                    LogLevel::Error => ("ERR ", Color::Red),
                    LogLevel::Debug => ("DBG ", Color::DarkGray),
                };

                Line::from(vec![
                    Span::styled(format!("{} ", time), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format!("[{}] ", level_str),
                        Style::default().fg(level_color),
                    ),
                    Span::raw(entry.message.clone()),
                ])
            })
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(" LOGS ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

        frame.render_widget(paragraph, area);
    }
}
