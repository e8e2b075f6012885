use chrono::Utc;
use uuid::Uuid;

use super::config::Config;
use crate::conversation::{
    Conversation, ConversationResponse, PendingTurn, SubmitRejected, TurnOutcome,
};
use crate::render::Choice;
use crate::util::truncate_with_ellipsis;

const MAX_LOG_ENTRIES: usize = 100;
const SCROLL_STEP: usize = 5;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created_at: std::time::Instant,
    pub duration_secs: u64,
}

impl Toast {
    pub fn new(message: String, level: ToastLevel) -> Self {
        let duration_secs = match level {
            ToastLevel::Info => 3,
            ToastLevel::Warning => 4,
            ToastLevel::Error => 5,
        };
        Self {
            message,
            level,
            created_at: std::time::Instant::now(),
            duration_secs,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() >= self.duration_secs
    }
}

pub struct AppState {
    pub config: Config,
    pub conversation: Conversation,
    pub running: bool,

    pub input_buffer: String,
    /// Index into `conversation.actions()`.
    pub focused_choice: Option<usize>,
    /// Lines scrolled up from the bottom of the conversation.
    pub chat_scroll: usize,

    pub show_help: bool,
    pub show_logs: bool,
    pub toast: Option<Toast>,
    pub logs: Vec<LogEntry>,
    pub animation_frame: usize,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let conversation = Conversation::new(config.server.history_mode)
            .with_render_options(config.ui.render_options());
        let show_logs = config.ui.show_logs;

        Self {
            config,
            conversation,
            running: true,
            input_buffer: String::new(),
            focused_choice: None,
            chat_scroll: 0,
            show_help: false,
            show_logs,
            toast: None,
            logs: Vec::new(),
            animation_frame: 0,
        }
    }

    pub fn advance_animation(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 10;
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        };
        self.logs.push(entry);
        if self.logs.len() > MAX_LOG_ENTRIES {
            self.logs.remove(0);
        }
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn log_warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn log_debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn show_error(&mut self, msg: impl Into<String>) {
        self.toast = Some(Toast::new(msg.into(), ToastLevel::Error));
    }

    pub fn show_info(&mut self, msg: impl Into<String>) {
        self.toast = Some(Toast::new(msg.into(), ToastLevel::Info));
    }

    pub fn show_warning(&mut self, msg: impl Into<String>) {
        self.toast = Some(Toast::new(msg.into(), ToastLevel::Warning));
    }

    pub fn expire_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn input_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn input_backspace(&mut self) {
        self.input_buffer.pop();
    }

    /// Pastes collapse to one line; the input box is single-line.
    pub fn paste(&mut self, text: &str) {
        let cleaned = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
        self.input_buffer.push_str(&cleaned);
    }

    pub fn choices(&self) -> Vec<Choice> {
        self.conversation.actions()
    }

    pub fn focused(&self) -> Option<Choice> {
        let index = self.focused_choice?;
        self.choices().into_iter().nth(index)
    }

    /// Moves focus forward, starting from the newest choices.
    pub fn focus_next(&mut self) {
        let count = self.choices().len();
        if count == 0 {
            self.focused_choice = None;
            return;
        }
        self.focused_choice = Some(match self.focused_choice {
            Some(i) if i + 1 < count => i + 1,
            Some(_) => 0,
            None => self.newest_choice_start(),
        });
    }

    pub fn focus_prev(&mut self) {
        let count = self.choices().len();
        if count == 0 {
            self.focused_choice = None;
            return;
        }
        self.focused_choice = Some(match self.focused_choice {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        });
    }

    pub fn clear_focus(&mut self) {
        self.focused_choice = None;
    }

    /// Index of the first choice offered by the most recent turn that has any.
    fn newest_choice_start(&self) -> usize {
        let counts: Vec<usize> = self
            .conversation
            .history()
            .iter()
            .map(|entry| entry.plan.choices().len())
            .collect();
        let total: usize = counts.iter().sum();
        let newest = counts.iter().rev().find(|&&n| n > 0).copied().unwrap_or(0);
        total - newest
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(SCROLL_STEP);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(SCROLL_STEP);
    }

    /// Starts a turn for `text`. Returns the request to send, or `None` when
    /// the submit was refused.
    pub fn start_turn(&mut self, text: &str) -> Option<PendingTurn> {
        match self.conversation.begin_turn(text) {
            Ok(pending) => {
                self.input_buffer.clear();
                self.focused_choice = None;
                self.chat_scroll = 0;
                self.log_info(format!(
                    "Sent: {}",
                    truncate_with_ellipsis(text.trim(), 60)
                ));
                Some(pending)
            }
            Err(SubmitRejected::EmptyInput) => None,
            Err(SubmitRejected::AwaitingReply) => {
                self.show_warning("Wait for the agent to reply");
                None
            }
        }
    }

    pub fn finish_turn(
        &mut self,
        turn_id: Uuid,
        result: anyhow::Result<ConversationResponse>,
    ) -> TurnOutcome {
        let error = result.as_ref().err().map(|e| format!("{:#}", e));
        let outcome = self.conversation.complete_turn(turn_id, result);

        match outcome {
            TurnOutcome::Replied {
                appended,
                context_replaced,
            } => {
                if appended {
                    self.log_info("Agent replied");
                } else {
                    self.log_debug("Received a response without a displayable message");
                }
                if context_replaced {
                    self.log_debug(format!(
                        "Shared context updated ({} keys)",
                        self.conversation.shared_context().len()
                    ));
                }
                self.chat_scroll = 0;
            }
            TurnOutcome::Failed => {
                self.log_error(format!(
                    "Request failed: {}",
                    error.unwrap_or_else(|| "unknown error".to_string())
                ));
                self.show_error("Could not reach the agent");
                self.chat_scroll = 0;
            }
            TurnOutcome::Stale => {
                self.log_warn(format!("Dropped reply for stale turn {}", turn_id));
            }
        }
        outcome
    }
}
