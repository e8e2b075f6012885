pub mod action;
pub mod config;
pub mod keys;
pub mod state;

pub use action::Action;
pub use config::{Config, GlobalConfig, Keybind, Keybinds, ServerConfig, UiConfig};
pub use keys::{handle_key_event, matches_keybind};
pub use state::{AppState, LogEntry, LogLevel, Toast, ToastLevel};
