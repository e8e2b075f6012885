use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::conversation::HistoryMode;
use crate::render::RenderOptions;
use crate::transport::http::DEFAULT_ENDPOINT;

const ENDPOINT_ENV: &str = "AGENTIVE_ENDPOINT";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn display_name(&self) -> &'static str {
        match self {
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warn",
            LogLevel::Error => "Error",
        }
    }

    /// `EnvFilter` directive for this crate at this level.
    pub fn directive(&self) -> String {
        let level = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        format!("agentive={}", level)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GlobalConfig {
    #[serde(default)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub history_mode: HistoryMode,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
            history_mode: HistoryMode::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_true")]
    pub show_banner: bool,
    #[serde(default = "default_true")]
    pub show_logs: bool,
    #[serde(default = "default_true")]
    pub interactive_lists: bool,
}

fn default_true() -> bool {
    true
}

fn default_tick_rate() -> u64 {
    100
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            show_banner: default_true(),
            show_logs: default_true(),
            interactive_lists: default_true(),
        }
    }
}

impl UiConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            interactive_lists: self.interactive_lists,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Keybind {
    pub key: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

impl Keybind {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Vec<String>) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn display(&self) -> String {
        if self.modifiers.is_empty() {
            self.key.clone()
        } else {
            format!("{}+{}", self.modifiers.join("+"), self.key)
        }
    }

    pub fn display_short(&self) -> String {
        let key_display = match self.key.as_str() {
            "Up" => "↑".to_string(),
            "Down" => "↓".to_string(),
            "Enter" => "↵".to_string(),
            "Tab" => "⇥".to_string(),
            "BackTab" => "S-⇥".to_string(),
            "PageUp" => "PgUp".to_string(),
            "PageDown" => "PgDn".to_string(),
            k => k.to_string(),
        };
        if self.modifiers.is_empty() {
            key_display
        } else {
            let mods: String = self
                .modifiers
                .iter()
                .map(|m| match m.as_str() {
                    "Control" => "C-".to_string(),
                    "Shift" => "S-".to_string(),
                    "Alt" => "M-".to_string(),
                    _ => format!("{}-", m.chars().next().unwrap_or('?')),
                })
                .collect();
            format!("{}{}", mods, key_display)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keybinds {
    #[serde(default = "default_focus_next")]
    pub focus_next: Keybind,
    #[serde(default = "default_focus_prev")]
    pub focus_prev: Keybind,
    #[serde(default = "default_scroll_up")]
    pub scroll_up: Keybind,
    #[serde(default = "default_scroll_down")]
    pub scroll_down: Keybind,
    #[serde(default = "default_toggle_logs")]
    pub toggle_logs: Keybind,
    #[serde(default = "default_toggle_help")]
    pub toggle_help: Keybind,
    #[serde(default = "default_quit")]
    pub quit: Keybind,
}

fn default_focus_next() -> Keybind {
    Keybind::new("Tab")
}
fn default_focus_prev() -> Keybind {
    Keybind::new("BackTab")
}
fn default_scroll_up() -> Keybind {
    Keybind::new("PageUp")
}
fn default_scroll_down() -> Keybind {
    Keybind::new("PageDown")
}
fn default_toggle_logs() -> Keybind {
    Keybind::with_modifiers("l", vec!["Control".to_string()])
}
fn default_toggle_help() -> Keybind {
    Keybind::new("F1")
}
fn default_quit() -> Keybind {
    Keybind::with_modifiers("c", vec!["Control".to_string()])
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            focus_next: default_focus_next(),
            focus_prev: default_focus_prev(),
            scroll_up: default_scroll_up(),
            scroll_down: default_scroll_down(),
            toggle_logs: default_toggle_logs(),
            toggle_help: default_toggle_help(),
            quit: default_quit(),
        }
    }
}

impl Keybinds {
    pub fn all_keybinds(&self) -> Vec<(&'static str, &Keybind)> {
        vec![
            ("Next choice", &self.focus_next),
            ("Previous choice", &self.focus_prev),
            ("Scroll up", &self.scroll_up),
            ("Scroll down", &self.scroll_down),
            ("Toggle logs", &self.toggle_logs),
            ("Toggle help", &self.toggle_help),
            ("Quit", &self.quit),
        ]
    }

    pub fn find_conflicts(&self) -> Vec<(String, String)> {
        let all = self.all_keybinds();
        let mut conflicts = Vec::new();
        for (i, (name_a, kb_a)) in all.iter().enumerate() {
            for (name_b, kb_b) in all.iter().skip(i + 1) {
                if kb_a == kb_b {
                    conflicts.push((name_a.to_string(), name_b.to_string()));
                }
            }
        }
        conflicts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keybinds: Keybinds,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        Self::ensure_config_dir()?;
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")
    }

    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::home_dir()
            .context("Could not find home directory")?
            .join(".agentive");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn ensure_config_dir() -> Result<PathBuf> {
        let dir = Self::config_dir()?;
        if !dir.exists() {
            std::fs::create_dir_all(&dir).context("Failed to create config directory")?;
        }
        Ok(dir)
    }

    pub fn endpoint_from_env() -> Option<String> {
        std::env::var(ENDPOINT_ENV).ok().filter(|v| !v.is_empty())
    }

    /// Applies `AGENTIVE_ENDPOINT`, then a command-line endpoint on top.
    pub fn apply_overrides(&mut self, env_endpoint: Option<String>, cli_endpoint: Option<String>) {
        if let Some(endpoint) = cli_endpoint.or(env_endpoint) {
            self.server.endpoint = endpoint;
        }
    }
}
