use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::action::Action;
use super::config::Keybind;
use super::state::AppState;

pub fn matches_keybind(key: KeyEvent, keybind: &Keybind) -> bool {
    let has_ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let has_shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let has_alt = key.modifiers.contains(KeyModifiers::ALT);

    let expected_ctrl = keybind.modifiers.iter().any(|m| m == "Control");
    let expected_shift = keybind.modifiers.iter().any(|m| m == "Shift");
    let expected_alt = keybind.modifiers.iter().any(|m| m == "Alt");

    if has_ctrl != expected_ctrl || has_alt != expected_alt {
        return false;
    }

    match &keybind.key[..] {
        "Up" => key.code == KeyCode::Up,
        "Down" => key.code == KeyCode::Down,
        "Enter" => key.code == KeyCode::Enter,
        "Tab" => key.code == KeyCode::Tab,
        "BackTab" => key.code == KeyCode::BackTab,
        "Esc" => key.code == KeyCode::Esc,
        "PageUp" => key.code == KeyCode::PageUp,
        "PageDown" => key.code == KeyCode::PageDown,
        "Home" => key.code == KeyCode::Home,
        "End" => key.code == KeyCode::End,
        f if f.len() > 1 && f.starts_with('F') => f[1..]
            .parse::<u8>()
            .map(|n| key.code == KeyCode::F(n))
            .unwrap_or(false),
        c => match (c.chars().next(), key.code) {
            (Some(ch), KeyCode::Char(input_ch)) if ch.is_ascii_alphabetic() => {
                let same = ch.eq_ignore_ascii_case(&input_ch);
                if expected_shift {
                    same && has_shift
                } else {
                    same && (!has_shift || has_ctrl)
                }
            }
            (Some(ch), KeyCode::Char(input_ch)) => ch == input_ch,
            _ => false,
        },
    }
}

/// Maps a key press to an action. Keybinds win over text entry, so bound
/// keys carry a modifier or are non-printing by default.
pub fn handle_key_event(key: KeyEvent, state: &AppState) -> Option<Action> {
    let kb = &state.config.keybinds;

    if matches_keybind(key, &kb.quit) {
        return Some(Action::Quit);
    }

    if state.show_help {
        return Some(Action::ToggleHelp);
    }

    if matches_keybind(key, &kb.toggle_help) {
        Some(Action::ToggleHelp)
    } else if matches_keybind(key, &kb.toggle_logs) {
        Some(Action::ToggleLogs)
    } else if matches_keybind(key, &kb.focus_next) {
        Some(Action::FocusNext)
    } else if matches_keybind(key, &kb.focus_prev) {
        Some(Action::FocusPrev)
    } else if matches_keybind(key, &kb.scroll_up) {
        Some(Action::ScrollUp)
    } else if matches_keybind(key, &kb.scroll_down) {
        Some(Action::ScrollDown)
    } else {
        handle_input_key(key, state)
    }
}

fn handle_input_key(key: KeyEvent, state: &AppState) -> Option<Action> {
    match key.code {
        KeyCode::Enter => {
            if state.input_buffer.trim().is_empty() && state.focused_choice.is_some() {
                Some(Action::ActivateFocused)
            } else {
                Some(Action::SubmitInput)
            }
        }
        KeyCode::Esc => {
            if state.focused_choice.is_some() {
                Some(Action::ClearFocus)
            } else if !state.input_buffer.is_empty() {
                Some(Action::InputClear)
            } else {
                None
            }
        }
        KeyCode::Backspace => Some(Action::InputBackspace),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::InputChar(c))
        }
        _ => None,
    }
}
