use uuid::Uuid;

use crate::conversation::ConversationResponse;

#[derive(Debug)]
pub enum Action {
    // Input editing
    InputChar(char),
    InputBackspace,
    InputClear,
    Paste(String),

    /// Submit whatever is in the input buffer.
    SubmitInput,
    /// Submit a specific text, e.g. an activated choice.
    Submit {
        text: String,
    },

    // Choice focus
    FocusNext,
    FocusPrev,
    ClearFocus,
    ActivateFocused,

    // View
    ScrollUp,
    ScrollDown,
    ToggleLogs,
    ToggleHelp,

    /// A transport call finished, successfully or not.
    ReplyReceived {
        turn_id: Uuid,
        result: anyhow::Result<ConversationResponse>,
    },

    Tick,
    Quit,
}
