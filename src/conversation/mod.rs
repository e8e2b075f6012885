pub mod machine;
pub mod types;

pub use machine::{
    Conversation, HistoryEntry, PendingTurn, Phase, SubmitRejected, TurnOutcome,
    TRANSPORT_FAILURE_TEXT,
};
pub use types::{
    AgentReply, ConversationRequest, ConversationResponse, HistoryMode, PlanStep, ResponseType,
    Sender, SharedContext, Turn, WidgetPayload,
};
