//! Scripted transport for driving the conversation without a server.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::TurnTransport;
use crate::conversation::{ConversationRequest, ConversationResponse};

/// Returns queued outcomes in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<ConversationResponse>>>,
    requests: Mutex<Vec<ConversationRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_response(&self, response: ConversationResponse) {
        self.outcomes.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_failure(&self, message: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(anyhow!(message.to_string())));
    }

    pub fn recorded_requests(&self) -> Vec<ConversationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TurnTransport for ScriptedTransport {
    async fn exchange(&self, request: &ConversationRequest) -> Result<ConversationResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted response left")))
    }
}
