//! The boundary between the conversation and the remote agent.
//!
//! The state machine only sees a reply or an opaque failure; status codes,
//! timeouts and connection errors all collapse into the `Err` side.

pub mod http;
#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::conversation::{ConversationRequest, ConversationResponse};

pub use http::HttpTransport;

/// Exchanges one request for one reply.
#[async_trait]
pub trait TurnTransport: Send + Sync {
    async fn exchange(&self, request: &ConversationRequest) -> Result<ConversationResponse>;
}

#[async_trait]
impl<T: TurnTransport + ?Sized> TurnTransport for Arc<T> {
    async fn exchange(&self, request: &ConversationRequest) -> Result<ConversationResponse> {
        (**self).exchange(request).await
    }
}
