use anyhow::Result;
use thiserror::Error;
use uuid::Uuid;

use super::types::{
    AgentReply, ConversationRequest, ConversationResponse, HistoryMode, SharedContext, Turn,
};
use crate::render::{classify_with, Choice, RenderOptions, RenderPlan};
use crate::transport::TurnTransport;
use crate::util::single_line;

pub const TRANSPORT_FAILURE_TEXT: &str = "Sorry, I had trouble connecting to the server.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("message is empty")]
    EmptyInput,
    #[error("still waiting for the agent to reply")]
    AwaitingReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingReply {
        turn_id: Uuid,
    },
}

/// The in-flight half of a turn: hand `request` to a transport, then pass
/// `turn_id` and the outcome to `Conversation::complete_turn`.
#[derive(Debug)]
pub struct PendingTurn {
    pub turn_id: Uuid,
    pub request: ConversationRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Replied {
        appended: bool,
        context_replaced: bool,
    },
    Failed,
    /// The completion did not belong to the turn in flight and was dropped.
    Stale,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub turn: Turn,
    pub plan: RenderPlan,
}

/// Owns the turn history and shared context. At most one request is in
/// flight: `begin_turn` is refused until the pending turn completes.
#[derive(Debug)]
pub struct Conversation {
    history: Vec<HistoryEntry>,
    shared_context: SharedContext,
    phase: Phase,
    mode: HistoryMode,
    render_options: RenderOptions,
}

impl Conversation {
    pub fn new(mode: HistoryMode) -> Self {
        Self {
            history: Vec::new(),
            shared_context: SharedContext::new(),
            phase: Phase::Idle,
            mode,
            render_options: RenderOptions::default(),
        }
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn turns(&self) -> impl DoubleEndedIterator<Item = &Turn> {
        self.history.iter().map(|entry| &entry.turn)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn shared_context(&self) -> &SharedContext {
        &self.shared_context
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_awaiting_reply(&self) -> bool {
        matches!(self.phase, Phase::AwaitingReply { .. })
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    /// Every actionable entry across the history, in display order.
    pub fn actions(&self) -> Vec<Choice> {
        self.history
            .iter()
            .flat_map(|entry| entry.plan.choices())
            .collect()
    }

    /// Appends the user turn and moves to `AwaitingReply`.
    pub fn begin_turn(&mut self, text: &str) -> Result<PendingTurn, SubmitRejected> {
        if text.trim().is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }
        if self.is_awaiting_reply() {
            tracing::debug!("Refusing submit while a reply is pending");
            return Err(SubmitRejected::AwaitingReply);
        }

        self.history.push(HistoryEntry {
            turn: Turn::user(text),
            plan: RenderPlan::text(text),
        });

        let turn_id = Uuid::new_v4();
        self.phase = Phase::AwaitingReply { turn_id };
        tracing::info!("Submitting turn {}: {}", turn_id, single_line(text));

        Ok(PendingTurn {
            turn_id,
            request: self.build_request(),
        })
    }

    /// Reconciles the in-flight turn with its transport outcome and returns
    /// to `Idle`.
    pub fn complete_turn(
        &mut self,
        turn_id: Uuid,
        result: Result<ConversationResponse>,
    ) -> TurnOutcome {
        match self.phase {
            Phase::AwaitingReply { turn_id: pending } if pending == turn_id => {}
            _ => {
                tracing::warn!("Ignoring completion for turn {} that is not in flight", turn_id);
                return TurnOutcome::Stale;
            }
        }
        self.phase = Phase::Idle;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("Turn {} failed: {:#}", turn_id, err);
                self.history.push(HistoryEntry {
                    turn: Turn::agent_text(TRANSPORT_FAILURE_TEXT),
                    plan: RenderPlan::text(TRANSPORT_FAILURE_TEXT),
                });
                return TurnOutcome::Failed;
            }
        };

        let context_replaced = match response.shared_context {
            Some(context) => {
                tracing::debug!("Shared context replaced ({} keys)", context.len());
                self.shared_context = context;
                true
            }
            None => false,
        };

        let appended = match response.agent_response {
            Some(reply) if reply.is_displayable() => {
                self.append_reply(reply);
                true
            }
            _ => {
                tracing::debug!("Received a response without a displayable message");
                false
            }
        };

        TurnOutcome::Replied {
            appended,
            context_replaced,
        }
    }

    /// Runs both phases around a single transport call.
    pub async fn submit<T>(
        &mut self,
        transport: &T,
        text: &str,
    ) -> Result<TurnOutcome, SubmitRejected>
    where
        T: TurnTransport + ?Sized,
    {
        let pending = self.begin_turn(text)?;
        let result = transport.exchange(&pending.request).await;
        Ok(self.complete_turn(pending.turn_id, result))
    }

    fn append_reply(&mut self, reply: AgentReply) {
        let plan = classify_with(&reply, &self.render_options);
        if plan.is_empty() {
            tracing::debug!("Agent turn appended with nothing to render");
        }
        self.history.push(HistoryEntry {
            turn: Turn::agent(reply),
            plan,
        });
    }

    fn build_request(&self) -> ConversationRequest {
        let messages = match self.mode {
            HistoryMode::Full => self.turns().cloned().collect(),
            HistoryMode::Latest => self
                .turns()
                .rev()
                .find(|turn| turn.is_user())
                .cloned()
                .into_iter()
                .collect(),
        };
        ConversationRequest {
            messages,
            shared_context: self.shared_context.clone(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(HistoryMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::types::{PlanStep, Sender, WidgetPayload};
    use crate::render::{RenderBlock, WeatherView, WidgetView};
    use crate::transport::testing::ScriptedTransport;
    use serde_json::{json, Map};

    fn context(value: serde_json::Value) -> SharedContext {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_begin_turn_appends_user_turn_before_any_request() {
        let mut conversation = Conversation::default();
        let pending = conversation.begin_turn("plan a dinner").unwrap();

        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.history()[0].turn, Turn::user("plan a dinner"));
        assert_eq!(
            conversation.phase(),
            Phase::AwaitingReply {
                turn_id: pending.turn_id
            }
        );
        assert_eq!(pending.request.messages, vec![Turn::user("plan a dinner")]);
    }

    #[tokio::test]
    async fn test_blank_submit_is_noop() {
        let transport = ScriptedTransport::new();
        let mut conversation = Conversation::default();

        for text in ["", "   ", "\n\t"] {
            assert_eq!(
                conversation.submit(&transport, text).await,
                Err(SubmitRejected::EmptyInput)
            );
        }
        assert!(conversation.is_empty());
        assert!(transport.recorded_requests().is_empty());
        assert_eq!(conversation.phase(), Phase::Idle);
    }

    #[test]
    fn test_second_submit_refused_while_awaiting() {
        let mut conversation = Conversation::default();
        let _pending = conversation.begin_turn("first").unwrap();

        assert_eq!(
            conversation.begin_turn("second").unwrap_err(),
            SubmitRejected::AwaitingReply
        );
        assert_eq!(conversation.len(), 1);
    }

    #[tokio::test]
    async fn test_clarification_option_resubmits() {
        let transport = ScriptedTransport::new();
        transport.queue_response(ConversationResponse::reply(AgentReply::clarification(
            "Which cuisine?",
            vec!["A".into(), "B".into()],
        )));
        transport.queue_response(ConversationResponse::reply(AgentReply::answer("Got it")));

        let mut conversation = Conversation::default();
        conversation.submit(&transport, "dinner").await.unwrap();

        let actions = conversation.actions();
        assert_eq!(actions, vec![Choice::echo("A"), Choice::echo("B")]);

        conversation
            .submit(&transport, &actions[1].reply)
            .await
            .unwrap();
        assert_eq!(conversation.history()[2].turn, Turn::user("B"));
        assert_eq!(conversation.len(), 4);
    }

    #[tokio::test]
    async fn test_canvas_reply_renders_panel() {
        let transport = ScriptedTransport::new();
        let widgets = vec![
            WidgetPayload::from_value(json!({ "widget_type": "map", "location": "Paris" }))
                .unwrap(),
            WidgetPayload::from_value(json!({ "widget_type": "bogus" })).unwrap(),
        ];
        transport.queue_response(ConversationResponse::reply(
            AgentReply::canvas(widgets).with_text("hidden"),
        ));

        let mut conversation = Conversation::default();
        conversation.submit(&transport, "show me").await.unwrap();

        let plan = &conversation.history()[1].plan;
        assert_eq!(plan.blocks.len(), 1);
        let panel = plan.panel().unwrap();
        assert!(matches!(panel[0], WidgetView::Map(_)));
        assert_eq!(panel[1], WidgetView::unknown("bogus"));
        assert!(!plan
            .blocks
            .iter()
            .any(|block| matches!(block, RenderBlock::Text(_))));
    }

    #[tokio::test]
    async fn test_missing_agent_response_appends_nothing() {
        let transport = ScriptedTransport::new();
        transport.queue_response(ConversationResponse::default());

        let mut conversation = Conversation::default();
        let outcome = conversation.submit(&transport, "hello").await.unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Replied {
                appended: false,
                context_replaced: false
            }
        );
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_empty_agent_response_appends_nothing() {
        let transport = ScriptedTransport::new();
        transport.queue_response(ConversationResponse::reply(AgentReply::default()));

        let mut conversation = Conversation::default();
        conversation.submit(&transport, "hello").await.unwrap();
        assert_eq!(conversation.len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_appends_apology() {
        let transport = ScriptedTransport::new();
        transport.queue_failure("connection refused");
        transport.queue_response(ConversationResponse::reply(AgentReply::answer("Back")));

        let mut conversation = Conversation::default();
        let outcome = conversation.submit(&transport, "hello").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Failed);
        let turns: Vec<&Turn> = conversation.turns().collect();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], &Turn::user("hello"));
        assert_eq!(turns[1].sender, Sender::Agent);
        assert_eq!(turns[1].text(), Some(TRANSPORT_FAILURE_TEXT));
        assert!(turns[1].response_type.is_none());
        assert_eq!(conversation.phase(), Phase::Idle);

        conversation.submit(&transport, "again").await.unwrap();
        assert_eq!(conversation.len(), 4);
    }

    #[tokio::test]
    async fn test_shared_context_echoed_unchanged() {
        let transport = ScriptedTransport::new();
        let initial = context(json!({ "trip": { "city": "Bangkok", "nights": 3 }, "step": 1 }));
        transport.queue_response(
            ConversationResponse::reply(AgentReply::answer("ok")).with_context(initial.clone()),
        );
        transport.queue_response(ConversationResponse::reply(AgentReply::answer("still ok")));
        transport.queue_response(ConversationResponse::reply(AgentReply::answer("again")));

        let mut conversation = Conversation::default();
        conversation.submit(&transport, "one").await.unwrap();
        let before = serde_json::to_string(conversation.shared_context()).unwrap();
        conversation.submit(&transport, "two").await.unwrap();
        conversation.submit(&transport, "three").await.unwrap();
        let after = serde_json::to_string(conversation.shared_context()).unwrap();

        assert_eq!(before, after);
        let requests = transport.recorded_requests();
        assert_eq!(requests[0].shared_context, SharedContext::new());
        assert_eq!(requests[1].shared_context, initial);
        assert_eq!(requests[2].shared_context, initial);
    }

    #[tokio::test]
    async fn test_workflow_reply_keeps_context_and_text() {
        let transport = ScriptedTransport::new();
        transport.queue_response(
            serde_json::from_value(json!({
                "agent_response": {
                    "response_type": "execute_workflow",
                    "text": "Working on it",
                    "steps": [{ "agent": "food_service", "goal": "Find Italian restaurants" }]
                },
                "shared_context": { "k": 1 }
            }))
            .unwrap(),
        );

        let mut conversation = Conversation::default();
        let outcome = conversation.submit(&transport, "dinner").await.unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Replied {
                appended: true,
                context_replaced: true
            }
        );
        assert_eq!(conversation.shared_context(), &context(json!({ "k": 1 })));
        let last = conversation.history().last().unwrap();
        assert_eq!(last.plan, RenderPlan::text("Working on it"));
        assert!(conversation.actions().is_empty());
    }

    #[tokio::test]
    async fn test_shared_context_replaced_wholesale() {
        let transport = ScriptedTransport::new();
        transport.queue_response(
            ConversationResponse::default().with_context(context(json!({ "a": 1, "b": 2 }))),
        );
        transport.queue_response(
            ConversationResponse::default().with_context(context(json!({ "c": 3 }))),
        );
        transport.queue_response(
            ConversationResponse::default().with_context(SharedContext::from_map(Map::new())),
        );

        let mut conversation = Conversation::default();
        conversation.submit(&transport, "one").await.unwrap();
        conversation.submit(&transport, "two").await.unwrap();
        assert_eq!(conversation.shared_context(), &context(json!({ "c": 3 })));

        let outcome = conversation.submit(&transport, "three").await.unwrap();
        assert_eq!(
            outcome,
            TurnOutcome::Replied {
                appended: false,
                context_replaced: true
            }
        );
        assert!(conversation.shared_context().is_empty());
    }

    #[tokio::test]
    async fn test_full_history_mode_sends_every_turn() {
        let transport = ScriptedTransport::new();
        transport.queue_response(ConversationResponse::reply(AgentReply::answer("first")));
        transport.queue_response(ConversationResponse::reply(AgentReply::answer("second")));

        let mut conversation = Conversation::new(HistoryMode::Full);
        conversation.submit(&transport, "one").await.unwrap();
        conversation.submit(&transport, "two").await.unwrap();

        let requests = transport.recorded_requests();
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(requests[1].messages[1], Turn::agent(AgentReply::answer("first")));
        assert_eq!(requests[1].messages[2], Turn::user("two"));
    }

    #[tokio::test]
    async fn test_latest_mode_sends_only_user_turn() {
        let transport = ScriptedTransport::new();
        transport.queue_response(ConversationResponse::reply(AgentReply::answer("first")));
        transport.queue_response(ConversationResponse::reply(AgentReply::answer("second")));

        let mut conversation = Conversation::new(HistoryMode::Latest);
        conversation.submit(&transport, "one").await.unwrap();
        conversation.submit(&transport, "two").await.unwrap();

        let requests = transport.recorded_requests();
        assert_eq!(requests[0].messages, vec![Turn::user("one")]);
        assert_eq!(requests[1].messages, vec![Turn::user("two")]);
        assert_eq!(conversation.len(), 4);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut conversation = Conversation::default();
        let pending = conversation.begin_turn("hello").unwrap();

        let outcome = conversation.complete_turn(
            Uuid::new_v4(),
            Ok(ConversationResponse::reply(AgentReply::answer("wrong turn"))),
        );
        assert_eq!(outcome, TurnOutcome::Stale);
        assert!(conversation.is_awaiting_reply());
        assert_eq!(conversation.len(), 1);

        let outcome = conversation.complete_turn(
            pending.turn_id,
            Ok(ConversationResponse::reply(AgentReply::answer("right turn"))),
        );
        assert!(matches!(outcome, TurnOutcome::Replied { appended: true, .. }));
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_completion_while_idle_is_stale() {
        let mut conversation = Conversation::default();
        let outcome =
            conversation.complete_turn(Uuid::new_v4(), Ok(ConversationResponse::default()));
        assert_eq!(outcome, TurnOutcome::Stale);
        assert!(conversation.is_empty());
    }

    #[tokio::test]
    async fn test_plan_and_weather_replies() {
        let transport = ScriptedTransport::new();
        transport.queue_response(ConversationResponse::reply(AgentReply::plan(
            None,
            vec![
                PlanStep::new("Find restaurants", "Look for Italian places"),
                PlanStep::new("Book a table", "Reserve for 8pm"),
            ],
        )));
        transport.queue_response(ConversationResponse::reply(AgentReply::canvas(vec![
            WidgetPayload::from_value(json!({ "widget_type": "weather", "location": "Paris" }))
                .unwrap(),
        ])));

        let mut conversation = Conversation::default();
        conversation.submit(&transport, "dinner plan").await.unwrap();
        let step = conversation.actions()[1].reply.clone();
        assert_eq!(step, "Book a table");

        conversation.submit(&transport, &step).await.unwrap();
        let panel = conversation.history()[3].plan.panel().unwrap().to_vec();
        assert_eq!(
            panel,
            vec![WidgetView::Weather(WeatherView::Fetching {
                location: "Paris".to_string()
            })]
        );
    }

    #[test]
    fn test_static_lists_have_no_actions() {
        let mut conversation = Conversation::default().with_render_options(RenderOptions {
            interactive_lists: false,
        });
        let pending = conversation.begin_turn("search").unwrap();
        conversation.complete_turn(
            pending.turn_id,
            Ok(ConversationResponse::reply(AgentReply::canvas(vec![
                WidgetPayload::from_value(
                    json!({ "widget_type": "list", "title": "Results", "items": ["x", "y"] }),
                )
                .unwrap(),
            ]))),
        );
        assert_eq!(conversation.len(), 2);
        assert!(conversation.actions().is_empty());
    }
}
