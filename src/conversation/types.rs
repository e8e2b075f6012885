use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Agent => "Agent",
        }
    }
}

/// Rendering strategy requested by the agent. Tags outside the known set are
/// kept verbatim in `Other` and render as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Answer,
    Clarification,
    Plan,
    Canvas,
    #[serde(untagged)]
    Other(String),
}

impl ResponseType {
    pub fn as_str(&self) -> &str {
        match self {
            ResponseType::Answer => "answer",
            ResponseType::Clarification => "clarification",
            ResponseType::Plan => "plan",
            ResponseType::Canvas => "canvas",
            ResponseType::Other(tag) => tag,
        }
    }
}

/// A step as the agent sent it. Workflow replies reuse `steps` with other
/// shapes (`agent`, `goal`), so every field is optional and unknown ones are
/// kept for resending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanStep {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            extra: Map::new(),
        }
    }

    /// Only titled steps can be shown and activated.
    pub fn is_actionable(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Decodes `steps` without letting one odd entry reject the whole reply.
/// Entries that are not objects are dropped.
fn lenient_steps<'de, D>(deserializer: D) -> Result<Option<Vec<PlanStep>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|entries| {
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(step) => Some(step),
                Err(err) => {
                    tracing::debug!("Dropping step that is not an object: {}", err);
                    None
                }
            })
            .collect()
    }))
}

/// A widget envelope: the `widget_type` tag plus every other field untouched.
/// Variant-specific validation happens in the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetPayload {
    #[serde(default)]
    pub widget_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl WidgetPayload {
    pub fn new(widget_type: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            widget_type: widget_type.into(),
            fields,
        }
    }

    /// Builds a payload from a JSON object, reading `widget_type` out of it.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The variant-specific fields as a JSON object, ready for a typed decode.
    pub fn body(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Server-owned state echoed back on every request. Never inspected or merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedContext(Map<String, Value>);

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_steps",
        skip_serializing_if = "Option::is_none"
    )]
    pub steps: Option<Vec<PlanStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<WidgetPayload>>,
}

impl AgentReply {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            response_type: Some(ResponseType::Answer),
            ..Default::default()
        }
    }

    pub fn clarification(text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            text: Some(text.into()),
            response_type: Some(ResponseType::Clarification),
            options: Some(options),
            ..Default::default()
        }
    }

    pub fn plan(text: Option<String>, steps: Vec<PlanStep>) -> Self {
        Self {
            text,
            response_type: Some(ResponseType::Plan),
            steps: Some(steps),
            ..Default::default()
        }
    }

    pub fn canvas(widgets: Vec<WidgetPayload>) -> Self {
        Self {
            response_type: Some(ResponseType::Canvas),
            widgets: Some(widgets),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Whether anything in the reply could be shown to the user.
    pub fn is_displayable(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
            || self.options.as_ref().is_some_and(|o| !o.is_empty())
            || self.steps.as_ref().is_some_and(|s| !s.is_empty())
            || self.widgets.as_ref().is_some_and(|w| !w.is_empty())
    }
}

/// One message in the conversation. Build through `Turn::user` or
/// `Turn::agent` so user turns never carry agent-only fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_steps",
        skip_serializing_if = "Option::is_none"
    )]
    pub steps: Option<Vec<PlanStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<WidgetPayload>>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: Some(text.into()),
            response_type: None,
            options: None,
            steps: None,
            widgets: None,
        }
    }

    pub fn agent(reply: AgentReply) -> Self {
        Self {
            sender: Sender::Agent,
            text: reply.text,
            response_type: reply.response_type,
            options: reply.options,
            steps: reply.steps,
            widgets: reply.widgets,
        }
    }

    /// An agent turn with plain text and no response type.
    pub fn agent_text(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Agent,
            text: Some(text.into()),
            response_type: None,
            options: None,
            steps: None,
            widgets: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Which turns go into `messages` on each request. Fixed for the lifetime of a
/// conversation; the server tracks context differently in each mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    #[default]
    Full,
    Latest,
}

impl HistoryMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            HistoryMode::Full => "full history",
            HistoryMode::Latest => "latest turn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRequest {
    pub messages: Vec<Turn>,
    pub shared_context: SharedContext,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationResponse {
    #[serde(default)]
    pub agent_response: Option<AgentReply>,
    #[serde(default)]
    pub shared_context: Option<SharedContext>,
}

impl ConversationResponse {
    pub fn reply(reply: AgentReply) -> Self {
        Self {
            agent_response: Some(reply),
            shared_context: None,
        }
    }

    pub fn with_context(mut self, context: SharedContext) -> Self {
        self.shared_context = Some(context);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_steps_do_not_reject_the_reply() {
        let body = r#"{"agent_response":{"response_type":"execute_workflow","text":"Working on it","steps":[{"agent":"food_service","goal":"Find Italian restaurants"}]},"shared_context":{"k":1}}"#;
        let response: ConversationResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.shared_context.unwrap().len(), 1);
        let reply = response.agent_response.unwrap();
        assert_eq!(
            reply.response_type,
            Some(ResponseType::Other("execute_workflow".to_string()))
        );
        let steps = reply.steps.clone().unwrap();
        assert_eq!(steps.len(), 1);
        assert!(!steps[0].is_actionable());

        // Resending history reproduces the step as received
        let resent = serde_json::to_value(Turn::agent(reply)).unwrap();
        assert_eq!(
            resent["steps"],
            json!([{ "agent": "food_service", "goal": "Find Italian restaurants" }])
        );
    }

    #[test]
    fn test_non_object_steps_are_dropped() {
        let reply: AgentReply = serde_json::from_value(json!({
            "response_type": "plan",
            "steps": ["bare string", { "title": "Book a table" }]
        }))
        .unwrap();
        assert_eq!(reply.steps.unwrap(), vec![PlanStep::new("Book a table", "")]);
    }

    #[test]
    fn test_user_turn_serializes_without_agent_fields() {
        let value = serde_json::to_value(Turn::user("plan a dinner")).unwrap();
        assert_eq!(value, json!({ "sender": "user", "text": "plan a dinner" }));
    }

    #[test]
    fn test_response_uses_snake_case_fields() {
        let body = r#"{
            "agent_response": {
                "text": "Which cuisine?",
                "response_type": "clarification",
                "options": ["Italian", "Thai"]
            },
            "shared_context": { "city": "Paris" }
        }"#;
        let response: ConversationResponse = serde_json::from_str(body).unwrap();
        let reply = response.agent_response.unwrap();
        assert_eq!(reply.response_type, Some(ResponseType::Clarification));
        assert_eq!(reply.options.unwrap(), vec!["Italian", "Thai"]);
        assert_eq!(
            response.shared_context.unwrap().get("city"),
            Some(&json!("Paris"))
        );
    }

    #[test]
    fn test_unknown_response_type_is_kept() {
        let reply: AgentReply =
            serde_json::from_str(r#"{ "response_type": "execute_workflow" }"#).unwrap();
        assert_eq!(
            reply.response_type,
            Some(ResponseType::Other("execute_workflow".to_string()))
        );
        let back = serde_json::to_value(&reply).unwrap();
        assert_eq!(back, json!({ "response_type": "execute_workflow" }));
    }

    #[test]
    fn test_null_fields_decode_as_absent() {
        let response: ConversationResponse =
            serde_json::from_str(r#"{ "agent_response": null, "shared_context": null }"#)
                .unwrap();
        assert!(response.agent_response.is_none());
        assert!(response.shared_context.is_none());

        let empty: ConversationResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ConversationResponse::default());
    }

    #[test]
    fn test_widget_payload_keeps_extra_fields() {
        let payload = WidgetPayload::from_value(json!({
            "widget_type": "weather",
            "location": "Paris",
            "api_data": { "main": { "temp": 20.6 } }
        }))
        .unwrap();
        assert_eq!(payload.widget_type, "weather");
        assert_eq!(payload.field("location"), Some(&json!("Paris")));
        assert!(payload.field("widget_type").is_none());

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back["api_data"]["main"]["temp"], json!(20.6));
        assert_eq!(back["widget_type"], json!("weather"));
    }

    #[test]
    fn test_shared_context_preserves_key_order() {
        let body = r#"{"zeta":1,"alpha":{"b":2,"a":1},"mid":[3,2,1]}"#;
        let context: SharedContext = serde_json::from_str(body).unwrap();
        assert_eq!(serde_json::to_string(&context).unwrap(), body);
    }

    #[test]
    fn test_is_displayable() {
        assert!(!AgentReply::default().is_displayable());
        assert!(!AgentReply::canvas(Vec::new()).is_displayable());
        assert!(AgentReply::answer("hi").is_displayable());
        assert!(AgentReply::plan(None, vec![PlanStep::new("Find", "Search")]).is_displayable());
    }

    #[test]
    fn test_agent_turn_copies_reply() {
        let turn = Turn::agent(AgentReply::clarification("Pick", vec!["A".into()]));
        assert_eq!(turn.sender, Sender::Agent);
        assert_eq!(turn.text(), Some("Pick"));
        assert_eq!(turn.options.as_deref(), Some(&["A".to_string()][..]));
    }

    #[test]
    fn test_history_mode_names() {
        let mode: HistoryMode = serde_json::from_str(r#""latest""#).unwrap();
        assert_eq!(mode, HistoryMode::Latest);
        assert_eq!(HistoryMode::default(), HistoryMode::Full);
    }
}
