use super::registry::render_panel;
use super::widgets::WidgetView;
use crate::conversation::{AgentReply, PlanStep, ResponseType};

/// Something the user can activate. Activation submits `reply` as a new user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub reply: String,
}

impl Choice {
    /// A choice whose reply is its own label.
    pub fn echo(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            reply: text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Whether list widget items can be activated.
    pub interactive_lists: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            interactive_lists: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderBlock {
    Text(String),
    Choices(Vec<Choice>),
    Steps(Vec<PlanStep>),
    Panel(Vec<WidgetView>),
}

impl RenderBlock {
    pub fn choices(&self) -> Vec<Choice> {
        match self {
            RenderBlock::Text(_) => Vec::new(),
            RenderBlock::Choices(choices) => choices.clone(),
            RenderBlock::Steps(steps) => steps
                .iter()
                .map(|step| Choice {
                    label: step.title.clone(),
                    reply: step.title.clone(),
                })
                .collect(),
            RenderBlock::Panel(views) => views.iter().flat_map(WidgetView::choices).collect(),
        }
    }
}

/// What to display for one turn, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPlan {
    pub blocks: Vec<RenderBlock>,
}

impl RenderPlan {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![RenderBlock::Text(text.into())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every actionable entry in the plan, in display order.
    pub fn choices(&self) -> Vec<Choice> {
        self.blocks.iter().flat_map(RenderBlock::choices).collect()
    }

    pub fn panel(&self) -> Option<&[WidgetView]> {
        self.blocks.iter().find_map(|block| match block {
            RenderBlock::Panel(views) => Some(views.as_slice()),
            _ => None,
        })
    }
}

pub fn classify(reply: &AgentReply) -> RenderPlan {
    classify_with(reply, &RenderOptions::default())
}

/// Picks a rendering strategy from `response_type`. The tag decides; a tag
/// whose companion field is empty falls through to plain text, never to
/// another strategy.
pub fn classify_with(reply: &AgentReply, options: &RenderOptions) -> RenderPlan {
    let mut blocks = Vec::new();
    let text = reply
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| RenderBlock::Text(t.to_string()));

    match reply.response_type {
        Some(ResponseType::Clarification) if has_items(&reply.options) => {
            blocks.extend(text);
            let choices = reply
                .options
                .iter()
                .flatten()
                .map(Choice::echo)
                .collect();
            blocks.push(RenderBlock::Choices(choices));
        }
        Some(ResponseType::Plan) if has_actionable_steps(&reply.steps) => {
            blocks.extend(text);
            let steps = reply
                .steps
                .iter()
                .flatten()
                .filter(|step| step.is_actionable())
                .cloned()
                .collect();
            blocks.push(RenderBlock::Steps(steps));
        }
        Some(ResponseType::Canvas) if has_items(&reply.widgets) => {
            let widgets = reply.widgets.as_deref().unwrap_or_default();
            blocks.push(RenderBlock::Panel(render_panel(widgets, options)));
        }
        _ => match text {
            Some(block) => blocks.push(block),
            None => tracing::debug!(
                "Agent reply ({}) has no text to display",
                reply
                    .response_type
                    .as_ref()
                    .map(ResponseType::as_str)
                    .unwrap_or("untyped")
            ),
        },
    }

    RenderPlan { blocks }
}

fn has_items<T>(items: &Option<Vec<T>>) -> bool {
    items.as_ref().is_some_and(|items| !items.is_empty())
}

fn has_actionable_steps(steps: &Option<Vec<PlanStep>>) -> bool {
    steps.iter().flatten().any(PlanStep::is_actionable)
}
