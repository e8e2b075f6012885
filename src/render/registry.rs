use super::classifier::RenderOptions;
use super::widgets::{ListRenderer, MapRenderer, WeatherRenderer, WidgetRenderer, WidgetView};
use crate::conversation::WidgetPayload;

static LIST_RENDERER: ListRenderer = ListRenderer;
static MAP_RENDERER: MapRenderer = MapRenderer;
static WEATHER_RENDERER: WeatherRenderer = WeatherRenderer;

/// The closed set of widget tags this client knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Map,
    Weather,
    List,
}

impl WidgetKind {
    pub fn all() -> &'static [WidgetKind] {
        &[WidgetKind::Map, WidgetKind::Weather, WidgetKind::List]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            WidgetKind::Map => "map",
            WidgetKind::Weather => "weather",
            WidgetKind::List => "list",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.tag() == tag)
    }

    pub fn renderer(&self) -> &'static dyn WidgetRenderer {
        match self {
            WidgetKind::Map => &MAP_RENDERER,
            WidgetKind::Weather => &WEATHER_RENDERER,
            WidgetKind::List => &LIST_RENDERER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Known(WidgetKind),
    Unknown,
}

/// Looks up the renderer for a tag. Unrecognized tags are not an error: the
/// agent's widget vocabulary can grow ahead of the client.
pub fn resolve(widget_type: &str) -> Resolution {
    match WidgetKind::from_tag(widget_type) {
        Some(kind) => Resolution::Known(kind),
        None => Resolution::Unknown,
    }
}

pub fn render_widget(payload: &WidgetPayload, options: &RenderOptions) -> WidgetView {
    match resolve(&payload.widget_type) {
        Resolution::Known(kind) => kind.renderer().render(payload, options),
        Resolution::Unknown => {
            tracing::debug!("No renderer for widget type '{}'", payload.widget_type);
            WidgetView::unknown(payload.widget_type.clone())
        }
    }
}

/// Renders every payload in order. A bad widget never takes its siblings down.
pub fn render_panel(widgets: &[WidgetPayload], options: &RenderOptions) -> Vec<WidgetView> {
    widgets
        .iter()
        .map(|payload| render_widget(payload, options))
        .collect()
}
