pub mod classifier;
pub mod registry;
pub mod widgets;

pub use classifier::{classify, classify_with, Choice, RenderBlock, RenderOptions, RenderPlan};
pub use registry::{render_panel, render_widget, resolve, Resolution, WidgetKind};
pub use widgets::{
    ListView, MapView, WeatherReport, WeatherView, WidgetError, WidgetRenderer, WidgetView,
};
