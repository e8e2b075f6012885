pub mod app;
pub mod components;
pub mod helpers;

pub use app::AppWidget;
