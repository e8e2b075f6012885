pub mod app;
pub mod conversation;
pub mod render;
pub mod transport;
pub mod ui;
pub mod util;
