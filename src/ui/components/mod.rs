pub mod chat_view;
pub mod help_overlay;
pub mod status_bar;
pub mod toast;
pub mod widget_card;

pub use chat_view::ChatViewWidget;
pub use help_overlay::HelpOverlay;
pub use status_bar::{InputBarWidget, StatusBarWidget};
pub use toast::ToastWidget;
pub use widget_card::WidgetCard;
