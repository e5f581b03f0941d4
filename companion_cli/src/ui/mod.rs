pub mod layout;
pub mod tui;
pub mod tui_app;
