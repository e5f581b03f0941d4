pub mod logging;
pub mod ui;

pub use ui::tui_app::TuiApp;
