// Terminal UI implementation using ratatui
// The pretty face of Exact Mails

pub mod app;
pub mod runner;
pub mod sparkline;
pub mod ui;

pub use app::{App, InputMode, Tab};
pub use runner::run_tui;
