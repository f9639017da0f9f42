//! TUI module: Terminal User Interface using Ratatui.
//!
//! Two screens:
//! - Patient form (with live BMI calculation)
//! - Estimate result with conversions, bracket and health insights

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::Theme;
