//! Terminal playground: loading screen, then editor, Run and result pane.

pub mod app;
pub mod editor;
pub mod events;
pub mod handler;
pub mod ui;

pub use handler::run_playground;
