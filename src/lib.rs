//! Embedded Python sessions: bootstrap an interpreter, run snippets against
//! it, and capture what they print and return.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod engine;
pub mod execution;
pub mod logging;
pub mod printer;
pub mod process;
pub mod tui;
pub mod utils;
