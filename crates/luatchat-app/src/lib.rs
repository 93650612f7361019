//! luatchat application layer: conversation controller, terminal view,
//! interactive command surface, and configuration.

pub mod cli;
pub mod config;
pub mod controller;
pub mod repl;
pub mod view;

pub use controller::{ChatController, ChatView};
pub use view::TerminalView;
