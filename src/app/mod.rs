//! Application runtime composition modules.

pub(crate) mod config;
pub(crate) mod exit_handler;
pub(crate) mod output;
pub(crate) mod progress_bar;
pub(crate) mod runtime;
pub(crate) mod source;
pub(crate) mod terminal;
