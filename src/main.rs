//! CLI entry point for the segstitch recorder.

use std::process::ExitCode;

mod app;
mod cli;

/// Process-level outcome of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => Self::SUCCESS,
            ProcessExit::Failure => Self::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run_segstitch().await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
