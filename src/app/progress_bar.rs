//! Progress UI for recording runs.

use indicatif::{ProgressBar, ProgressStyle};
use segstitch_core::{LogProgress, NoopProgress, ProgressReporter, human_bytes};

use crate::app::terminal::LogWriter;

/// Progress reporter picked for one run.
///
/// An interactive stderr gets an indicatif bar, anything else gets log
/// lines, and `--quiet` gets nothing. While a bar is shown, log lines
/// are written above it through `log`.
#[derive(Debug)]
pub(crate) enum RunProgress {
    Bar { bar: ProgressBar, log: LogWriter },
    Log(LogProgress),
    Silent(NoopProgress),
}

impl RunProgress {
    pub(crate) fn select(
        use_bar: bool,
        quiet: bool,
        total_segments: usize,
        log: &LogWriter,
    ) -> Self {
        if quiet {
            Self::Silent(NoopProgress)
        } else if use_bar {
            Self::with_bar(new_bar(ProgressBar::new(total_segments as u64)), log)
        } else {
            Self::Log(LogProgress)
        }
    }

    fn with_bar(bar: ProgressBar, log: &LogWriter) -> Self {
        log.attach(bar.clone());
        Self::Bar {
            bar,
            log: log.clone(),
        }
    }

    /// Clears the bar, if any, so the summary line prints on a clean row.
    pub(crate) fn finish(&self) {
        if let Self::Bar { bar, log } = self {
            bar.finish_and_clear();
            log.detach();
        }
    }
}

fn new_bar(bar: ProgressBar) -> ProgressBar {
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}

impl ProgressReporter for RunProgress {
    fn on_segment_committed(&self, done: usize, total: usize, bytes_written: u64) {
        match self {
            Self::Bar { bar, .. } => {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
                bar.set_message(human_bytes(bytes_written));
            }
            Self::Log(log) => log.on_segment_committed(done, total, bytes_written),
            Self::Silent(noop) => noop.on_segment_committed(done, total, bytes_written),
        }
    }
}
