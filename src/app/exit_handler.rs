//! Exit code logic for the recorder process.
//!
//! Single responsibility: map a pipeline outcome to the process exit outcome.

use segstitch_core::PipelineStats;

use crate::ProcessExit;

/// A run succeeds only when it completed and every segment was committed.
pub(crate) fn determine_exit_outcome(stats: &PipelineStats, aborted: bool) -> ProcessExit {
    if !aborted && stats.is_complete() {
        ProcessExit::Success
    } else {
        ProcessExit::Failure
    }
}
