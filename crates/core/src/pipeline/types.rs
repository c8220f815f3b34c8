//! Types for the harvest pipeline.

use std::time::Duration;

/// Step of a record task at which it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Detail JSON fetch or decode.
    DetailFetch,
    /// Image tag selection.
    Selection,
    /// Image download.
    ImageFetch,
    /// Image persistence.
    Save,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::DetailFetch => "detail-fetch",
            Stage::Selection => "selection",
            Stage::ImageFetch => "image-fetch",
            Stage::Save => "save",
        }
    }
}

/// One abandoned record task, kept for the end-of-run report.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub vehicle_id: i64,
    pub stage: Stage,
    pub message: String,
}

/// Result of one record task, accumulated at the fan-in point.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The record had no usable id; nothing counts.
    Skipped,
    /// The task gave up at `failure.stage`.
    Failed(TaskFailure),
    /// The image was fetched and persisted.
    Saved,
}

/// End-of-run totals.
///
/// Counter semantics: `parsed` counts every record whose detail JSON was
/// fetched and decoded (it reached image selection), including records that
/// then failed selection. `downloaded` counts successful image fetches,
/// `saved` successful writes, so `saved <= downloaded <= parsed` always
/// holds.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub parsed: u64,
    pub downloaded: u64,
    pub saved: u64,
    pub elapsed: Duration,
    pub failures: Vec<TaskFailure>,
}

impl RunSummary {
    /// Folds one task outcome into the totals.
    pub(crate) fn absorb(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Skipped => {}
            TaskOutcome::Saved => {
                self.parsed += 1;
                self.downloaded += 1;
                self.saved += 1;
            }
            TaskOutcome::Failed(failure) => {
                match failure.stage {
                    Stage::DetailFetch => {}
                    Stage::Selection | Stage::ImageFetch => self.parsed += 1,
                    Stage::Save => {
                        self.parsed += 1;
                        self.downloaded += 1;
                    }
                }
                self.failures.push(failure);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stage: Stage) -> TaskOutcome {
        TaskOutcome::Failed(TaskFailure {
            vehicle_id: 1,
            stage,
            message: "x".to_string(),
        })
    }

    #[test]
    fn counters_follow_the_reached_stage() {
        let mut summary = RunSummary::default();
        summary.absorb(TaskOutcome::Skipped);
        summary.absorb(failed(Stage::DetailFetch));
        summary.absorb(failed(Stage::Selection));
        summary.absorb(failed(Stage::ImageFetch));
        summary.absorb(failed(Stage::Save));
        summary.absorb(TaskOutcome::Saved);

        assert_eq!(summary.parsed, 4);
        assert_eq!(summary.downloaded, 2);
        assert_eq!(summary.saved, 1);
        assert_eq!(summary.failures.len(), 4);
        assert!(summary.saved <= summary.downloaded && summary.downloaded <= summary.parsed);
    }
}
