//! Generation jobs - background execution with progress events and cancellation
//!
//! A job is validated and sized up front, then runs on a blocking worker
//! thread that owns its generator, deduplicator and sink. The caller keeps a
//! [`JobHandle`] with a single-consumer event channel and a cancel switch.

mod report;
mod request;
mod runner;
mod worker;

pub use report::{JobReport, JobResult};
pub use request::GenerationRequest;
pub use runner::{JobHandle, JobRunner};
pub use worker::GenerationJob;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::JobArea;

/// Cooperative cancellation flag shared between a handle and its worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Progress snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Units of work done (elements, words, permutations or pairs)
    pub processed: u128,
    pub total: u128,
    /// Distinct candidates written so far
    pub emitted: u64,
}

impl JobProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Notification sent from a worker to the job's owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobEvent {
    Started {
        job_id: String,
        area: JobArea,
        total: u128,
    },
    Progress(JobProgress),
    /// Terminal event; always the last one on the channel
    Finished(JobReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let worker = token.clone();
        assert!(!worker.is_cancelled());
        token.cancel();
        assert!(worker.is_cancelled());
    }

    #[test]
    fn test_fraction() {
        let progress = JobProgress {
            processed: 25,
            total: 100,
            emitted: 30,
        };
        assert_eq!(progress.fraction(), 0.25);
        let empty = JobProgress {
            processed: 0,
            total: 0,
            emitted: 0,
        };
        assert_eq!(empty.fraction(), 1.0);
    }
}
