//! Job submission, one running job per area

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use super::report::JobResult;
use super::request::GenerationRequest;
use super::worker::GenerationJob;
use super::{CancelToken, JobEvent};
use crate::error::{ForgeError, Result};
use crate::output::Destination;
use crate::types::{ForgeConfig, JobArea, JobState};

/// Starts jobs on the blocking pool and enforces one active job per area
#[derive(Debug, Clone, Default)]
pub struct JobRunner {
    config: ForgeConfig,
    active: Arc<Mutex<HashSet<JobArea>>>,
}

impl JobRunner {
    pub fn new(config: ForgeConfig) -> Self {
        Self {
            config,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Whether a job currently occupies the area
    pub fn is_busy(&self, area: JobArea) -> bool {
        self.active.lock().contains(&area)
    }

    /// Validate and start a job.
    ///
    /// Must be called from within a tokio runtime. Fails with `Validation`
    /// or `CapacityExceeded` before anything runs, and with `Busy` while the
    /// request's area already has a running job.
    pub fn submit(&self, request: GenerationRequest, destination: Destination) -> Result<JobHandle> {
        let job = GenerationJob::new(request, destination, self.config.clone())?;
        let area = job.area();
        let job_id = job.id().to_string();
        let guard = AreaGuard::acquire(&self.active, area)?;

        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let worker_cancel = cancel.clone();

        tracing::debug!(job_id = %job_id, area = %area, "Submitting job");
        let task = tokio::task::spawn_blocking(move || {
            let result = job.run(&worker_cancel, &tx);
            // free the area before announcing the end so a follow-up submit succeeds
            drop(guard);
            let _ = tx.send(JobEvent::Finished(result.report.clone()));
            result
        });

        Ok(JobHandle {
            job_id,
            area,
            state: JobState::Pending,
            cancel,
            events: rx,
            task,
        })
    }
}

/// Marks an area busy until dropped
struct AreaGuard {
    active: Arc<Mutex<HashSet<JobArea>>>,
    area: JobArea,
}

impl AreaGuard {
    fn acquire(active: &Arc<Mutex<HashSet<JobArea>>>, area: JobArea) -> Result<Self> {
        if !active.lock().insert(area) {
            return Err(ForgeError::busy(area));
        }
        Ok(Self {
            active: Arc::clone(active),
            area,
        })
    }
}

impl Drop for AreaGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.area);
    }
}

/// Caller side of a running job
#[derive(Debug)]
pub struct JobHandle {
    job_id: String,
    area: JobArea,
    state: JobState,
    cancel: CancelToken,
    events: UnboundedReceiver<JobEvent>,
    task: JoinHandle<JobResult>,
}

impl JobHandle {
    pub fn id(&self) -> &str {
        &self.job_id
    }

    pub fn area(&self) -> JobArea {
        self.area
    }

    /// Last state seen through [`JobHandle::next_event`]
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Ask the worker to stop at its next unit boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this job, e.g. from a signal handler
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Next event from the worker; `None` once the channel is drained
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        let event = self.events.recv().await?;
        match &event {
            JobEvent::Started { .. } => self.state = JobState::Running,
            JobEvent::Finished(report) => self.state = report.state,
            JobEvent::Progress(_) => {}
        }
        Some(event)
    }

    /// Wait for the worker and take ownership of its result
    pub async fn wait(self) -> Result<JobResult> {
        self.task
            .await
            .map_err(|e| ForgeError::internal(format!("Job {} worker stopped: {}", self.job_id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::CharacterSet;

    #[test]
    fn test_area_guard_releases() {
        let active = Arc::new(Mutex::new(HashSet::new()));
        let guard = AreaGuard::acquire(&active, JobArea::Rules).unwrap();
        assert_eq!(
            AreaGuard::acquire(&active, JobArea::Rules).err(),
            Some(ForgeError::busy(JobArea::Rules))
        );
        assert!(AreaGuard::acquire(&active, JobArea::Combiner).is_ok());
        drop(guard);
        assert!(AreaGuard::acquire(&active, JobArea::Rules).is_ok());
    }

    #[tokio::test]
    async fn test_submit_and_wait() {
        let runner = JobRunner::default();
        let request = GenerationRequest::BruteForce {
            sets: vec![CharacterSet::Numbers],
            length: 1,
        };
        let mut handle = runner.submit(request, Destination::Memory).unwrap();
        assert_eq!(handle.state(), JobState::Pending);

        while let Some(event) = handle.next_event().await {
            if matches!(event, JobEvent::Finished(_)) {
                break;
            }
        }
        assert_eq!(handle.state(), JobState::Completed);
        assert!(!runner.is_busy(JobArea::BruteForce));

        let result = handle.wait().await.unwrap();
        assert_eq!(result.words().unwrap().len(), 10);
    }
}
