//! Job outcome records

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::output::{Destination, SinkOutput};
use crate::types::{JobArea, JobState};

/// Summary of a finished job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: String,
    pub area: JobArea,
    pub state: JobState,
    pub destination: Destination,
    /// Units of work done
    pub processed: u128,
    /// Units of work planned
    pub total: u128,
    /// Distinct candidates written to the sink
    pub emitted: u64,
    /// Raw candidates dropped as repeats
    pub duplicates_skipped: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Cause of a `Failed` state
    pub error: Option<ForgeError>,
}

impl JobReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.processed as f64 / self.total as f64) * 100.0
        }
    }

    /// Save the report as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ForgeError::io(e.to_string(), Some(parent.display().to_string())))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ForgeError::io(e.to_string(), Some(path.display().to_string())))
    }

    /// Load a report saved with [`JobReport::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ForgeError::io(e.to_string(), Some(path.display().to_string())))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Report plus whatever the sink left behind
#[derive(Debug, Clone)]
pub struct JobResult {
    pub report: JobReport,
    pub output: SinkOutput,
}

impl JobResult {
    pub fn state(&self) -> JobState {
        self.report.state
    }

    /// Generated words of an in-memory job
    pub fn words(&self) -> Option<&[String]> {
        match &self.output {
            SinkOutput::Words(words) => Some(words),
            _ => None,
        }
    }

    /// The sink output, or the error that failed the job
    pub fn into_output(self) -> Result<SinkOutput> {
        match self.report.state {
            JobState::Failed => Err(self
                .report
                .error
                .unwrap_or_else(|| crate::internal_error!("Job {} failed without a cause", self.report.job_id))),
            _ => Ok(self.output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(state: JobState, error: Option<ForgeError>) -> JobReport {
        let now = Utc::now();
        JobReport {
            job_id: "rules_1".to_string(),
            area: JobArea::Rules,
            state,
            destination: Destination::Memory,
            processed: 5,
            total: 10,
            emitted: 40,
            duplicates_skipped: 2,
            started_at: now,
            finished_at: now,
            error,
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(report(JobState::Cancelled, None).progress_percent(), 50.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("job.json");
        let original = report(JobState::Failed, Some(ForgeError::capacity_exceeded(2_000_000, 1_000_000)));
        original.save(&path).unwrap();
        assert_eq!(JobReport::load(&path).unwrap(), original);
    }

    #[test]
    fn test_failed_result_yields_error() {
        let result = JobResult {
            report: report(JobState::Failed, Some(ForgeError::io("disk full", None))),
            output: SinkOutput::Discarded,
        };
        assert_eq!(result.into_output().unwrap_err(), ForgeError::io("disk full", None));
    }
}
