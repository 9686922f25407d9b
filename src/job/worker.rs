//! Job execution loop

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;

use super::report::{JobReport, JobResult};
use super::request::GenerationRequest;
use super::{CancelToken, JobEvent, JobProgress};
use crate::error::{ForgeError, Result};
use crate::generate::{BruteForceEnumerator, CharacterSet, PairwiseCombiner, PermutationCombiner, RuleApplication};
use crate::output::{dedup_ordered, DedupMode, Destination, OrderedDeduplicator, SinkOutput, StreamingSink};
use crate::types::{ForgeConfig, JobArea, JobState};

static NEXT_JOB: AtomicU64 = AtomicU64::new(1);

/// Unified generator wrapper
enum SourceKind {
    BruteForce(BruteForceEnumerator),
    Rules(RuleApplication),
    Permutations(PermutationCombiner),
    Pairwise(PairwiseCombiner),
}

impl SourceKind {
    fn from_request(request: GenerationRequest) -> Result<Self> {
        let source = match request {
            GenerationRequest::BruteForce { sets, length } => {
                SourceKind::BruteForce(BruteForceEnumerator::new(&sets, length)?)
            }
            GenerationRequest::Rules { words, rules } => SourceKind::Rules(RuleApplication::new(words, rules)),
            GenerationRequest::Permutations {
                words,
                rules,
                combine_words,
            } => SourceKind::Permutations(PermutationCombiner::new(dedup_ordered(words), rules, combine_words)),
            GenerationRequest::Pairwise {
                left,
                right,
                rules,
                both_orders,
            } => SourceKind::Pairwise(PairwiseCombiner::new(left, right, rules, both_orders)),
        };
        Ok(source)
    }

    /// Brute-force output is unique by construction (the catalog sets are
    /// disjoint), so only the rule-driven sources need a membership set.
    fn dedup_mode(&self) -> DedupMode {
        match self {
            SourceKind::BruteForce(_) => DedupMode::Untracked,
            _ => DedupMode::Streaming,
        }
    }

    fn next_unit(&mut self, out: &mut Vec<String>) -> bool {
        match self {
            SourceKind::BruteForce(g) => match g.next() {
                Some(word) => {
                    out.push(word);
                    true
                }
                None => false,
            },
            SourceKind::Rules(g) => g.next_unit(out),
            SourceKind::Permutations(g) => g.next_unit(out),
            SourceKind::Pairwise(g) => g.next_unit(out),
        }
    }

    fn current_index(&self) -> u128 {
        match self {
            SourceKind::BruteForce(g) => g.current_index(),
            SourceKind::Rules(g) => g.current_index(),
            SourceKind::Permutations(g) => g.current_index(),
            SourceKind::Pairwise(g) => g.current_index(),
        }
    }

    fn total(&self) -> u128 {
        match self {
            SourceKind::BruteForce(g) => g.total(),
            SourceKind::Rules(g) => g.total(),
            SourceKind::Permutations(g) => g.total(),
            SourceKind::Pairwise(g) => g.total(),
        }
    }
}

/// Count-then-time throttle for progress events.
///
/// The clock is only read once every `interval` units.
struct ProgressThrottle {
    interval: u64,
    min_period: Duration,
    since_check: u64,
    last_emit: Instant,
}

impl ProgressThrottle {
    fn new(interval: u64, min_period: Duration) -> Self {
        Self {
            interval: interval.max(1),
            min_period,
            since_check: 0,
            last_emit: Instant::now(),
        }
    }

    fn tick(&mut self) -> bool {
        self.since_check += 1;
        if self.since_check < self.interval {
            return false;
        }
        self.since_check = 0;
        if self.last_emit.elapsed() < self.min_period {
            return false;
        }
        self.last_emit = Instant::now();
        true
    }
}

/// How the run loop stopped
enum Outcome {
    Completed,
    Cancelled,
}

/// One validated generation run.
///
/// Owns its generator, deduplicator and sink exclusively from the moment it
/// starts until it hands back a [`JobResult`].
#[derive(Debug, Clone)]
pub struct GenerationJob {
    id: String,
    request: GenerationRequest,
    destination: Destination,
    config: ForgeConfig,
}

impl GenerationJob {
    /// Validate the request and build a pending job.
    ///
    /// An in-memory brute-force run whose exact size exceeds
    /// `config.memory_limit` is refused here, before any output exists.
    pub fn new(request: GenerationRequest, destination: Destination, config: ForgeConfig) -> Result<Self> {
        request.validate()?;

        if destination.is_memory() {
            if let GenerationRequest::BruteForce { sets, length } = &request {
                let total = CharacterSet::total_combinations(sets, *length)?;
                if total > config.memory_limit as u128 {
                    return Err(ForgeError::capacity_exceeded(total, config.memory_limit));
                }
            }
        }

        let area = request.area();
        let now = Utc::now();
        let id = format!(
            "{}_{}_{}",
            area.to_string().replace('-', "_"),
            now.format("%Y%m%d_%H%M%S"),
            NEXT_JOB.fetch_add(1, Ordering::Relaxed)
        );

        Ok(Self {
            id,
            request,
            destination,
            config,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn area(&self) -> JobArea {
        self.request.area()
    }

    /// Run to a terminal state on the current thread.
    ///
    /// Sends `Started` once the sink is open, then throttled `Progress`
    /// events; the terminal `Finished` event is left to the caller so it can
    /// release the job's area first. Cancellation is polled between units of
    /// work.
    pub fn run(self, cancel: &CancelToken, events: &UnboundedSender<JobEvent>) -> JobResult {
        let area = self.area();
        let started_at = Utc::now();
        let clock = Instant::now();

        let mut source = match SourceKind::from_request(self.request.clone()) {
            Ok(source) => source,
            Err(e) => return self.fail_before_start(e, 0, started_at),
        };
        let total = source.total();

        let mut sink = match StreamingSink::open(&self.destination, &self.config) {
            Ok(sink) => sink,
            Err(e) => return self.fail_before_start(e, total, started_at),
        };

        let _ = events.send(JobEvent::Started {
            job_id: self.id.clone(),
            area,
            total,
        });
        tracing::info!(job_id = %self.id, area = %area, total = %total, "Job started");

        let mut dedup = OrderedDeduplicator::with_mode(source.dedup_mode());

        let outcome = self
            .drive(&mut source, &mut dedup, &mut sink, cancel, events)
            .and_then(|outcome| {
                if let Outcome::Completed = outcome {
                    sink.flush()?;
                }
                Ok(outcome)
            });
        let accepted = sink.written();

        let (state, error, output) = match outcome {
            Ok(Outcome::Completed) => (JobState::Completed, None, sink.into_output()),
            Ok(Outcome::Cancelled) => (JobState::Cancelled, None, sink.abandon()),
            Err(e) => (JobState::Failed, Some(e), sink.abandon()),
        };
        // a file only counts the lines that reached it
        let emitted = match &output {
            SinkOutput::File { lines, .. } => *lines,
            _ => accepted,
        };

        let report = JobReport {
            job_id: self.id.clone(),
            area,
            state,
            destination: self.destination.clone(),
            processed: source.current_index(),
            total,
            emitted,
            duplicates_skipped: dedup.duplicates(),
            started_at,
            finished_at: Utc::now(),
            error,
        };

        let duration_ms = clock.elapsed().as_millis() as u64;
        match &report.error {
            Some(e) => tracing::warn!(
                job_id = %report.job_id,
                area = %area,
                processed = %report.processed,
                emitted = report.emitted,
                duration_ms,
                error = %e,
                "Job failed"
            ),
            None => tracing::info!(
                job_id = %report.job_id,
                area = %area,
                state = %state,
                processed = %report.processed,
                emitted = report.emitted,
                duration_ms,
                "Job finished"
            ),
        }

        JobResult { report, output }
    }

    fn drive(
        &self,
        source: &mut SourceKind,
        dedup: &mut OrderedDeduplicator,
        sink: &mut StreamingSink,
        cancel: &CancelToken,
        events: &UnboundedSender<JobEvent>,
    ) -> Result<Outcome> {
        let total = source.total();
        let mut throttle = ProgressThrottle::new(self.config.progress_interval, self.config.progress_min_period);
        let mut buffer = Vec::new();

        loop {
            if cancel.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }

            buffer.clear();
            if !source.next_unit(&mut buffer) {
                break;
            }

            for word in &buffer {
                if dedup.insert(word) {
                    sink.push(word)?;
                }
            }

            if throttle.tick() {
                let _ = events.send(JobEvent::Progress(JobProgress {
                    processed: source.current_index(),
                    total,
                    emitted: sink.written(),
                }));
            }
        }

        let _ = events.send(JobEvent::Progress(JobProgress {
            processed: source.current_index(),
            total,
            emitted: sink.written(),
        }));
        Ok(Outcome::Completed)
    }

    fn fail_before_start(&self, error: ForgeError, total: u128, started_at: chrono::DateTime<Utc>) -> JobResult {
        tracing::warn!(job_id = %self.id, error = %error, "Job failed before start");
        JobResult {
            report: JobReport {
                job_id: self.id.clone(),
                area: self.area(),
                state: JobState::Failed,
                destination: self.destination.clone(),
                processed: 0,
                total,
                emitted: 0,
                duplicates_skipped: 0,
                started_at,
                finished_at: Utc::now(),
                error: Some(error),
            },
            output: SinkOutput::Discarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rule, RuleSet};
    use tokio::sync::mpsc;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run(request: GenerationRequest, destination: Destination, config: ForgeConfig) -> (JobResult, Vec<JobEvent>) {
        let job = GenerationJob::new(request, destination, config).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let result = job.run(&CancelToken::new(), &tx);
        drop(tx);
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        (result, events)
    }

    #[test]
    fn test_brute_force_in_memory() {
        let request = GenerationRequest::BruteForce {
            sets: vec![CharacterSet::Numbers],
            length: 2,
        };
        let (result, events) = run(request, Destination::Memory, ForgeConfig::default());
        assert_eq!(result.state(), JobState::Completed);
        let words = result.words().unwrap();
        assert_eq!(words.len(), 100);
        assert_eq!(words[0], "00");
        assert_eq!(words[99], "99");
        assert!(matches!(events[0], JobEvent::Started { total: 100, .. }));
        assert!(matches!(events.last(), Some(JobEvent::Progress(p)) if p.processed == 100));
    }

    #[test]
    fn test_memory_limit_refused_up_front() {
        let config = ForgeConfig {
            memory_limit: 99,
            ..ForgeConfig::default()
        };
        let request = GenerationRequest::BruteForce {
            sets: vec![CharacterSet::Numbers],
            length: 2,
        };
        let err = GenerationJob::new(request, Destination::Memory, config).unwrap_err();
        assert_eq!(err, ForgeError::capacity_exceeded(100, 99));
    }

    #[test]
    fn test_cross_base_dedup_is_global() {
        // "Pass" and "pass" both produce "pass" and "PASS"
        let request = GenerationRequest::Rules {
            words: words(&["Pass", "pass"]),
            rules: RuleSet::none().with(Rule::CaseVariations),
        };
        let (result, _) = run(request, Destination::Memory, ForgeConfig::default());
        assert_eq!(result.words().unwrap(), ["Pass", "PASS", "pass"]);
        assert_eq!(result.report.emitted, 3);
        assert_eq!(result.report.duplicates_skipped, 5);
    }

    #[test]
    fn test_rules_hit_memory_limit() {
        let config = ForgeConfig {
            memory_limit: 5,
            ..ForgeConfig::default()
        };
        let request = GenerationRequest::Rules {
            words: words(&["hi"]),
            rules: RuleSet::none().with(Rule::AppendNumbers),
        };
        let (result, _) = run(request, Destination::Memory, config);
        assert_eq!(result.state(), JobState::Failed);
        assert_eq!(result.report.error, Some(ForgeError::capacity_exceeded(6, 5)));
        assert_eq!(result.output, SinkOutput::Discarded);
    }

    #[test]
    fn test_pre_cancelled_job() {
        let job = GenerationJob::new(
            GenerationRequest::BruteForce {
                sets: vec![CharacterSet::Lowercase],
                length: 3,
            },
            Destination::Memory,
            ForgeConfig::default(),
        )
        .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = job.run(&cancel, &tx);
        assert_eq!(result.state(), JobState::Cancelled);
        assert_eq!(result.report.processed, 0);
        assert_eq!(result.output, SinkOutput::Discarded);
    }

    #[test]
    fn test_unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        let request = GenerationRequest::BruteForce {
            sets: vec![CharacterSet::Numbers],
            length: 1,
        };
        let (result, events) = run(request, Destination::File(path), ForgeConfig::default());
        assert_eq!(result.state(), JobState::Failed);
        assert!(matches!(result.report.error, Some(ForgeError::Io { .. })));
        assert_eq!(result.report.total, 10);
        assert_eq!(result.report.emitted, 0);
        // the sink never opened, so the job never announced a start
        assert!(events.is_empty());
    }

    #[test]
    fn test_throttle_counts_before_clock() {
        let mut throttle = ProgressThrottle::new(3, Duration::ZERO);
        assert!(!throttle.tick());
        assert!(!throttle.tick());
        assert!(throttle.tick());
        assert!(!throttle.tick());

        let mut slow = ProgressThrottle::new(1, Duration::from_secs(3600));
        assert!(!slow.tick());
    }

    #[test]
    fn test_job_ids_are_unique() {
        let request = GenerationRequest::BruteForce {
            sets: vec![CharacterSet::Numbers],
            length: 1,
        };
        let a = GenerationJob::new(request.clone(), Destination::Memory, ForgeConfig::default()).unwrap();
        let b = GenerationJob::new(request, Destination::Memory, ForgeConfig::default()).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with("brute_force_"));
    }
}
