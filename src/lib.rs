//! Wordlist Forge - candidate password list generation for credential audits
//!
//! Brute-force enumeration, rule-based word mutation and multi-word
//! combination, with size estimates up front and duplicate-free streamed output.

pub mod error;
pub mod generate;
pub mod job;
pub mod output;
pub mod types;

// Re-export commonly used types
pub use error::{ForgeError, Result};
pub use types::{
    EstimationResult, ForgeConfig, JobArea, JobState, Rule, RuleSet, TimeBucket,
};

// Re-export main functionality
pub use generate::{apply_rules, leet, BruteForceEnumerator, CharacterSet, SizeEstimator};
pub use job::{
    CancelToken, GenerationJob, GenerationRequest, JobEvent, JobHandle, JobProgress, JobReport,
    JobResult, JobRunner,
};
pub use output::{Destination, OrderedDeduplicator, SinkOutput, WordList};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
