//! Core types and structures for wordlist-forge

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ForgeError, Result};

/// Word mutation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    LeetSpeak,
    CaseVariations,
    AppendNumbers,
    PrependNumbers,
    AppendSpecialCharacters,
    PrependSpecialCharacters,
}

impl Rule {
    /// Every rule in application order
    pub const ALL: [Rule; 6] = [
        Rule::LeetSpeak,
        Rule::CaseVariations,
        Rule::AppendNumbers,
        Rule::PrependNumbers,
        Rule::AppendSpecialCharacters,
        Rule::PrependSpecialCharacters,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::LeetSpeak => "leet_speak",
            Rule::CaseVariations => "case_variations",
            Rule::AppendNumbers => "append_numbers",
            Rule::PrependNumbers => "prepend_numbers",
            Rule::AppendSpecialCharacters => "append_special_characters",
            Rule::PrependSpecialCharacters => "prepend_special_characters",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Rule {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Rule::ALL
            .iter()
            .copied()
            .find(|rule| rule.name() == key)
            .ok_or_else(|| ForgeError::invalid_parameter("rule", format!("Unknown rule: {}", s)))
    }
}

/// Enabled/disabled flag for every rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub leet_speak: bool,
    pub case_variations: bool,
    pub append_numbers: bool,
    pub prepend_numbers: bool,
    pub append_special_characters: bool,
    pub prepend_special_characters: bool,
}

impl RuleSet {
    /// No rule enabled
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a set from a list of enabled rules
    pub fn from_rules(rules: &[Rule]) -> Self {
        let mut set = Self::none();
        for rule in rules {
            set.set(*rule, true);
        }
        set
    }

    /// Builder-style enable
    pub fn with(mut self, rule: Rule) -> Self {
        self.set(rule, true);
        self
    }

    pub fn set(&mut self, rule: Rule, enabled: bool) {
        match rule {
            Rule::LeetSpeak => self.leet_speak = enabled,
            Rule::CaseVariations => self.case_variations = enabled,
            Rule::AppendNumbers => self.append_numbers = enabled,
            Rule::PrependNumbers => self.prepend_numbers = enabled,
            Rule::AppendSpecialCharacters => self.append_special_characters = enabled,
            Rule::PrependSpecialCharacters => self.prepend_special_characters = enabled,
        }
    }

    pub fn is_enabled(&self, rule: Rule) -> bool {
        match rule {
            Rule::LeetSpeak => self.leet_speak,
            Rule::CaseVariations => self.case_variations,
            Rule::AppendNumbers => self.append_numbers,
            Rule::PrependNumbers => self.prepend_numbers,
            Rule::AppendSpecialCharacters => self.append_special_characters,
            Rule::PrependSpecialCharacters => self.prepend_special_characters,
        }
    }

    /// Enabled rules in application order
    pub fn enabled(&self) -> impl Iterator<Item = Rule> + '_ {
        Rule::ALL.into_iter().filter(move |rule| self.is_enabled(*rule))
    }

    pub fn any(&self) -> bool {
        self.enabled().next().is_some()
    }

    /// Whether any affix rule is enabled
    pub fn has_affixes(&self) -> bool {
        self.append_numbers
            || self.prepend_numbers
            || self.append_special_characters
            || self.prepend_special_characters
    }
}

/// Logical generation area; at most one job runs per area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobArea {
    BruteForce,
    Rules,
    Combiner,
}

impl std::fmt::Display for JobArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobArea::BruteForce => write!(f, "brute-force"),
            JobArea::Rules => write!(f, "rules"),
            JobArea::Combiner => write!(f, "combiner"),
        }
    }
}

/// Generation job lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Cancelled,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Cancelled | JobState::Completed | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Running => write!(f, "running"),
            JobState::Cancelled => write!(f, "cancelled"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// Rough wall-clock bucket for a candidate count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    UnderOneSecond,
    OneToFiveSeconds,
    FiveToThirtySeconds,
    ThirtySecondsToTwoMinutes,
    OneToFiveMinutes,
    OverFiveMinutes,
}

impl TimeBucket {
    /// Map a candidate count to its bucket
    pub fn for_count(count: u128) -> Self {
        match count {
            c if c < 1_000 => TimeBucket::UnderOneSecond,
            c if c < 10_000 => TimeBucket::OneToFiveSeconds,
            c if c < 100_000 => TimeBucket::FiveToThirtySeconds,
            c if c < 1_000_000 => TimeBucket::ThirtySecondsToTwoMinutes,
            c if c < 10_000_000 => TimeBucket::OneToFiveMinutes,
            _ => TimeBucket::OverFiveMinutes,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::UnderOneSecond => "<1s",
            TimeBucket::OneToFiveSeconds => "1-5s",
            TimeBucket::FiveToThirtySeconds => "5-30s",
            TimeBucket::ThirtySecondsToTwoMinutes => "30s-2m",
            TimeBucket::OneToFiveMinutes => "1-5m",
            TimeBucket::OverFiveMinutes => ">5m",
        }
    }
}

impl std::fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Pre-flight size and time estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationResult {
    /// Candidate count; an upper bound unless `exact` is set
    pub count: u128,
    pub bucket: TimeBucket,
    /// True when the count is the exact output size
    pub exact: bool,
}

impl EstimationResult {
    pub fn exact(count: u128) -> Self {
        Self {
            count,
            bucket: TimeBucket::for_count(count),
            exact: true,
        }
    }

    pub fn upper_bound(count: u128) -> Self {
        Self {
            count,
            bucket: TimeBucket::for_count(count),
            exact: false,
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfig {
    /// Maximum candidates kept by an in-memory sink
    pub memory_limit: u64,
    /// Emit a progress event every N units of work
    pub progress_interval: u64,
    /// Never emit progress events closer together than this
    pub progress_min_period: Duration,
    /// Flush file sinks every N lines
    pub flush_interval: u64,
    /// Words shown when previewing an in-memory result
    pub preview_limit: usize,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            memory_limit: 1_000_000,
            progress_interval: 10_000,
            progress_min_period: Duration::from_millis(250),
            flush_interval: 10_000,
            preview_limit: 10_000,
        }
    }
}

impl ForgeConfig {
    pub const MEMORY_LIMIT_VAR: &'static str = "WORDLIST_FORGE_MEMORY_LIMIT";
    pub const PROGRESS_INTERVAL_VAR: &'static str = "WORDLIST_FORGE_PROGRESS_INTERVAL";
    pub const FLUSH_INTERVAL_VAR: &'static str = "WORDLIST_FORGE_FLUSH_INTERVAL";

    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(limit) = read_positive_var(Self::MEMORY_LIMIT_VAR)? {
            config.memory_limit = limit;
        }
        if let Some(interval) = read_positive_var(Self::PROGRESS_INTERVAL_VAR)? {
            config.progress_interval = interval;
        }
        if let Some(interval) = read_positive_var(Self::FLUSH_INTERVAL_VAR)? {
            config.flush_interval = interval;
        }
        Ok(config)
    }
}

fn read_positive_var(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => parse_positive(name, &raw).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ForgeError::config(format!("{}: {}", name, e))),
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<u64> {
    let value: u64 = raw
        .trim()
        .replace('_', "")
        .parse()
        .map_err(|_| ForgeError::config(format!("{} must be a positive integer, got '{}'", name, raw)))?;
    if value == 0 {
        return Err(ForgeError::config(format!("{} must be greater than zero", name)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_parse() {
        assert_eq!("leet_speak".parse::<Rule>().unwrap(), Rule::LeetSpeak);
        assert_eq!("Append-Numbers".parse::<Rule>().unwrap(), Rule::AppendNumbers);
        assert!("reverse".parse::<Rule>().is_err());
    }

    #[test]
    fn test_rule_set_order() {
        let rules = RuleSet::from_rules(&[Rule::PrependNumbers, Rule::LeetSpeak]);
        let enabled: Vec<Rule> = rules.enabled().collect();
        assert_eq!(enabled, vec![Rule::LeetSpeak, Rule::PrependNumbers]);
        assert!(rules.has_affixes());
        assert!(!RuleSet::none().any());
    }

    #[test]
    fn test_time_buckets() {
        assert_eq!(TimeBucket::for_count(999).label(), "<1s");
        assert_eq!(TimeBucket::for_count(1_000).label(), "1-5s");
        assert_eq!(TimeBucket::for_count(99_999).label(), "5-30s");
        assert_eq!(TimeBucket::for_count(500_000).label(), "30s-2m");
        assert_eq!(TimeBucket::for_count(5_000_000).label(), "1-5m");
        assert_eq!(TimeBucket::for_count(9_999_999).label(), "1-5m");
        assert_eq!(TimeBucket::for_count(u128::MAX).label(), ">5m");
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("X", "1_000").unwrap(), 1000);
        assert!(parse_positive("X", "0").is_err());
        assert!(parse_positive("X", "lots").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
    }
}
