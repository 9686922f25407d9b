//! Insertion-order-preserving deduplication

use std::collections::HashSet;

/// How much the deduplicator remembers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupMode {
    /// Membership set plus ordered replay of first-seen words
    Ordered,
    /// Membership set only; the sink holds the ordered output
    Streaming,
    /// No tracking, for sources that cannot repeat a word
    Untracked,
}

/// Set that also remembers the order in which words were first seen.
///
/// Membership test and insert are amortized O(1). One deduplicator belongs
/// to one job; nothing is shared across jobs.
#[derive(Debug, Clone)]
pub struct OrderedDeduplicator {
    mode: DedupMode,
    seen: HashSet<String>,
    order: Vec<String>,
    admitted: u64,
    duplicates: u64,
}

impl OrderedDeduplicator {
    /// Deduplicator with ordered replay
    pub fn new() -> Self {
        Self::with_mode(DedupMode::Ordered)
    }

    /// Deduplicator for a streamed job whose sink keeps the output
    pub fn streaming() -> Self {
        Self::with_mode(DedupMode::Streaming)
    }

    pub fn with_mode(mode: DedupMode) -> Self {
        Self {
            mode,
            seen: HashSet::new(),
            order: Vec::new(),
            admitted: 0,
            duplicates: 0,
        }
    }

    pub fn mode(&self) -> DedupMode {
        self.mode
    }

    /// Record a word; true on its first occurrence
    pub fn insert(&mut self, word: &str) -> bool {
        match self.mode {
            DedupMode::Untracked => {}
            DedupMode::Streaming => {
                if self.seen.contains(word) {
                    self.duplicates += 1;
                    return false;
                }
                self.seen.insert(word.to_string());
            }
            DedupMode::Ordered => {
                if self.seen.contains(word) {
                    self.duplicates += 1;
                    return false;
                }
                self.seen.insert(word.to_string());
                self.order.push(word.to_string());
            }
        }
        self.admitted += 1;
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.seen.contains(word)
    }

    /// Distinct words admitted so far
    pub fn len(&self) -> u64 {
        self.admitted
    }

    pub fn is_empty(&self) -> bool {
        self.admitted == 0
    }

    /// Rejected repeats so far
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// First-seen words in order; empty unless the mode is `Ordered`
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl Default for OrderedDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<String> for OrderedDeduplicator {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut dedup = Self::new();
        for word in iter {
            dedup.insert(&word);
        }
        dedup
    }
}

/// Drop repeats from a sequence, keeping first occurrences in order
pub fn dedup_ordered<I>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    words.into_iter().collect::<OrderedDeduplicator>().into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_occurrence_order() {
        let out = dedup_ordered(words(&["b", "a", "b", "c", "a"]));
        assert_eq!(out, words(&["b", "a", "c"]));
    }

    #[test]
    fn test_idempotent() {
        let input = words(&["x", "y", "x", "z", "y", "x"]);
        let once = dedup_ordered(input.clone());
        let again = dedup_ordered(input);
        assert_eq!(once, again);
        assert_eq!(dedup_ordered(once.clone()), once);
    }

    #[test]
    fn test_counts() {
        let mut dedup = OrderedDeduplicator::new();
        assert!(dedup.insert("a"));
        assert!(!dedup.insert("a"));
        assert!(dedup.insert("b"));
        assert_eq!(dedup.len(), 2);
        assert_eq!(dedup.duplicates(), 1);
        assert_eq!(dedup.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_streaming_keeps_no_order() {
        let mut dedup = OrderedDeduplicator::streaming();
        assert!(dedup.insert("a"));
        assert!(!dedup.insert("a"));
        assert!(dedup.contains("a"));
        assert_eq!(dedup.iter().count(), 0);
    }

    #[test]
    fn test_untracked_admits_everything() {
        let mut dedup = OrderedDeduplicator::with_mode(DedupMode::Untracked);
        assert!(dedup.insert("a"));
        assert!(dedup.insert("a"));
        assert_eq!(dedup.len(), 2);
        assert_eq!(dedup.duplicates(), 0);
    }
}
