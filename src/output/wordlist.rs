//! Word list ingestion, persistence and maintenance

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::dedup::OrderedDeduplicator;
use crate::error::{ForgeError, Result};

/// Ordered sequence of base words.
///
/// Duplicates are allowed. Every word is non-empty and free of line
/// separators, so it survives a round trip through the one-word-per-line
/// format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Wrap already tokenized words, trimming each and dropping blanks
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Vec::new();
        for word in words {
            let word = word.as_ref();
            if word.contains('\n') || word.contains('\r') {
                return Err(ForgeError::invalid_parameter(
                    "words",
                    format!("Word contains a line separator: {:?}", word),
                ));
            }
            let word = word.trim();
            if !word.is_empty() {
                list.push(word.to_string());
            }
        }
        Ok(Self { words: list })
    }

    /// Parse comma-separated typed input
    pub fn parse_typed(text: &str) -> Result<Self> {
        Self::new(text.split(','))
    }

    /// Parse line-separated input; `\n`, `\r\n` and a lone `\r` all end a line
    pub fn parse_lines(text: &str) -> Self {
        Self {
            words: split_lines(text),
        }
    }

    /// Load a newline-delimited file.
    ///
    /// Decoding is best effort: bytes that are not valid UTF-8 are dropped.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| ForgeError::io(e.to_string(), Some(path.display().to_string())))?;
        let text = decode_lossy(&bytes);
        let list = Self::parse_lines(&text);
        tracing::debug!(path = %path.display(), words = list.len(), "Loaded word list");
        Ok(list)
    }

    /// Reject an empty list before any generation starts
    pub fn require_non_empty(&self, parameter: &str) -> Result<()> {
        if self.words.is_empty() {
            return Err(ForgeError::invalid_parameter(parameter, "Word list is empty"));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.words
    }
}

impl From<WordList> for Vec<String> {
    fn from(list: WordList) -> Self {
        list.words
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// UTF-8 decode that skips malformed byte sequences instead of replacing them
fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Write words one per line, flushing every `flush_interval` lines
pub fn save_wordlist<S: AsRef<str>>(path: &Path, words: &[S], flush_interval: u64) -> Result<u64> {
    let map_err = |e: std::io::Error| ForgeError::io(e.to_string(), Some(path.display().to_string()));

    let file = File::create(path).map_err(map_err)?;
    let mut writer = BufWriter::new(file);
    let interval = flush_interval.max(1);
    let mut written = 0u64;

    for word in words {
        writeln!(writer, "{}", word.as_ref()).map_err(map_err)?;
        written += 1;
        if written % interval == 0 {
            writer.flush().map_err(map_err)?;
        }
    }
    writer.flush().map_err(map_err)?;

    tracing::info!(path = %path.display(), written, "Saved word list");
    Ok(written)
}

/// Drop repeated words keeping first occurrences; returns the removed count
pub fn remove_duplicates(words: Vec<String>) -> (Vec<String>, u64) {
    let dedup: OrderedDeduplicator = words.into_iter().collect();
    let removed = dedup.duplicates();
    (dedup.into_vec(), removed)
}

/// Sort by character length, then case-insensitively
pub fn sort_by_length(words: &mut [String]) {
    words.sort_by_cached_key(|w| (w.chars().count(), w.to_lowercase()));
}

/// Summary statistics over a word list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordListStats {
    pub total: u64,
    pub unique: u64,
    pub duplicates: u64,
    pub min_length: usize,
    pub max_length: usize,
    pub avg_length: f64,
    pub with_uppercase: u64,
    pub with_lowercase: u64,
    pub with_digits: u64,
    pub with_special: u64,
}

impl WordListStats {
    /// Compute statistics; `None` for an empty list
    pub fn compute<S: AsRef<str>>(words: &[S]) -> Option<Self> {
        if words.is_empty() {
            return None;
        }

        let mut dedup = OrderedDeduplicator::streaming();
        let mut stats = Self {
            total: words.len() as u64,
            unique: 0,
            duplicates: 0,
            min_length: usize::MAX,
            max_length: 0,
            avg_length: 0.0,
            with_uppercase: 0,
            with_lowercase: 0,
            with_digits: 0,
            with_special: 0,
        };
        let mut total_length = 0u64;

        for word in words {
            let word = word.as_ref();
            dedup.insert(word);

            let length = word.chars().count();
            stats.min_length = stats.min_length.min(length);
            stats.max_length = stats.max_length.max(length);
            total_length += length as u64;

            if word.chars().any(char::is_uppercase) {
                stats.with_uppercase += 1;
            }
            if word.chars().any(char::is_lowercase) {
                stats.with_lowercase += 1;
            }
            if word.chars().any(|c| c.is_ascii_digit()) {
                stats.with_digits += 1;
            }
            if word.chars().any(|c| !c.is_alphanumeric()) {
                stats.with_special += 1;
            }
        }

        stats.unique = dedup.len();
        stats.duplicates = dedup.duplicates();
        stats.avg_length = total_length as f64 / stats.total as f64;
        Some(stats)
    }

    /// Share of words in a category, in percent
    pub fn percent(&self, count: u64) -> f64 {
        (count as f64 / self.total as f64) * 100.0
    }
}

impl std::fmt::Display for WordListStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total words:      {}", self.total)?;
        writeln!(f, "Unique words:     {}", self.unique)?;
        writeln!(f, "Duplicates:       {}", self.duplicates)?;
        writeln!(f)?;
        writeln!(f, "Minimum length:   {}", self.min_length)?;
        writeln!(f, "Maximum length:   {}", self.max_length)?;
        writeln!(f, "Average length:   {:.1}", self.avg_length)?;
        writeln!(f)?;
        for (label, count) in [
            ("uppercase", self.with_uppercase),
            ("lowercase", self.with_lowercase),
            ("digits", self.with_digits),
            ("special", self.with_special),
        ] {
            writeln!(f, "Contains {:<10} {} ({:.1}%)", label, count, self.percent(count))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_trims() {
        let list = WordList::parse_typed(" alpha, beta ,,gamma ").unwrap();
        assert_eq!(list.words(), ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_embedded_newline_rejected() {
        let err = WordList::new(["ok", "bad\nword"]).unwrap_err();
        assert!(matches!(err, ForgeError::Validation { parameter: Some(ref p), .. } if p == "words"));
        assert!(WordList::parse_typed("a,b\r,c").is_err());
    }

    #[test]
    fn test_parse_lines_drops_blanks() {
        let list = WordList::parse_lines("one\r\n\n  two  \n\n");
        assert_eq!(list.words(), ["one", "two"]);
    }

    #[test]
    fn test_load_skips_malformed_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, b"pass\xffword\n\nsecret\n").unwrap();
        let list = WordList::load(&path).unwrap();
        assert_eq!(list.words(), ["password", "secret"]);
    }

    #[test]
    fn test_load_keeps_replacement_character() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        let mut bytes = "a\u{FFFD}b\n".as_bytes().to_vec();
        bytes.push(0xff);
        std::fs::write(&path, bytes).unwrap();
        assert_eq!(WordList::load(&path).unwrap().words(), ["a\u{FFFD}b"]);
    }

    #[test]
    fn test_load_cr_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mac.txt");
        std::fs::write(&path, b"alpha\rbeta\rgamma\r").unwrap();
        let list = WordList::load(&path).unwrap();
        assert_eq!(list.words(), ["alpha", "beta", "gamma"]);

        let copy = dir.path().join("copy.txt");
        save_wordlist(&copy, list.words(), 10).unwrap();
        assert_eq!(std::fs::read_to_string(&copy).unwrap(), "alpha\nbeta\ngamma\n");
    }

    #[test]
    fn test_require_non_empty() {
        let list = WordList::parse_lines("\r\n \n");
        let err = list.require_non_empty("words").unwrap_err();
        assert_eq!(err, ForgeError::invalid_parameter("words", "Word list is empty"));
        assert!(WordList::parse_lines("x").require_non_empty("words").is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let written = save_wordlist(&path, &["a", "b", "c"], 2).unwrap();
        assert_eq!(written, 3);
        assert_eq!(WordList::load(&path).unwrap().words(), ["a", "b", "c"]);
    }

    #[test]
    fn test_remove_duplicates() {
        let words = vec!["x".to_string(), "y".to_string(), "x".to_string()];
        let (unique, removed) = remove_duplicates(words);
        assert_eq!(unique, ["x", "y"]);
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_sort_by_length() {
        let mut words: Vec<String> = ["bb", "A", "c", "Ab", "aa"].iter().map(|s| s.to_string()).collect();
        sort_by_length(&mut words);
        assert_eq!(words, ["A", "c", "aa", "Ab", "bb"]);
    }

    #[test]
    fn test_stats() {
        let stats = WordListStats::compute(&["Pass1", "pass", "pass", "p@ss"]).unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.unique, 3);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.min_length, 4);
        assert_eq!(stats.max_length, 5);
        assert_eq!(stats.with_uppercase, 1);
        assert_eq!(stats.with_digits, 1);
        assert_eq!(stats.with_special, 1);
        assert_eq!(stats.percent(stats.with_lowercase), 100.0);
        assert!(WordListStats::compute::<&str>(&[]).is_none());
    }
}
