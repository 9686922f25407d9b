//! Brute-force enumeration over a composed alphabet

use super::CharacterSet;
use crate::error::{ForgeError, Result};

/// Generator for every fixed-length string over an alphabet.
///
/// Order is the standard cartesian product: the rightmost position varies
/// fastest, so alphabet `ab` at length 2 yields `aa`, `ab`, `ba`, `bb`.
#[derive(Debug, Clone)]
pub struct BruteForceEnumerator {
    alphabet: Vec<char>,
    length: usize,
    /// Per-position alphabet indices of the next word
    digits: Vec<usize>,
    current_index: u128,
    total: u128,
}

impl BruteForceEnumerator {
    pub const MIN_LENGTH: usize = 1;
    pub const MAX_LENGTH: usize = 10;

    /// Create a generator for the selected sets and word length
    pub fn new(sets: &[CharacterSet], length: usize) -> Result<Self> {
        Self::validate_length(length)?;
        let alphabet = CharacterSet::compose(sets)?;
        Ok(Self::with_alphabet(alphabet, length))
    }

    pub fn validate_length(length: usize) -> Result<()> {
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            return Err(ForgeError::invalid_parameter(
                "length",
                format!(
                    "Length must be between {} and {}, got {}",
                    Self::MIN_LENGTH,
                    Self::MAX_LENGTH,
                    length
                ),
            ));
        }
        Ok(())
    }

    fn with_alphabet(alphabet: Vec<char>, length: usize) -> Self {
        let total = (alphabet.len() as u128).pow(length as u32);
        Self {
            alphabet,
            length,
            digits: vec![0; length],
            current_index: 0,
            total,
        }
    }

    /// Total number of combinations
    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Index of the next word to be produced
    pub fn current_index(&self) -> u128 {
        self.current_index
    }

    /// Set current index (for resume)
    pub fn set_index(&mut self, index: u128) {
        self.current_index = index.min(self.total);
        if self.current_index < self.total {
            self.digits = self.decompose(self.current_index);
        }
    }

    /// Word at a specific position of the sequence
    pub fn word_at(&self, index: u128) -> Option<String> {
        if index >= self.total {
            return None;
        }
        Some(self.render(&self.decompose(index)))
    }

    fn decompose(&self, index: u128) -> Vec<usize> {
        let base = self.alphabet.len() as u128;
        let mut digits = vec![0; self.length];
        let mut n = index;

        for i in (0..self.length).rev() {
            digits[i] = (n % base) as usize;
            n /= base;
        }
        digits
    }

    fn render(&self, digits: &[usize]) -> String {
        digits.iter().map(|&d| self.alphabet[d]).collect()
    }

    /// Advance the odometer by one, rightmost position first
    fn advance(&mut self) {
        let base = self.alphabet.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }
    }

    /// Generate next batch of words
    pub fn next_batch(&mut self, count: usize) -> Vec<String> {
        self.by_ref().take(count).collect()
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.total
    }

    pub fn remaining(&self) -> u128 {
        self.total.saturating_sub(self.current_index)
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.current_index as f64 / self.total as f64) * 100.0
        }
    }
}

impl Iterator for BruteForceEnumerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }
        let word = self.render(&self.digits);
        self.current_index += 1;
        self.advance();
        Some(word)
    }
}
