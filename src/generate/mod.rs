//! Candidate generation - brute-force enumeration, rule mutation and word combination
//!
//! Every generator here is synchronous and pull-based; the job layer drives
//! them unit by unit so it can report progress and honor cancellation.

mod brute;
mod combiner;
mod estimate;
mod rules;
pub mod tables;

pub use brute::BruteForceEnumerator;
pub use combiner::{PairwiseCombiner, PermutationCombiner, Permutations};
pub use estimate::SizeEstimator;
pub use rules::{apply_rules, leet, RuleApplication, RuleEngine};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

/// Named character class for brute-force generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterSet {
    Uppercase,
    Lowercase,
    Numbers,
    Special,
}

impl CharacterSet {
    /// Canonical composition order
    pub const ALL: [CharacterSet; 4] = [
        CharacterSet::Uppercase,
        CharacterSet::Lowercase,
        CharacterSet::Numbers,
        CharacterSet::Special,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CharacterSet::Uppercase => "uppercase",
            CharacterSet::Lowercase => "lowercase",
            CharacterSet::Numbers => "numbers",
            CharacterSet::Special => "special",
        }
    }

    pub fn alphabet(&self) -> &'static str {
        match self {
            CharacterSet::Uppercase => tables::UPPERCASE,
            CharacterSet::Lowercase => tables::LOWERCASE,
            CharacterSet::Numbers => tables::NUMBERS,
            CharacterSet::Special => tables::SPECIAL,
        }
    }

    /// Concatenate the selected sets in canonical order.
    ///
    /// Selection order and repeats are ignored, so `[Numbers, Uppercase,
    /// Numbers]` composes to `A..Z0..9`.
    pub fn compose(selected: &[CharacterSet]) -> Result<Vec<char>> {
        let alphabet: Vec<char> = Self::ALL
            .iter()
            .filter(|set| selected.contains(set))
            .flat_map(|set| set.alphabet().chars())
            .collect();

        if alphabet.is_empty() {
            return Err(ForgeError::invalid_parameter(
                "charset",
                "Select at least one character set",
            ));
        }
        Ok(alphabet)
    }

    /// Size of the brute-force space for the selection
    pub fn total_combinations(selected: &[CharacterSet], length: usize) -> Result<u128> {
        let alphabet = Self::compose(selected)?;
        Ok((alphabet.len() as u128).saturating_pow(length as u32))
    }
}

impl std::fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CharacterSet {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "uppercase" | "upper" => Ok(CharacterSet::Uppercase),
            "lowercase" | "lower" => Ok(CharacterSet::Lowercase),
            "numbers" | "digits" => Ok(CharacterSet::Numbers),
            "special" | "special_characters" => Ok(CharacterSet::Special),
            other => Err(ForgeError::invalid_parameter(
                "charset",
                format!("Unknown character set: {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_uses_canonical_order() {
        let alphabet = CharacterSet::compose(&[CharacterSet::Numbers, CharacterSet::Uppercase]).unwrap();
        assert_eq!(alphabet.len(), 36);
        assert_eq!(alphabet[0], 'A');
        assert_eq!(alphabet[26], '0');
    }

    #[test]
    fn test_compose_ignores_repeats() {
        let alphabet = CharacterSet::compose(&[CharacterSet::Numbers, CharacterSet::Numbers]).unwrap();
        assert_eq!(alphabet.len(), 10);
    }

    #[test]
    fn test_empty_selection_rejected() {
        assert!(matches!(
            CharacterSet::compose(&[]),
            Err(ForgeError::Validation { .. })
        ));
    }

    #[test]
    fn test_total_combinations() {
        let total = CharacterSet::total_combinations(&[CharacterSet::Lowercase], 4).unwrap();
        assert_eq!(total, 26_u128.pow(4)); // 456,976
        let all = CharacterSet::total_combinations(&CharacterSet::ALL, 10).unwrap();
        assert_eq!(all, 85_u128.pow(10));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Upper".parse::<CharacterSet>().unwrap(), CharacterSet::Uppercase);
        assert_eq!("special_characters".parse::<CharacterSet>().unwrap(), CharacterSet::Special);
        assert!("emoji".parse::<CharacterSet>().is_err());
    }
}
