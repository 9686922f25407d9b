//! Generation requests and their pre-flight checks

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::generate::{BruteForceEnumerator, CharacterSet, SizeEstimator};
use crate::output::dedup_ordered;
use crate::types::{EstimationResult, JobArea, RuleSet};

/// Inputs of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationRequest {
    /// Every string of `length` over the selected character sets
    BruteForce { sets: Vec<CharacterSet>, length: usize },
    /// Rule variants of each word
    Rules { words: Vec<String>, rules: RuleSet },
    /// Rule variants of every ordered permutation of the words
    Permutations {
        words: Vec<String>,
        rules: RuleSet,
        combine_words: bool,
    },
    /// Rule variants of every ordered pair drawn from two lists
    Pairwise {
        left: Vec<String>,
        right: Vec<String>,
        rules: RuleSet,
        both_orders: bool,
    },
}

impl GenerationRequest {
    pub fn area(&self) -> JobArea {
        match self {
            GenerationRequest::BruteForce { .. } => JobArea::BruteForce,
            GenerationRequest::Rules { .. } => JobArea::Rules,
            GenerationRequest::Permutations { .. } | GenerationRequest::Pairwise { .. } => JobArea::Combiner,
        }
    }

    /// Reject bad parameters before any generation starts
    pub fn validate(&self) -> Result<()> {
        match self {
            GenerationRequest::BruteForce { sets, length } => {
                BruteForceEnumerator::validate_length(*length)?;
                CharacterSet::compose(sets)?;
            }
            GenerationRequest::Rules { words, rules } => {
                check_words("words", words)?;
                if !rules.any() {
                    return Err(ForgeError::invalid_parameter("rules", "Select at least one rule"));
                }
            }
            GenerationRequest::Permutations { words, .. } => {
                check_words("words", words)?;
            }
            GenerationRequest::Pairwise { left, right, .. } => {
                check_words("left", left)?;
                check_words("right", right)?;
            }
        }
        Ok(())
    }

    /// Pre-flight size and time estimate
    pub fn estimate(&self) -> Result<EstimationResult> {
        self.validate()?;
        let estimate = match self {
            GenerationRequest::BruteForce { sets, length } => SizeEstimator::brute_force(sets, *length)?,
            GenerationRequest::Rules { words, rules } => SizeEstimator::rules(words.len(), rules),
            GenerationRequest::Permutations {
                words,
                rules,
                combine_words,
            } => {
                let distinct = dedup_ordered(words.iter().cloned()).len();
                let rules = rules.any().then_some(rules);
                SizeEstimator::permutations(distinct, rules, *combine_words)
            }
            GenerationRequest::Pairwise {
                left,
                right,
                rules,
                both_orders,
            } => SizeEstimator::pairwise(left.len(), right.len(), rules, *both_orders),
        };
        Ok(estimate)
    }
}

/// Non-empty list of non-empty words without line separators
fn check_words(parameter: &str, words: &[String]) -> Result<()> {
    if words.is_empty() {
        return Err(ForgeError::invalid_parameter(parameter, "Word list is empty"));
    }
    for word in words {
        if word.is_empty() {
            return Err(ForgeError::invalid_parameter(parameter, "Word list contains an empty word"));
        }
        if word.contains('\n') || word.contains('\r') {
            return Err(ForgeError::invalid_parameter(
                parameter,
                format!("Word contains a line separator: {:?}", word),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rule;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_areas() {
        let request = GenerationRequest::Pairwise {
            left: words(&["a"]),
            right: words(&["b"]),
            rules: RuleSet::none(),
            both_orders: false,
        };
        assert_eq!(request.area(), JobArea::Combiner);
    }

    #[test]
    fn test_validation() {
        let bad_length = GenerationRequest::BruteForce {
            sets: vec![CharacterSet::Numbers],
            length: 11,
        };
        assert!(matches!(bad_length.validate(), Err(ForgeError::Validation { .. })));

        let no_sets = GenerationRequest::BruteForce { sets: vec![], length: 3 };
        assert!(no_sets.validate().is_err());

        let no_rules = GenerationRequest::Rules {
            words: words(&["a"]),
            rules: RuleSet::none(),
        };
        assert!(no_rules.validate().is_err());

        let empty_right = GenerationRequest::Pairwise {
            left: words(&["a"]),
            right: vec![],
            rules: RuleSet::none(),
            both_orders: false,
        };
        let err = empty_right.validate().unwrap_err();
        assert_eq!(err, ForgeError::invalid_parameter("right", "Word list is empty"));

        let newline = GenerationRequest::Permutations {
            words: words(&["a\nb"]),
            rules: RuleSet::none(),
            combine_words: false,
        };
        assert!(newline.validate().is_err());
    }

    #[test]
    fn test_permutation_estimate_uses_distinct_words() {
        let request = GenerationRequest::Permutations {
            words: words(&["a", "b", "c", "a"]),
            rules: RuleSet::none(),
            combine_words: false,
        };
        assert_eq!(request.estimate().unwrap().count, 15);
    }

    #[test]
    fn test_rules_estimate() {
        let request = GenerationRequest::Rules {
            words: words(&["hi"]),
            rules: RuleSet::none().with(Rule::AppendNumbers),
        };
        assert_eq!(request.estimate().unwrap().count, 7);
    }
}
