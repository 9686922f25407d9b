//! Pre-flight size and time estimation

use super::tables::{NUMBER_SUFFIXES, SPECIAL_SUFFIXES};
use super::CharacterSet;
use crate::error::Result;
use crate::types::{EstimationResult, Rule, RuleSet};

/// Combinatorial size estimates for every generation mode.
///
/// Only the brute-force count is exact. The rule-based counts are upper
/// bounds: deduplication can only shrink the actual output.
pub struct SizeEstimator;

impl SizeEstimator {
    /// Sum of P(k, r) for r = 1..=k
    pub fn permutation_count(k: usize) -> u128 {
        let mut sum: u128 = 0;
        let mut term: u128 = 1;
        for r in 1..=k {
            term = term.saturating_mul((k - r + 1) as u128);
            sum = sum.saturating_add(term);
        }
        sum
    }

    /// Growth factor of one rule
    pub fn rule_multiplier(rule: Rule) -> u128 {
        match rule {
            Rule::CaseVariations => 3,
            Rule::LeetSpeak => 2,
            Rule::AppendNumbers | Rule::PrependNumbers => NUMBER_SUFFIXES.len() as u128 + 1,
            Rule::AppendSpecialCharacters | Rule::PrependSpecialCharacters => {
                SPECIAL_SUFFIXES.len() as u128 + 1
            }
        }
    }

    /// Product of the multipliers of every enabled rule
    pub fn rules_multiplier(rules: &RuleSet) -> u128 {
        rules
            .enabled()
            .map(Self::rule_multiplier)
            .fold(1u128, |acc, m| acc.saturating_mul(m))
    }

    /// Exact size of a brute-force run
    pub fn brute_force(sets: &[CharacterSet], length: usize) -> Result<EstimationResult> {
        let total = CharacterSet::total_combinations(sets, length)?;
        Ok(EstimationResult::exact(total))
    }

    /// Upper bound for rule application over `words` base words
    pub fn rules(words: usize, rules: &RuleSet) -> EstimationResult {
        let mut variants: u128 = 1;
        if rules.leet_speak {
            variants += 1;
        }
        if rules.case_variations {
            variants += 3;
        }

        let mut affixes: u128 = 1;
        if rules.append_numbers {
            affixes += NUMBER_SUFFIXES.len() as u128;
        }
        if rules.prepend_numbers {
            affixes += NUMBER_SUFFIXES.len() as u128;
        }
        if rules.append_special_characters {
            affixes += SPECIAL_SUFFIXES.len() as u128;
        }
        if rules.prepend_special_characters {
            affixes += SPECIAL_SUFFIXES.len() as u128;
        }

        let count = (words as u128)
            .saturating_mul(variants)
            .saturating_mul(affixes);
        EstimationResult::upper_bound(count)
    }

    /// Upper bound for permutation mode over `k` distinct words.
    ///
    /// Without rules this is the plain permutation count. With rules it is
    /// scaled by the per-rule multiplier table; `combine_words` adds up to
    /// two raw candidates per base and word.
    pub fn permutations(k: usize, rules: Option<&RuleSet>, combine_words: bool) -> EstimationResult {
        let bases = Self::permutation_count(k);
        let mut count = match rules {
            Some(rules) => bases.saturating_mul(Self::rules_multiplier(rules)),
            None => bases,
        };
        if combine_words {
            count = count.saturating_add(bases.saturating_mul(2 * k as u128));
        }
        EstimationResult::upper_bound(count)
    }

    /// Upper bound for pairwise mode: |A| x |B| x product of rule multipliers
    pub fn pairwise(left: usize, right: usize, rules: &RuleSet, both_orders: bool) -> EstimationResult {
        let pairs = (left as u128).saturating_mul(right as u128);
        let orders = if both_orders { 2 } else { 1 };
        let count = pairs
            .saturating_mul(orders)
            .saturating_mul(Self::rules_multiplier(rules));
        EstimationResult::upper_bound(count)
    }

    /// Flat "x4" permutation heuristic kept for comparison with old reports
    #[deprecated(note = "use SizeEstimator::permutations, which applies the per-rule multiplier table")]
    pub fn flat_permutations(k: usize) -> EstimationResult {
        EstimationResult::upper_bound(Self::permutation_count(k).saturating_mul(4))
    }
}
