//! Multi-word combination: ordered permutations and pairwise list products

use super::estimate::SizeEstimator;
use super::rules::RuleEngine;
use crate::types::RuleSet;

/// Every ordered r-permutation of `0..n` for r = 1..=n.
///
/// Within one r the index tuples come in lexicographic order, so for n = 3
/// the sequence starts `[0] [1] [2] [0,1] [0,2] [1,0] ...`.
#[derive(Debug, Clone)]
pub struct Permutations {
    n: usize,
    indices: Vec<usize>,
    used: Vec<bool>,
    started: bool,
    done: bool,
}

impl Permutations {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            indices: Vec::with_capacity(n),
            used: vec![false; n],
            started: false,
            done: n == 0,
        }
    }

    /// Number of tuples the iterator yields in total
    pub fn total(&self) -> u128 {
        SizeEstimator::permutation_count(self.n)
    }

    /// Start the first (lexicographically smallest) tuple of length r
    fn reset_to_length(&mut self, r: usize) {
        self.used.iter_mut().for_each(|u| *u = false);
        self.indices.clear();
        for i in 0..r {
            self.indices.push(i);
            self.used[i] = true;
        }
    }

    fn smallest_unused(&self) -> usize {
        let mut candidate = 0;
        while self.used[candidate] {
            candidate += 1;
        }
        candidate
    }

    /// Step to the next tuple of the same length; false when none is left
    fn advance(&mut self) -> bool {
        let r = self.indices.len();
        let mut i = r;
        while i > 0 {
            i -= 1;
            let current = self.indices[i];
            self.used[current] = false;

            if let Some(next) = (current + 1..self.n).find(|&x| !self.used[x]) {
                self.indices[i] = next;
                self.used[next] = true;
                for j in i + 1..r {
                    let fill = self.smallest_unused();
                    self.indices[j] = fill;
                    self.used[fill] = true;
                }
                return true;
            }
        }
        false
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            self.reset_to_length(1);
            return Some(self.indices.clone());
        }

        if self.advance() {
            return Some(self.indices.clone());
        }

        let r = self.indices.len() + 1;
        if r > self.n {
            self.done = true;
            return None;
        }
        self.reset_to_length(r);
        Some(self.indices.clone())
    }
}

/// Permutation mode: every ordered permutation of the words is one base.
///
/// One permutation is one unit of work.
#[derive(Debug, Clone)]
pub struct PermutationCombiner {
    words: Vec<String>,
    engine: RuleEngine,
    combine_words: bool,
    permutations: Permutations,
    current_index: u128,
    total: u128,
}

impl PermutationCombiner {
    /// `words` are expected to be distinct; the job layer deduplicates them.
    pub fn new(words: Vec<String>, rules: RuleSet, combine_words: bool) -> Self {
        let permutations = Permutations::new(words.len());
        let total = permutations.total();
        Self {
            words,
            engine: RuleEngine::new(rules),
            combine_words,
            permutations,
            current_index: 0,
            total,
        }
    }

    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn current_index(&self) -> u128 {
        self.current_index
    }

    /// Produce the raw candidates of the next permutation; false once exhausted
    pub fn next_unit(&mut self, out: &mut Vec<String>) -> bool {
        let Some(indices) = self.permutations.next() else {
            return false;
        };

        let base: String = indices.iter().map(|&i| self.words[i].as_str()).collect();
        self.engine.apply_into(&base, out);

        if self.combine_words {
            for other in &self.words {
                if *other != base {
                    out.push(format!("{}{}", base, other));
                    out.push(format!("{}{}", other, base));
                }
            }
        }

        self.current_index += 1;
        true
    }
}

/// Pairwise mode: every ordered pair of two lists is one base.
///
/// One pair is one unit of work.
#[derive(Debug, Clone)]
pub struct PairwiseCombiner {
    left: Vec<String>,
    right: Vec<String>,
    engine: RuleEngine,
    both_orders: bool,
    left_index: usize,
    right_index: usize,
    current_index: u128,
    total: u128,
}

impl PairwiseCombiner {
    pub fn new(left: Vec<String>, right: Vec<String>, rules: RuleSet, both_orders: bool) -> Self {
        let total = (left.len() as u128) * (right.len() as u128);
        Self {
            left,
            right,
            engine: RuleEngine::new(rules),
            both_orders,
            left_index: 0,
            right_index: 0,
            current_index: 0,
            total,
        }
    }

    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn current_index(&self) -> u128 {
        self.current_index
    }

    /// Produce the raw candidates of the next pair; false once exhausted
    pub fn next_unit(&mut self, out: &mut Vec<String>) -> bool {
        if self.current_index >= self.total {
            return false;
        }

        let a = &self.left[self.left_index];
        let b = &self.right[self.right_index];
        self.engine.apply_combined_into(&format!("{}{}", a, b), out);
        if self.both_orders {
            self.engine.apply_combined_into(&format!("{}{}", b, a), out);
        }

        self.right_index += 1;
        if self.right_index == self.right.len() {
            self.right_index = 0;
            self.left_index += 1;
        }
        self.current_index += 1;
        true
    }
}
