//! Per-word mutation rules (leet speak, case variants, numeric/special affixes)

use super::tables::{LEET_MAP, NUMBER_SUFFIXES, SPECIAL_SUFFIXES};
use crate::output::OrderedDeduplicator;
use crate::types::RuleSet;

/// Lower-case a word, then substitute every leet pair in table order
pub fn leet(word: &str) -> String {
    let mut out = word.to_lowercase();
    for (from, to) in LEET_MAP {
        out = out.replace(*from, &to.to_string());
    }
    out
}

/// First character upper-cased, the rest lower-cased
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Apply rules to a single word, returning unique variants in emission order
pub fn apply_rules(word: &str, rules: &RuleSet) -> Vec<String> {
    RuleEngine::new(*rules).apply(word)
}

/// Rule engine for a fixed rule selection
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine {
    rules: RuleSet,
}

impl RuleEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Unique variants of one word, in first-emission order
    pub fn apply(&self, word: &str) -> Vec<String> {
        let mut raw = Vec::new();
        self.apply_into(word, &mut raw);
        raw.into_iter().collect::<OrderedDeduplicator>().into_vec()
    }

    /// Emit every variant of a word, duplicates included.
    ///
    /// Base variants are the word, then its leet form, then upper, lower and
    /// capitalized forms. Each base variant is emitted followed by its affixed
    /// forms.
    pub fn apply_into(&self, word: &str, out: &mut Vec<String>) {
        let mut variants = vec![word.to_string()];

        if self.rules.leet_speak {
            variants.push(leet(word));
        }

        if self.rules.case_variations {
            variants.push(word.to_uppercase());
            variants.push(word.to_lowercase());
            variants.push(capitalize(word));
        }

        self.expand_affixes(&variants, out);
    }

    /// Emit every variant of a combined base, duplicates included.
    ///
    /// Case forms come first; leet is then applied to every form gathered so
    /// far and only previously unseen leet forms are kept.
    pub fn apply_combined_into(&self, base: &str, out: &mut Vec<String>) {
        let mut variants = vec![base.to_string()];

        if self.rules.case_variations {
            variants.push(base.to_uppercase());
            variants.push(base.to_lowercase());
            variants.push(capitalize(base));
        }

        if self.rules.leet_speak {
            let leet_forms: Vec<String> = variants.iter().map(|v| leet(v)).collect();
            for form in leet_forms {
                if !variants.contains(&form) {
                    variants.push(form);
                }
            }
        }

        self.expand_affixes(&variants, out);
    }

    fn expand_affixes(&self, variants: &[String], out: &mut Vec<String>) {
        for variant in variants {
            out.push(variant.clone());

            if self.rules.append_numbers {
                out.extend(NUMBER_SUFFIXES.iter().map(|n| format!("{}{}", variant, n)));
            }
            if self.rules.prepend_numbers {
                out.extend(NUMBER_SUFFIXES.iter().map(|n| format!("{}{}", n, variant)));
            }
            if self.rules.append_special_characters {
                out.extend(SPECIAL_SUFFIXES.iter().map(|c| format!("{}{}", variant, c)));
            }
            if self.rules.prepend_special_characters {
                out.extend(SPECIAL_SUFFIXES.iter().map(|c| format!("{}{}", c, variant)));
            }
        }
    }
}

/// Rule application over a word list; one word is one unit of work
#[derive(Debug, Clone)]
pub struct RuleApplication {
    engine: RuleEngine,
    words: Vec<String>,
    current_index: usize,
}

impl RuleApplication {
    pub fn new(words: Vec<String>, rules: RuleSet) -> Self {
        Self {
            engine: RuleEngine::new(rules),
            words,
            current_index: 0,
        }
    }

    pub fn total(&self) -> u128 {
        self.words.len() as u128
    }

    pub fn current_index(&self) -> u128 {
        self.current_index as u128
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.words.len()
    }

    /// Produce the raw variants of the next word; false once exhausted
    pub fn next_unit(&mut self, out: &mut Vec<String>) -> bool {
        let Some(word) = self.words.get(self.current_index) else {
            return false;
        };
        self.engine.apply_into(word, out);
        self.current_index += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rule;

    fn rules(list: &[Rule]) -> RuleSet {
        RuleSet::from_rules(list)
    }

    #[test]
    fn test_leet_literal() {
        assert_eq!(leet("pass"), "p455");
        assert_eq!(leet("Elite Tools"), "31173 70015");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hELLO"), "Hello");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("über"), "Über");
    }

    #[test]
    fn test_append_numbers_exact_order() {
        let out = apply_rules("hi", &rules(&[Rule::AppendNumbers]));
        assert_eq!(out, vec!["hi", "hi1", "hi2", "hi3", "hi123", "hi2023", "hi2024"]);
    }

    #[test]
    fn test_no_rules_is_identity() {
        assert_eq!(apply_rules("word", &RuleSet::none()), vec!["word"]);
    }

    #[test]
    fn test_case_variations_deduplicated() {
        let out = apply_rules("Pass", &rules(&[Rule::CaseVariations]));
        // capitalized form equals the input and is dropped
        assert_eq!(out, vec!["Pass", "PASS", "pass"]);
    }

    #[test]
    fn test_leet_then_case_order() {
        let out = apply_rules("Test", &rules(&[Rule::LeetSpeak, Rule::CaseVariations]));
        assert_eq!(out, vec!["Test", "7357", "TEST", "test"]);
    }

    #[test]
    fn test_affix_kind_order() {
        let out = apply_rules(
            "x",
            &rules(&[Rule::PrependSpecialCharacters, Rule::AppendSpecialCharacters]),
        );
        assert_eq!(
            out,
            vec!["x", "x!", "x@", "x#", "x$", "x!@#", "!x", "@x", "#x", "$x", "!@#x"]
        );
    }

    #[test]
    fn test_affixes_apply_to_every_variant() {
        let out = apply_rules("ab", &rules(&[Rule::LeetSpeak, Rule::PrependNumbers]));
        assert_eq!(&out[..7], &["ab", "1ab", "2ab", "3ab", "123ab", "2023ab", "2024ab"]);
        assert_eq!(out[7], "4b");
        assert_eq!(out[8], "14b");
        assert_eq!(out.len(), 14);
    }

    #[test]
    fn test_combined_leet_adds_only_new_forms() {
        let engine = RuleEngine::new(rules(&[Rule::CaseVariations, Rule::LeetSpeak]));
        let mut out = Vec::new();
        engine.apply_combined_into("ax", &mut out);
        assert_eq!(out, vec!["ax", "AX", "ax", "Ax", "4x"]);
    }

    #[test]
    fn test_rule_application_units() {
        let mut app = RuleApplication::new(vec!["a".into(), "b".into()], rules(&[Rule::AppendNumbers]));
        let mut out = Vec::new();
        assert!(app.next_unit(&mut out));
        assert_eq!(out.len(), 7);
        assert!(app.next_unit(&mut out));
        assert!(!app.next_unit(&mut out));
        assert_eq!(app.current_index(), 2);
        assert!(app.is_exhausted());
    }
}
