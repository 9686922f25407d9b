//! Fixed data tables shared by every generator
//!
//! Changing any entry changes the generated output.

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &str = "0123456789";
pub const SPECIAL: &str = "!@#$%^&*()_+-={}:<>?,./";

/// Leet substitutions, applied in this order.
///
/// Sources are pairwise distinct, so the order never changes the result,
/// but it is part of the table and kept stable.
pub const LEET_MAP: &[(char, char)] = &[
    ('e', '3'),
    ('a', '4'),
    ('i', '1'),
    ('o', '0'),
    ('s', '5'),
    ('t', '7'),
    ('l', '1'),
];

/// Numeric affixes, in emission order
pub const NUMBER_SUFFIXES: &[&str] = &["1", "2", "3", "123", "2023", "2024"];

/// Special-character affixes, in emission order
pub const SPECIAL_SUFFIXES: &[&str] = &["!", "@", "#", "$", "!@#"];
