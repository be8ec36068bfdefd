//! Dialect detection and British-to-American IPA rewriting for the
//! `phonetic` column.

use lazy_static::lazy_static;
use regex::Regex;

/// Vowels and diphthongs that only show up in Received Pronunciation.
const BRITISH_FEATURES: [&str; 6] = ["ɒ", "ɑː", "ɪə", "eə", "ʊə", "ɜː"];

/// Rhotic vowels and the open back vowel typical of General American.
const AMERICAN_FEATURES: [&str; 6] = ["ɑ", "ər", "ɔr", "ɪr", "ɛr", "ɝ"];

/// Literal rewrites applied in this exact order. Earlier rules feed later
/// ones (`ɒ` becomes `ɑ` before `ɑː` is looked at).
const UK_TO_US_REWRITES: [(&str, &str); 9] = [
    ("ɒ", "ɑ"),
    ("ɑː", "ɑ"),
    ("ɔː", "ɔ"),
    ("ɪə", "ɪr"),
    ("eə", "ɛr"),
    ("ʊə", "ʊr"),
    ("ɜː", "ɝ"),
    ("uː", "u"),
    ("iː", "i"),
];

lazy_static! {
    // A single trailing newline may follow the schwa and is kept.
    static ref TRAILING_SCHWA: Regex = Regex::new(r"ə(\n?)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    British,
    American,
    Neutral,
}

/// Classifies a transcription by counting which feature set it hits more
/// often. Each feature counts at most once.
pub fn detect_dialect(phonetic: &str) -> Dialect {
    if phonetic.is_empty() {
        return Dialect::Neutral;
    }

    let british = BRITISH_FEATURES.iter().filter(|f| phonetic.contains(*f)).count();
    let american = AMERICAN_FEATURES.iter().filter(|f| phonetic.contains(*f)).count();

    if british > american {
        Dialect::British
    } else if american > british {
        Dialect::American
    } else {
        Dialect::Neutral
    }
}

pub fn british_to_american(uk: &str) -> String {
    if uk.is_empty() {
        return String::new();
    }

    let mut us = uk.to_string();
    for (from, to) in UK_TO_US_REWRITES {
        us = us.replace(from, to);
    }

    TRAILING_SCHWA.replace(&us, "ər${1}").into_owned()
}

/// The two phonetic columns of `word_dictionary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneticPair {
    pub uk: String,
    pub us: String,
}

impl PhoneticPair {
    /// Derives both columns from the single source transcription.
    ///
    /// British and neutral input keep the source as the UK form and transcribe
    /// the US form. American input is stored unchanged in both columns; there
    /// is no reverse rewrite.
    pub fn derive(phonetic: &str) -> Self {
        match detect_dialect(phonetic) {
            Dialect::American => Self {
                uk: phonetic.to_string(),
                us: phonetic.to_string(),
            },
            Dialect::British | Dialect::Neutral => Self {
                uk: phonetic.to_string(),
                us: british_to_american(phonetic),
            },
        }
    }
}
