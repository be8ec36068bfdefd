//! Loading the primary word list (`stardict.csv`).

use bzip2::read::MultiBzDecoder;
use indicatif::ProgressBar;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ExportError, Result};
use crate::filter::is_valid_word;

/// One row of the word list, after filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub phonetic: String,
    pub definition: String,
    pub translation: String,
    /// Part-of-speech ratio string such as `n:60/v:40`.
    pub pos: String,
    pub collins: i64,
    /// Raw inflection string such as `p:loved/3:loves`.
    pub exchange: String,
    pub audio: String,
}

impl WordEntry {
    /// Single tokens become words with an id; anything with whitespace is a
    /// phrase.
    pub fn is_phrase(&self) -> bool {
        self.word.contains(char::is_whitespace)
    }
}

// Columns we read; everything else in the file (oxford, tag, bnc, ...) is ignored.
#[derive(Debug, Deserialize)]
struct StardictRow {
    #[serde(default)]
    word: String,
    #[serde(default)]
    phonetic: String,
    #[serde(default)]
    definition: String,
    #[serde(default)]
    translation: String,
    #[serde(default)]
    pos: String,
    #[serde(default)]
    collins: String,
    #[serde(default)]
    exchange: String,
    #[serde(default)]
    audio: String,
}

impl StardictRow {
    fn into_entry(self, word: String) -> WordEntry {
        WordEntry {
            word,
            phonetic: self.phonetic,
            definition: self.definition,
            translation: self.translation,
            pos: self.pos,
            collins: self.collins.trim().parse().unwrap_or(0),
            exchange: self.exchange,
            audio: self.audio,
        }
    }
}

/// The word list in file order.
///
/// Ids are assigned by walking `entries` front to back, so this is a plain
/// sequence rather than a map. A word listed twice keeps the slot of its
/// first row and the fields of its last.
#[derive(Debug, Default)]
pub struct Lexicon {
    entries: Vec<WordEntry>,
}

impl Lexicon {
    /// Opens `path` (plain or `.bz2`) and reads it with [`Lexicon::from_reader`].
    /// Compressed files may hold several concatenated streams, as parallel
    /// compressors write them.
    pub fn load(path: &Path, progress: &ProgressBar) -> Result<Self> {
        let file = File::open(path).map_err(|e| ExportError::io(path, e))?;
        let reader: Box<dyn Read> = if path.to_string_lossy().ends_with(".bz2") {
            Box::new(BufReader::with_capacity(256 * 1024, MultiBzDecoder::new(file)))
        } else {
            Box::new(BufReader::with_capacity(256 * 1024, file))
        };
        Self::from_reader(reader, progress)
    }

    pub fn from_reader<R: Read>(reader: R, progress: &ProgressBar) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut entries: Vec<WordEntry> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut rows_read = 0usize;

        for row in csv.deserialize::<StardictRow>() {
            let row = row?;
            rows_read += 1;
            if rows_read % 100_000 == 0 {
                progress.set_message(format!("{} rows read, {} kept", rows_read, entries.len()));
                tracing::debug!(rows_read, kept = entries.len(), "loading word list");
            }

            let word = row.word.trim().to_string();
            if !is_valid_word(&word) {
                continue;
            }

            let entry = row.into_entry(word);
            match slots.get(&entry.word) {
                Some(&slot) => entries[slot] = entry,
                None => {
                    slots.insert(entry.word.clone(), entries.len());
                    entries.push(entry);
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<WordEntry>> for Lexicon {
    fn from(entries: Vec<WordEntry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a Lexicon {
    type Item = &'a WordEntry;
    type IntoIter = std::slice::Iter<'a, WordEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
