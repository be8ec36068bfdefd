//! One exporter per output table.
//!
//! Exporters only produce rows; opening files and writing the preamble is
//! the pipeline's job. The two id-assigning exporters hand back the
//! [`IdMap`] the relation exporters resolve against.

use indicatif::ProgressBar;
use std::io::{self, Write};

use crate::exchange::parse_exchange;
use crate::filter::is_valid_word;
use crate::ids::{IdAssigner, IdMap};
use crate::phonetic::PhoneticPair;
use crate::resemble::ResembleGroup;
use crate::roots::RootEntry;
use crate::source::Lexicon;
use crate::sql::{BatchWriter, LiteralContext, SqlValue, Table};

pub static WORD_DICTIONARY: Table = Table {
    name: "word_dictionary",
    columns: &[
        "id",
        "word",
        "phonetic_uk",
        "phonetic_us",
        "translation_en",
        "translation_zh",
        "pos_ratio",
        "collins",
        "audio",
    ],
    context: LiteralContext::Sql,
    file_name: "insert_word_dictionary.sql",
    title: "word dictionary",
};

pub static PHRASE_DICTIONARY: Table = Table {
    name: "phrase_dictionary",
    columns: &["phrase", "translation_en", "translation_zh", "audio"],
    context: LiteralContext::Sql,
    file_name: "insert_phrase_dictionary.sql",
    title: "phrase dictionary",
};

pub static WORD_LEMMA: Table = Table {
    name: "word_lemma",
    columns: &["word_id", "pos", "word"],
    context: LiteralContext::Sql,
    file_name: "insert_word_lemma.sql",
    title: "word inflections",
};

pub static WORD_RESEMBLE: Table = Table {
    name: "word_resemble",
    columns: &["words", "word_id", "content"],
    context: LiteralContext::Sql,
    file_name: "insert_word_resemble.sql",
    title: "synonym groups",
};

pub static WORD_ROOTS: Table = Table {
    name: "word_roots",
    columns: &[
        "`root`",
        "`class`",
        "`origin`",
        "meaning_en",
        "meaning_zh",
        "function_en",
        "function_zh",
    ],
    context: LiteralContext::JsonField,
    file_name: "insert_word_roots.sql",
    title: "word roots and affixes",
};

pub static WORD_ROOT_EXAMPLE: Table = Table {
    name: "word_root_example",
    columns: &["root_id", "word_id"],
    context: LiteralContext::Sql,
    file_name: "insert_word_root_example.sql",
    title: "word root examples",
};

/// Relation rows written plus references that could not be resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelationCounts {
    pub rows: usize,
    pub unresolved: usize,
}

/// Writes every single-token entry to `word_dictionary`, assigning ids in
/// lexicon order.
pub fn export_words<W: Write>(
    lexicon: &Lexicon,
    writer: &mut BatchWriter<'_, W>,
    progress: &ProgressBar,
) -> io::Result<IdMap> {
    let mut ids = IdAssigner::new();

    for entry in lexicon {
        progress.inc(1);
        if entry.is_phrase() {
            continue;
        }

        let id = ids.assign(&entry.word);
        let phonetic = PhoneticPair::derive(&entry.phonetic);

        writer.push(&[
            SqlValue::from(id),
            SqlValue::from(entry.word.as_str()),
            SqlValue::from(phonetic.uk),
            SqlValue::from(phonetic.us),
            SqlValue::from(entry.definition.as_str()),
            SqlValue::from(entry.translation.as_str()),
            SqlValue::from(entry.pos.as_str()),
            SqlValue::from(entry.collins),
            SqlValue::from(entry.audio.as_str()),
        ])?;
    }

    Ok(ids.finish())
}

/// Writes every multi-token entry to `phrase_dictionary`. Phrases get no id.
pub fn export_phrases<W: Write>(
    lexicon: &Lexicon,
    writer: &mut BatchWriter<'_, W>,
    progress: &ProgressBar,
) -> io::Result<usize> {
    for entry in lexicon {
        progress.inc(1);
        if !entry.is_phrase() {
            continue;
        }

        writer.push(&[
            SqlValue::from(entry.word.as_str()),
            SqlValue::from(entry.definition.as_str()),
            SqlValue::from(entry.translation.as_str()),
            SqlValue::from(entry.audio.as_str()),
        ])?;
    }

    Ok(writer.rows())
}

/// Expands the `exchange` column of every word that has an id.
pub fn export_lemmas<W: Write>(
    lexicon: &Lexicon,
    words: &IdMap,
    writer: &mut BatchWriter<'_, W>,
    progress: &ProgressBar,
) -> io::Result<usize> {
    for entry in lexicon {
        progress.inc(1);
        let Some(word_id) = words.get(&entry.word) else {
            continue;
        };

        for inflection in parse_exchange(&entry.exchange) {
            if !is_valid_word(inflection.word) {
                continue;
            }
            writer.push(&[
                SqlValue::from(word_id),
                SqlValue::from(inflection.code),
                SqlValue::from(inflection.word),
            ])?;
        }
    }

    Ok(writer.rows())
}

/// Fans every synonym group out into one row per known member word. Each row
/// repeats the whole header and body.
pub fn export_resembles<W: Write>(
    groups: &[ResembleGroup],
    words: &IdMap,
    writer: &mut BatchWriter<'_, W>,
    progress: &ProgressBar,
) -> io::Result<RelationCounts> {
    let mut counts = RelationCounts::default();

    for group in groups {
        progress.inc(1);
        for member in group.members() {
            if member.chars().count() <= 1 || !is_valid_word(member) {
                continue;
            }
            let Some(word_id) = words.get(member) else {
                counts.unresolved += 1;
                continue;
            };

            writer.push(&[
                SqlValue::from(group.header.as_str()),
                SqlValue::from(word_id),
                SqlValue::from(group.body.as_str()),
            ])?;
        }
    }

    counts.rows = writer.rows();
    Ok(counts)
}

/// Writes every accepted root to `word_roots`, assigning ids in document
/// order. The Chinese meaning and function columns are left empty.
pub fn export_roots<W: Write>(
    roots: &[RootEntry],
    writer: &mut BatchWriter<'_, W>,
    progress: &ProgressBar,
) -> io::Result<IdMap> {
    let mut ids = IdAssigner::new();

    for root in roots {
        progress.inc(1);
        ids.assign(&root.root);

        writer.push(&[
            SqlValue::from(root.root.as_str()),
            root.class.clone(),
            root.origin.clone(),
            root.meaning.clone(),
            SqlValue::text(""),
            root.function.clone(),
            SqlValue::text(""),
        ])?;
    }

    Ok(ids.finish())
}

/// Links roots to the example words that exist in `word_dictionary`.
/// Repeated examples produce repeated rows.
pub fn export_root_examples<W: Write>(
    roots: &[RootEntry],
    root_ids: &IdMap,
    words: &IdMap,
    writer: &mut BatchWriter<'_, W>,
    progress: &ProgressBar,
) -> io::Result<RelationCounts> {
    let mut counts = RelationCounts::default();

    for root in roots {
        progress.inc(1);
        let Some(root_id) = root_ids.get(&root.root) else {
            continue;
        };

        for example in &root.examples {
            if !is_valid_word(example) {
                continue;
            }
            let Some(word_id) = words.get(example) else {
                counts.unresolved += 1;
                continue;
            };

            writer.push(&[SqlValue::from(root_id), SqlValue::from(word_id)])?;
        }
    }

    counts.rows = writer.rows();
    Ok(counts)
}
