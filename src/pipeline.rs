//! Runs the exporters in dependency order.
//!
//! Word ids must exist before lemmas, synonym groups and root examples are
//! written, and root ids before root examples, so the stage order is fixed:
//! words, phrases, roots, lemmas, synonym groups, root examples.
//!
//! Only the word list is essential. If it cannot be read, or the word table
//! cannot be written, the run fails. Every other stage logs its failure and
//! continues with an empty result, so later stages still run and simply emit
//! fewer rows.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::export::{
    export_lemmas, export_phrases, export_resembles, export_root_examples, export_roots,
    export_words, RelationCounts, PHRASE_DICTIONARY, WORD_DICTIONARY, WORD_LEMMA, WORD_RESEMBLE,
    WORD_ROOTS, WORD_ROOT_EXAMPLE,
};
use crate::ids::IdMap;
use crate::resemble::{parse_resemble, ResembleGroup};
use crate::roots::{parse_roots, RootEntry};
use crate::script::write_import_script;
use crate::source::Lexicon;
use crate::sql::{write_preamble, BatchWriter, Table};

/// What a run produced.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub words: usize,
    pub phrases: usize,
    pub lemmas: usize,
    pub resembles: usize,
    pub roots: usize,
    pub root_examples: usize,
    /// Synonym-group members with no matching word.
    pub unresolved_members: usize,
    /// Root examples with no matching word.
    pub unresolved_examples: usize,
    /// SQL files written, in stage order.
    pub files: Vec<PathBuf>,
    pub script: Option<PathBuf>,
    pub elapsed: Duration,
}

impl ExportSummary {
    pub fn total_rows(&self) -> usize {
        self.words + self.phrases + self.lemmas + self.resembles + self.roots + self.root_examples
    }
}

/// Logs a tolerated stage failure and substitutes an empty result.
fn tolerate<T: Default>(stage: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(stage, error = %e, "stage failed, continuing with empty result");
            T::default()
        }
    }
}

fn read_corpus(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ExportError::io(path, e))
}

pub struct Pipeline<'a> {
    config: &'a ExportConfig,
    quiet: bool,
    summary: ExportSummary,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ExportConfig, quiet: bool) -> Self {
        Self {
            config,
            quiet,
            summary: ExportSummary::default(),
        }
    }

    pub fn run(mut self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let config = self.config;
        let sizes = &config.batch_sizes;

        sizes.validate()?;
        fs::create_dir_all(&config.output_dir)
            .map_err(|e| ExportError::io(&config.output_dir, e))?;

        let lexicon = self.load_lexicon()?;
        let total = lexicon.len() as u64;

        let words = self.write_table(&WORD_DICTIONARY, sizes.word_dictionary, total, |w, pb| {
            export_words(&lexicon, w, pb)
        })?;
        self.summary.words = words.len();

        let phrases = self.write_table(&PHRASE_DICTIONARY, sizes.phrase_dictionary, total, |w, pb| {
            export_phrases(&lexicon, w, pb)
        });
        self.summary.phrases = tolerate("phrase_dictionary", phrases);

        let roots: Vec<RootEntry> = tolerate(
            "read roots",
            read_corpus(&config.roots).and_then(|text| parse_roots(&text)),
        );
        let root_ids = self.write_table(&WORD_ROOTS, sizes.word_roots, roots.len() as u64, |w, pb| {
            export_roots(&roots, w, pb)
        });
        let root_ids: IdMap = tolerate("word_roots", root_ids);
        self.summary.roots = root_ids.len();
        if root_ids.is_empty() {
            tracing::debug!("no roots exported, root examples will be empty");
        }

        let lemmas = self.write_table(&WORD_LEMMA, sizes.word_lemma, total, |w, pb| {
            export_lemmas(&lexicon, &words, w, pb)
        });
        self.summary.lemmas = tolerate("word_lemma", lemmas);

        let groups: Vec<ResembleGroup> = tolerate(
            "read synonym groups",
            read_corpus(&config.resemble).map(|text| parse_resemble(&text)),
        );
        let resembles =
            self.write_table(&WORD_RESEMBLE, sizes.word_resemble, groups.len() as u64, |w, pb| {
                export_resembles(&groups, &words, w, pb)
            });
        let RelationCounts { rows, unresolved } = tolerate("word_resemble", resembles);
        self.summary.resembles = rows;
        self.summary.unresolved_members = unresolved;

        let examples = self.write_table(
            &WORD_ROOT_EXAMPLE,
            sizes.word_root_example,
            roots.len() as u64,
            |w, pb| export_root_examples(&roots, &root_ids, &words, w, pb),
        );
        let RelationCounts { rows, unresolved } = tolerate("word_root_example", examples);
        self.summary.root_examples = rows;
        self.summary.unresolved_examples = unresolved;

        if self.summary.unresolved_members > 0 || self.summary.unresolved_examples > 0 {
            tracing::info!(
                members = self.summary.unresolved_members,
                examples = self.summary.unresolved_examples,
                "dropped references to words not in the dictionary"
            );
        }

        if config.write_script {
            let path = write_import_script(&config.output_dir, &config.database)?;
            tracing::info!(path = %path.display(), "import script written");
            self.summary.script = Some(path);
        }

        self.summary.elapsed = start_time.elapsed();
        Ok(self.summary)
    }

    fn load_lexicon(&self) -> Result<Lexicon> {
        let path = &self.config.stardict;
        let pb = self.spinner(format!("Loading {}", path.display()));

        let lexicon = Lexicon::load(path, &pb).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "cannot load word list");
            e
        })?;
        pb.finish_and_clear();

        if lexicon.is_empty() {
            return Err(ExportError::EmptySource(path.clone()));
        }
        tracing::info!(entries = lexicon.len(), "word list loaded");
        Ok(lexicon)
    }

    /// Opens the table's file, writes the preamble, lets `fill` push rows and
    /// flushes the last batch.
    fn write_table<T>(
        &mut self,
        table: &Table,
        batch_size: usize,
        total: u64,
        fill: impl FnOnce(&mut BatchWriter<'_, BufWriter<File>>, &ProgressBar) -> io::Result<T>,
    ) -> Result<T> {
        let path = self.config.output_dir.join(table.file_name);
        let file = File::create(&path).map_err(|e| ExportError::io(&path, e))?;
        let mut out = BufWriter::with_capacity(256 * 1024, file);
        write_preamble(&mut out, table, &self.config.database)
            .map_err(|e| ExportError::io(&path, e))?;

        let mut writer = BatchWriter::new(out, table, batch_size)?;
        let pb = self.bar(total, table.name);
        let value = fill(&mut writer, &pb).map_err(|e| ExportError::io(&path, e))?;
        let stats = writer.finish().map_err(|e| ExportError::io(&path, e))?;
        pb.finish_and_clear();

        tracing::info!(
            table = table.name,
            rows = stats.rows,
            batches = stats.batches,
            "table exported"
        );
        self.summary.files.push(path);
        Ok(value)
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    fn bar(&self, total: u64, name: &'static str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:>18} [{bar:40}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message(name);
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BatchSizes;

    const STARDICT: &str = "\
word,phonetic,definition,translation,pos,collins,oxford,tag,bnc,frq,exchange,detail,audio
happy,ˈhæpi,feeling pleasure,adj. 快乐的,a:100,5,1,,,,r:happier/t:happiest,,
glad,ɡlæd,pleased,adj. 高兴的,a:100,4,1,,,,,,
3d,,three dimensional,,,,,,,,,,
give up,,stop trying,放弃,,,,,,,,,
benefit,ˈbenɪfɪt,an advantage,n. 利益,n:70/v:30,4,1,,,,p:benefited/d:benefited,,
";

    const RESEMBLE: &str = "%happy, glad, cheerful\n都有快乐之意\n- happy: 普通用词\n\n%x\n";

    const ROOTS: &str = r#"{"bene": {"class": "root", "origin": "Latin", "meaning": "good", "function": "",
        "example": ["benefit", "benevolent"]}, "note": "ignored"}"#;

    fn config(dir: &Path, resemble: Option<&str>, roots: Option<&str>) -> ExportConfig {
        fs::write(dir.join("stardict.csv"), STARDICT).unwrap();
        if let Some(text) = resemble {
            fs::write(dir.join("resemble.txt"), text).unwrap();
        }
        if let Some(text) = roots {
            fs::write(dir.join("wordroot.txt"), text).unwrap();
        }
        ExportConfig {
            stardict: dir.join("stardict.csv"),
            resemble: dir.join("resemble.txt"),
            roots: dir.join("wordroot.txt"),
            output_dir: dir.join("out"),
            database: "ecdict".to_string(),
            batch_sizes: BatchSizes::default(),
            write_script: true,
        }
    }

    fn output(config: &ExportConfig, table: &Table) -> String {
        fs::read_to_string(config.output_dir.join(table.file_name)).unwrap()
    }

    #[test]
    fn full_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Some(RESEMBLE), Some(ROOTS));

        let summary = Pipeline::new(&config, true).run().unwrap();
        assert_eq!(summary.words, 3);
        assert_eq!(summary.phrases, 1);
        assert_eq!(summary.lemmas, 4);
        assert_eq!(summary.resembles, 2);
        assert_eq!(summary.unresolved_members, 1);
        assert_eq!(summary.roots, 1);
        assert_eq!(summary.root_examples, 1);
        assert_eq!(summary.unresolved_examples, 1);
        assert_eq!(summary.total_rows(), 12);
        assert_eq!(summary.files.len(), 6);
        assert!(summary.script.as_ref().unwrap().exists());

        let words = output(&config, &WORD_DICTIONARY);
        assert!(words.starts_with("-- word dictionary\nUSE ecdict;\n\nINSERT INTO word_dictionary"));
        assert!(words.contains("(1, \"happy\","));
        assert!(words.contains("(3, \"benefit\","));
        assert!(!words.contains("\"3d\""));

        let phrases = output(&config, &PHRASE_DICTIONARY);
        assert!(phrases.contains("(\"give up\", \"stop trying\", \"放弃\", \"\")"));

        let lemmas = output(&config, &WORD_LEMMA);
        assert!(lemmas.contains("(1, \"r\", \"happier\")"));
        assert!(lemmas.contains("(3, \"d\", \"benefited\")"));

        let resembles = output(&config, &WORD_RESEMBLE);
        assert!(resembles.contains("(\"happy,glad,cheerful\", 1, "));
        assert!(resembles.contains("(\"happy,glad,cheerful\", 2, "));

        let examples = output(&config, &WORD_ROOT_EXAMPLE);
        assert!(examples.contains("(1, 3);"));
    }

    #[test]
    fn missing_corpora_still_produce_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), None, None);

        let summary = Pipeline::new(&config, true).run().unwrap();
        assert_eq!(summary.words, 3);
        assert_eq!(summary.lemmas, 4);
        assert_eq!(summary.resembles, 0);
        assert_eq!(summary.roots, 0);
        assert_eq!(summary.root_examples, 0);
        assert_eq!(summary.files.len(), 6);
        assert_eq!(output(&config, &WORD_ROOTS), "-- word roots and affixes\nUSE ecdict;\n\n");
    }

    #[test]
    fn malformed_roots_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Some(RESEMBLE), Some("[\"not\", \"an object\"]"));

        let summary = Pipeline::new(&config, true).run().unwrap();
        assert_eq!(summary.roots, 0);
        assert_eq!(summary.root_examples, 0);
        assert_eq!(summary.resembles, 2);
    }

    #[test]
    fn missing_word_list_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), None, None);
        config.stardict = dir.path().join("missing.csv");

        assert!(matches!(
            Pipeline::new(&config, true).run(),
            Err(ExportError::Io { .. })
        ));
    }

    #[test]
    fn empty_word_list_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), None, None);
        fs::write(&config.stardict, "word,phonetic\n3d,\n'tis,\n").unwrap();

        assert!(matches!(
            Pipeline::new(&config, true).run(),
            Err(ExportError::EmptySource(_))
        ));
    }

    #[test]
    fn tiny_batches_split_statements() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), None, None);
        config.batch_sizes.word_dictionary = 2;
        config.write_script = false;

        let summary = Pipeline::new(&config, true).run().unwrap();
        assert!(summary.script.is_none());
        assert_eq!(output(&config, &WORD_DICTIONARY).matches("INSERT INTO").count(), 2);
    }
}
