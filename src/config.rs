//! Run configuration: paths, database name and per-table batch sizes.
//!
//! Command-line flags take precedence over the optional YAML file, which
//! takes precedence over the defaults below.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{ExportError, Result};

lazy_static! {
    // Same shape the import script's `USE` rewrite matches.
    static ref DATABASE_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Rows per `INSERT` statement, per table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchSizes {
    pub word_dictionary: usize,
    pub phrase_dictionary: usize,
    pub word_lemma: usize,
    pub word_resemble: usize,
    pub word_roots: usize,
    pub word_root_example: usize,
}

impl Default for BatchSizes {
    fn default() -> Self {
        Self {
            word_dictionary: 1000,
            phrase_dictionary: 1000,
            word_lemma: 1000,
            word_resemble: 500,
            word_roots: 100,
            word_root_example: 500,
        }
    }
}

impl BatchSizes {
    /// Rejects zero, which would make a batch never fill.
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("word_dictionary", self.word_dictionary),
            ("phrase_dictionary", self.phrase_dictionary),
            ("word_lemma", self.word_lemma),
            ("word_resemble", self.word_resemble),
            ("word_roots", self.word_roots),
            ("word_root_example", self.word_root_example),
        ];
        match sizes.iter().find(|(_, size)| *size == 0) {
            Some((table, _)) => Err(ExportError::InvalidConfig(format!(
                "batch size for {} must be at least 1",
                table
            ))),
            None => Ok(()),
        }
    }
}

/// Contents of the `--config` YAML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database: Option<String>,
    #[serde(default)]
    pub batch_sizes: BatchSizes,
}

/// Everything the pipeline needs for one run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Primary word list, `.csv` or `.csv.bz2`.
    pub stardict: PathBuf,
    /// Synonym-group corpus.
    pub resemble: PathBuf,
    /// Word-root JSON corpus.
    pub roots: PathBuf,
    pub output_dir: PathBuf,
    pub database: String,
    pub batch_sizes: BatchSizes,
    pub write_script: bool,
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let mut file = File::open(path).map_err(|e| ExportError::io(path, e))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| ExportError::io(path, e))?;

    Ok(serde_yaml::from_str(&contents)?)
}

/// Checks that `name` can be used verbatim in `USE <name>;`.
pub fn validate_database_name(name: &str) -> Result<String> {
    let name = name.trim();
    if DATABASE_NAME.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(ExportError::InvalidConfig(format!(
            "database name {:?} must match [A-Za-z_][A-Za-z0-9_]*",
            name
        )))
    }
}

/// Asks for a database name until a valid one is entered. Blank lines ask
/// again silently, invalid names with a hint.
pub fn prompt_database_name(mut input: impl BufRead, mut output: impl Write) -> Result<String> {
    loop {
        write!(output, "Database name: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(ExportError::InvalidConfig("no database name given".to_string()));
        }

        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        match validate_database_name(name) {
            Ok(name) => return Ok(name),
            Err(e) => writeln!(output, "{}", e)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_batch_sizes() {
        let sizes = BatchSizes::default();
        assert_eq!(sizes.word_dictionary, 1000);
        assert_eq!(sizes.word_resemble, 500);
        assert_eq!(sizes.word_roots, 100);
    }

    #[test]
    fn yaml_overrides_some_sizes() {
        let config: FileConfig = serde_yaml::from_str(
            "database: ecdict\nbatch_sizes:\n  word_roots: 10\n  word_lemma: 2000\n",
        )
        .unwrap();
        assert_eq!(config.database.as_deref(), Some("ecdict"));
        assert_eq!(config.batch_sizes.word_roots, 10);
        assert_eq!(config.batch_sizes.word_lemma, 2000);
        assert_eq!(config.batch_sizes.word_dictionary, 1000);
    }

    #[test]
    fn zero_batch_size_fails_validation() {
        assert!(BatchSizes::default().validate().is_ok());
        let sizes = BatchSizes {
            word_resemble: 0,
            ..BatchSizes::default()
        };
        let err = sizes.validate().unwrap_err();
        assert!(err.to_string().contains("word_resemble"));
    }

    #[test]
    fn yaml_rejects_unknown_tables() {
        let result: std::result::Result<FileConfig, _> =
            serde_yaml::from_str("batch_sizes:\n  word_typo: 10\n");
        assert!(result.is_err());
    }

    #[test]
    fn example_file_matches_defaults() {
        let config: FileConfig = serde_yaml::from_str(include_str!("../export.example.yaml")).unwrap();
        assert_eq!(config.database.as_deref(), Some("ecdict"));
        assert_eq!(config.batch_sizes, BatchSizes::default());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.yaml");
        std::fs::write(&path, "database: dict_db\n").unwrap();
        let config = load_file_config(&path).unwrap();
        assert_eq!(config.database.as_deref(), Some("dict_db"));
        assert_eq!(config.batch_sizes, BatchSizes::default());
    }

    #[test]
    fn database_names() {
        assert_eq!(validate_database_name(" ecdict ").unwrap(), "ecdict");
        assert!(validate_database_name("_db2").is_ok());
        assert!(validate_database_name("2db").is_err());
        assert!(validate_database_name("my-db").is_err());
        assert!(validate_database_name("db; DROP").is_err());
        assert!(validate_database_name("").is_err());
    }

    #[test]
    fn prompt_skips_blank_lines() {
        let mut shown = Vec::new();
        let name = prompt_database_name("\n  \necdict\n".as_bytes(), &mut shown).unwrap();
        assert_eq!(name, "ecdict");
        assert_eq!(String::from_utf8(shown).unwrap().matches("Database name: ").count(), 3);
    }

    #[test]
    fn prompt_asks_again_after_invalid_name() {
        let mut shown = Vec::new();
        let name = prompt_database_name("my-db\n2db\nmy_db\n".as_bytes(), &mut shown).unwrap();
        assert_eq!(name, "my_db");

        let shown = String::from_utf8(shown).unwrap();
        assert_eq!(shown.matches("Database name: ").count(), 3);
        assert!(shown.contains("\"my-db\""));
    }

    #[test]
    fn prompt_gives_up_at_eof_after_invalid_name() {
        assert!(prompt_database_name("my-db\n".as_bytes(), std::io::sink()).is_err());
    }

    #[test]
    fn prompt_gives_up_at_eof() {
        assert!(prompt_database_name("\n".as_bytes(), std::io::sink()).is_err());
    }
}
