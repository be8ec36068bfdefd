//! Generation of `import_all_data.sh`, the shell script that loads the
//! exported files into MySQL.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ExportError, Result};
use crate::export::{
    PHRASE_DICTIONARY, WORD_DICTIONARY, WORD_LEMMA, WORD_RESEMBLE, WORD_ROOTS, WORD_ROOT_EXAMPLE,
};
use crate::sql::Table;

pub const SCRIPT_FILE: &str = "import_all_data.sh";
pub const SCHEMA_FILE: &str = "create_final_schema.sql";

/// Import order. Referenced tables come before the tables that reference them.
static IMPORT_ORDER: [&Table; 6] = [
    &WORD_DICTIONARY,
    &PHRASE_DICTIONARY,
    &WORD_ROOTS,
    &WORD_LEMMA,
    &WORD_RESEMBLE,
    &WORD_ROOT_EXAMPLE,
];

const SCRIPT_HEAD: &str = r#"#!/bin/bash
# Imports the exported dictionary tables into MySQL.

echo "Importing dictionary data..."

DB_NAME="{DB_NAME}"
isReplaceDBName=false

read -p "Current database: $DB_NAME, enter a new name (or press Enter to keep it): " db_name
if [ -n "$db_name" ]; then
    DB_NAME="$db_name"
    isReplaceDBName=true
fi
echo "Database: $DB_NAME"

while true; do
    read -s -p "MySQL password: " password
    echo
    if [ -n "$password" ]; then
        break
    fi
done

if ! command -v mysql &> /dev/null; then
    echo "Error: mysql command not found"
    exit 1
fi

process_file() {
    if [ "$isReplaceDBName" = false ]; then
        return
    fi

    local filename="$1"

    if [[ ! -f "$filename" ]]; then
        echo "Error: file '$filename' does not exist"
        return 1
    fi

    echo "Rewriting database name in $filename"
    if [[ "$OSTYPE" == "darwin"* ]]; then
        sed -i '' -E "s/^USE [a-zA-Z_][a-zA-Z0-9_]*;/USE $DB_NAME;/" "$filename"
    else
        sed -i -E "s/^USE [a-zA-Z_][a-zA-Z0-9_]*;/USE $DB_NAME;/" "$filename"
    fi
}

echo
echo "1. Creating schema..."
process_file "{SCHEMA_FILE}"
if ! mysql -u root -p"$password" < {SCHEMA_FILE}; then
    echo "Error: failed to create schema"
    exit 1
fi
"#;

/// Renders the script for `database`.
pub fn render_import_script(database: &str) -> String {
    let mut script = SCRIPT_HEAD
        .replace("{DB_NAME}", database)
        .replace("{SCHEMA_FILE}", SCHEMA_FILE);

    for (step, table) in IMPORT_ORDER.iter().enumerate() {
        script.push_str(&format!(
            "\necho\necho \"{n}. Importing {label}...\"\nprocess_file \"{file}\"\n\
             if ! mysql -u root -p\"$password\" < {file}; then\n    \
             echo \"Error: failed to import {label}\"\n    exit 1\nfi\n",
            n = step + 2,
            label = table.title,
            file = table.file_name,
        ));
    }

    let counts: Vec<String> = IMPORT_ORDER
        .iter()
        .map(|table| format!("SELECT '{0}' AS table_name, COUNT(*) AS count FROM {0}", table.name))
        .collect();

    script.push_str("\necho\necho \"Import finished.\"\necho \"Row counts:\"\n");
    script.push_str("mysql -u root -p\"$password\" -e \"\nUSE $DB_NAME;\n");
    script.push_str(&counts.join("\nUNION ALL\n"));
    script.push_str(";\n\"\n");
    script
}

/// Writes the script into `output_dir` and marks it executable.
pub fn write_import_script(output_dir: &Path, database: &str) -> Result<PathBuf> {
    let path = output_dir.join(SCRIPT_FILE);
    fs::write(&path, render_import_script(database)).map_err(|e| ExportError::io(&path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .map_err(|e| ExportError::io(&path, e))?;
    }

    Ok(path)
}
