//! Batched `INSERT` rendering.
//!
//! Every output table goes through [`BatchWriter`]: rows are buffered until a
//! batch is full, then written as one multi-row statement. String columns are
//! quoted through a single escaping function whose behaviour is selected by
//! the table's [`LiteralContext`].

use std::io::Write;

use crate::error::{ExportError, Result};

/// How string literals are escaped for a given table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralContext {
    /// Plain SQL text: escapes `"`, newline, carriage return and tab.
    /// Backslashes pass through untouched.
    Sql,
    /// JSON-sourced text embedded in SQL: escapes `"` only.
    JsonField,
}

/// Quotes `text` as a double-quoted literal for the given context.
pub fn quote_literal(text: &str, context: LiteralContext) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match (ch, context) {
            ('"', _) => out.push_str("\\\""),
            ('\n', LiteralContext::Sql) => out.push_str("\\n"),
            ('\r', LiteralContext::Sql) => out.push_str("\\r"),
            ('\t', LiteralContext::Sql) => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// A single cell of an output row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    /// An already formatted numeric or boolean literal, written bare.
    Bare(String),
    Text(String),
}

impl SqlValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn render(&self, context: LiteralContext) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Bare(s) => s.clone(),
            SqlValue::Text(s) => quote_literal(s, context),
        }
    }
}

impl From<u32> for SqlValue {
    fn from(n: u32) -> Self {
        SqlValue::Int(i64::from(n))
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

/// Static description of an output table.
#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    /// Column list exactly as it appears between the parentheses.
    pub columns: &'static [&'static str],
    pub context: LiteralContext,
    /// Output file name inside the output directory.
    pub file_name: &'static str,
    /// Comment written on the first line of the file.
    pub title: &'static str,
}

impl Table {
    fn insert_prefix(&self) -> String {
        format!("INSERT INTO {} ({}) VALUES\n", self.name, self.columns.join(", "))
    }
}

/// Writes the comment line and `USE` statement every output file starts with.
pub fn write_preamble<W: Write>(out: &mut W, table: &Table, database: &str) -> std::io::Result<()> {
    writeln!(out, "-- {}", table.title)?;
    write!(out, "USE {};\n\n", database)
}

/// Counts reported by [`BatchWriter::finish`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub rows: usize,
    pub batches: usize,
}

/// Buffers rows for one table and writes them as multi-row `INSERT`s.
pub struct BatchWriter<'t, W: Write> {
    out: W,
    table: &'t Table,
    prefix: String,
    batch_size: usize,
    pending: Vec<String>,
    stats: BatchStats,
}

impl<'t, W: Write> BatchWriter<'t, W> {
    pub fn new(out: W, table: &'t Table, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ExportError::InvalidConfig(format!(
                "batch size for {} must be at least 1",
                table.name
            )));
        }

        Ok(Self {
            out,
            table,
            prefix: table.insert_prefix(),
            batch_size,
            pending: Vec::with_capacity(batch_size),
            stats: BatchStats::default(),
        })
    }

    /// Queues one row, writing a statement whenever the batch fills up.
    pub fn push(&mut self, row: &[SqlValue]) -> std::io::Result<()> {
        debug_assert_eq!(row.len(), self.table.columns.len());

        let cells: Vec<String> = row.iter().map(|v| v.render(self.table.context)).collect();
        self.pending.push(format!("({})", cells.join(", ")));
        self.stats.rows += 1;

        if self.pending.len() == self.batch_size {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Rows queued so far, including the ones already written.
    pub fn rows(&self) -> usize {
        self.stats.rows
    }

    fn flush_batch(&mut self) -> std::io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        self.out.write_all(self.prefix.as_bytes())?;
        self.out.write_all(self.pending.join(",\n").as_bytes())?;
        self.out.write_all(b";\n\n")?;
        self.pending.clear();
        self.stats.batches += 1;
        Ok(())
    }

    /// Writes the final partial batch and flushes the sink.
    pub fn finish(mut self) -> std::io::Result<BatchStats> {
        self.flush_batch()?;
        self.out.flush()?;
        Ok(self.stats)
    }
}
