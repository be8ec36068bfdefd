use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod exchange;
mod export;
mod filter;
mod ids;
mod phonetic;
mod pipeline;
mod resemble;
mod roots;
mod script;
mod source;
mod sql;

use config::{load_file_config, prompt_database_name, validate_database_name, ExportConfig, FileConfig};
use pipeline::{ExportSummary, Pipeline};

#[derive(Parser)]
#[command(name = "ecdict-sql-export")]
#[command(about = "Export the ECDICT word list, synonym groups and word roots as MySQL insert scripts")]
struct Args {
    /// Word list (.csv or .csv.bz2)
    #[arg(long, default_value = "data/stardict.csv")]
    stardict: PathBuf,

    /// Synonym-group text file
    #[arg(long, default_value = "resemble.txt")]
    resemble: PathBuf,

    /// Word-root JSON file
    #[arg(long, default_value = "wordroot.txt")]
    roots: PathBuf,

    /// Directory the SQL files and import script are written to
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Database name used in `USE` statements (prompted for if absent)
    #[arg(short, long)]
    database: Option<String>,

    /// YAML file with a database name and per-table batch sizes
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not write import_all_data.sh
    #[arg(long)]
    no_script: bool,

    /// Quiet mode - warnings only, no progress bars
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(args: Args) -> anyhow::Result<(ExportConfig, bool)> {
    let file = match &args.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let database = match args.database.or(file.database) {
        Some(name) => name,
        None => prompt_database_name(io::stdin().lock(), io::stdout())?,
    };

    let config = ExportConfig {
        stardict: args.stardict,
        resemble: args.resemble,
        roots: args.roots,
        output_dir: args.output,
        database: validate_database_name(&database)?,
        batch_sizes: file.batch_sizes,
        write_script: !args.no_script,
    };
    Ok((config, args.quiet))
}

fn print_stats(summary: &ExportSummary, config: &ExportConfig) {
    println!();
    println!("============================================================");
    println!("Database: {}", config.database);
    println!("Words: {}", summary.words);
    println!("Phrases: {}", summary.phrases);
    println!("Inflections: {}", summary.lemmas);
    println!("Synonym rows: {}", summary.resembles);
    println!("Roots: {}", summary.roots);
    println!("Root examples: {}", summary.root_examples);
    println!("Total rows: {}", summary.total_rows());
    println!("------------------------------------------------------------");
    println!("Unknown synonym members: {}", summary.unresolved_members);
    println!("Unknown root examples: {}", summary.unresolved_examples);
    println!("------------------------------------------------------------");
    println!("Files:");
    for path in &summary.files {
        println!("  {}", path.display());
    }
    if let Some(script) = &summary.script {
        println!("  {}", script.display());
        println!();
        println!("Run the import: cd {} && ./{}", config.output_dir.display(), script::SCRIPT_FILE);
    }
    println!("Time: {:.1}s", summary.elapsed.as_secs_f64());
    println!("============================================================");
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);

    let (config, quiet) = resolve_config(args)?;
    if !quiet {
        println!("Word list: {}", config.stardict.display());
        println!("Synonyms: {}", config.resemble.display());
        println!("Roots: {}", config.roots.display());
        println!("Output: {}", config.output_dir.display());
        println!();
    }

    let summary = Pipeline::new(&config, quiet).run()?;

    if !quiet {
        print_stats(&summary, &config);
    }

    Ok(())
}
