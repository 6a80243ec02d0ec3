mod dataset;
mod scripts;

use crate::scenario;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sql-stress-gen")]
#[command(version)]
#[command(
    about = "Generate deterministic SQL stress-test scripts with expected-result oracles",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the per-table dataset files replayed by every scenario
    Dataset {
        /// Schema description file (JSON)
        #[arg(short, long, default_value = "schema.json")]
        schema: PathBuf,

        /// Output directory for dataset files
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Rows per dataset
        #[arg(short, long, default_value_t = scenario::DATASET_ROWS)]
        rows: u64,

        /// Random seed for reproducibility
        #[arg(long, default_value_t = 12345)]
        seed: u64,

        /// Show progress during generation
        #[arg(short, long)]
        progress: bool,
    },

    /// Generate script/oracle file pairs from previously written datasets
    Scripts {
        /// Schema description file (JSON)
        #[arg(short, long, default_value = "schema.json")]
        schema: PathBuf,

        /// Directory holding the dataset files
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Output directory for .sql script files
        #[arg(long, default_value = "scripts")]
        script_dir: PathBuf,

        /// Output directory for .out oracle files
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Random seed for reproducibility (must match the dataset seed for
        /// a fully reproducible suite)
        #[arg(long, default_value_t = 12345)]
        seed: u64,

        /// Show progress during generation
        #[arg(short, long)]
        progress: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Dataset {
            schema,
            data_dir,
            rows,
            seed,
            progress,
        } => dataset::run(schema, data_dir, rows, seed, progress),
        Commands::Scripts {
            schema,
            data_dir,
            script_dir,
            output_dir,
            seed,
            progress,
        } => scripts::run(schema, data_dir, script_dir, output_dir, seed, progress),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sql-stress-gen", &mut io::stdout());
            Ok(())
        }
    }
}
