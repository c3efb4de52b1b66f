use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Infer column schemas from sampled CSV files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sample each configured table and write the inferred schemas as JSON
    Infer(InferArgs),
    /// Check a table configuration file without reading any data
    Validate(ValidateArgs),
    /// Write the rows sampled for one table as CSV
    Sample(SampleArgs),
}

#[derive(Debug, Args)]
pub struct InferArgs {
    /// Table configuration file (YAML or JSON list of table specs)
    #[arg(short, long)]
    pub config: PathBuf,
    /// Root directory that search prefixes and patterns are resolved against
    #[arg(short, long)]
    pub input: PathBuf,
    /// Only infer the table with this name
    #[arg(short, long)]
    pub table: Option<String>,
    /// Destination JSON file (stdout if omitted or '-')
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Table configuration file to check
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Table configuration file (YAML or JSON list of table specs)
    #[arg(short, long)]
    pub config: PathBuf,
    /// Root directory that search prefixes and patterns are resolved against
    #[arg(short, long)]
    pub input: PathBuf,
    /// Table whose rows should be sampled
    #[arg(short, long)]
    pub table: String,
    /// Destination CSV file (stdout if omitted or '-')
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}
