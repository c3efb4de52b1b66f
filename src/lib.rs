pub mod cli;
pub mod config;
pub mod convert;
pub mod counts;
pub mod datatype;
pub mod io_utils;
pub mod pick;
pub mod sample;
pub mod schema;

use std::{collections::BTreeMap, env, io::Write, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    config::TableSpec,
    schema::Schema,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_schema_infer", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Infer(args) => handle_infer(&args),
        Commands::Validate(args) => handle_validate(&args),
        Commands::Sample(args) => handle_sample(&args),
    }
}

fn handle_infer(args: &cli::InferArgs) -> Result<()> {
    let specs = config::load_table_specs(&args.config)
        .with_context(|| format!("Loading table config {:?}", args.config))?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let selected: Vec<&TableSpec> = match &args.table {
        Some(name) => vec![find_table(&specs, name)?],
        None => specs.iter().collect(),
    };

    let mut schemas: BTreeMap<&str, Schema> = BTreeMap::new();
    for spec in selected {
        info!(
            "Inferring schema for table '{}' from {:?}",
            spec.table_name, args.input
        );
        let schema = sample::sampled_schema(&args.input, spec, encoding)
            .with_context(|| format!("Inferring schema for table '{}'", spec.table_name))?;
        info!(
            "Table '{}': {} column(s) inferred",
            spec.table_name,
            schema.len()
        );
        schemas.insert(spec.table_name.as_str(), schema);
    }

    let mut output = io_utils::open_output(args.output.as_deref())?;
    serde_json::to_writer_pretty(&mut output, &schemas).context("Writing schema JSON")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn handle_validate(args: &cli::ValidateArgs) -> Result<()> {
    let specs = config::load_table_specs(&args.config)
        .with_context(|| format!("Validating table config {:?}", args.config))?;
    for spec in &specs {
        debug!(
            "Table '{}': pattern '{}', {} override(s)",
            spec.table_name,
            spec.search_pattern,
            spec.schema_overrides().len()
        );
    }
    info!(
        "Table config {:?} is valid ({} table(s))",
        args.config,
        specs.len()
    );
    Ok(())
}

fn handle_sample(args: &cli::SampleArgs) -> Result<()> {
    let specs = config::load_table_specs(&args.config)
        .with_context(|| format!("Loading table config {:?}", args.config))?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let spec = find_table(&specs, &args.table)?;

    let rows = sample::sample_files(&args.input, spec, encoding)
        .with_context(|| format!("Sampling table '{}'", spec.table_name))?;
    let bytes = io_utils::rows_to_csv_bytes(&rows)?;

    let mut output = io_utils::open_output(args.output.as_deref())?;
    output.write_all(&bytes)?;
    if !bytes.is_empty() {
        writeln!(output)?;
    }
    output.flush()?;
    info!(
        "Wrote {} sampled row(s) for table '{}'",
        rows.len(),
        spec.table_name
    );
    Ok(())
}

fn find_table<'a>(specs: &'a [TableSpec], name: &str) -> Result<&'a TableSpec> {
    specs
        .iter()
        .find(|spec| spec.table_name == name)
        .ok_or_else(|| anyhow!("Table '{name}' is not defined in the table config"))
}
