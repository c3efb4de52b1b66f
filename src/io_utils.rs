//! I/O helpers for delimited text.
//!
//! - **Encoding**: input bytes are decoded per field via `encoding_rs`,
//!   defaulting to UTF-8.
//! - **Readers**: headers on, flexible row widths, configurable delimiter.
//! - **Output**: the `-` path (or none) routes to stdout.
//! - **Serialization**: [`rows_to_csv_bytes()`] renders sampled rows back into
//!   an in-memory delimited buffer.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::Terminator;
use encoding_rs::{Encoding, UTF_8};

use crate::counts::Row;

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    Ok(open_csv_reader(BufReader::new(file), delimiter))
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_dash(p) => Ok(Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        ))),
        _ => Ok(Box::new(std::io::stdout())),
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

/// Renders `rows` as comma-delimited UTF-8 text.
///
/// The header is the sorted union of every row's keys. Cells a row lacks, or
/// holds as `None`, are written empty. Trailing line terminators are stripped.
pub fn rows_to_csv_bytes(rows: &[Row]) -> Result<Vec<u8>> {
    let header: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    if header.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());
    writer
        .write_record(&header)
        .context("Writing CSV header")?;
    for row in rows {
        let record = header
            .iter()
            .map(|column| row.get(*column).and_then(Option::as_deref).unwrap_or(""));
        writer.write_record(record).context("Writing CSV row")?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV buffer: {}", err.error()))?;
    let text = String::from_utf8(buffer).context("CSV buffer is not UTF-8")?;
    Ok(text.trim_end_matches(['\r', '\n']).as_bytes().to_vec())
}
