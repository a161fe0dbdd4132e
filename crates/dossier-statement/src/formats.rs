//! Statement serialization.
//!
//! Three encodings of the same record:
//!
//! | format | shape                                   | notes                              |
//! |--------|-----------------------------------------|------------------------------------|
//! | json   | one JSON object per line                | lossless                           |
//! | csv    | header + 13 columns                     | flushed every `batch_size` rows    |
//! | pack   | header + 10 columns                     | `canonical_id`, `prop_type`, `id` rebuilt on read |

use std::fmt;
use std::io::{BufRead, Read, Write};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use dossier_model::Model;
use serde::{Deserialize, Serialize};

use crate::error::StatementError;
use crate::statement::{Statement, BASE};

pub const CSV_COLUMNS: [&str; 13] = [
    "canonical_id",
    "entity_id",
    "prop",
    "prop_type",
    "schema",
    "value",
    "dataset",
    "lang",
    "original_value",
    "external",
    "first_seen",
    "last_seen",
    "id",
];

pub const PACK_COLUMNS: [&str; 10] = [
    "entity_id",
    "prop",
    "schema",
    "value",
    "dataset",
    "lang",
    "original_value",
    "external",
    "first_seen",
    "last_seen",
];

pub const DEFAULT_BATCH_SIZE: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
    Pack,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Pack => "pack",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = StatementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            "pack" => Ok(Format::Pack),
            other => Err(StatementError::UnknownFormat(other.to_string())),
        }
    }
}

// ============================================================================
// Row shapes
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(default)]
    canonical_id: String,
    entity_id: String,
    prop: String,
    #[serde(default)]
    prop_type: String,
    schema: String,
    value: String,
    dataset: String,
    #[serde(default)]
    lang: String,
    #[serde(default)]
    original_value: String,
    #[serde(default)]
    external: String,
    #[serde(default)]
    first_seen: String,
    #[serde(default)]
    last_seen: String,
    #[serde(default)]
    id: String,
}

impl From<&Statement> for CsvRow {
    fn from(stmt: &Statement) -> Self {
        Self {
            canonical_id: stmt.canonical_id.clone(),
            entity_id: stmt.entity_id.clone(),
            prop: stmt.prop.clone(),
            prop_type: stmt.prop_type.clone(),
            schema: stmt.schema.clone(),
            value: stmt.value.clone(),
            dataset: stmt.dataset.clone(),
            lang: stmt.lang.clone().unwrap_or_default(),
            original_value: stmt.original_value.clone().unwrap_or_default(),
            external: format_bool(stmt.external),
            first_seen: format_ts(stmt.first_seen),
            last_seen: format_ts(stmt.last_seen),
            id: stmt.id.clone(),
        }
    }
}

impl CsvRow {
    fn into_statement(self) -> Result<Statement, StatementError> {
        let mut stmt = Statement {
            id: self.id,
            canonical_id: self.canonical_id,
            entity_id: self.entity_id,
            prop: self.prop,
            prop_type: self.prop_type,
            schema: self.schema,
            value: self.value,
            dataset: self.dataset,
            lang: non_empty(self.lang),
            original_value: non_empty(self.original_value),
            external: parse_bool(&self.external),
            first_seen: parse_ts(&self.first_seen)?,
            last_seen: parse_ts(&self.last_seen)?,
        };
        if stmt.canonical_id.is_empty() {
            stmt.canonical_id = stmt.entity_id.clone();
        }
        if stmt.id.is_empty() {
            stmt.id = stmt.generate_key();
        }
        Ok(stmt)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PackRow {
    entity_id: String,
    prop: String,
    schema: String,
    value: String,
    dataset: String,
    #[serde(default)]
    lang: String,
    #[serde(default)]
    original_value: String,
    #[serde(default)]
    external: String,
    #[serde(default)]
    first_seen: String,
    #[serde(default)]
    last_seen: String,
}

impl From<&Statement> for PackRow {
    fn from(stmt: &Statement) -> Self {
        Self {
            entity_id: stmt.entity_id.clone(),
            prop: stmt.prop.clone(),
            schema: stmt.schema.clone(),
            value: stmt.value.clone(),
            dataset: stmt.dataset.clone(),
            lang: stmt.lang.clone().unwrap_or_default(),
            original_value: stmt.original_value.clone().unwrap_or_default(),
            external: format_bool(stmt.external),
            first_seen: format_ts(stmt.first_seen),
            last_seen: format_ts(stmt.last_seen),
        }
    }
}

impl PackRow {
    /// Rebuild the omitted columns. `None` when the model does not know
    /// `schema:prop`.
    fn into_statement(self, model: &Model) -> Result<Option<Statement>, StatementError> {
        let prop_type = if self.prop == BASE {
            BASE.to_string()
        } else {
            match model.get(&self.schema).and_then(|s| s.get(&self.prop)) {
                Some(prop) => prop.type_().name().to_string(),
                None => {
                    tracing::warn!(schema = %self.schema, prop = %self.prop, "skipped packed statement for unknown property");
                    return Ok(None);
                }
            }
        };
        let stmt = Statement::new(self.entity_id, self.prop, self.schema, self.value, self.dataset)
            .with_prop_type(prop_type)
            .with_lang(non_empty(self.lang).as_deref())
            .with_original_value(non_empty(self.original_value).as_deref())
            .with_external(parse_bool(&self.external))
            .seen(parse_ts(&self.first_seen)?, parse_ts(&self.last_seen)?);
        Ok(Some(stmt))
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn format_bool(value: bool) -> String {
    let flag = if value { "t" } else { "f" };
    flag.to_string()
}

fn parse_bool(text: &str) -> bool {
    matches!(text.trim().to_ascii_lowercase().as_str(), "t" | "true" | "1" | "yes")
}

fn format_ts(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// RFC 3339, or a naive timestamp taken as UTC. Blank means absent.
fn parse_ts(text: &str) -> Result<Option<DateTime<Utc>>, StatementError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(Some(naive.and_utc()));
        }
    }
    Err(StatementError::Timestamp(text.to_string()))
}

// ============================================================================
// JSON lines
// ============================================================================

/// Write one statement per line. Returns the number written.
pub fn write_json<'a, W, I>(mut writer: W, statements: I) -> Result<usize, StatementError>
where
    W: Write,
    I: IntoIterator<Item = &'a Statement>,
{
    let mut count = 0;
    for stmt in statements {
        serde_json::to_writer(&mut writer, stmt)?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Read statements line by line; blank lines are skipped.
pub fn read_json<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Statement, StatementError>> {
    reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(serde_json::from_str(&line).map_err(StatementError::from)),
        Err(err) => Some(Err(err.into())),
    })
}

// ============================================================================
// CSV and pack
// ============================================================================

/// Streaming CSV writer for the full and packed column sets.
///
/// The underlying buffer is flushed every `batch_size` rows, so a writer
/// fed from an unbounded statement stream holds at most one batch.
pub struct CsvStatementWriter<W: Write> {
    writer: csv::Writer<W>,
    format: Format,
    batch_size: usize,
    pending: usize,
    written: usize,
}

impl<W: Write> CsvStatementWriter<W> {
    pub fn new(inner: W, batch_size: usize) -> Result<Self, StatementError> {
        Self::with_format(inner, Format::Csv, batch_size)
    }

    pub fn pack(inner: W, batch_size: usize) -> Result<Self, StatementError> {
        Self::with_format(inner, Format::Pack, batch_size)
    }

    fn with_format(inner: W, format: Format, batch_size: usize) -> Result<Self, StatementError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        match format {
            Format::Pack => writer.write_record(PACK_COLUMNS)?,
            _ => writer.write_record(CSV_COLUMNS)?,
        }
        Ok(Self {
            writer,
            format,
            batch_size: batch_size.max(1),
            pending: 0,
            written: 0,
        })
    }

    pub fn write(&mut self, stmt: &Statement) -> Result<(), StatementError> {
        match self.format {
            Format::Pack => self.writer.serialize(PackRow::from(stmt))?,
            _ => self.writer.serialize(CsvRow::from(stmt))?,
        }
        self.pending += 1;
        self.written += 1;
        if self.pending >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), StatementError> {
        self.writer.flush()?;
        tracing::debug!(rows = self.pending, total = self.written, format = %self.format, "flushed statement batch");
        self.pending = 0;
        Ok(())
    }

    /// The inner writer; rows of an unfinished batch are not in it yet.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Rows written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush what is pending and hand back the inner writer.
    pub fn finish(mut self) -> Result<W, StatementError> {
        self.flush()?;
        self.writer
            .into_inner()
            .map_err(|err| StatementError::Io(err.into_error()))
    }
}

pub fn read_csv<R: Read>(reader: R) -> impl Iterator<Item = Result<Statement, StatementError>> {
    csv::Reader::from_reader(reader)
        .into_deserialize::<CsvRow>()
        .map(|row| row.map_err(StatementError::from).and_then(CsvRow::into_statement))
}

/// Read packed statements, rebuilding `canonical_id`, `prop_type` and `id`.
/// Rows naming a property the model does not know are skipped.
pub fn read_pack<'m, R>(model: &'m Model, reader: R) -> impl Iterator<Item = Result<Statement, StatementError>> + 'm
where
    R: Read + 'm,
{
    csv::Reader::from_reader(reader)
        .into_deserialize::<PackRow>()
        .filter_map(move |row| match row {
            Ok(row) => row.into_statement(model).transpose(),
            Err(err) => Some(Err(err.into())),
        })
}

// ============================================================================
// Format dispatch
// ============================================================================

pub fn read_statements<'m, R>(
    model: &'m Model,
    reader: R,
    format: Format,
) -> Box<dyn Iterator<Item = Result<Statement, StatementError>> + 'm>
where
    R: BufRead + 'm,
{
    match format {
        Format::Json => Box::new(read_json(reader)),
        Format::Csv => Box::new(read_csv(reader)),
        Format::Pack => Box::new(read_pack(model, reader)),
    }
}

/// Write statements in any format. Returns the number written.
pub fn write_statements<'a, W, I>(writer: W, format: Format, statements: I) -> Result<usize, StatementError>
where
    W: Write,
    I: IntoIterator<Item = &'a Statement>,
{
    match format {
        Format::Json => write_json(writer, statements),
        Format::Csv | Format::Pack => {
            let mut out = CsvStatementWriter::with_format(writer, format, DEFAULT_BATCH_SIZE)?;
            for stmt in statements {
                out.write(stmt)?;
            }
            let count = out.written();
            out.finish()?;
            Ok(count)
        }
    }
}
