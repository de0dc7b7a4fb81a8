//! Output formatting for materialized rows.
//!
//! Supports table, JSON, CSV, and raw output formats.

use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::{json, Value as JsonValue};

use rowcast_common::types::ScalarValue;
use rowcast_core::convert::convert;
use rowcast_core::export::{DelimitedWriter, TabularSink};
use rowcast_core::{BytesMap, OrderedRows, StringMap, ValueMap};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output.
    Table,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
    /// Raw output (values separated by tabs).
    Raw,
}

impl OutputFormat {
    /// Parses a configured format name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            "raw" => Some(OutputFormat::Raw),
            _ => None,
        }
    }
}

/// One output cell, kept in the shape the row mode produced.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    /// Converted text.
    Text(String),
    /// Unconverted driver value.
    Value(ScalarValue),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl OutputCell {
    fn display(&self) -> String {
        match self {
            OutputCell::Text(s) => s.clone(),
            OutputCell::Value(ScalarValue::Null) => "NULL".to_string(),
            OutputCell::Value(v) => convert(v).unwrap_or_else(|_| format!("<{}>", v.kind_name())),
            OutputCell::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            OutputCell::Text(s) => json!(s),
            OutputCell::Value(v) => value_to_json(v),
            OutputCell::Bytes(b) => json!(String::from_utf8_lossy(b)),
        }
    }
}

/// Materialized rows ready for printing.
///
/// Map rows hold one entry per distinct column name, so the map
/// constructors collapse repeated names in the header the same way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Output {
    /// Column names.
    pub columns: Vec<String>,
    /// Cells per row, aligned with `columns`.
    pub rows: Vec<Vec<OutputCell>>,
}

impl Output {
    /// Builds output from string-map rows.
    pub fn from_string_maps(columns: Vec<String>, rows: Vec<StringMap>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_values().map(OutputCell::Text).collect())
            .collect();
        Self {
            columns: distinct(columns),
            rows,
        }
    }

    /// Builds output from string-slice rows.
    pub fn from_slices(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(OutputCell::Text).collect())
            .collect();
        Self { columns, rows }
    }

    /// Builds output from value-map rows.
    pub fn from_value_maps(columns: Vec<String>, rows: Vec<ValueMap>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_values().map(OutputCell::Value).collect())
            .collect();
        Self {
            columns: distinct(columns),
            rows,
        }
    }

    /// Builds output from byte-map rows.
    pub fn from_byte_maps(columns: Vec<String>, rows: Vec<BytesMap>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_values().map(OutputCell::Bytes).collect())
            .collect();
        Self {
            columns: distinct(columns),
            rows,
        }
    }

    /// Builds output from reordered rows.
    pub fn from_ordered(result: OrderedRows) -> Self {
        Self::from_string_maps(result.columns, result.rows)
    }
}

/// Drops repeated names, keeping each at its first position.
fn distinct(columns: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        if !seen.contains(&column) {
            seen.push(column);
        }
    }
    seen
}

/// Formats output according to the specified format.
pub fn format_output(output: &Output, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_table(output),
        OutputFormat::Json => format_json(output),
        OutputFormat::Csv => format_csv(output),
        OutputFormat::Raw => format_raw(output),
    }
}

/// Formats the output as a table.
fn format_table(output: &Output) -> String {
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    if !output.columns.is_empty() {
        table.set_header(output.columns.iter().map(Cell::new));
    }
    for row in &output.rows {
        table.add_row(row.iter().map(|c| Cell::new(c.display())));
    }

    format!("{table}\n({} rows)", output.rows.len())
}

/// Formats the output as a JSON array of objects.
fn format_json(output: &Output) -> String {
    let rows: Vec<JsonValue> = output
        .rows
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            for (i, cell) in row.iter().enumerate() {
                let name = output
                    .columns
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("column_{i}"));
                obj.insert(name, cell.to_json());
            }
            JsonValue::Object(obj)
        })
        .collect();

    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}

/// Converts a driver value to JSON, keeping numbers and booleans native.
fn value_to_json(value: &ScalarValue) -> JsonValue {
    match value {
        ScalarValue::Null => JsonValue::Null,
        ScalarValue::Bool(b) => json!(*b),
        ScalarValue::Int8(_)
        | ScalarValue::Int16(_)
        | ScalarValue::Int32(_)
        | ScalarValue::Int64(_)
        | ScalarValue::UInt8(_)
        | ScalarValue::UInt16(_)
        | ScalarValue::UInt32(_) => json!(value.as_i64()),
        ScalarValue::UInt64(u) => json!(*u),
        ScalarValue::Float64(f) if f.is_finite() => json!(*f),
        ScalarValue::Float32(f) if f.is_finite() => json!(f64::from(*f)),
        other => match convert(other) {
            Ok(text) => json!(text),
            Err(_) => json!(format!("<{}>", other.kind_name())),
        },
    }
}

/// Formats the output as CSV.
fn format_csv(output: &Output) -> String {
    let mut writer = DelimitedWriter::new(Vec::new());
    let mut write = || -> std::io::Result<()> {
        writer.write_record(&output.columns)?;
        for row in &output.rows {
            let record: Vec<String> = row.iter().map(OutputCell::display).collect();
            writer.write_record(&record)?;
        }
        writer.flush()
    };
    if let Err(e) = write() {
        return format!("error: {e}");
    }
    match writer.into_inner() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => format!("error: {e}"),
    }
}

/// Formats the output as raw tab-separated values.
fn format_raw(output: &Output) -> String {
    let mut text = String::new();
    if !output.columns.is_empty() {
        text.push_str(&output.columns.join("\t"));
        text.push('\n');
    }
    for row in &output.rows {
        let values: Vec<String> = row.iter().map(OutputCell::display).collect();
        text.push_str(&values.join("\t"));
        text.push('\n');
    }
    text
}
