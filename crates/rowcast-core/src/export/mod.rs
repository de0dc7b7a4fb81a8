//! Streamed tabular export.
//!
//! [`rows_to_sink`] writes a header record and then one record per row to a
//! [`TabularSink`] without buffering the result set. [`DelimitedWriter`] is
//! the CSV/TSV sink over any [`Write`].

use std::io::{self, BufWriter, Write};

use tracing::debug;

use rowcast_common::config::ExportConfig;
use rowcast_common::error::RowcastResult;

use crate::cursor::Cursor;
use crate::decode::RowDecoder;

/// A destination for tabular records.
pub trait TabularSink {
    /// Writes one record.
    fn write_record(&mut self, fields: &[String]) -> io::Result<()>;

    /// Flushes buffered records to the underlying destination.
    fn flush(&mut self) -> io::Result<()>;
}

impl<S: TabularSink + ?Sized> TabularSink for &mut S {
    fn write_record(&mut self, fields: &[String]) -> io::Result<()> {
        (**self).write_record(fields)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Delimited-text sink (CSV by default).
pub struct DelimitedWriter<W: Write> {
    inner: BufWriter<W>,
    config: ExportConfig,
    delimiter: String,
    quote: String,
    escaped_quote: String,
}

impl<W: Write> DelimitedWriter<W> {
    /// Creates a CSV writer.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, ExportConfig::default())
    }

    /// Creates a writer with the given export settings.
    pub fn with_config(writer: W, config: ExportConfig) -> Self {
        Self {
            inner: BufWriter::new(writer),
            delimiter: config.delimiter.to_string(),
            quote: config.quote.to_string(),
            escaped_quote: format!("{0}{0}", config.quote),
            config,
        }
    }

    /// Returns the export settings.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.inner.into_inner().map_err(io::IntoInnerError::into_error)
    }

    fn needs_quotes(&self, value: &str) -> bool {
        self.config.quote_all
            || value.contains(self.config.delimiter)
            || value.contains(self.config.quote)
            || value.contains('\n')
            || value.contains('\r')
    }

    fn escape(&self, value: &str) -> String {
        if self.needs_quotes(value) {
            format!(
                "{q}{}{q}",
                value.replace(&self.quote, &self.escaped_quote),
                q = self.quote
            )
        } else {
            value.to_string()
        }
    }
}

impl<W: Write> TabularSink for DelimitedWriter<W> {
    fn write_record(&mut self, fields: &[String]) -> io::Result<()> {
        let record: Vec<String> = fields.iter().map(|f| self.escape(f)).collect();
        self.inner.write_all(record.join(&self.delimiter).as_bytes())?;
        self.inner
            .write_all(self.config.line_terminator.as_str().as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streams the result set to `sink` and returns the number of data rows.
///
/// The header is the effective column list. A sink failure aborts at once;
/// records already handed to the sink are not withdrawn.
pub fn rows_to_sink<C, S>(cursor: &mut C, sink: &mut S, selection: &[usize]) -> RowcastResult<usize>
where
    C: Cursor + ?Sized,
    S: TabularSink + ?Sized,
{
    let columns = cursor.columns()?;
    let mut decoder = RowDecoder::with_selection(columns, selection)?;
    sink.write_record(&decoder.effective_columns())?;

    let mut count = 0;
    while cursor.advance() {
        let record = decoder.decode_strings(cursor)?;
        sink.write_record(&record)?;
        count += 1;
    }
    if let Some(e) = cursor.take_error() {
        return Err(e);
    }
    sink.flush()?;
    debug!(rows = count, "Exported result set");
    Ok(count)
}
