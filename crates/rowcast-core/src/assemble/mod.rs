//! Result assembly.
//!
//! Each function drives one cursor across every row and collects the decoded
//! rows in one output shape. The column list is read once, any selection is
//! validated once before the first row, and row order is cursor order. After
//! the loop, a deferred cursor error is surfaced instead of a short result.

use tracing::debug;

use rowcast_common::error::RowcastResult;

use crate::cursor::Cursor;
use crate::decode::{BytesMap, RowDecoder, StringMap, ValueMap};

/// Rows together with the effective column list they were emitted under.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderedRows {
    /// Emitted column names, in emission order.
    pub columns: Vec<String>,
    /// One map per row, keys in emission order.
    pub rows: Vec<StringMap>,
}

impl OrderedRows {
    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Advances through all rows, decoding each with `decode`.
fn drain<C, T, F>(cursor: &mut C, decoder: &mut RowDecoder, mut decode: F) -> RowcastResult<Vec<T>>
where
    C: Cursor + ?Sized,
    F: FnMut(&mut RowDecoder, &mut C) -> RowcastResult<T>,
{
    let mut rows = Vec::new();
    while cursor.advance() {
        rows.push(decode(&mut *decoder, &mut *cursor)?);
    }
    if let Some(e) = cursor.take_error() {
        return Err(e);
    }
    debug!(rows = rows.len(), "Materialized result set");
    Ok(rows)
}

fn decoder_for<C: Cursor + ?Sized>(cursor: &mut C, selection: &[usize]) -> RowcastResult<RowDecoder> {
    let columns = cursor.columns()?;
    RowDecoder::with_selection(columns, selection)
}

/// Collects every row as column name to text.
pub fn rows_to_string_maps<C: Cursor + ?Sized>(cursor: &mut C) -> RowcastResult<Vec<StringMap>> {
    let mut decoder = decoder_for(cursor, &[])?;
    drain(cursor, &mut decoder, RowDecoder::decode_string_map)
}

/// Collects every row as text values in natural column order.
pub fn rows_to_string_slices<C: Cursor + ?Sized>(
    cursor: &mut C,
) -> RowcastResult<Vec<Vec<String>>> {
    let mut decoder = decoder_for(cursor, &[])?;
    drain(cursor, &mut decoder, RowDecoder::decode_strings)
}

/// Collects every row as column name to driver value.
pub fn rows_to_value_maps<C: Cursor + ?Sized>(cursor: &mut C) -> RowcastResult<Vec<ValueMap>> {
    let mut decoder = decoder_for(cursor, &[])?;
    drain(cursor, &mut decoder, RowDecoder::decode_values)
}

/// Collects every row as column name to bytes.
pub fn rows_to_byte_maps<C: Cursor + ?Sized>(cursor: &mut C) -> RowcastResult<Vec<BytesMap>> {
    let mut decoder = decoder_for(cursor, &[])?;
    drain(cursor, &mut decoder, RowDecoder::decode_bytes)
}

/// Collects every row as column name to text, restricted and reordered by
/// `selection`.
///
/// # Errors
///
/// An out-of-range selection index fails before any row is read.
pub fn rows_to_ordered_maps<C: Cursor + ?Sized>(
    cursor: &mut C,
    selection: &[usize],
) -> RowcastResult<OrderedRows> {
    let mut decoder = decoder_for(cursor, selection)?;
    let columns = decoder.effective_columns();
    let rows = drain(cursor, &mut decoder, RowDecoder::decode_string_map)?;
    Ok(OrderedRows { columns, rows })
}
