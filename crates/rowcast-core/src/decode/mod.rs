//! Row decoding.
//!
//! A [`RowDecoder`] is built once per result set. It owns the column list,
//! the validated column selection, and the scan slots. Each decode call scans
//! the full row and then emits the selected columns in one output shape.

use indexmap::IndexMap;

use rowcast_common::error::{RowcastError, RowcastResult};
use rowcast_common::types::ScalarValue;

use crate::convert::{convert, convert_bytes};
use crate::cursor::Cursor;

/// A decoded row keyed by column name, values as text.
pub type StringMap = IndexMap<String, String>;

/// A decoded row keyed by column name, values as driver values.
pub type ValueMap = IndexMap<String, ScalarValue>;

/// A decoded row keyed by column name, values as bytes.
pub type BytesMap = IndexMap<String, Vec<u8>>;

/// Checks every selection index against the result width.
///
/// # Errors
///
/// Returns [`RowcastError::SelectionIndexOutOfRange`] for the first index
/// that does not address a column.
pub fn validate_selection(selection: &[usize], width: usize) -> RowcastResult<()> {
    match selection.iter().find(|&&index| index >= width) {
        Some(&index) => Err(RowcastError::SelectionIndexOutOfRange { index, width }),
        None => Ok(()),
    }
}

/// Decodes rows of one result set.
#[derive(Debug)]
pub struct RowDecoder {
    columns: Vec<String>,
    /// Column indices to emit, in emission order.
    emit: Vec<usize>,
    slots: Vec<ScalarValue>,
}

impl RowDecoder {
    /// Creates a decoder emitting every column in natural order.
    pub fn new(columns: Vec<String>) -> Self {
        let emit = (0..columns.len()).collect();
        let slots = vec![ScalarValue::Null; columns.len()];
        Self {
            columns,
            emit,
            slots,
        }
    }

    /// Creates a decoder emitting only `selection`, in selection order.
    ///
    /// An empty selection means every column in natural order.
    ///
    /// # Errors
    ///
    /// Fails with [`RowcastError::SelectionIndexOutOfRange`] if any index is
    /// outside the column list.
    pub fn with_selection(columns: Vec<String>, selection: &[usize]) -> RowcastResult<Self> {
        validate_selection(selection, columns.len())?;
        let mut decoder = Self::new(columns);
        if !selection.is_empty() {
            decoder.emit = selection.to_vec();
        }
        Ok(decoder)
    }

    /// Returns the full column list.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the names of the emitted columns, in emission order.
    pub fn effective_columns(&self) -> Vec<String> {
        self.emit.iter().map(|&i| self.columns[i].clone()).collect()
    }

    /// Scans the current row into the slots.
    ///
    /// The whole column set is always scanned, whatever the selection.
    fn scan<C: Cursor + ?Sized>(&mut self, cursor: &mut C) -> RowcastResult<()> {
        self.slots.fill(ScalarValue::Null);
        cursor.scan_into(&mut self.slots)
    }

    /// Decodes the current row as column name to text.
    ///
    /// NULL cells become empty strings.
    pub fn decode_string_map<C: Cursor + ?Sized>(
        &mut self,
        cursor: &mut C,
    ) -> RowcastResult<StringMap> {
        self.scan(cursor)?;
        let mut row = StringMap::with_capacity(self.emit.len());
        for &i in &self.emit {
            let text = convert(&self.slots[i])?;
            row.insert(self.columns[i].clone(), text);
        }
        Ok(row)
    }

    /// Decodes the current row as text values in emission order.
    pub fn decode_strings<C: Cursor + ?Sized>(
        &mut self,
        cursor: &mut C,
    ) -> RowcastResult<Vec<String>> {
        self.scan(cursor)?;
        self.emit.iter().map(|&i| convert(&self.slots[i])).collect()
    }

    /// Decodes the current row as column name to driver value.
    ///
    /// No conversion is applied; NULL stays [`ScalarValue::Null`].
    pub fn decode_values<C: Cursor + ?Sized>(
        &mut self,
        cursor: &mut C,
    ) -> RowcastResult<ValueMap> {
        self.scan(cursor)?;
        let mut row = ValueMap::with_capacity(self.emit.len());
        for &i in &self.emit {
            row.insert(self.columns[i].clone(), std::mem::take(&mut self.slots[i]));
        }
        Ok(row)
    }

    /// Decodes the current row as column name to bytes.
    ///
    /// NULL cells become empty byte vectors.
    pub fn decode_bytes<C: Cursor + ?Sized>(
        &mut self,
        cursor: &mut C,
    ) -> RowcastResult<BytesMap> {
        self.scan(cursor)?;
        let mut row = BytesMap::with_capacity(self.emit.len());
        for &i in &self.emit {
            let bytes = convert_bytes(&self.slots[i])?;
            row.insert(self.columns[i].clone(), bytes);
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{MemoryCursor, ResultSet};
    use rowcast_common::types::UnsupportedKind;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn abc_cursor() -> MemoryCursor<'static> {
        MemoryCursor::new(
            ResultSet::new(["a", "b", "c"])
                .row([
                    ScalarValue::Int64(1),
                    ScalarValue::Null,
                    ScalarValue::text("x"),
                ]),
        )
    }

    #[test]
    fn test_validate_selection() {
        assert!(validate_selection(&[], 0).is_ok());
        assert!(validate_selection(&[0, 2], 3).is_ok());
        let err = validate_selection(&[1, 5, 7], 3).unwrap_err();
        match err {
            RowcastError::SelectionIndexOutOfRange { index, width } => {
                assert_eq!(index, 5);
                assert_eq!(width, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_decode_string_map_natural_order() {
        let mut cursor = abc_cursor();
        let mut decoder = RowDecoder::new(columns(&["a", "b", "c"]));
        assert!(cursor.advance());
        let row = decoder.decode_string_map(&mut cursor).unwrap();
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(row["a"], "1");
        assert_eq!(row["b"], "");
        assert_eq!(row["c"], "x");
    }

    #[test]
    fn test_decode_with_selection() {
        let mut cursor = abc_cursor();
        let mut decoder = RowDecoder::with_selection(columns(&["a", "b", "c"]), &[2, 0]).unwrap();
        assert_eq!(decoder.effective_columns(), vec!["c", "a"]);

        assert!(cursor.advance());
        let row = decoder.decode_strings(&mut cursor).unwrap();
        assert_eq!(row, vec!["x", "1"]);
    }

    #[test]
    fn test_selection_rejected_before_decoding() {
        let err = RowDecoder::with_selection(columns(&["a", "b", "c"]), &[5]).unwrap_err();
        assert!(matches!(
            err,
            RowcastError::SelectionIndexOutOfRange { index: 5, width: 3 }
        ));
    }

    #[test]
    fn test_decode_values_keeps_null() {
        let mut cursor = abc_cursor();
        let mut decoder = RowDecoder::new(columns(&["a", "b", "c"]));
        assert!(cursor.advance());
        let row = decoder.decode_values(&mut cursor).unwrap();
        assert_eq!(row["a"], ScalarValue::Int64(1));
        assert!(row["b"].is_null());
    }

    #[test]
    fn test_decode_bytes() {
        let mut cursor = MemoryCursor::new(
            ResultSet::new(["flag", "data", "gone"]).row([
                ScalarValue::blob(vec![0u8]),
                ScalarValue::blob(vec![0xff, 0x00]),
                ScalarValue::Null,
            ]),
        );
        let mut decoder = RowDecoder::new(columns(&["flag", "data", "gone"]));
        assert!(cursor.advance());
        let row = decoder.decode_bytes(&mut cursor).unwrap();
        assert_eq!(row["flag"], b"0");
        assert_eq!(row["data"], vec![0xffu8, 0x00]);
        assert!(row["gone"].is_empty());
    }

    #[test]
    fn test_unsupported_aborts_row() {
        let mut cursor = MemoryCursor::new(
            ResultSet::new(["ok", "bad"]).row([
                ScalarValue::Int32(1),
                ScalarValue::Unsupported(UnsupportedKind::Map),
            ]),
        );
        let mut decoder = RowDecoder::new(columns(&["ok", "bad"]));
        assert!(cursor.advance());
        let err = decoder.decode_string_map(&mut cursor).unwrap_err();
        assert!(matches!(err, RowcastError::UnsupportedScalarKind { .. }));
    }

    #[test]
    fn test_unselected_unsupported_column_is_skipped() {
        let mut cursor = MemoryCursor::new(
            ResultSet::new(["ok", "bad"]).row([
                ScalarValue::Int32(1),
                ScalarValue::Unsupported(UnsupportedKind::Function),
            ]),
        );
        let mut decoder = RowDecoder::with_selection(columns(&["ok", "bad"]), &[0]).unwrap();
        assert!(cursor.advance());
        let row = decoder.decode_string_map(&mut cursor).unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row["ok"], "1");
    }

    #[test]
    fn test_scan_failure_propagates() {
        let mut cursor = MemoryCursor::new(
            ResultSet::new(["a"]).row([ScalarValue::Int32(1)]).fail_scan_at(0),
        );
        let mut decoder = RowDecoder::new(columns(&["a"]));
        assert!(cursor.advance());
        let err = decoder.decode_strings(&mut cursor).unwrap_err();
        assert!(matches!(err, RowcastError::ScanFailed { .. }));
    }
}
