//! Parsed structure of a text buffer.

use horizon_grid_core::CancellationToken;

use crate::error::Result;
use crate::logging::targets;
use crate::model::{GridColumn, GridRow};
use crate::value::{CellValue, TypeMerger};

use super::format::{Record, TextFormat};

/// Columns and rows parsed from a text buffer, each row paired with the
/// record it was read from.
///
/// Ranges in the records refer to the text as it was when parsed. A markup is
/// never updated in place; every edit is followed by a fresh parse.
#[derive(Debug, Clone, Default)]
pub struct Markup {
    columns: Vec<GridColumn>,
    rows: Vec<GridRow>,
    header: Option<Record>,
    records: Vec<Record>,
    text_len: usize,
}

impl Markup {
    /// Parse `text` with `format`, inferring column types from up to
    /// `sample_size` values per column.
    pub fn parse<F: TextFormat + ?Sized>(
        text: &str,
        format: &F,
        sample_size: usize,
        cancel: Option<&CancellationToken>,
    ) -> Result<Self> {
        let mut records = format.scan(text, cancel)?;
        let header = if format.has_header() && !records.is_empty() {
            Some(records.remove(0))
        } else {
            None
        };

        let width = records
            .iter()
            .map(Record::len)
            .chain(header.as_ref().map(Record::len))
            .max()
            .unwrap_or(0);
        let null_text = format.null_text();

        let columns = (0..width)
            .map(|column| {
                let mut merger = TypeMerger::new();
                for record in &records {
                    if merger.samples() >= sample_size {
                        break;
                    }
                    match record.value(column) {
                        Some(text) if text != null_text => merger.observe_text(text),
                        _ => {}
                    }
                }
                let name = header
                    .as_ref()
                    .and_then(|h| h.value(column))
                    .filter(|name| !name.is_empty())
                    .map_or_else(|| default_column_name(column), str::to_string);
                GridColumn::new(column, name).with_type(merger.result())
            })
            .collect::<Vec<_>>();

        let rows = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let values = columns
                    .iter()
                    .enumerate()
                    .map(|(column, grid_column)| match record.value(column) {
                        Some(text) if text != null_text => grid_column.column_type().parse(text),
                        _ => CellValue::Null,
                    })
                    .collect();
                GridRow::new(i + 1, values)
            })
            .collect();

        tracing::debug!(
            target: targets::TEXT,
            columns = width,
            rows = records.len(),
            header = header.is_some(),
            "markup parsed"
        );

        Ok(Self {
            columns,
            rows,
            header,
            records,
            text_len: text.chars().count(),
        })
    }

    /// Parsed columns.
    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    /// Parsed rows.
    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The header record, if the format declares one.
    pub fn header(&self) -> Option<&Record> {
        self.header.as_ref()
    }

    /// Data records, aligned with [`rows`](Self::rows).
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The record of data row `row`.
    pub fn record(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    /// Length of the parsed text in characters.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// The last record of the text, header included.
    pub fn last_record(&self) -> Option<&Record> {
        self.records.last().or(self.header.as_ref())
    }

    /// Serialize the parsed values back to text.
    pub fn to_text<F: TextFormat + ?Sized>(&self, format: &F) -> Result<String> {
        let null_text = format.null_text();
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        if self.header.is_some() {
            let names: Vec<String> = self.columns.iter().map(|c| c.name().to_string()).collect();
            lines.push(format.format_record(&names)?);
        }
        for row in &self.rows {
            let values: Vec<String> = row.values().iter().map(|v| v.to_text(null_text)).collect();
            lines.push(format.format_record(&values)?);
        }
        let mut text = lines.join(format.record_separator());
        // A blank last line only counts as a record when terminated.
        if lines.last().is_some_and(String::is_empty) {
            text.push_str(format.record_separator());
        }
        Ok(text)
    }
}

/// Name of an unnamed column.
pub(crate) fn default_column_name(column: usize) -> String {
    format!("C{}", column + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::format::CsvFormat;
    use crate::value::ColumnType;

    #[test]
    fn test_parse_with_header() {
        let format = CsvFormat::new().with_header(true);
        let markup = Markup::parse("id,name,score\n1,ann,2.5\n2,bob,", &format, 200, None).unwrap();
        assert_eq!(markup.column_count(), 3);
        assert_eq!(markup.row_count(), 2);
        assert_eq!(markup.columns()[1].name(), "name");
        assert_eq!(markup.columns()[0].column_type(), ColumnType::Integer);
        assert_eq!(markup.columns()[2].column_type(), ColumnType::Double);
        assert_eq!(markup.rows()[1].value(2), Some(&CellValue::Null));
        assert_eq!(markup.rows()[1].number(), 2);
        assert_eq!(markup.header().map(Record::len), Some(3));
    }

    #[test]
    fn test_parse_without_header_pads_short_rows() {
        let markup = Markup::parse("x,y\nz", &CsvFormat::new(), 200, None).unwrap();
        assert_eq!(markup.columns()[1].name(), "C2");
        assert_eq!(markup.rows()[1].values().len(), 2);
        assert_eq!(markup.record(1).map(Record::len), Some(1));
        assert_eq!(markup.text_len(), 5);
    }

    #[test]
    fn test_null_text() {
        let format = CsvFormat::new().with_null_text("NULL");
        let markup = Markup::parse("1\nNULL\n3", &format, 200, None).unwrap();
        assert_eq!(markup.columns()[0].column_type(), ColumnType::Integer);
        assert_eq!(markup.rows()[1].value(0), Some(&CellValue::Null));
        assert_eq!(markup.to_text(&format).unwrap(), "1\nNULL\n3");
    }

    #[test]
    fn test_to_text_terminates_blank_last_row() {
        let format = CsvFormat::new();
        let markup = Markup::parse("x\n\n", &format, 200, None).unwrap();
        assert_eq!(markup.row_count(), 2);
        let text = markup.to_text(&format).unwrap();
        assert_eq!(text, "x\n\n");
        assert_eq!(Markup::parse(&text, &format, 200, None).unwrap().rows(), markup.rows());
    }
}
