//! Structural grid edits expressed as text edits.

use std::collections::BTreeMap;
use std::sync::Arc;

use horizon_grid_core::{ConnectionId, PerfSpan};

use crate::error::{GridError, Result};
use crate::index::{Column, IndexSet, Model, ModelColumn, ModelRow, Row};
use crate::logging::targets;
use crate::model::{CellUpdate, GridDataModel, GridMutator};
use crate::value::DEFAULT_TYPE_SAMPLE_SIZE;

use super::buffer::TextBuffer;
use super::format::{Record, TextFormat, next_row_id};
use super::markup::{Markup, default_column_name};
use super::parse_service::ParsedMarkup;
use super::reparse::ReparseController;
use super::session::UpdateSession;

/// A grid model backed by a text document.
///
/// The buffer is parsed into a [`Markup`] whose columns and rows feed a
/// [`GridDataModel`]. Edits made through [`GridMutator`] are translated into
/// text edits against the ranges recorded in the markup and applied in one
/// [`UpdateSession`]; the buffer is parsed again after every batch, whether it
/// succeeded or not.
///
/// # Example
///
/// ```
/// use horizon_grid::index::ModelColumn;
/// use horizon_grid::model::GridMutator;
/// use horizon_grid::text::{CsvFormat, RopeBuffer, TextBuffer, TextMutationEngine};
///
/// let buffer = RopeBuffer::new("a,b,c\n1,2,3");
/// let mut engine = TextMutationEngine::new(buffer, CsvFormat::new().with_header(true)).unwrap();
///
/// engine.rename_column(ModelColumn::new(1), "bb").unwrap();
/// assert_eq!(engine.buffer().text(), "a,bb,c\n1,2,3");
/// ```
pub struct TextMutationEngine<B: TextBuffer, F: TextFormat + Clone> {
    buffer: B,
    format: F,
    markup: Arc<Markup>,
    /// Buffer revision the markup was parsed from; `None` after a failed parse.
    parsed_revision: Option<u64>,
    model: Arc<GridDataModel>,
    controller: Arc<ReparseController>,
    sample_size: usize,
    buffer_connection: ConnectionId,
}

impl<B: TextBuffer, F: TextFormat + Clone> TextMutationEngine<B, F> {
    /// Parse `buffer` with `format`.
    pub fn new(buffer: B, format: F) -> Result<Self> {
        Self::with_sample_size(buffer, format, DEFAULT_TYPE_SAMPLE_SIZE)
    }

    /// Parse `buffer` with `format`, inferring column types from up to
    /// `sample_size` values.
    pub fn with_sample_size(buffer: B, format: F, sample_size: usize) -> Result<Self> {
        let controller = Arc::new(ReparseController::new());
        let notify = controller.clone();
        let buffer_connection = buffer.changed().connect(move |_| notify.notify_changed());

        let mut engine = Self {
            buffer,
            format,
            markup: Arc::new(Markup::default()),
            parsed_revision: None,
            model: Arc::new(GridDataModel::new()),
            controller,
            sample_size,
            buffer_connection,
        };
        engine.reparse()?;
        Ok(engine)
    }

    /// The text buffer.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Mutable access to the text buffer, for edits made outside the grid.
    ///
    /// The markup becomes stale and is parsed again before the next grid edit.
    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    /// The format in effect.
    pub fn format(&self) -> &F {
        &self.format
    }

    /// The most recent markup.
    pub fn markup(&self) -> &Arc<Markup> {
        &self.markup
    }

    /// The model showing the parsed columns and rows.
    pub fn model(&self) -> Arc<GridDataModel> {
        self.model.clone()
    }

    /// The controller turning buffer changes into re-parse requests.
    pub fn controller(&self) -> &Arc<ReparseController> {
        &self.controller
    }

    /// Returns `true` if the markup reflects the current buffer.
    pub fn is_parsed(&self) -> bool {
        self.parsed_revision == Some(self.buffer.modification_count())
    }

    /// Parse the buffer and publish the result to the model.
    pub fn reparse(&mut self) -> Result<()> {
        let _span = tracing::debug_span!(target: targets::TEXT, "horizon_grid::parse").entered();
        let _perf = PerfSpan::new("parse");
        let revision = self.buffer.modification_count();
        match Markup::parse(&self.buffer.text(), &self.format, self.sample_size, None) {
            Ok(markup) => {
                self.publish(Arc::new(markup), revision);
                Ok(())
            }
            Err(err) => {
                self.parsed_revision = None;
                tracing::warn!(target: targets::TEXT, error = %err, "buffer could not be parsed");
                Err(err)
            }
        }
    }

    /// Adopt a markup parsed in the background. Results for an older buffer
    /// revision are ignored; returns whether the markup was applied.
    pub fn apply_parsed(&mut self, parsed: &ParsedMarkup) -> bool {
        if parsed.revision != self.buffer.modification_count() {
            tracing::debug!(
                target: targets::TEXT,
                parsed = parsed.revision,
                current = self.buffer.modification_count(),
                "stale parse result ignored"
            );
            return false;
        }
        self.publish(parsed.markup.clone(), parsed.revision);
        true
    }

    fn publish(&mut self, markup: Arc<Markup>, revision: u64) {
        self.model.set_columns(markup.columns().to_vec());
        self.model.add_rows(markup.rows().to_vec());
        self.model.after_last_row_added();
        self.markup = markup;
        self.parsed_revision = Some(revision);
    }

    /// Reject edits on a read-only buffer and make sure the markup is current.
    fn prepare(&mut self, operation: &'static str) -> Result<()> {
        if self.buffer.is_read_only() {
            tracing::warn!(target: targets::TEXT, operation, "edit rejected: buffer is read-only");
            return Err(GridError::ReadOnly);
        }
        if !self.is_parsed() {
            self.reparse()?;
        }
        Ok(())
    }

    /// Run one batch of text edits.
    ///
    /// Re-parse requests are muted for the duration of the batch. On success
    /// the session's format is kept. The buffer is parsed again afterwards if
    /// it changed or the batch failed.
    fn edit<O>(&mut self, operation: &'static str, op: O) -> Result<()>
    where
        O: FnOnce(&mut UpdateSession<'_, B, F>, &Markup) -> Result<()>,
    {
        self.prepare(operation)?;
        let _perf = PerfSpan::new(operation);
        let _span = tracing::debug_span!(
            target: targets::TEXT,
            "horizon_grid::edit_batch",
            operation
        )
        .entered();

        let markup = self.markup.clone();
        let controller = self.controller.clone();
        let guard = controller.mute();
        let (result, format, edits) = {
            let mut session = UpdateSession::new(&mut self.buffer, self.format.clone());
            let result = op(&mut session, &markup);
            let edits = session.edit_count();
            (result, session.finish(), edits)
        };
        let changed = guard.take_changed();

        match &result {
            Ok(()) => {
                self.format = format;
                tracing::debug!(target: targets::TEXT, operation, edits, "edit batch applied");
            }
            Err(err) => {
                tracing::warn!(
                    target: targets::TEXT,
                    operation,
                    edits,
                    error = %err,
                    "edit batch failed"
                );
            }
        }

        let reparsed = if changed || result.is_err() {
            self.reparse()
        } else {
            Ok(())
        };
        result.map_err(GridError::edit_failed)?;
        reparsed
    }

    fn check_row(&self, row: ModelRow) -> Result<usize> {
        let count = self.markup.row_count();
        row.as_usize()
            .filter(|&i| i < count)
            .ok_or_else(|| GridError::invalid_row(row.value(), count))
    }

    fn check_column(&self, column: ModelColumn) -> Result<usize> {
        let count = self.markup.column_count();
        column
            .as_usize()
            .filter(|&i| i < count)
            .ok_or_else(|| GridError::invalid_column(column.value(), count))
    }

    /// Values of a new record: `template` padded with nulls, with a fresh row
    /// identifier when the format needs one.
    fn new_records(&self, templates: &[Option<&Record>]) -> Vec<Vec<String>> {
        let markup = &self.markup;
        let null_text = self.format.null_text();
        let width = markup.column_count();
        let id_column = self.format.row_id_column().map(|name| {
            markup
                .columns()
                .iter()
                .position(|c| c.name() == name)
                .unwrap_or(0)
        });
        let mut last_id = id_column.and_then(|column| {
            markup
                .records()
                .last()
                .and_then(|r| r.value(column))
                .map(str::to_string)
        });

        templates
            .iter()
            .enumerate()
            .map(|(i, template)| {
                let mut values: Vec<String> = (0..width)
                    .map(|column| {
                        template
                            .and_then(|r| r.value(column))
                            .unwrap_or(null_text)
                            .to_string()
                    })
                    .collect();
                if let Some(column) = id_column.filter(|&c| c < values.len()) {
                    let id = next_row_id(last_id.as_deref(), markup.row_count() + i);
                    values[column] = id.clone();
                    last_id = Some(id);
                }
                values
            })
            .collect()
    }
}

/// Append records after the last record of the text.
fn append_records<B: TextBuffer, F: TextFormat>(
    session: &mut UpdateSession<'_, B, F>,
    markup: &Markup,
    records: &[Vec<String>],
) -> Result<()> {
    let format = session.format();
    let separator = format.record_separator().to_string();
    let lines = records
        .iter()
        .map(|values| format.format_record(values))
        .collect::<Result<Vec<_>>>()?;

    let (offset, needs_separator) = match markup.last_record() {
        Some(last) => (last.full_range.end, !last.has_separator()),
        None => (markup.text_len(), false),
    };
    let mut text = String::new();
    if needs_separator {
        for line in &lines {
            text.push_str(&separator);
            text.push_str(line);
        }
        // A blank last line needs its own terminator to count as a record.
        if lines.last().is_some_and(String::is_empty) {
            text.push_str(&separator);
        }
    } else {
        for line in &lines {
            text.push_str(line);
            text.push_str(&separator);
        }
    }
    session.insert(offset, &text)
}

/// Serialize the retained or reordered fields of `record`.
fn rewrite_record<F: TextFormat>(format: &F, record: &Record, order: &[usize]) -> Result<String> {
    let values: Vec<String> = order
        .iter()
        .filter_map(|&column| record.value(column).map(str::to_string))
        .collect();
    format.format_record(&values)
}

impl<B: TextBuffer, F: TextFormat + Clone> GridMutator for TextMutationEngine<B, F> {
    fn is_read_only(&self) -> bool {
        self.buffer.is_read_only()
    }

    fn insert_rows(&mut self, count: usize) -> Result<()> {
        self.prepare("insert_rows")?;
        if count == 0 {
            return Ok(());
        }
        let records = self.new_records(&vec![None; count]);
        self.edit("insert_rows", |session, markup| {
            append_records(session, markup, &records)
        })
    }

    fn clone_row(&mut self, row: ModelRow) -> Result<()> {
        self.prepare("clone_row")?;
        let index = self.check_row(row)?;
        let markup = self.markup.clone();
        let records = self.new_records(&[markup.record(index)]);
        self.edit("clone_row", |session, markup| {
            append_records(session, markup, &records)
        })
    }

    fn delete_rows(&mut self, rows: &IndexSet<Model, Row>) -> Result<()> {
        self.prepare("delete_rows")?;
        let rows = rows.sorted();
        let indices = rows
            .iter()
            .map(|row| self.check_row(row))
            .collect::<Result<Vec<_>>>()?;
        if indices.is_empty() {
            return Ok(());
        }
        self.edit("delete_rows", |session, markup| {
            for index in indices {
                if let Some(record) = markup.record(index) {
                    session.delete(record.full_range.clone())?;
                }
            }
            Ok(())
        })
    }

    fn insert_column(&mut self, name: Option<&str>) -> Result<()> {
        self.prepare("insert_column")?;
        let name = name.map_or_else(
            || default_column_name(self.markup.column_count()),
            str::to_string,
        );
        self.edit("insert_column", |session, markup| {
            let separator = session.format().value_separator();
            let null_field = format!(
                "{separator}{}",
                session.format().format_value(session.format().null_text())?
            );
            if let Some(header) = markup.header() {
                let field = format!("{separator}{}", session.format().format_value(&name)?);
                session.insert(header.range.end, &field)?;
            }
            for record in markup.records() {
                session.insert(record.range.end, &null_field)?;
            }
            Ok(())
        })
    }

    fn delete_columns(&mut self, columns: &IndexSet<Model, Column>) -> Result<()> {
        self.prepare("delete_columns")?;
        let columns = columns.sorted();
        let removed = columns
            .iter()
            .map(|column| self.check_column(column))
            .collect::<Result<Vec<_>>>()?;
        if removed.is_empty() {
            return Ok(());
        }
        let retained: Vec<usize> = (0..self.markup.column_count())
            .filter(|column| !removed.contains(column))
            .collect();

        self.edit("delete_columns", |session, markup| {
            for record in markup.header().into_iter().chain(markup.records()) {
                let mut text = rewrite_record(session.format(), record, &retained)?;
                if text.is_empty() && !record.has_separator() {
                    text.push_str(session.format().record_separator());
                }
                session.replace(record.range.clone(), &text)?;
            }
            Ok(())
        })
    }

    fn rename_column(&mut self, column: ModelColumn, name: &str) -> Result<()> {
        self.prepare("rename_column")?;
        let index = self.check_column(column)?;
        self.edit("rename_column", |session, markup| {
            let formatted = session.format().format_value(name)?;
            match markup.header() {
                Some(header) if index < header.len() => {
                    session.replace(header.values[index].range.clone(), &formatted)
                }
                Some(header) => {
                    let separator = session.format().value_separator();
                    let mut text = String::new();
                    for i in header.len()..=index {
                        text.push(separator);
                        if i == index {
                            text.push_str(&formatted);
                        } else {
                            let filler = markup.columns()[i].name();
                            text.push_str(&session.format().format_value(filler)?);
                        }
                    }
                    session.insert(header.range.end, &text)
                }
                None => {
                    let names: Vec<String> = markup
                        .columns()
                        .iter()
                        .enumerate()
                        .map(|(i, c)| (if i == index { name } else { c.name() }).to_string())
                        .collect();
                    let mut line = session.format().format_record(&names)?;
                    line.push_str(session.format().record_separator());
                    session.insert(0, &line)?;
                    session.format_mut().set_has_header(true);
                    Ok(())
                }
            }
        })
    }

    fn move_column(&mut self, from: ModelColumn, to: ModelColumn) -> Result<()> {
        self.prepare("move_column")?;
        let from = self.check_column(from)?;
        let to = self.check_column(to)?;
        if from == to {
            return Ok(());
        }
        let mut order: Vec<usize> = (0..self.markup.column_count()).collect();
        let moved = order.remove(from);
        order.insert(to, moved);

        self.edit("move_column", |session, markup| {
            let null_text = session.format().null_text().to_string();
            let mut text = String::new();
            for record in markup.header().into_iter().chain(markup.records()) {
                let values: Vec<String> = order
                    .iter()
                    .map(|&column| record.value(column).unwrap_or(&null_text).to_string())
                    .collect();
                text.push_str(&session.format().format_record(&values)?);
                if record.has_separator() {
                    text.push_str(&session.slice(record.range.end..record.full_range.end)?);
                }
            }
            session.replace(0..markup.text_len(), &text)
        })
    }

    fn update_cells(&mut self, updates: &[CellUpdate]) -> Result<()> {
        self.prepare("update_cells")?;
        let null_text = self.format.null_text().to_string();
        let mut by_row: BTreeMap<usize, BTreeMap<usize, String>> = BTreeMap::new();
        for update in updates {
            let row = self.check_row(update.row)?;
            let column = self.check_column(update.column)?;
            by_row
                .entry(row)
                .or_default()
                .insert(column, update.value.to_text(&null_text));
        }
        if by_row.is_empty() {
            return Ok(());
        }

        self.edit("update_cells", |session, markup| {
            let separator = session.format().value_separator();
            let null_field = session.format().format_value(&null_text)?;
            for (row, cells) in &by_row {
                let Some(record) = markup.record(*row) else {
                    continue;
                };
                let mut fields = record.len();
                let mut blank = false;
                for (&column, value) in cells {
                    let formatted = session.format().format_value(value)?;
                    if column < record.len() {
                        blank = fields == 1 && formatted.is_empty();
                        session.replace(record.values[column].range.clone(), &formatted)?;
                        continue;
                    }
                    let mut text = String::new();
                    for i in fields..=column {
                        text.push(separator);
                        text.push_str(if i == column { &formatted } else { &null_field });
                    }
                    fields = column + 1;
                    blank = false;
                    session.insert(record.range.end, &text)?;
                }
                // An unterminated blank last line would not parse as a record.
                if blank && !record.has_separator() {
                    let terminator = session.format().record_separator().to_string();
                    session.insert(record.range.end, &terminator)?;
                }
            }
            Ok(())
        })
    }
}

impl<B: TextBuffer, F: TextFormat + Clone> Drop for TextMutationEngine<B, F> {
    fn drop(&mut self) {
        self.buffer.changed().disconnect(self.buffer_connection);
    }
}

impl<B: TextBuffer, F: TextFormat + Clone> std::fmt::Debug for TextMutationEngine<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextMutationEngine")
            .field("columns", &self.markup.column_count())
            .field("rows", &self.markup.row_count())
            .field("parsed", &self.is_parsed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::buffer::RopeBuffer;
    use crate::text::format::CsvFormat;
    use crate::model::TabularModel;
    use crate::value::CellValue;
    use pretty_assertions::assert_eq;

    fn engine(text: &str, header: bool) -> TextMutationEngine<RopeBuffer, CsvFormat> {
        TextMutationEngine::new(RopeBuffer::new(text), CsvFormat::new().with_header(header)).unwrap()
    }

    #[test]
    fn test_model_follows_markup() {
        let engine = engine("a,b\n1,2\n3,4", true);
        let model = engine.model();
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.column(ModelColumn::new(1)).unwrap().name(), "b");
        assert!(model.is_complete());
    }

    #[test]
    fn test_insert_rows_adds_missing_separator() {
        let mut engine = engine("a,b\n1,2", true);
        engine.insert_rows(2).unwrap();
        assert_eq!(engine.buffer().text(), "a,b\n1,2\n,\n,");
        assert_eq!(engine.model().row_count(), 3);
    }

    #[test]
    fn test_insert_rows_after_terminated_record() {
        let mut engine = engine("1,2\n", false);
        engine.insert_rows(1).unwrap();
        assert_eq!(engine.buffer().text(), "1,2\n,\n");
    }

    #[test]
    fn test_blank_row_in_single_column_table() {
        let mut engine = engine("a\n1", true);
        engine.insert_rows(1).unwrap();
        assert_eq!(engine.buffer().text(), "a\n1\n\n");
        assert_eq!(engine.model().row_count(), 2);
    }

    #[test]
    fn test_delete_columns_keeps_blank_last_row() {
        let mut engine = engine("a,b\n1,2\n,4", true);
        engine.delete_columns(&IndexSet::from_values([1])).unwrap();
        assert_eq!(engine.buffer().text(), "a\n1\n\n");
        assert_eq!(engine.model().row_count(), 2);
        assert_eq!(
            engine.model().value(ModelRow::new(1), ModelColumn::new(0)).unwrap(),
            CellValue::Null
        );
    }

    #[test]
    fn test_nulling_only_field_of_last_row_keeps_it() {
        let mut engine = engine("a\n1\n2", true);
        engine
            .update_cells(&[CellUpdate::new(ModelRow::new(1), ModelColumn::new(0), CellValue::Null)])
            .unwrap();
        assert_eq!(engine.buffer().text(), "a\n1\n\n");
        assert_eq!(engine.model().row_count(), 2);

        engine
            .update_cells(&[CellUpdate::new(ModelRow::new(1), ModelColumn::new(0), 5i64)])
            .unwrap();
        assert_eq!(engine.buffer().text(), "a\n1\n5\n");
        assert_eq!(engine.model().row_count(), 2);
    }

    #[test]
    fn test_row_ids_are_synthesized() {
        let format = CsvFormat::new().with_header(true).with_row_id_column("id");
        let mut engine = TextMutationEngine::new(RopeBuffer::new("id,v\n7,x\n"), format).unwrap();
        engine.insert_rows(2).unwrap();
        engine.clone_row(ModelRow::new(0)).unwrap();
        assert_eq!(engine.buffer().text(), "id,v\n7,x\n8,\n9,\n10,x\n");
    }

    #[test]
    fn test_delete_rows_in_any_order() {
        let mut engine = engine("r1\nr2\nr3\nr4\n", false);
        engine.delete_rows(&IndexSet::from_values([3, 1])).unwrap();
        assert_eq!(engine.buffer().text(), "r1\nr3\n");
        assert!(matches!(
            engine.delete_rows(&IndexSet::from_values([5])),
            Err(GridError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_insert_column_with_header() {
        let mut engine = engine("a,b\n1,2\n3", true);
        engine.insert_column(Some("c")).unwrap();
        assert_eq!(engine.buffer().text(), "a,b,c\n1,2,\n3,");
    }

    #[test]
    fn test_delete_columns_rewrites_records() {
        let mut engine = engine("a,b,c\n1,\"x,y\",3\n4", true);
        engine.delete_columns(&IndexSet::from_values([1, 0])).unwrap();
        assert_eq!(engine.buffer().text(), "c\n3\n");
        assert_eq!(engine.model().column_count(), 1);
    }

    #[test]
    fn test_rename_extends_short_header() {
        let mut engine = engine("a\n1,2,3", true);
        engine.rename_column(ModelColumn::new(2), "z").unwrap();
        assert_eq!(engine.buffer().text(), "a,C2,z\n1,2,3");
    }

    #[test]
    fn test_rename_synthesizes_header() {
        let mut engine = engine("1,2\n3,4", false);
        engine.rename_column(ModelColumn::new(0), "id").unwrap();
        assert_eq!(engine.buffer().text(), "id,C2\n1,2\n3,4");
        assert!(engine.format().has_header);
        assert_eq!(engine.model().row_count(), 2);
        assert_eq!(engine.model().column(ModelColumn::new(0)).unwrap().name(), "id");
    }

    #[test]
    fn test_move_column_keeps_crlf() {
        let mut engine = engine("a,b,c\r\n1,2\r\n", true);
        engine
            .move_column(ModelColumn::new(2), ModelColumn::new(0))
            .unwrap();
        assert_eq!(engine.buffer().text(), "c,a,b\r\n,1,2\r\n");
    }

    #[test]
    fn test_update_cells_pads_short_rows() {
        let mut engine = engine("a,b,c,d\n1\n2,3", true);
        engine
            .update_cells(&[
                CellUpdate::new(ModelRow::new(0), ModelColumn::new(3), "x"),
                CellUpdate::new(ModelRow::new(1), ModelColumn::new(0), "q,r"),
                CellUpdate::new(ModelRow::new(0), ModelColumn::new(1), CellValue::Null),
            ])
            .unwrap();
        assert_eq!(engine.buffer().text(), "a,b,c,d\n1,,,x\n\"q,r\",3");
    }

    #[test]
    fn test_read_only_rejects_before_editing() {
        let buffer = RopeBuffer::new("a\n1").with_read_only(true);
        let mut engine = TextMutationEngine::new(buffer, CsvFormat::new()).unwrap();
        assert!(engine.is_read_only());
        assert!(matches!(engine.insert_rows(1), Err(GridError::ReadOnly)));
        assert!(matches!(
            engine.rename_column(ModelColumn::new(0), "x"),
            Err(GridError::ReadOnly)
        ));
        assert_eq!(engine.buffer().text(), "a\n1");
    }

    #[test]
    fn test_external_edits_are_reparsed() {
        let mut engine = engine("a,b\n1,2", true);
        let requests = Arc::new(parking_lot::Mutex::new(0));
        let r = requests.clone();
        engine.controller().reparse_requested().connect(move |_| *r.lock() += 1);

        engine.buffer_mut().insert(7, "\n3,4").unwrap();
        assert_eq!(*requests.lock(), 1);
        assert!(!engine.is_parsed());

        engine.insert_rows(1).unwrap();
        assert_eq!(engine.buffer().text(), "a,b\n1,2\n3,4\n,");
        assert_eq!(*requests.lock(), 1);
        assert_eq!(engine.model().row_count(), 3);
    }

    #[test]
    fn test_failed_parse_blocks_edits_until_fixed() {
        let mut engine = engine("a\n1", false);
        engine.buffer_mut().insert(3, "\n\"open").unwrap();
        assert!(matches!(engine.insert_rows(1), Err(GridError::Parse { .. })));
        engine.buffer_mut().insert(9, "\"").unwrap();
        assert!(engine.insert_rows(1).is_ok());
    }
}
