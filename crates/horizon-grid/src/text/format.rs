//! Record formats of text buffers.

use std::ops::Range;

use horizon_grid_core::CancellationToken;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Records scanned between cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 1024;

/// One field of a record: its character range in the source text and its
/// unquoted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRange {
    /// Characters the field occupies, quotes included.
    pub range: Range<usize>,
    /// The field's value with quoting removed.
    pub value: String,
}

/// One record of a text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Characters of the record's fields, without the record separator.
    pub range: Range<usize>,
    /// `range` plus the trailing record separator, if any.
    pub full_range: Range<usize>,
    /// Fields in order. A blank line holds one empty field.
    pub values: Vec<ValueRange>,
}

impl Record {
    /// Returns `true` if the record is terminated by a record separator.
    pub fn has_separator(&self) -> bool {
        self.full_range.end > self.range.end
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of field `index`.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(|v| v.value.as_str())
    }
}

/// The grammar of a record-oriented text document.
///
/// Implementations split text into [`Record`]s and serialize values back. The
/// mutation engine works only with what a format reports and never inspects
/// the grammar itself.
pub trait TextFormat: Send + Sync {
    /// Split `text` into records.
    fn scan(&self, text: &str, cancel: Option<&CancellationToken>) -> Result<Vec<Record>>;

    /// Serialize one value, quoting it when needed.
    fn format_value(&self, value: &str) -> Result<String>;

    /// Separator between values.
    fn value_separator(&self) -> char;

    /// Separator between records.
    fn record_separator(&self) -> &str;

    /// Text representing a null value.
    fn null_text(&self) -> &str;

    /// Returns `true` if the first record is a header.
    fn has_header(&self) -> bool;

    /// Declare whether the first record is a header.
    fn set_has_header(&mut self, has_header: bool);

    /// Name of the column holding row identifiers, if the format needs one.
    fn row_id_column(&self) -> Option<&str> {
        None
    }

    /// Serialize a whole record, without the record separator.
    fn format_record(&self, values: &[String]) -> Result<String> {
        let mut record = String::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                record.push(self.value_separator());
            }
            record.push_str(&self.format_value(value)?);
        }
        Ok(record)
    }
}

/// Delimiter-separated values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvFormat {
    /// Separator between values.
    pub value_separator: char,
    /// Separator between records. `"\n"` also accepts `"\r\n"`.
    pub record_separator: String,
    /// Quote character.
    pub quote: char,
    /// Whether the first record holds column names.
    pub has_header: bool,
    /// Text of a null value.
    pub null_text: String,
    /// Column holding row identifiers.
    pub row_id_column: Option<String>,
    /// Trim whitespace around unquoted values.
    pub trim_whitespace: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            value_separator: ',',
            record_separator: "\n".to_string(),
            quote: '"',
            has_header: false,
            null_text: String::new(),
            row_id_column: None,
            trim_whitespace: false,
        }
    }
}

impl CsvFormat {
    /// Comma separated values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab separated values.
    pub fn tsv() -> Self {
        Self {
            value_separator: '\t',
            ..Self::default()
        }
    }

    /// Set the value separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.value_separator = separator;
        self
    }

    /// Declare a header record.
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the null text.
    pub fn with_null_text(mut self, null_text: impl Into<String>) -> Self {
        self.null_text = null_text.into();
        self
    }

    /// Require a row identifier column.
    pub fn with_row_id_column(mut self, column: impl Into<String>) -> Self {
        self.row_id_column = Some(column.into());
        self
    }

    /// Check that the format can be used for scanning and quoting.
    pub fn validate(&self) -> Result<()> {
        if !self.value_separator.is_ascii() || !self.quote.is_ascii() {
            return Err(GridError::settings(
                "value separator and quote must be ASCII characters",
            ));
        }
        if self.value_separator == self.quote {
            return Err(GridError::settings("value separator and quote must differ"));
        }
        if self.record_separator.is_empty() {
            return Err(GridError::settings("record separator must not be empty"));
        }
        if self.record_separator.contains(self.value_separator) {
            return Err(GridError::settings(
                "record separator must not contain the value separator",
            ));
        }
        Ok(())
    }

    /// Length of the record separator starting at `pos`, 0 if there is none.
    fn separator_len(&self, chars: &[char], pos: usize, record_separator: &[char]) -> usize {
        if chars[pos..].starts_with(record_separator) {
            record_separator.len()
        } else if record_separator == ['\n'] && chars[pos..].starts_with(&['\r', '\n']) {
            2
        } else {
            0
        }
    }

    fn is_field_end(&self, chars: &[char], pos: usize, record_separator: &[char]) -> bool {
        pos >= chars.len()
            || chars[pos] == self.value_separator
            || self.separator_len(chars, pos, record_separator) > 0
    }
}

impl TextFormat for CsvFormat {
    fn scan(&self, text: &str, cancel: Option<&CancellationToken>) -> Result<Vec<Record>> {
        let chars: Vec<char> = text.chars().collect();
        let record_separator: Vec<char> = self.record_separator.chars().collect();
        if record_separator.is_empty() {
            return Err(GridError::settings("record separator must not be empty"));
        }
        let mut records = Vec::new();
        let mut pos = 0;
        let mut line = 1;

        while pos < chars.len() {
            if records.len() % CANCEL_CHECK_INTERVAL == 0
                && cancel.is_some_and(CancellationToken::is_cancelled)
            {
                return Err(GridError::Cancelled);
            }

            let start = pos;
            let mut values = Vec::new();
            loop {
                let field_start = pos;
                let mut value = String::new();
                if pos < chars.len() && chars[pos] == self.quote {
                    let quote_line = line;
                    pos += 1;
                    loop {
                        let Some(&c) = chars.get(pos) else {
                            return Err(GridError::parse(quote_line, "unterminated quoted value"));
                        };
                        if c == self.quote {
                            if chars.get(pos + 1) == Some(&self.quote) {
                                value.push(c);
                                pos += 2;
                                continue;
                            }
                            pos += 1;
                            break;
                        }
                        if c == '\n' {
                            line += 1;
                        }
                        value.push(c);
                        pos += 1;
                    }
                    // Text after the closing quote is kept verbatim.
                    while !self.is_field_end(&chars, pos, &record_separator) {
                        value.push(chars[pos]);
                        pos += 1;
                    }
                } else {
                    while !self.is_field_end(&chars, pos, &record_separator) {
                        value.push(chars[pos]);
                        pos += 1;
                    }
                    if self.trim_whitespace {
                        value = value.trim().to_string();
                    }
                }
                values.push(ValueRange {
                    range: field_start..pos,
                    value,
                });
                if pos < chars.len() && chars[pos] == self.value_separator {
                    pos += 1;
                    continue;
                }
                break;
            }

            let end = pos;
            if pos < chars.len() {
                pos += self.separator_len(&chars, pos, &record_separator);
                line += 1;
            }
            records.push(Record {
                range: start..end,
                full_range: start..pos,
                values,
            });
        }
        Ok(records)
    }

    fn format_value(&self, value: &str) -> Result<String> {
        if value.is_empty() {
            return Ok(String::new());
        }
        let needs_quotes = value.contains(self.value_separator)
            || value.contains(self.quote)
            || value.contains(['\r', '\n'])
            || value.contains(self.record_separator.as_str())
            || (self.trim_whitespace && value.trim() != value);
        if !needs_quotes {
            return Ok(value.to_string());
        }

        self.validate()?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.value_separator as u8)
            .quote(self.quote as u8)
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer
            .write_record([value])
            .map_err(|e| GridError::text_edit(e.to_string()))?;
        let bytes = writer
            .into_inner()
            .map_err(|e| GridError::text_edit(e.to_string()))?;
        let mut quoted =
            String::from_utf8(bytes).map_err(|e| GridError::text_edit(e.to_string()))?;
        if quoted.ends_with('\n') {
            quoted.pop();
        }
        Ok(quoted)
    }

    fn value_separator(&self) -> char {
        self.value_separator
    }

    fn record_separator(&self) -> &str {
        &self.record_separator
    }

    fn null_text(&self) -> &str {
        &self.null_text
    }

    fn has_header(&self) -> bool {
        self.has_header
    }

    fn set_has_header(&mut self, has_header: bool) {
        self.has_header = has_header;
    }

    fn row_id_column(&self) -> Option<&str> {
        self.row_id_column.as_deref()
    }
}

/// Guess the value separator of `text` from its first lines.
///
/// Picks the most frequent of comma, tab, pipe and semicolon; comma when none
/// occurs.
pub fn detect_separator(text: &str) -> char {
    let sample: Vec<&str> = text.lines().take(5).collect();
    let count = |c: char| sample.iter().map(|line| line.matches(c).count()).sum::<usize>();

    let comma = count(',');
    let tab = count('\t');
    let pipe = count('|');
    let semicolon = count(';');
    let max = comma.max(tab).max(pipe).max(semicolon);

    if max == 0 || comma == max {
        ','
    } else if tab == max {
        '\t'
    } else if pipe == max {
        '|'
    } else {
        ';'
    }
}

/// The identifier for a new row: the last identifier plus one when it is an
/// integer, otherwise `row_count + 1`.
pub fn next_row_id(last: Option<&str>, row_count: usize) -> String {
    last.and_then(|id| id.trim().parse::<i64>().ok())
        .and_then(|id| id.checked_add(1))
        .map_or_else(|| (row_count + 1).to_string(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(record: &Record) -> Vec<&str> {
        record.values.iter().map(|v| v.value.as_str()).collect()
    }

    #[test]
    fn test_scan_ranges() {
        let records = CsvFormat::new().scan("a,bb\n1,2", None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].range, 0..4);
        assert_eq!(records[0].full_range, 0..5);
        assert!(records[0].has_separator());
        assert_eq!(records[0].values[1].range, 2..4);
        assert_eq!(records[1].full_range, 5..8);
        assert!(!records[1].has_separator());
    }

    #[test]
    fn test_scan_quotes_and_crlf() {
        let text = "\"x,\"\"y\"\"\",z\r\n\"multi\nline\",\r\n";
        let records = CsvFormat::new().scan(text, None).unwrap();
        assert_eq!(values(&records[0]), vec!["x,\"y\"", "z"]);
        assert_eq!(values(&records[1]), vec!["multi\nline", ""]);
        assert_eq!(records[0].full_range.end - records[0].range.end, 2);
    }

    #[test]
    fn test_trailing_separator_yields_empty_field() {
        let records = CsvFormat::new().scan("x,y,", None).unwrap();
        assert_eq!(values(&records[0]), vec!["x", "y", ""]);
        assert_eq!(records[0].values[2].range, 4..4);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = CsvFormat::new().scan("a\nb,\"open\nmore", None).unwrap_err();
        assert!(matches!(err, GridError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_cancelled_scan() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(
            CsvFormat::new().scan("a", Some(&token)),
            Err(GridError::Cancelled)
        ));
    }

    #[test]
    fn test_format_value_quotes_when_needed() {
        let format = CsvFormat::new();
        assert_eq!(format.format_value("plain").unwrap(), "plain");
        assert_eq!(format.format_value("").unwrap(), "");
        assert_eq!(format.format_value("a,b").unwrap(), "\"a,b\"");
        assert_eq!(format.format_value("say \"hi\"").unwrap(), "\"say \"\"hi\"\"\"");
        assert_eq!(
            format
                .format_record(&["1".to_string(), "x\ny".to_string()])
                .unwrap(),
            "1,\"x\ny\""
        );
    }

    #[test]
    fn test_validate() {
        assert!(CsvFormat::new().validate().is_ok());
        assert!(CsvFormat::new().with_separator('"').validate().is_err());
        assert!(CsvFormat::new().with_separator('→').validate().is_err());
    }

    #[test]
    fn test_detect_separator() {
        assert_eq!(detect_separator("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_separator("a;b\n1;2"), ';');
        assert_eq!(detect_separator("a|b"), '|');
        assert_eq!(detect_separator("plain"), ',');
    }

    #[test]
    fn test_next_row_id() {
        assert_eq!(next_row_id(Some("41"), 3), "42");
        assert_eq!(next_row_id(Some("r7"), 3), "4");
        assert_eq!(next_row_id(None, 0), "1");
    }
}
