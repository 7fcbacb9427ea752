//! Cell values, column types and type inference.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::nested::{NestedTable, StaticNestedTable};

/// Default number of values sampled when inferring a column type.
pub const DEFAULT_TYPE_SAMPLE_SIZE: usize = 200;

/// A single cell value.
#[derive(Clone)]
pub enum CellValue {
    /// No value.
    Null,
    /// A boolean.
    Boolean(bool),
    /// A 64-bit integer.
    Integer(i64),
    /// An integer outside the 64-bit range.
    BigInteger(i128),
    /// A floating point number.
    Double(f64),
    /// Text.
    Text(String),
    /// An ordered collection; the values of a hierarchical column group.
    Array(Vec<CellValue>),
    /// A table-valued cell.
    Table(Arc<dyn NestedTable>),
}

impl CellValue {
    /// Returns `true` for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The nested table held by this cell, if any.
    pub fn as_table(&self) -> Option<&Arc<dyn NestedTable>> {
        match self {
            CellValue::Table(table) => Some(table),
            _ => None,
        }
    }

    /// The elements of an array cell, if any.
    pub fn as_array(&self) -> Option<&[CellValue]> {
        match self {
            CellValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// The text of a text cell, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Render the value as text, using `null_text` for nulls.
    pub fn to_text(&self, null_text: &str) -> String {
        match self {
            CellValue::Null => null_text.to_string(),
            other => other.to_string(),
        }
    }

    /// Normalize a semi-structured document value into a cell value.
    ///
    /// - objects become arrays of their values in key order
    /// - arrays whose elements are all objects with the same keys become
    ///   static nested tables with one column per key
    /// - numbers become the narrowest of integer, big integer and double
    pub fn from_json(value: &JsonValue) -> CellValue {
        match value {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    CellValue::BigInteger(i128::from(u))
                } else {
                    CellValue::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => CellValue::Text(s.clone()),
            JsonValue::Object(map) => {
                CellValue::Array(map.values().map(CellValue::from_json).collect())
            }
            JsonValue::Array(items) => match json_table_keys(items) {
                Some(keys) => {
                    let rows = items
                        .iter()
                        .filter_map(JsonValue::as_object)
                        .map(|object| {
                            keys.iter()
                                .map(|key| object.get(key).map_or(CellValue::Null, CellValue::from_json))
                                .collect()
                        })
                        .collect();
                    CellValue::Table(Arc::new(StaticNestedTable::with_inferred_types(keys, rows)))
                }
                None => CellValue::Array(items.iter().map(CellValue::from_json).collect()),
            },
        }
    }
}

/// Keys shared by every element, when the array is a non-empty list of
/// objects of identical shape.
fn json_table_keys(items: &[JsonValue]) -> Option<Vec<String>> {
    let first = items.first()?.as_object()?;
    let keys: Vec<String> = first.keys().cloned().collect();
    let same_shape = items.iter().all(|item| {
        item.as_object()
            .is_some_and(|object| object.len() == keys.len() && keys.iter().all(|k| object.contains_key(k)))
    });
    same_shape.then_some(keys)
}

impl fmt::Debug for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("Null"),
            CellValue::Boolean(b) => write!(f, "Boolean({b})"),
            CellValue::Integer(i) => write!(f, "Integer({i})"),
            CellValue::BigInteger(i) => write!(f, "BigInteger({i})"),
            CellValue::Double(d) => write!(f, "Double({d})"),
            CellValue::Text(s) => write!(f, "Text({s:?})"),
            CellValue::Array(values) => f.debug_tuple("Array").field(values).finish(),
            CellValue::Table(table) => write!(
                f,
                "Table({}x{})",
                table.row_count(),
                table.column_count()
            ),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Boolean(b) => write!(f, "{b}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::BigInteger(i) => write!(f, "{i}"),
            CellValue::Double(d) => write!(f, "{d}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            CellValue::Table(table) => {
                write!(f, "<table {}x{}>", table.row_count(), table.column_count())
            }
        }
    }
}

impl PartialEq for CellValue {
    /// Tables compare by identity; everything else by value.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a == b,
            (CellValue::Integer(a), CellValue::Integer(b)) => a == b,
            (CellValue::BigInteger(a), CellValue::BigInteger(b)) => a == b,
            (CellValue::Double(a), CellValue::Double(b)) => a == b,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Array(a), CellValue::Array(b)) => a == b,
            (CellValue::Table(a), CellValue::Table(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Double(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

/// The logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnType {
    /// Free text; the fallback for anything else.
    #[default]
    String,
    /// 64-bit integers.
    Integer,
    /// Integers beyond the 64-bit range.
    BigInteger,
    /// Floating point numbers.
    Double,
    /// `true` / `false`.
    Boolean,
    /// A group of hierarchical sub-columns.
    Array,
    /// Table-valued cells.
    Table,
}

impl ColumnType {
    /// Human readable type name.
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::BigInteger => "biginteger",
            ColumnType::Double => "double",
            ColumnType::Boolean => "boolean",
            ColumnType::Array => "array",
            ColumnType::Table => "table",
        }
    }

    /// Returns `true` for the numeric types.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::BigInteger | ColumnType::Double)
    }

    /// Parse text under this type. Text that does not parse is kept as text.
    pub fn parse(self, text: &str) -> CellValue {
        let parsed = match self {
            ColumnType::Integer => parse_integer(text).map(CellValue::Integer),
            ColumnType::BigInteger => parse_big_integer(text).map(|i| match i64::try_from(i) {
                Ok(small) => CellValue::Integer(small),
                Err(_) => CellValue::BigInteger(i),
            }),
            ColumnType::Double => parse_double(text).map(CellValue::Double),
            ColumnType::Boolean => parse_boolean(text).map(CellValue::Boolean),
            _ => None,
        };
        parsed.unwrap_or_else(|| CellValue::Text(text.to_string()))
    }

    /// The narrowest type describing a single text value.
    pub fn classify(text: &str) -> ColumnType {
        if parse_boolean(text).is_some() {
            ColumnType::Boolean
        } else if parse_integer(text).is_some() {
            ColumnType::Integer
        } else if parse_big_integer(text).is_some() {
            ColumnType::BigInteger
        } else if parse_double(text).is_some() {
            ColumnType::Double
        } else {
            ColumnType::String
        }
    }

    /// The type of an already typed value, if it has one.
    pub fn of_value(value: &CellValue) -> Option<ColumnType> {
        match value {
            CellValue::Null => None,
            CellValue::Boolean(_) => Some(ColumnType::Boolean),
            CellValue::Integer(_) => Some(ColumnType::Integer),
            CellValue::BigInteger(_) => Some(ColumnType::BigInteger),
            CellValue::Double(_) => Some(ColumnType::Double),
            CellValue::Text(text) => Some(ColumnType::classify(text)),
            CellValue::Array(_) => Some(ColumnType::Array),
            CellValue::Table(_) => Some(ColumnType::Table),
        }
    }

    /// The most specific type compatible with both inputs.
    ///
    /// Numeric types widen `Integer -> BigInteger -> Double`; any other
    /// disagreement falls back to `String`.
    pub fn merge(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (a, b) if a.is_numeric() && b.is_numeric() => {
                if a == Double || b == Double {
                    Double
                } else {
                    BigInteger
                }
            }
            _ => String,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulates observed values and yields the most specific type they share.
#[derive(Debug, Clone, Default)]
pub struct TypeMerger {
    merged: Option<ColumnType>,
    samples: usize,
}

impl TypeMerger {
    /// Create an empty merger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one value. Nulls are ignored.
    pub fn observe(&mut self, value: &CellValue) {
        if let Some(ty) = ColumnType::of_value(value) {
            self.observe_type(ty);
        }
    }

    /// Observe one raw text value. Empty text counts as null.
    pub fn observe_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.observe_type(ColumnType::classify(text));
        }
    }

    fn observe_type(&mut self, ty: ColumnType) {
        self.samples += 1;
        self.merged = Some(match self.merged {
            Some(merged) => merged.merge(ty),
            None => ty,
        });
    }

    /// Number of non-null values observed.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// The merged type; `String` when nothing non-null was observed.
    pub fn result(&self) -> ColumnType {
        self.merged.unwrap_or_default()
    }
}

/// Infer a column type from at most `sample_size` values.
pub fn infer_type<'a>(values: impl IntoIterator<Item = &'a CellValue>, sample_size: usize) -> ColumnType {
    let mut merger = TypeMerger::new();
    for value in values.into_iter().take(sample_size) {
        merger.observe(value);
    }
    merger.result()
}

fn parse_boolean(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    if !looks_integral(text) {
        return None;
    }
    text.parse().ok()
}

fn parse_big_integer(text: &str) -> Option<i128> {
    if !looks_integral(text) {
        return None;
    }
    text.parse().ok()
}

fn parse_double(text: &str) -> Option<f64> {
    let numeric = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && text.chars().any(|c| c.is_ascii_digit());
    if !numeric {
        return None;
    }
    text.parse().ok()
}

fn looks_integral(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
