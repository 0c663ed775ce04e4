//! Domain models shared by the lookup core and the CLI host.
//!
//! - [`CellValue`] - a single spreadsheet cell (text, number, date or empty)
//! - [`Table`] - headers plus rows of cells, as read from a sheet export
//! - [`Argument`] - a dynamically typed host argument (scalar or range)
//! - [`MatchSelector`] - which match(es) a lookup returns
//! - [`LookupResult`] - the outcome of a lookup

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;
use std::num::NonZeroUsize;

use crate::error::{TableError, TableResult};

// =============================================================================
// Cell Values
// =============================================================================

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// Free text.
    Text(String),
    /// Any numeric cell.
    Number(f64),
    /// Date or date-time cell, without time zone.
    Date(NaiveDateTime),
    /// Blank cell.
    #[default]
    Empty,
}

/// A single column of cells, top to bottom.
pub type Column = Vec<CellValue>;

/// A single row of cells, left to right.
pub type Row = Vec<CellValue>;

/// A two-dimensional block of cells as handed over by a spreadsheet host.
pub type Range = Vec<Row>;

impl CellValue {
    /// Shorthand for a text cell.
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Date cell at midnight of the given day.
    pub fn date(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(|d| CellValue::Date(d.and_time(NaiveTime::MIN)))
    }

    /// `true` for empty cells and empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, CellValue::Date(_))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Date(d) if d.time() == NaiveTime::MIN => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Empty => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

/// Render a number the way a sheet displays it in plain text.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

// =============================================================================
// Date Literals
// =============================================================================

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

/// Parse a date literal.
///
/// Accepts ISO dates and date-times, RFC 3339, RFC 2822 and the common
/// `MM/DD/YYYY`, `YYYY/MM/DD` and month-name forms. Zoned inputs are
/// normalized to UTC. Returns `None` for anything else.
pub fn parse_date(literal: &str) -> Option<NaiveDateTime> {
    let s = literal.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(d.and_time(NaiveTime::MIN));
    }

    if let Some(dt) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }

    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.naive_utc())
}

// =============================================================================
// Tables
// =============================================================================

/// A sheet: one header row plus data rows.
///
/// Rows may be ragged; missing trailing cells read as [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, column), `Empty` when the row is too short.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(EMPTY)
    }

    /// Copy one column out of the table.
    pub fn column(&self, index: usize) -> Column {
        (0..self.rows.len())
            .map(|row| self.cell(row, index).clone())
            .collect()
    }

    /// Copy one column as a width-1 range, the shape a sheet hands to custom functions.
    pub fn range(&self, index: usize) -> Range {
        (0..self.rows.len())
            .map(|row| vec![self.cell(row, index).clone()])
            .collect()
    }

    /// Resolve a column reference.
    ///
    /// Tried in order: exact header name, case-insensitive header name,
    /// 1-based index, spreadsheet letters (`A`, `B`, ..., `AA`).
    pub fn column_index(&self, reference: &str) -> TableResult<usize> {
        let reference = reference.trim();

        if let Some(i) = self.headers.iter().position(|h| h == reference) {
            return Ok(i);
        }
        if let Some(i) = self
            .headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(reference))
        {
            return Ok(i);
        }
        if let Ok(n) = reference.parse::<usize>() {
            if n >= 1 {
                return Ok(n - 1);
            }
        }
        if let Some(i) = column_letters_to_index(reference) {
            return Ok(i);
        }

        Err(TableError::UnknownColumn {
            column: reference.to_string(),
            available: self.headers.join(", "),
        })
    }
}

/// `A` -> 0, `Z` -> 25, `AA` -> 26.
pub fn column_letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty()
        || letters.len() > 3
        || !letters.chars().all(|c| c.is_ascii_alphabetic())
    {
        return None;
    }
    let n = letters
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1));
    Some(n - 1)
}

// =============================================================================
// Host Arguments
// =============================================================================

/// A dynamically typed argument, as a spreadsheet host passes it to a custom function.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
    Empty,
    Range(Range),
}

impl From<CellValue> for Argument {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Text(s) => Argument::Text(s),
            CellValue::Number(n) => Argument::Number(n),
            CellValue::Date(d) => Argument::Date(d),
            CellValue::Empty => Argument::Empty,
        }
    }
}

impl From<Range> for Argument {
    fn from(range: Range) -> Self {
        Argument::Range(range)
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::Text(s.to_string())
    }
}

impl From<f64> for Argument {
    fn from(n: f64) -> Self {
        Argument::Number(n)
    }
}

// =============================================================================
// Match Selection
// =============================================================================

/// Which matches a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSelector {
    /// Every matching row, in scan order.
    All,
    /// Only the k-th matching row (1-indexed).
    Nth(NonZeroUsize),
    /// A request no match count can satisfy (negative, fractional or NaN).
    /// The scan runs to completion and yields no match.
    Unreachable,
}

impl MatchSelector {
    /// `0` selects all matches.
    pub fn nth(k: usize) -> Self {
        NonZeroUsize::new(k).map_or(MatchSelector::All, MatchSelector::Nth)
    }

    /// Interpret a numeric `nth_match` argument.
    pub fn from_number(n: f64) -> Self {
        if n == 0.0 {
            MatchSelector::All
        } else if n.fract() == 0.0 && n >= 1.0 && n <= usize::MAX as f64 {
            MatchSelector::nth(n as usize)
        } else {
            MatchSelector::Unreachable
        }
    }

    /// `true` when `count` matches so far means the requested match was just found.
    pub fn is_hit(&self, count: usize) -> bool {
        matches!(self, MatchSelector::Nth(k) if k.get() == count)
    }
}

impl From<usize> for MatchSelector {
    fn from(k: usize) -> Self {
        MatchSelector::nth(k)
    }
}

// =============================================================================
// Lookup Results
// =============================================================================

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult<T> {
    /// The requested k-th match.
    Match(T),
    /// All matches in scan order (see `ScanOptions::empty_placeholder`).
    All(Vec<T>),
    /// Fewer matches than requested. Rendered as the empty string.
    NoMatch,
}

impl<T> LookupResult<T> {
    /// Flatten into a list of values (empty for `NoMatch`).
    pub fn into_vec(self) -> Vec<T> {
        match self {
            LookupResult::Match(v) => vec![v],
            LookupResult::All(vs) => vs,
            LookupResult::NoMatch => Vec::new(),
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, LookupResult::NoMatch)
    }
}

impl<T: Serialize> Serialize for LookupResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LookupResult::Match(v) => v.serialize(serializer),
            LookupResult::All(vs) => {
                let mut seq = serializer.serialize_seq(Some(vs.len()))?;
                for v in vs {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            LookupResult::NoMatch => serializer.serialize_str(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(parse_date("2023-01-15"), Some(expected));
        assert_eq!(parse_date("01/15/2023"), Some(expected));
        assert_eq!(parse_date("2023/01/15"), Some(expected));
        assert_eq!(parse_date("Jan 15 2023"), Some(expected));
        assert_eq!(parse_date("January 15, 2023"), Some(expected));
        assert_eq!(parse_date("2023-01-15T00:00:00Z"), Some(expected));
    }

    #[test]
    fn test_parse_date_with_time() {
        let dt = parse_date("2023-01-15 10:30").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "10:30");
        let dt = parse_date("2023-01-15T10:30:05.250").unwrap();
        assert_eq!(dt.format("%S%.3f").to_string(), "05.250");
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2023-13-45"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(5.0).to_string(), "5");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(CellValue::date(2023, 3, 1).unwrap().to_string(), "2023-03-01");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_serialize() {
        let cells = vec![
            CellValue::text("a"),
            CellValue::Number(3.0),
            CellValue::Number(0.5),
            CellValue::Empty,
        ];
        assert_eq!(serde_json::to_string(&cells).unwrap(), r#"["a",3,0.5,""]"#);
    }

    #[test]
    fn test_lookup_result_serialize() {
        let one: LookupResult<CellValue> = LookupResult::Match("b".into());
        assert_eq!(serde_json::to_string(&one).unwrap(), r#""b""#);
        let none: LookupResult<CellValue> = LookupResult::NoMatch;
        assert_eq!(serde_json::to_string(&none).unwrap(), r#""""#);
        let all = LookupResult::All(vec![CellValue::from("x"), CellValue::from("y")]);
        assert_eq!(serde_json::to_string(&all).unwrap(), r#"["x","y"]"#);
    }

    #[test]
    fn test_match_selector_from_number() {
        assert_eq!(MatchSelector::from_number(0.0), MatchSelector::All);
        assert_eq!(MatchSelector::from_number(2.0), MatchSelector::nth(2));
        assert_eq!(MatchSelector::from_number(1.5), MatchSelector::Unreachable);
        assert_eq!(MatchSelector::from_number(-1.0), MatchSelector::Unreachable);
        assert_eq!(MatchSelector::from_number(f64::NAN), MatchSelector::Unreachable);
        assert!(MatchSelector::nth(2).is_hit(2));
        assert!(!MatchSelector::All.is_hit(1));
    }

    #[test]
    fn test_column_index_resolution() {
        let table = Table::new(
            vec!["Timestamp".into(), "Date Spent".into(), "Amount".into()],
            vec![],
        );
        assert_eq!(table.column_index("Amount").unwrap(), 2);
        assert_eq!(table.column_index("date spent").unwrap(), 1);
        assert_eq!(table.column_index("1").unwrap(), 0);
        assert_eq!(table.column_index("C").unwrap(), 2);
        assert_eq!(column_letters_to_index("AA"), Some(26));
        assert!(table.column_index("no such column!").is_err());
    }

    #[test]
    fn test_ragged_rows_read_empty() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::text("x")], vec![CellValue::text("y"), CellValue::Number(1.0)]],
        );
        assert_eq!(table.column(1), vec![CellValue::Empty, CellValue::Number(1.0)]);
        assert_eq!(table.range(0), vec![vec![CellValue::text("x")], vec![CellValue::text("y")]]);
    }
}
