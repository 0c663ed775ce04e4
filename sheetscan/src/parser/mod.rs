//! CSV to [`Table`] parser with encoding and delimiter auto-detection.
//!
//! Sheet exports arrive in whatever encoding and separator the user's locale
//! produced. The first row is the header row; every other cell is typed by
//! [`infer_cell`]. The untyped field text is kept alongside as
//! [`RawRecords`] so a table can be written back without rewriting cells
//! nobody changed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::Path;

use crate::error::{TableError, TableResult};
use crate::models::{parse_date, CellValue, Table};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("valid number regex")
});

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed table
    pub table: Table,
    /// Field text as read, row for row with `table`
    pub records: RawRecords,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Type a raw CSV field: blank, number, date, or text.
pub fn infer_cell(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() {
        return CellValue::Empty;
    }
    if NUMBER_RE.is_match(s) {
        if let Ok(n) = s.parse::<f64>() {
            return CellValue::Number(n);
        }
    }
    if let Some(d) = parse_date(s) {
        return CellValue::Date(d);
    }
    CellValue::Text(s.to_string())
}

/// CSV fields exactly as read: unquoted, but not trimmed or typed.
///
/// Blank records are dropped, so `rows[i]` is the source of `Table::rows[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecords {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawRecords {
    /// Overwrite one field, padding a short row with empty fields.
    pub fn set_field(&mut self, row: usize, column: usize, value: String) {
        if let Some(fields) = self.rows.get_mut(row) {
            if fields.len() <= column {
                fields.resize(column + 1, String::new());
            }
            fields[column] = value;
        }
    }

    pub fn field(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Type every field into a [`Table`].
    pub fn to_table(&self) -> Table {
        let headers = self.headers.iter().map(|h| h.trim().to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|fields| fields.iter().map(|f| infer_cell(f)).collect())
            .collect();
        Table::new(headers, rows)
    }
}

fn delimiter_byte(delimiter: char) -> TableResult<u8> {
    u8::try_from(delimiter).map_err(|_| TableError::InvalidDelimiter(delimiter))
}

/// Parse CSV text with an explicit delimiter.
///
/// # Example
/// ```
/// use sheetscan::{csv_to_table, CellValue};
///
/// let table = csv_to_table("item,amount\ncoffee,3.5", ',').unwrap();
/// assert_eq!(table.headers, vec!["item", "amount"]);
/// assert_eq!(table.rows[0][1], CellValue::Number(3.5));
/// ```
pub fn csv_to_table(content: &str, delimiter: char) -> TableResult<Table> {
    Ok(read_records(content, delimiter)?.to_table())
}

/// Read CSV text into untyped records, skipping blank lines.
pub fn read_records(content: &str, delimiter: char) -> TableResult<RawRecords> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TableError::EmptyFile);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawRecords { headers, rows })
}

/// Parse CSV bytes, detecting encoding and (unless given) the delimiter.
pub fn parse_bytes_auto(bytes: &[u8], delimiter: Option<char>) -> TableResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let content = content.trim_start_matches('\u{feff}');
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(content));

    let records = read_records(content, delimiter)?;

    Ok(ParseResult {
        table: records.to_table(),
        records,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection.
pub fn parse_csv_file_auto<P: AsRef<Path>>(
    path: P,
    delimiter: Option<char>,
) -> TableResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes, delimiter)
}

/// Write records (header row first) as CSV, quoting only where needed.
pub fn write_records<W: Write>(
    records: &RawRecords,
    writer: W,
    delimiter: char,
) -> TableResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .flexible(true)
        .from_writer(writer);

    writer.write_record(&records.headers)?;
    for row in &records.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
