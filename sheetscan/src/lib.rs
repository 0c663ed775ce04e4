//! # Sheetscan - multi-criteria lookup over spreadsheet tables
//!
//! Sheetscan finds the rows of a table that satisfy every one of a set of
//! per-column comparators (`">=5"`, `"=Food"`, `">2023-01-01"`, `"<>"`) and
//! returns the value of a result column for the k-th match or for all of
//! them, like a `SUMIFS` that returns values.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Lookup    │────▶│   Result    │
//! │  (any enc)  │     │(typed cells)│     │ (one scan)  │     │ value/list  │
//! └─────────────┘     └─────────────┘     └──────┬──────┘     └─────────────┘
//!                                                │ per cell
//!                                         ┌──────▼──────┐
//!                                         │  Criteria   │
//!                                         │ (comparator)│
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use sheetscan::{lookup, CellValue, CriteriaPair, LookupResult, MatchSelector};
//!
//! let items = vec![CellValue::from("coffee"), CellValue::from("rent"), CellValue::from("bagel")];
//! let kinds = vec![CellValue::from("Food"), CellValue::from("Home"), CellValue::from("Food")];
//! let criteria = vec![CriteriaPair::new(kinds, "=Food").unwrap()];
//!
//! let second = lookup(MatchSelector::nth(2), &items, &criteria).unwrap();
//! assert_eq!(second, LookupResult::Match(CellValue::from("bagel")));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Cells, tables, host arguments, selectors and results
//! - [`criteria`] - Comparator parsing and evaluation
//! - [`lookup`] - The multi-criteria scan
//! - [`parser`] - CSV parsing with auto-detection
//! - [`fill`] - Default-date back-fill
//! - [`config`] - Environment configuration
//! - [`logs`] - Leveled stderr logging

// Core modules
pub mod error;
pub mod models;

// Lookup
pub mod criteria;
pub mod lookup;

// Tables
pub mod fill;
pub mod parser;

// Host support
pub mod config;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CliError, ConfigError, LookupError, ScanResult, TableError, TableResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    parse_date,
    Argument,
    CellValue,
    Column,
    LookupResult,
    MatchSelector,
    Range,
    Row,
    Table,
};

// =============================================================================
// Re-exports - Criteria
// =============================================================================

pub use criteria::{
    evaluate, evaluate_row, operators_description, Comparator, Matchable, Operator,
};

// =============================================================================
// Re-exports - Lookup
// =============================================================================

pub use lookup::{lookup, lookup_with, lookupnifs, lookupnifs_with, CriteriaPair, ScanOptions};

// =============================================================================
// Re-exports - Tables
// =============================================================================

pub use fill::{apply_to_records, fill_default_dates, FillColumns, FilledCell};

pub use parser::{
    csv_to_table,
    decode_content,
    detect_delimiter,
    detect_encoding,
    infer_cell,
    parse_bytes_auto,
    parse_csv_file_auto,
    read_records,
    write_records,
    ParseResult,
    RawRecords,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::Settings;
