//! Default-date back-fill.
//!
//! Spending sheets fed by a form carry a `Timestamp` column (when the entry
//! was submitted) and a `Date Spent` column the user may leave blank. Blank
//! dates default to the submission timestamp.
//!
//! [`fill_default_dates`] decides on the typed table; [`apply_to_records`]
//! mirrors those fills onto the field text read from the file, so writing the
//! sheet back changes the filled cells and nothing else.

use serde::Serialize;

use crate::models::{CellValue, Table};
use crate::parser::RawRecords;

/// Which columns to read from and write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FillColumns {
    pub timestamp: usize,
    pub date: usize,
}

impl Default for FillColumns {
    /// Timestamp in the first column, date spent in the second.
    fn default() -> Self {
        Self {
            timestamp: 0,
            date: 1,
        }
    }
}

/// A single filled cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledCell {
    /// Data row index (0-based, header excluded).
    pub row: usize,
    pub value: CellValue,
}

/// Copy the timestamp into every blank date cell whose timestamp is set.
///
/// Rows too short to hold the date column are padded with empty cells first.
/// Returns the cells that were written, in row order.
pub fn fill_default_dates(table: &mut Table, columns: FillColumns) -> Vec<FilledCell> {
    let mut filled = Vec::new();

    for (row_idx, row) in table.rows.iter_mut().enumerate() {
        let timestamp = row.get(columns.timestamp).cloned().unwrap_or_default();
        let date_blank = row.get(columns.date).map_or(true, CellValue::is_blank);

        if !date_blank || timestamp.is_blank() {
            continue;
        }

        if row.len() <= columns.date {
            row.resize(columns.date + 1, CellValue::Empty);
        }
        row[columns.date] = timestamp.clone();
        filled.push(FilledCell {
            row: row_idx,
            value: timestamp,
        });
    }

    filled
}

/// Copy each filled row's timestamp field text into its date field.
///
/// `filled` must come from the table `records` was typed into.
pub fn apply_to_records(records: &mut RawRecords, columns: FillColumns, filled: &[FilledCell]) {
    for cell in filled {
        let Some(stamp) = records.field(cell.row, columns.timestamp) else {
            continue;
        };
        let stamp = stamp.to_string();
        records.set_field(cell.row, columns.date, stamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp(day: u32) -> CellValue {
        CellValue::Date(
            NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap(),
        )
    }

    fn spending_table() -> Table {
        Table::new(
            vec!["Timestamp".into(), "Date Spent".into(), "Amount".into()],
            vec![
                vec![stamp(1), CellValue::Empty, CellValue::Number(12.0)],
                vec![stamp(2), CellValue::date(2024, 2, 28).unwrap(), CellValue::Number(3.5)],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Number(1.0)],
                vec![stamp(4), CellValue::text(""), CellValue::Number(7.0)],
            ],
        )
    }

    #[test]
    fn test_fill_blank_dates() {
        let mut table = spending_table();
        let filled = fill_default_dates(&mut table, FillColumns::default());

        assert_eq!(filled.iter().map(|f| f.row).collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(table.rows[0][1], stamp(1));
        assert_eq!(table.rows[3][1], stamp(4));
    }

    #[test]
    fn test_existing_dates_untouched() {
        let mut table = spending_table();
        fill_default_dates(&mut table, FillColumns::default());

        assert_eq!(table.rows[1][1], CellValue::date(2024, 2, 28).unwrap());
        assert_eq!(table.rows[2][1], CellValue::Empty);
    }

    #[test]
    fn test_short_rows_padded() {
        let mut table = Table::new(vec!["Timestamp".into()], vec![vec![stamp(5)]]);
        let filled = fill_default_dates(&mut table, FillColumns::default());

        assert_eq!(filled.len(), 1);
        assert_eq!(table.rows[0], vec![stamp(5), stamp(5)]);
    }

    #[test]
    fn test_records_keep_untouched_text() {
        let csv = "Timestamp,Date Spent,Code,Note,When\n\
                   2023-01-05 19:40:00,,007,  padded,01/15/2023\n\
                   01/06/2023,01/06/2023,1e3,x,\n";
        let mut records = crate::parser::read_records(csv, ',').unwrap();
        let mut table = records.to_table();

        let filled = fill_default_dates(&mut table, FillColumns::default());
        apply_to_records(&mut records, FillColumns::default(), &filled);

        let mut out = Vec::new();
        crate::parser::write_records(&records, &mut out, ',').unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Timestamp,Date Spent,Code,Note,When\n\
             2023-01-05 19:40:00,2023-01-05 19:40:00,007,  padded,01/15/2023\n\
             01/06/2023,01/06/2023,1e3,x,\n"
        );
    }

    #[test]
    fn test_records_short_row_padded() {
        let mut records = crate::parser::read_records("Timestamp,Date\n 3/4/2024 ", ',').unwrap();
        let mut table = records.to_table();

        let filled = fill_default_dates(&mut table, FillColumns::default());
        apply_to_records(&mut records, FillColumns::default(), &filled);

        assert_eq!(records.rows[0], vec![" 3/4/2024 ", " 3/4/2024 "]);
    }

    #[test]
    fn test_custom_columns() {
        let mut table = Table::new(
            vec!["Date".into(), "Submitted".into()],
            vec![vec![CellValue::Empty, stamp(6)]],
        );
        let filled = fill_default_dates(&mut table, FillColumns { timestamp: 1, date: 0 });

        assert_eq!(filled.len(), 1);
        assert_eq!(table.rows[0][0], stamp(6));
    }
}
