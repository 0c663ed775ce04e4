use sheetscan::{
    apply_to_records, fill_default_dates, lookup, lookupnifs, parse_csv_file_auto,
    write_records, Argument, CellValue, CriteriaPair, FillColumns, LookupError, LookupResult,
    MatchSelector,
};
use std::fs;
use tempfile::tempdir;

const SPENDING: &str = "\
Timestamp;Date Spent;Item;Category;Amount
2023-01-03 08:12:00;2023-01-02;Coffee;Food;3.5
2023-01-05 19:40:00;;Groceries;Food;54.2
2023-01-07 10:00:00;2023-01-07;Rent;Home;900
2023-02-01 12:30:00;2023-01-31;Bagel;Food;2.75
2023-02-02 09:05:00;;Lamp;Home;35
";

fn write_spending(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("spending.csv");
    fs::write(&path, SPENDING).unwrap();
    path
}

#[test]
fn test_lookup_on_parsed_file() {
    let dir = tempdir().unwrap();
    let parsed = parse_csv_file_auto(write_spending(&dir), None).unwrap();
    let table = parsed.table;

    assert_eq!(parsed.delimiter, ';');
    assert_eq!(table.row_count(), 5);

    let items = table.column(table.column_index("Item").unwrap());
    let criteria = vec![
        CriteriaPair::new(table.column(table.column_index("Category").unwrap()), "=Food").unwrap(),
        CriteriaPair::new(table.column(table.column_index("Amount").unwrap()), "<10").unwrap(),
    ];

    assert_eq!(
        lookup(MatchSelector::All, &items, &criteria).unwrap(),
        LookupResult::All(vec![CellValue::from("Coffee"), CellValue::from("Bagel")])
    );
    assert_eq!(
        lookup(MatchSelector::nth(2), &items, &criteria).unwrap(),
        LookupResult::Match(CellValue::from("Bagel"))
    );
    assert_eq!(
        lookup(MatchSelector::nth(3), &items, &criteria).unwrap(),
        LookupResult::NoMatch
    );
}

#[test]
fn test_date_criteria_on_parsed_file() {
    let dir = tempdir().unwrap();
    let table = parse_csv_file_auto(write_spending(&dir), None).unwrap().table;

    let items = table.column(table.column_index("C").unwrap());
    // blank dates compare as text: "" > "2023-01-05" is false
    let criteria = vec![CriteriaPair::new(table.column(1), ">2023-01-05").unwrap()];

    assert_eq!(
        lookup(MatchSelector::All, &items, &criteria).unwrap(),
        LookupResult::All(vec![CellValue::from("Rent"), CellValue::from("Bagel")])
    );
}

#[test]
fn test_lookupnifs_on_sheet_ranges() {
    let dir = tempdir().unwrap();
    let table = parse_csv_file_auto(write_spending(&dir), None).unwrap().table;

    let args = vec![
        Argument::Number(0.0),
        Argument::Range(table.range(2)),
        Argument::Range(table.range(3)),
        Argument::from("=Home"),
        Argument::Range(table.range(4)),
        Argument::from(">100"),
    ];
    assert_eq!(
        lookupnifs(&args).unwrap(),
        LookupResult::All(vec![vec![CellValue::from("Rent")]])
    );

    let mut short = table.range(4);
    short.pop();
    let args = vec![
        Argument::Number(1.0),
        Argument::Range(table.range(2)),
        Argument::Range(short),
        Argument::from(">0"),
    ];
    assert!(matches!(
        lookupnifs(&args),
        Err(LookupError::Shape { position: 3, expected: 5, actual: 4 })
    ));
}

#[test]
fn test_fill_round_trip() {
    let dir = tempdir().unwrap();
    let parsed = parse_csv_file_auto(write_spending(&dir), None).unwrap();
    let mut table = parsed.table;
    let mut records = parsed.records;

    let filled = fill_default_dates(&mut table, FillColumns::default());
    assert_eq!(filled.iter().map(|f| f.row).collect::<Vec<_>>(), vec![1, 4]);
    apply_to_records(&mut records, FillColumns::default(), &filled);

    let out_path = dir.path().join("filled.csv");
    write_records(&records, fs::File::create(&out_path).unwrap(), parsed.delimiter).unwrap();

    let written = fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("2023-01-05 19:40:00;2023-01-05 19:40:00;Groceries"));
    assert!(written.contains("2023-02-02 09:05:00;2023-02-02 09:05:00;Lamp"));
    assert!(written.contains("2023-01-03 08:12:00;2023-01-02;Coffee"));

    let reparsed = parse_csv_file_auto(&out_path, None).unwrap().table;
    assert_eq!(reparsed, table);
    assert!(fill_default_dates(&mut table, FillColumns::default()).is_empty());
}

#[test]
fn test_fill_only_changes_filled_cells() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("codes.csv");
    let source = "Timestamp,Date Spent,Code,Note,When\n\
                  2023-01-05 19:40:00,,007,  padded,01/15/2023\n\
                  2023-01-06 08:00:00,2023-01-06,1e3,\"a, b\",\n";
    fs::write(&path, source).unwrap();

    let parsed = parse_csv_file_auto(&path, None).unwrap();
    let mut table = parsed.table;
    let mut records = parsed.records;

    let filled = fill_default_dates(&mut table, FillColumns::default());
    apply_to_records(&mut records, FillColumns::default(), &filled);

    let mut out = Vec::new();
    write_records(&records, &mut out, parsed.delimiter).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Timestamp,Date Spent,Code,Note,When\n\
         2023-01-05 19:40:00,2023-01-05 19:40:00,007,  padded,01/15/2023\n\
         2023-01-06 08:00:00,2023-01-06,1e3,\"a, b\",\n"
    );
}
