//! Sheetscan CLI - multi-criteria lookups and date back-fill on CSV sheet exports
//!
//! ```bash
//! sheetscan lookup spending.csv --search Item --where Category =Food --where Amount ">=5"
//! sheetscan lookup spending.csv --search Item --nth 2 --where "Date Spent" ">2023-01-01"
//! sheetscan fill spending.csv -o filled.csv
//! sheetscan parse spending.csv
//! sheetscan operators
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use sheetscan::config::parse_delimiter;
use sheetscan::error::CliResult;
use sheetscan::logs::{
    self, log_error, log_info, log_info_indent, log_success, log_warning, LogLevel,
};
use sheetscan::{
    apply_to_records, fill_default_dates, lookup_with, operators_description,
    parse_csv_file_auto, write_records, CellValue, CriteriaPair, FillColumns, LookupResult,
    MatchSelector, ParseResult, ScanOptions, Settings,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetscan")]
#[command(about = "Multi-criteria lookups over spreadsheet CSV exports", long_about = None)]
struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long, global = true, value_parser = parse_delimiter)]
    delimiter: Option<char>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One value per line
    Text,
    /// JSON scalar or array
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output the typed table as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Return values of the search column for rows matching every criterion
    Lookup {
        /// Input CSV file
        input: PathBuf,

        /// Column whose values are returned (header, letter or 1-based index)
        #[arg(short, long)]
        search: String,

        /// Which match to return (0 = all matches)
        #[arg(short, long, default_value_t = 0)]
        nth: usize,

        /// Criterion: a column and a comparator such as ">=5", "=Food" or "<>"
        #[arg(
            short = 'w',
            long = "where",
            num_args = 2,
            value_names = ["COLUMN", "COMPARATOR"],
            allow_hyphen_values = true
        )]
        criteria: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Return an empty list instead of a single blank when nothing matches
        #[arg(long)]
        no_placeholder: bool,
    },

    /// Fill blank date cells from the timestamp column
    Fill {
        /// Input CSV file
        input: PathBuf,

        /// Timestamp column (default: first column)
        #[arg(long)]
        timestamp: Option<String>,

        /// Date column to fill (default: second column)
        #[arg(long)]
        date: Option<String>,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the comparator grammar
    Operators,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = Settings::from_env()
        .map_err(Into::into)
        .and_then(|mut settings| {
            if cli.quiet {
                settings.log_level = LogLevel::Warning;
            }
            if cli.delimiter.is_some() {
                settings.delimiter = cli.delimiter;
            }
            logs::LOGGER.set_level(settings.log_level);
            run(cli.command, &settings)
        });

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn run(command: Commands, settings: &Settings) -> CliResult<()> {
    match command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref(), settings),

        Commands::Lookup {
            input,
            search,
            nth,
            criteria,
            format,
            no_placeholder,
        } => {
            let mut settings = settings.clone();
            if no_placeholder {
                settings.empty_placeholder = false;
            }
            cmd_lookup(&input, &search, nth, &criteria, format, &settings)
        }

        Commands::Fill {
            input,
            timestamp,
            date,
            output,
        } => cmd_fill(
            &input,
            timestamp.as_deref(),
            date.as_deref(),
            output.as_deref(),
            settings,
        ),

        Commands::Operators => {
            println!("{}", operators_description());
            Ok(())
        }
    }
}

fn read_table(input: &Path, settings: &Settings) -> CliResult<ParseResult> {
    log_info(format!("📄 Reading {}", input.display()));

    let result = parse_csv_file_auto(input, settings.delimiter)?;

    log_info_indent(format!("Encoding: {}", result.encoding), 1);
    log_info_indent(
        format!(
            "Delimiter: '{}'{}",
            format_delimiter(result.delimiter),
            if settings.delimiter.is_none() { " (auto-detected)" } else { "" }
        ),
        1,
    );
    log_info_indent(format!("Columns: {}", result.table.headers.join(", ")), 1);
    log_success(format!("Read {} rows", result.table.row_count()));

    Ok(result)
}

fn cmd_parse(input: &Path, output: Option<&Path>, settings: &Settings) -> CliResult<()> {
    let result = read_table(input, settings)?;
    let table = &result.table;

    let mut records = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let mut record = serde_json::Map::new();
        for (col, header) in table.headers.iter().enumerate() {
            record.insert(header.clone(), serde_json::to_value(table.cell(row, col))?);
        }
        records.push(serde_json::Value::Object(record));
    }

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)
}

fn cmd_lookup(
    input: &Path,
    search: &str,
    nth: usize,
    criteria: &[String],
    format: OutputFormat,
    settings: &Settings,
) -> CliResult<()> {
    let result = read_table(input, settings)?;
    let table = &result.table;

    let search_column = table.column(table.column_index(search)?);

    let pairs = criteria
        .chunks_exact(2)
        .map(|pair| -> CliResult<CriteriaPair> {
            let column = table.column_index(&pair[0])?;
            Ok(CriteriaPair::new(table.column(column), &pair[1])?)
        })
        .collect::<CliResult<Vec<_>>>()?;

    for pair in criteria.chunks_exact(2) {
        log_info_indent(format!("Where {} {}", pair[0], pair[1]), 1);
    }

    let selector = MatchSelector::nth(nth);
    let exact = ScanOptions {
        empty_placeholder: false,
    };
    let found = lookup_with(exact, selector, &search_column, &pairs)?;

    match &found {
        LookupResult::Match(_) => log_success(format!("Found match #{}", nth)),
        LookupResult::All(values) => log_success(format!("{} matching rows", values.len())),
        LookupResult::NoMatch => log_warning(format!("Fewer than {} matching rows", nth)),
    }
    let found = settings.scan_options().apply(found);

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&found)?,
        OutputFormat::Text => render_text(&found),
    };
    write_output(&rendered, None)
}

fn render_text(result: &LookupResult<CellValue>) -> String {
    match result {
        LookupResult::Match(value) => value.to_string(),
        LookupResult::All(values) => values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        LookupResult::NoMatch => String::new(),
    }
}

fn cmd_fill(
    input: &Path,
    timestamp: Option<&str>,
    date: Option<&str>,
    output: Option<&Path>,
    settings: &Settings,
) -> CliResult<()> {
    let ParseResult {
        mut table,
        mut records,
        delimiter,
        ..
    } = read_table(input, settings)?;

    let defaults = FillColumns::default();
    let columns = FillColumns {
        timestamp: timestamp
            .map(|c| table.column_index(c))
            .transpose()?
            .unwrap_or(defaults.timestamp),
        date: date
            .map(|c| table.column_index(c))
            .transpose()?
            .unwrap_or(defaults.date),
    };

    let filled = fill_default_dates(&mut table, columns);
    apply_to_records(&mut records, columns, &filled);
    if filled.is_empty() {
        log_info("No blank dates to fill");
    } else {
        log_success(format!("Filled {} blank dates", filled.len()));
        for cell in filled.iter().take(5) {
            // +2: 1-based, after the header row
            log_info_indent(format!("Row {}: {}", cell.row + 2, cell.value), 1);
        }
    }

    match output {
        Some(path) => {
            let file = fs::File::create(path)?;
            write_records(&records, file, delimiter)?;
            log_success(format!("💾 Output written to: {}", path.display()));
        }
        None => {
            let stdout = std::io::stdout();
            write_records(&records, stdout.lock(), delimiter)?;
        }
    }
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log_success(format!("💾 Output written to: {}", p.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", content)?;
        }
    }
    Ok(())
}
