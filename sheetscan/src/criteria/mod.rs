//! Comparator parsing and per-cell criteria evaluation.
//!
//! A comparator is an operator token followed by an operand literal, e.g.
//! `">=5"`, `"=Food"` or `"<>"` (not equal to empty). Operators are
//! recognized by prefix in a fixed order so that two-character tokens win
//! over their one-character prefixes:
//!
//! ```text
//! <=   >=   =   <>   <   >
//! ```
//!
//! Date cells compare against the operand parsed as a date. Everything else
//! uses loose comparison: numbers against numeric text, text against text.

pub mod coerce;

use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{LookupError, ScanResult};
use crate::models::{parse_date, CellValue};

use coerce::{compare_text, to_number};

// =============================================================================
// Operators
// =============================================================================

/// Comparison operator of a comparator string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Lte,
    Gte,
    Eq,
    Ne,
    Lt,
    Gt,
}

impl Operator {
    /// Recognition order. Longer tokens precede their prefixes.
    pub const PRECEDENCE: [Operator; 6] = [
        Operator::Lte,
        Operator::Gte,
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Gt,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Lt => "<",
            Operator::Gt => ">",
        }
    }

    /// Split a comparator into its operator and operand literal.
    pub fn split(comparator: &str) -> Option<(Operator, &str)> {
        Self::PRECEDENCE
            .iter()
            .find_map(|op| comparator.strip_prefix(op.token()).map(|rest| (*op, rest)))
    }

    /// Numeric comparison. NaN on either side is false except for `Ne`.
    pub fn eval_numbers(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Operator::Lte => lhs <= rhs,
            Operator::Gte => lhs >= rhs,
            Operator::Eq => lhs == rhs,
            Operator::Ne => lhs != rhs,
            Operator::Lt => lhs < rhs,
            Operator::Gt => lhs > rhs,
        }
    }

    /// Text comparison: exact (in)equality, code-unit ordering.
    pub fn eval_text(self, lhs: &str, rhs: &str) -> bool {
        match self {
            Operator::Eq => lhs == rhs,
            Operator::Ne => lhs != rhs,
            _ => self.eval_ordering(compare_text(lhs, rhs)),
        }
    }

    fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Operator::Lte => ordering != Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Gt => ordering == Ordering::Greater,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// =============================================================================
// Comparators
// =============================================================================

/// A parsed comparator, reusable across every row of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    raw: String,
    operator: Operator,
    operand: String,
    /// Operand as a date, `None` when it does not parse (an invalid date).
    operand_date: Option<NaiveDateTime>,
}

impl Comparator {
    /// Parse a comparator string.
    ///
    /// Fails with [`LookupError::InvalidComparator`] when no operator token
    /// is a prefix of `comparator`. An empty operand is accepted.
    pub fn parse(comparator: &str) -> ScanResult<Self> {
        let (operator, operand) = Operator::split(comparator)
            .ok_or_else(|| LookupError::InvalidComparator(comparator.to_string()))?;

        Ok(Self {
            raw: comparator.to_string(),
            operator,
            operand: operand.to_string(),
            operand_date: parse_date(operand),
        })
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &str {
        &self.operand
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Test a single cell.
    pub fn matches(&self, cell: &CellValue) -> bool {
        match cell {
            CellValue::Date(d) => {
                let rhs = self.operand_date.map_or(f64::NAN, timestamp_millis);
                self.operator.eval_numbers(timestamp_millis(*d), rhs)
            }
            CellValue::Number(n) => self.operator.eval_numbers(*n, to_number(&self.operand)),
            CellValue::Text(s) => self.operator.eval_text(s, &self.operand),
            CellValue::Empty => self.operator.eval_text("", &self.operand),
        }
    }

    /// Test one row of a host range.
    ///
    /// A single-cell row is unwrapped to its cell. Any other row compares as
    /// its cells joined with `,`.
    pub fn matches_row(&self, row: &[CellValue]) -> bool {
        match row {
            [cell] => self.matches(cell),
            cells => {
                let joined = cells
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                self.matches(&CellValue::Text(joined))
            }
        }
    }
}

impl FromStr for Comparator {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Comparator::parse(s)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn timestamp_millis(d: NaiveDateTime) -> f64 {
    d.and_utc().timestamp_millis() as f64
}

// =============================================================================
// Evaluation
// =============================================================================

/// Anything a comparator can be tested against during a scan.
///
/// Implemented for plain cells (typed columns) and for host range rows.
pub trait Matchable: Clone {
    /// Value standing in for "nothing" in result sets.
    fn blank() -> Self;

    fn satisfies(&self, comparator: &Comparator) -> bool;
}

impl Matchable for CellValue {
    fn blank() -> Self {
        CellValue::Text(String::new())
    }

    fn satisfies(&self, comparator: &Comparator) -> bool {
        comparator.matches(self)
    }
}

impl Matchable for Vec<CellValue> {
    fn blank() -> Self {
        vec![CellValue::blank()]
    }

    fn satisfies(&self, comparator: &Comparator) -> bool {
        comparator.matches_row(self)
    }
}

/// Evaluate one cell against one comparator string.
pub fn evaluate(cell: &CellValue, comparator: &str) -> ScanResult<bool> {
    Ok(Comparator::parse(comparator)?.matches(cell))
}

/// Evaluate one host range row against one comparator string.
pub fn evaluate_row(row: &[CellValue], comparator: &str) -> ScanResult<bool> {
    Ok(Comparator::parse(comparator)?.matches_row(row))
}

/// Describe the comparator grammar for `sheetscan operators`.
pub fn operators_description() -> String {
    r#"Comparator grammar: <operator><operand>

| Operator | Meaning               | Example     |
|----------|-----------------------|-------------|
| <=       | less than or equal    | <=100       |
| >=       | greater than or equal | >=2023-01-01|
| =        | equal (loose)         | =Food       |
| <>       | not equal (loose)     | <>          |
| <        | less than             | <5          |
| >        | greater than          | >0          |

Operators are matched by prefix in the order <=, >=, =, <>, <, >.
An empty operand is allowed: "<>" keeps non-empty cells, "=" keeps empty ones.

Date cells compare against the operand parsed as a date
(2023-01-15, 2023-01-15T10:30, 01/15/2023, Jan 15 2023, RFC 3339/2822).
An unparseable date operand matches nothing, except with <> which matches everything.

Number cells compare numerically against the operand ("5" = 5, "" = 0).
Text and empty cells compare as text."#
        .to_string()
}
