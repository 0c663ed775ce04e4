//! Multi-criteria lookup (`LOOKUPNIFS`).
//!
//! Similar to `SUMIFS`, but returns values instead of summing them: scan the
//! search range once, keep the rows whose cells satisfy every criteria pair,
//! and return either the k-th match or all of them.
//!
//! Two entry points share the same scan:
//!
//! - [`lookup`] / [`lookup_with`] take typed columns and parsed comparators;
//!   arity and argument kinds hold by construction, only shapes are checked.
//! - [`lookupnifs`] takes the host's flat, dynamically typed argument list
//!   `(nth_match, search_range, criteria_range1, criteria1, ...)` and
//!   validates every position before scanning.
//!
//! # Example
//!
//! ```rust
//! use sheetscan::{lookup, CellValue, CriteriaPair, LookupResult, MatchSelector};
//!
//! let search = vec![CellValue::from("a"), CellValue::from("b"), CellValue::from("c")];
//! let ids = vec![CellValue::from("1"), CellValue::from("2"), CellValue::from("3")];
//! let criteria = vec![CriteriaPair::new(ids, "=2").unwrap()];
//!
//! let result = lookup(MatchSelector::All, &search, &criteria).unwrap();
//! assert_eq!(result, LookupResult::All(vec![CellValue::from("b")]));
//! ```

use crate::criteria::{Comparator, Matchable};
use crate::error::{LookupError, ScanResult};
use crate::models::{Argument, CellValue, LookupResult, MatchSelector, Range};

/// Argument position of the first criteria range (1-indexed).
const FIRST_CRITERIA_POSITION: usize = 3;

// =============================================================================
// Criteria Pairs
// =============================================================================

/// A criteria column and the comparator every row must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaPair<T = CellValue> {
    pub range: Vec<T>,
    pub comparator: Comparator,
}

impl<T> CriteriaPair<T> {
    /// Build a pair, parsing the comparator.
    pub fn new(range: Vec<T>, comparator: &str) -> ScanResult<Self> {
        Ok(Self {
            range,
            comparator: Comparator::parse(comparator)?,
        })
    }

    pub fn with_comparator(range: Vec<T>, comparator: Comparator) -> Self {
        Self { range, comparator }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Result-shaping options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// When collecting all matches finds none, return a single blank value
    /// instead of an empty list. Sheets refuse to render an empty array.
    pub empty_placeholder: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            empty_placeholder: true,
        }
    }
}

impl ScanOptions {
    /// Shape a finished scan's result.
    pub fn apply<T: Matchable>(self, result: LookupResult<T>) -> LookupResult<T> {
        match result {
            LookupResult::All(matches) if matches.is_empty() && self.empty_placeholder => {
                LookupResult::All(vec![T::blank()])
            }
            other => other,
        }
    }
}

// =============================================================================
// Typed Entry Point
// =============================================================================

/// Look up values in `search` for the rows satisfying every criteria pair.
///
/// Fails with [`LookupError::Shape`] if a criteria range is not exactly as
/// long as `search`; nothing is scanned in that case.
pub fn lookup<T: Matchable>(
    selector: MatchSelector,
    search: &[T],
    criteria: &[CriteriaPair<T>],
) -> ScanResult<LookupResult<T>> {
    lookup_with(ScanOptions::default(), selector, search, criteria)
}

/// [`lookup`] with explicit [`ScanOptions`].
pub fn lookup_with<T: Matchable>(
    options: ScanOptions,
    selector: MatchSelector,
    search: &[T],
    criteria: &[CriteriaPair<T>],
) -> ScanResult<LookupResult<T>> {
    for (i, pair) in criteria.iter().enumerate() {
        check_shape(FIRST_CRITERIA_POSITION + 2 * i, search.len(), pair.range.len())?;
    }

    let borrowed: Vec<Criterion<'_, T>> = criteria
        .iter()
        .map(|pair| (pair.range.as_slice(), Ok(&pair.comparator)))
        .collect();

    scan(options, selector, search, &borrowed)
}

fn check_shape(position: usize, expected: usize, actual: usize) -> ScanResult<()> {
    if actual != expected {
        return Err(LookupError::Shape {
            position,
            expected,
            actual,
        });
    }
    Ok(())
}

// =============================================================================
// Host Entry Point
// =============================================================================

/// Host-facing `LOOKUPNIFS(nth_match, search_range, criteria_range1, criteria1, ...)`.
///
/// Validation runs over every argument before the scan:
///
/// 1. at least `nth_match` and `search_range` ([`LookupError::Arity`])
/// 2. criteria arguments come in pairs ([`LookupError::Arity`])
/// 3. `search_range` is a range ([`LookupError::Type`])
/// 4. `nth_match` is a number ([`LookupError::Type`])
/// 5. each criteria range is a range ([`LookupError::Type`]) as long as
///    `search_range` ([`LookupError::Shape`])
/// 6. each criteria is text ([`LookupError::Type`]); a blank cell counts
///    as the empty string
///
/// A criteria without a recognized operator fails with
/// [`LookupError::InvalidComparator`] when the scan first tests a cell
/// against it, so it never fails a call whose scan does not reach it.
///
/// Rows of width 1 are unwrapped to their cell when tested; matches are
/// returned as the search range's rows.
pub fn lookupnifs(args: &[Argument]) -> ScanResult<LookupResult<Vec<CellValue>>> {
    lookupnifs_with(ScanOptions::default(), args)
}

/// [`lookupnifs`] with explicit [`ScanOptions`].
pub fn lookupnifs_with(
    options: ScanOptions,
    args: &[Argument],
) -> ScanResult<LookupResult<Vec<CellValue>>> {
    if args.len() < 2 {
        return Err(LookupError::too_few_arguments());
    }
    if args.len() % 2 == 1 {
        return Err(LookupError::unmatched_criteria_range());
    }

    let search: &Range = match &args[1] {
        Argument::Range(range) => range,
        _ => {
            return Err(LookupError::Type {
                position: 2,
                expected: "an array",
            })
        }
    };
    let nth_match = match &args[0] {
        Argument::Number(n) => *n,
        _ => {
            return Err(LookupError::Type {
                position: 1,
                expected: "a number",
            })
        }
    };

    let mut criteria: Vec<(&[Vec<CellValue>], ScanResult<Comparator>)> =
        Vec::with_capacity(args.len() / 2 - 1);
    for (i, pair) in args[2..].chunks_exact(2).enumerate() {
        let range_position = FIRST_CRITERIA_POSITION + 2 * i;

        let range = match &pair[0] {
            Argument::Range(range) => range,
            _ => {
                return Err(LookupError::Type {
                    position: range_position,
                    expected: "an array",
                })
            }
        };
        check_shape(range_position, search.len(), range.len())?;

        let comparator = match &pair[1] {
            Argument::Text(text) => Comparator::parse(text),
            Argument::Empty => Comparator::parse(""),
            _ => {
                return Err(LookupError::Type {
                    position: range_position + 1,
                    expected: "a string",
                })
            }
        };

        criteria.push((range.as_slice(), comparator));
    }

    let borrowed: Vec<Criterion<'_, Vec<CellValue>>> = criteria
        .iter()
        .map(|(range, comparator)| (*range, comparator.as_ref()))
        .collect();

    scan(
        options,
        MatchSelector::from_number(nth_match),
        search,
        &borrowed,
    )
}

// =============================================================================
// Scan
// =============================================================================

/// A shape-checked criteria column and its comparator, or the error to raise
/// when the comparator is first used.
type Criterion<'a, T> = (&'a [T], Result<&'a Comparator, &'a LookupError>);

/// Single linear scan over shape-checked inputs.
fn scan<T: Matchable>(
    options: ScanOptions,
    selector: MatchSelector,
    search: &[T],
    criteria: &[Criterion<'_, T>],
) -> ScanResult<LookupResult<T>> {
    let mut matches = Vec::new();

    for (row, value) in search.iter().enumerate() {
        if !row_matches(row, criteria)? {
            continue;
        }

        matches.push(value.clone());
        if selector.is_hit(matches.len()) {
            return Ok(LookupResult::Match(value.clone()));
        }
    }

    Ok(match selector {
        MatchSelector::All => options.apply(LookupResult::All(matches)),
        _ => LookupResult::NoMatch,
    })
}

/// AND over the criteria, stopping at the first one the row fails.
fn row_matches<T: Matchable>(row: usize, criteria: &[Criterion<'_, T>]) -> ScanResult<bool> {
    for (range, comparator) in criteria {
        let comparator = comparator.map_err(LookupError::clone)?;
        if !range[row].satisfies(comparator) {
            return Ok(false);
        }
    }
    Ok(true)
}
