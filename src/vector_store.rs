//! # VectorStore
//!
//! In-memory word → vector table built from a text embeddings file.
//!
//! Each line of the source has the shape `<word>, <num>, <num>, ...`. Lines are
//! parsed concurrently, one task per line, through the
//! [`ConcurrencyHarness`](crate::harness::ConcurrencyHarness). Once every task
//! has joined, the parsed records are folded into the table in line order and
//! the store is handed out; it is never written again, so any number of readers
//! may share it (typically behind an [`Arc`](std::sync::Arc)).
//!
//! ## Record policy
//! - Fewer than two fields (or an empty word): skipped, counted as malformed.
//! - A vector field that is not a finite number, or a line that is not valid
//!   UTF-8: that record is skipped and logged; the load continues.
//! - Duplicate words: the **first** occurrence (lowest line number) wins; later
//!   ones are counted in [`LoadReport::duplicates`].
//! - The dimension is whatever the first valid record has. Later records are
//!   not checked against it.
//!
//! ## Quick Example
//! ```no_run
//! use synonym_swap::harness::ConcurrencyHarness;
//! use synonym_swap::vector_store::VectorStore;
//!
//! # async fn demo() -> synonym_swap::error::Result<()> {
//! let source = std::io::Cursor::new("king, 1, 0\nqueen, 0.9, 0.1\n");
//! let (store, report) = VectorStore::load(source, &ConcurrencyHarness::default()).await?;
//! assert_eq!(store.size(), 2);
//! assert_eq!(report.loaded, 2);
//! # Ok(()) }
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::BufRead;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{ParseError, ParseErrorKind, Result};
use crate::harness::ConcurrencyHarness;

/// Field separator: a comma followed by optional whitespace.
static FIELD_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*").expect("static separator pattern is valid"));

/// Outcome of a load: what was kept and what was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Lines read from the source.
    pub lines: usize,
    /// Records inserted into the store.
    pub loaded: usize,
    /// Later occurrences of an already-loaded word.
    pub duplicates: usize,
    /// Every skipped record, in line order.
    pub skipped: Vec<ParseError>,
}

impl LoadReport {
    pub fn malformed(&self) -> usize {
        self.skipped.iter().filter(|e| e.is_malformed()).count()
    }

    pub fn unparsable(&self) -> usize {
        self.skipped.len() - self.malformed()
    }
}

/// Read-only word → vector table.
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    entries: HashMap<String, Vec<f64>>,
    dimension: Option<usize>,
}

impl VectorStore {
    /// Load a store from an already-open embeddings source.
    ///
    /// Lines are read sequentially, parsed one task per line, and joined before
    /// this returns, so no caller ever sees a partially populated store.
    ///
    /// # Errors
    /// - [`SwapError::Io`](crate::error::SwapError::Io) if the source cannot be read.
    /// - A task error from the harness if a parse task panics.
    ///
    /// Bad records are **not** errors; see [`LoadReport::skipped`].
    pub async fn load<R: BufRead>(
        source: R,
        harness: &ConcurrencyHarness,
    ) -> Result<(Self, LoadReport)> {
        let lines = read_raw_lines(source)?;
        debug!("Read {} embedding lines", lines.len());

        let parsed = harness
            .run(lines, |index, bytes| Ok(decode_record(index + 1, bytes)))
            .await?;

        let (store, report) = Self::from_parsed(parsed);

        info!(
            "Embeddings loaded: {} words, dimension {:?}, {} skipped, {} duplicates",
            report.loaded,
            store.dimension,
            report.skipped.len(),
            report.duplicates
        );
        Ok((store, report))
    }

    /// Build a store directly from `(word, vector)` pairs, first occurrence wins.
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let parsed = records
            .into_iter()
            .map(|(word, vector)| Ok((word.into(), vector)));
        Self::from_parsed(parsed).0
    }

    /// Fold parsed records into a store in their given (line) order.
    fn from_parsed<I>(parsed: I) -> (Self, LoadReport)
    where
        I: IntoIterator<Item = std::result::Result<(String, Vec<f64>), ParseError>>,
    {
        let mut store = Self::default();
        let mut report = LoadReport::default();

        for record in parsed {
            report.lines += 1;
            match record {
                Ok((word, vector)) => match store.entries.entry(word) {
                    Entry::Occupied(existing) => {
                        debug!("Duplicate embedding for {:?} ignored", existing.key());
                        report.duplicates += 1;
                    }
                    Entry::Vacant(slot) => {
                        store.dimension.get_or_insert(vector.len());
                        slot.insert(vector);
                        report.loaded += 1;
                    }
                },
                Err(skipped) => {
                    warn!("Skipping embedding record: {}", skipped);
                    report.skipped.push(skipped);
                }
            }
        }
        (store, report)
    }

    /// The vector for `word`, or `None` when it is not in the store.
    pub fn get(&self, word: &str) -> Option<&[f64]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of the first valid record loaded, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Iterate over all `(word, vector)` entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entries
            .iter()
            .map(|(word, vector)| (word.as_str(), vector.as_slice()))
    }
}

/// Split the source into raw lines without the `\n` / `\r\n` terminator.
///
/// Bytes are not decoded here, so an undecodable line only fails its own record.
fn read_raw_lines<R: BufRead>(mut source: R) -> std::io::Result<Vec<Vec<u8>>> {
    let mut lines = Vec::new();
    loop {
        let mut line = Vec::new();
        if source.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Decode one raw line as UTF-8 and parse it. `line_no` is 1-based.
fn decode_record(line_no: usize, bytes: Vec<u8>) -> std::result::Result<(String, Vec<f64>), ParseError> {
    match String::from_utf8(bytes) {
        Ok(line) => parse_record(line_no, &line),
        Err(_) => Err(ParseError {
            line: line_no,
            kind: ParseErrorKind::InvalidUtf8,
        }),
    }
}

/// Parse one `<word>, <num>, ...` line. `line_no` is 1-based.
fn parse_record(line_no: usize, line: &str) -> std::result::Result<(String, Vec<f64>), ParseError> {
    let mut fields = FIELD_SEPARATOR.split(line).map(str::trim);
    let word = fields.next().unwrap_or_default();
    let values: Vec<&str> = fields.collect();

    if word.is_empty() || values.is_empty() {
        return Err(ParseError {
            line: line_no,
            kind: ParseErrorKind::Malformed,
        });
    }

    let vector = values
        .iter()
        .enumerate()
        .map(|(i, raw)| match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ParseError {
                line: line_no,
                kind: ParseErrorKind::NotANumber {
                    field: i + 1,
                    value: (*raw).to_string(),
                },
            }),
        })
        .collect::<std::result::Result<Vec<f64>, ParseError>>()?;

    Ok((word.to_string(), vector))
}
