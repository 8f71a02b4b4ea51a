//! # Vocabulary filtering
//!
//! Restricts substitution to a list of words of interest (for example a list
//! of the most common English words). A word from the list enters the
//! [`VocabularySubset`] only if the [`VectorStore`] has a vector for it; misses
//! are excluded, reported to an optional callback and, with debugging on,
//! logged.
//!
//! The same list can instead be turned straight into a synonym table with
//! [`synonym_table`], which resolves every listed word and skips document
//! processing entirely.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::harness::{ConcurrencyHarness, ProgressHook};
use crate::resolver::NeighborResolver;
use crate::vector_store::VectorStore;

/// Callback told about each listed word that has no vector.
pub type MissHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Read a word list: one word per line, trimmed, blank lines ignored.
pub fn read_word_list<R: BufRead>(source: R) -> Result<Vec<String>> {
    let mut words = Vec::new();
    for line in source.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

/// Words from a vocabulary list that the store knows, with their vectors.
#[derive(Debug, Clone, Default)]
pub struct VocabularySubset {
    entries: HashMap<String, Vec<f64>>,
    excluded: Vec<String>,
}

impl VocabularySubset {
    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<&[f64]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Listed words dropped because the store had no vector for them, in list order.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }
}

/// Cross-references a word list against a finalized [`VectorStore`].
pub struct VocabularyFilter<'a> {
    store: &'a VectorStore,
    on_miss: Option<MissHook>,
    debug: bool,
}

impl<'a> VocabularyFilter<'a> {
    pub fn new(store: &'a VectorStore) -> Self {
        Self {
            store,
            on_miss: None,
            debug: false,
        }
    }

    pub fn with_miss_hook(mut self, hook: MissHook) -> Self {
        self.on_miss = Some(hook);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the subset of `words` that the store has vectors for.
    pub fn filter<I, S>(&self, words: I) -> VocabularySubset
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut subset = VocabularySubset::default();
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() || subset.contains(word) {
                continue;
            }
            match self.store.get(word) {
                Some(vector) => {
                    subset.entries.insert(word.to_string(), vector.to_vec());
                }
                None => {
                    if self.debug {
                        info!("No embedding found for word: {}", word);
                    }
                    if let Some(hook) = &self.on_miss {
                        hook(word);
                    }
                    subset.excluded.push(word.to_string());
                }
            }
        }
        debug!(
            "Vocabulary subset: {} words kept, {} excluded",
            subset.len(),
            subset.excluded.len()
        );
        subset
    }
}

/// Resolve every listed word, one task per word, keeping list order.
///
/// Words the store does not know map to themselves.
pub async fn synonym_table(
    resolver: &NeighborResolver,
    harness: &ConcurrencyHarness,
    words: Vec<String>,
    progress: Option<ProgressHook>,
) -> Result<Vec<(String, String)>> {
    let resolver = resolver.clone();
    let table = harness
        .run_with_progress(
            words,
            move |_, word| {
                let synonym = resolver.resolve(&word)?;
                Ok((word, synonym))
            },
            progress,
        )
        .await?;
    info!("Synonym table built for {} words", table.len());
    Ok(table)
}

/// Write a synonym table as `word synonym` lines, in table order.
pub fn write_synonym_table<W: Write>(table: &[(String, String)], mut sink: W) -> Result<()> {
    let rendered = table
        .iter()
        .map(|(word, synonym)| format!("{word} {synonym}"))
        .collect::<Vec<_>>()
        .join("\n");
    sink.write_all(rendered.as_bytes())?;
    sink.flush()?;
    Ok(())
}
