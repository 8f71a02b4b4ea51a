//! # Substitution pipeline
//!
//! Turns a document into its substituted form:
//!
//! ```text
//! raw text ──tokenize──▶ [t0, t1, t2, …]
//!                          │  eligible?  ──no──▶ kept as-is
//!                          ▼ yes
//!                    one resolve task per token (ConcurrencyHarness)
//!                          │
//!                          ▼
//!           results placed back by token position
//!                          │
//!                          ▼
//!              tokens joined by single spaces ──▶ sink
//! ```
//!
//! Tokens are runs of non-whitespace; newlines count as whitespace, so a
//! multi-line document becomes one line of output. The output always has as
//! many tokens as the input, in the same order, whatever order the tasks finish
//! in.
//!
//! Eligibility is set by [`Restriction`]: either membership in a
//! [`VocabularySubset`] or every token.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::harness::{ConcurrencyHarness, ProgressHook};
use crate::resolver::NeighborResolver;
use crate::vocabulary::VocabularySubset;

/// Which tokens are sent to the resolver.
#[derive(Debug, Clone)]
pub enum Restriction {
    /// Only tokens present in the subset.
    Subset(Arc<VocabularySubset>),
    /// Every token.
    Everything,
}

impl Restriction {
    pub fn admits(&self, token: &str) -> bool {
        match self {
            Restriction::Subset(subset) => subset.contains(token),
            Restriction::Everything => true,
        }
    }
}

/// Collaborator hooks: progress reporting and the verbose-logging toggle.
#[derive(Clone, Default)]
pub struct Hooks {
    pub progress: Option<ProgressHook>,
    pub debug: bool,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("progress", &self.progress.is_some())
            .field("debug", &self.debug)
            .finish()
    }
}

/// Result of one substitution run.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// Output tokens, position for position with the input.
    pub tokens: Vec<String>,
    /// Tokens sent to the resolver.
    pub resolved: usize,
    /// Resolved tokens whose replacement differs from the original.
    pub replaced: usize,
}

impl Substitution {
    /// The output text: tokens joined by single spaces, no trailing newline.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Split text on runs of whitespace (newlines included).
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Resolves the eligible tokens of a document concurrently and reassembles it.
#[derive(Debug, Clone)]
pub struct SubstitutionPipeline {
    resolver: NeighborResolver,
    harness: ConcurrencyHarness,
    hooks: Hooks,
}

impl SubstitutionPipeline {
    pub fn new(resolver: NeighborResolver, harness: ConcurrencyHarness) -> Self {
        Self {
            resolver,
            harness,
            hooks: Hooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Substitute every eligible token of `text`.
    ///
    /// # Errors
    /// A harness error if any resolve task fails; the whole document fails with it.
    pub async fn substitute(&self, text: &str, restriction: &Restriction) -> Result<Substitution> {
        let mut tokens: Vec<String> = tokenize(text).into_iter().map(str::to_string).collect();

        let (eligible, kept): (Vec<(usize, String)>, Vec<(usize, String)>) = tokens
            .iter()
            .cloned()
            .enumerate()
            .partition(|(_, token)| restriction.admits(token));

        if self.hooks.debug {
            for (_, token) in &kept {
                info!("No synonym found for word: '{}', keeping original.", token);
            }
        }

        let resolver = self.resolver.clone();
        let debug = self.hooks.debug;
        let resolved = self
            .harness
            .run_with_progress(
                eligible,
                move |_, (position, token)| {
                    let synonym = resolver.resolve(&token)?;
                    if debug {
                        info!("Swapping word: '{}' with synonym: '{}'", token, synonym);
                    }
                    Ok((position, synonym))
                },
                self.hooks.progress.clone(),
            )
            .await?;

        let mut replaced = 0;
        for (position, synonym) in &resolved {
            if tokens[*position] != *synonym {
                replaced += 1;
                tokens[*position] = synonym.clone();
            }
        }

        info!(
            "Substituted {} of {} resolved tokens ({} tokens total)",
            replaced,
            resolved.len(),
            tokens.len()
        );
        Ok(Substitution {
            tokens,
            resolved: resolved.len(),
            replaced,
        })
    }

    /// Read a whole document from `source`, substitute it, and write the
    /// result to `sink` in a single write.
    ///
    /// # Errors
    /// - [`SwapError::Io`](crate::error::SwapError::Io) if reading or writing fails.
    /// - Any error from [`substitute`](Self::substitute).
    pub async fn run<R: Read, W: Write>(
        &self,
        mut source: R,
        mut sink: W,
        restriction: &Restriction,
    ) -> Result<Substitution> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;

        let substitution = self.substitute(&text, restriction).await?;

        sink.write_all(substitution.text().as_bytes())?;
        sink.flush()?;
        Ok(substitution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::VectorStore;
    use crate::vocabulary::VocabularyFilter;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store() -> Arc<VectorStore> {
        Arc::new(VectorStore::from_records([
            ("king", vec![1.0, 0.0]),
            ("queen", vec![0.9, 0.1]),
            ("cat", vec![0.0, 1.0]),
            ("kitten", vec![0.1, 0.95]),
        ]))
    }

    fn pipeline(store: Arc<VectorStore>) -> SubstitutionPipeline {
        SubstitutionPipeline::new(NeighborResolver::new(store), ConcurrencyHarness::default())
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(
            tokenize("  the king\n\trules \r\n ok "),
            vec!["the", "king", "rules", "ok"]
        );
        assert!(tokenize(" \n ").is_empty());
    }

    #[tokio::test]
    async fn test_the_king_rules() {
        let store = store();
        let subset = VocabularyFilter::new(&store).filter(["king"]);
        let restriction = Restriction::Subset(Arc::new(subset));

        let out = pipeline(store)
            .substitute("the king rules", &restriction)
            .await
            .unwrap();
        assert_eq!(out.text(), "the queen rules");
        assert_eq!(out.resolved, 1);
        assert_eq!(out.replaced, 1);
    }

    #[tokio::test]
    async fn test_everything_mode_keeps_unknown_tokens() {
        let out = pipeline(store())
            .substitute("the cat and the king", &Restriction::Everything)
            .await
            .unwrap();
        assert_eq!(out.text(), "the kitten and the queen");
        assert_eq!(out.resolved, 5);
        assert_eq!(out.replaced, 2);
    }

    #[tokio::test]
    async fn test_token_count_and_order_are_preserved() {
        let words = ["king", "x", "cat", "queen", "y", "kitten"];
        let text: String = (0..200)
            .map(|i| words[i % words.len()])
            .collect::<Vec<_>>()
            .join("\n");
        let out = pipeline(store())
            .substitute(&text, &Restriction::Everything)
            .await
            .unwrap();
        assert_eq!(out.tokens.len(), 200);
        for (i, token) in out.tokens.iter().enumerate() {
            let expected = match words[i % words.len()] {
                "king" => "queen",
                "queen" => "king",
                "cat" => "kitten",
                "kitten" => "cat",
                other => other,
            };
            assert_eq!(token, expected, "position {i}");
        }
    }

    #[tokio::test]
    async fn test_run_writes_single_line_without_trailing_newline() {
        let store = store();
        let subset = VocabularyFilter::new(&store).filter(["cat", "dog"]);
        let restriction = Restriction::Subset(Arc::new(subset));

        let mut sink = Vec::new();
        let out = pipeline(store)
            .run(Cursor::new("a cat\nsat on\n\nthe dog\n"), &mut sink, &restriction)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), "a kitten sat on the dog");
        assert_eq!(out.tokens.len(), 6);
    }

    #[tokio::test]
    async fn test_empty_document() {
        let mut sink = Vec::new();
        let out = pipeline(store())
            .run(Cursor::new(""), &mut sink, &Restriction::Everything)
            .await
            .unwrap();
        assert!(out.tokens.is_empty());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_progress_reports_resolved_tokens_only() {
        let store = store();
        let subset = VocabularyFilter::new(&store).filter(["king", "cat"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let hooks = Hooks {
            progress: Some({
                let calls = Arc::clone(&calls);
                Arc::new(move |_: usize, total: usize| {
                    assert_eq!(total, 2);
                    calls.fetch_add(1, Ordering::SeqCst);
                })
            }),
            debug: true,
        };
        pipeline(store)
            .with_hooks(hooks)
            .substitute("king and cat", &Restriction::Subset(Arc::new(subset)))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_mixed_dimensions_fail_the_document() {
        let store = Arc::new(VectorStore::from_records([
            ("a", vec![1.0, 0.0]),
            ("b", vec![1.0, 0.0, 0.0]),
        ]));
        let err = pipeline(store)
            .substitute("a b", &Restriction::Everything)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::SwapError::TaskFailure { .. }));
    }
}
