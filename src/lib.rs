//! # Synonym Swap (library root)
//!
//! Loads a table of pre-trained word vectors and rewrites text by replacing
//! words with their nearest neighbour by cosine similarity.
//!
//! - Embedding table, parsed one task per line ([`vector_store`]).
//! - Brute-force nearest-neighbour search ([`resolver`]).
//! - Restricting substitution to a word list, or turning that list into a
//!   synonym table ([`vocabulary`]).
//! - Order-preserving concurrent substitution over a document ([`pipeline`]).
//! - The task-per-unit fan-out / fan-in used by all of the above ([`harness`]).
//! - CLI parsing, configuration and progress display ([`commands`],
//!   [`config`], [`progress`]).
//!
//! ## Data flow
//! ```text
//! embeddings ──▶ VectorStore ──▶ VocabularyFilter (optional)
//!                    │                  │
//!                    ▼                  ▼
//!             NeighborResolver ◀── SubstitutionPipeline ◀── document
//!                                       │
//!                                       ▼
//!                                     sink
//! ```
//!
//! The store is built once and never written again; share it behind an
//! [`Arc`](std::sync::Arc). Core APIs take readers and writers, never paths.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use synonym_swap::{ConcurrencyHarness, NeighborResolver, Restriction,
//!     SubstitutionPipeline, VectorStore, VocabularyFilter};
//!
//! # async fn demo() -> synonym_swap::error::Result<()> {
//! let harness = ConcurrencyHarness::default();
//! let embeddings = std::io::Cursor::new("king, 1, 0\nqueen, 0.9, 0.1\ncat, 0, 1\n");
//! let (store, _report) = VectorStore::load(embeddings, &harness).await?;
//! let store = Arc::new(store);
//!
//! let subset = VocabularyFilter::new(&store).filter(["king"]);
//! let pipeline = SubstitutionPipeline::new(NeighborResolver::new(store), harness);
//! let out = pipeline
//!     .substitute("the king rules", &Restriction::Subset(Arc::new(subset)))
//!     .await?;
//! assert_eq!(out.text(), "the queen rules");
//! # Ok(()) }
//! ```

use directories::ProjectDirs;

pub mod commands;
pub mod config;
pub mod error;
pub mod harness;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod vector_store;
pub mod vocabulary;

pub use error::{ParseError, Result, SwapError};
pub use harness::ConcurrencyHarness;
pub use pipeline::{Hooks, Restriction, Substitution, SubstitutionPipeline};
pub use resolver::{NeighborResolver, cosine_similarity};
pub use vector_store::{LoadReport, VectorStore};
pub use vocabulary::{VocabularyFilter, VocabularySubset};

/// Return the per-platform configuration directory.
///
/// This uses [`directories::ProjectDirs`] with the application triple
/// `("com", "synonym-swap", "swap")`. The directory is **not** created here.
///
/// # Errors
/// Returns an error if the platform configuration directory cannot be determined
/// (which is rare but possible in heavily sandboxed environments).
pub fn config_dir() -> std::result::Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let proj_dirs = ProjectDirs::from("com", "synonym-swap", "swap")
        .ok_or("Unable to determine config directory")?;
    Ok(proj_dirs.config_dir().to_path_buf())
}
