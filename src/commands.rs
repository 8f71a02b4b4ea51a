//! This module defines the command-line interface for the application using `clap`.
//!
//! It provides a `Cli` struct that represents the parsed command-line arguments,
//! and a `Commands` enum that represents the available subcommands and their
//! options. Path arguments are checked and opened by the binary; the library
//! itself only ever sees readers and writers.
//!
//! # Examples
//!
//! ```sh
//! swap simplify -e embeddings.txt -v google-1000.txt -i essay.txt -o out.txt
//! swap synonyms -e embeddings.txt -v google-1000.txt
//! swap nearest -e embeddings.txt king queen
//! swap init
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Represents the parsed command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true, color = clap::ColorChoice::Always)]
pub struct Cli {
    /// Log every substitution and every vocabulary miss.
    #[arg(long, global = true, env = "SWAP_DEBUG")]
    pub debug: bool,

    /// The parsed subcommand and its options.
    #[command(subcommand)]
    pub command: Commands,
}

/// Represents the available subcommands and their options.
#[derive(Subcommand, Debug)]
#[command(about, long_about = None, color = clap::ColorChoice::Always)]
pub enum Commands {
    /// Replace vocabulary words in a document with their nearest neighbours.
    #[clap(name = "simplify", alias = "s")]
    Simplify {
        /// Embeddings file: `word, num, num, ...` per line.
        #[arg(short = 'e', long)]
        embeddings: PathBuf,

        /// Word list restricting which tokens are replaced. Required unless `--all`
        /// is given or `resolve_everything` is set in the config.
        #[arg(short = 'v', long)]
        vocabulary: Option<PathBuf>,

        /// Document to rewrite.
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Output file. Defaults to the configured output path.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Replace every token, ignoring the vocabulary list.
        #[arg(long)]
        all: bool,
    },

    /// Write a `word synonym` table for every word of a list.
    #[clap(name = "synonyms")]
    Synonyms {
        #[arg(short = 'e', long)]
        embeddings: PathBuf,

        #[arg(short = 'v', long)]
        vocabulary: PathBuf,

        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Print the nearest neighbour of each given word.
    #[clap(name = "nearest", alias = "n")]
    Nearest {
        #[arg(short = 'e', long)]
        embeddings: PathBuf,

        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Write a default `config.yaml` into the configuration directory.
    Init,
}
