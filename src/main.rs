//! Main module for the Synonym Swap CLI application (swap).
//!
//! Parses the command line, loads the configuration, opens the files the user
//! named and hands readers and writers to the library. Path checks and console
//! presentation live here; the library never touches either.
//!
//! # Examples
//!
//! ```sh
//! cargo run -- simplify -e embeddings.txt -v google-1000.txt -i essay.txt
//! swap synonyms -e embeddings.txt -v google-1000.txt -o table.txt
//! swap init
//! ```

use clap::Parser;
use once_cell::sync::OnceCell;
use std::{
    error::Error,
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, warn};

use synonym_swap::{
    ConcurrencyHarness, Hooks, NeighborResolver, Restriction, SubstitutionPipeline, VectorStore,
    VocabularyFilter,
    commands::{Cli, Commands},
    config::{self, SwapConfig},
    config_dir, progress, vocabulary,
};

static TRACING: OnceCell<()> = OnceCell::new();

fn main() -> Result<(), Box<dyn Error>> {
    TRACING.get_or_init(|| {
        tracing_subscriber::fmt::init();
    });
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run())
}

/// Load configuration, parse arguments, and dispatch the chosen command.
async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let mut swap_config = load_or_default_config()?;
    swap_config.debug |= cli.debug;
    debug!("Config loaded: {:?}", swap_config);

    let harness = ConcurrencyHarness::new(swap_config.grace_period());

    match cli.command {
        Commands::Simplify {
            embeddings,
            vocabulary: word_list,
            input,
            output,
            all,
        } => {
            let store = Arc::new(load_store(&embeddings, &harness).await?);

            let restriction = match (swap_config.restricts_to_vocabulary(all), word_list) {
                (false, _) => Restriction::Everything,
                (true, None) => {
                    return Err("--vocabulary is required unless --all is given or \
                                resolve_everything is set in the config"
                        .into());
                }
                (true, Some(path)) => {
                    let words = vocabulary::read_word_list(open(&path)?)?;
                    let subset = VocabularyFilter::new(&store)
                        .with_debug(swap_config.debug)
                        .filter(&words);
                    if !subset.excluded().is_empty() {
                        warn!(
                            "{} vocabulary words have no embedding",
                            subset.excluded().len()
                        );
                    }
                    Restriction::Subset(Arc::new(subset))
                }
            };

            let document = File::open(existing(&input)?)?;
            let output = output.unwrap_or_else(|| swap_config.output_path.clone());
            let sink = BufWriter::new(File::create(&output)?);

            let bar = progress::resolution_bar("words resolved");
            let hooks = Hooks {
                progress: Some(progress::bar_hook(bar.clone())),
                debug: swap_config.debug,
            };
            let substitution = SubstitutionPipeline::new(NeighborResolver::new(store), harness)
                .with_hooks(hooks)
                .run(document, sink, &restriction)
                .await?;
            bar.finish_and_clear();

            println!(
                "Replaced {} of {} words; output written to {}",
                substitution.replaced,
                substitution.tokens.len(),
                output.display()
            );
        }
        Commands::Synonyms {
            embeddings,
            vocabulary: word_list,
            output,
        } => {
            let store = Arc::new(load_store(&embeddings, &harness).await?);
            let words = vocabulary::read_word_list(open(&word_list)?)?;

            let bar = progress::resolution_bar("synonyms resolved");
            let table = vocabulary::synonym_table(
                &NeighborResolver::new(store),
                &harness,
                words,
                Some(progress::bar_hook(bar.clone())),
            )
            .await?;
            bar.finish_and_clear();

            let output = output.unwrap_or_else(|| swap_config.output_path.clone());
            vocabulary::write_synonym_table(&table, BufWriter::new(File::create(&output)?))?;
            println!("{} synonyms written to {}", table.len(), output.display());
        }
        Commands::Nearest { embeddings, words } => {
            let store = Arc::new(load_store(&embeddings, &harness).await?);
            let resolver = NeighborResolver::new(store);
            for word in words {
                match resolver.nearest(&word)? {
                    Some(neighbor) => {
                        println!("{} -> {} ({:.4})", word, neighbor.word, neighbor.similarity)
                    }
                    None => println!("{} -> {} (no match)", word, word),
                }
            }
        }
        Commands::Init => {
            debug!("Initializing configuration");
            init()?;
        }
    }

    Ok(())
}

/// Read `config.yaml` from the config directory, or fall back to defaults.
fn load_or_default_config() -> Result<SwapConfig, Box<dyn Error>> {
    let config_path = config_dir()?.join("config.yaml");
    if !config_path.exists() {
        debug!("No config at {}; using defaults", config_path.display());
        return Ok(SwapConfig::default());
    }
    let path = config_path
        .to_str()
        .ok_or("Config path is not valid UTF-8")?;
    Ok(config::load_config(path)?)
}

async fn load_store(path: &Path, harness: &ConcurrencyHarness) -> Result<VectorStore, Box<dyn Error>> {
    info!("Loading embeddings from {}", path.display());
    let (store, report) = VectorStore::load(open(path)?, harness).await?;
    println!(
        "Embeddings loaded: {} words ({} malformed, {} unparsable, {} duplicates skipped)",
        store.size(),
        report.malformed(),
        report.unparsable(),
        report.duplicates
    );
    Ok(store)
}

fn open(path: &Path) -> Result<BufReader<File>, Box<dyn Error>> {
    Ok(BufReader::new(File::open(existing(path)?)?))
}

fn existing(path: &Path) -> Result<&Path, Box<dyn Error>> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("File does not exist: {}", path.display()).into())
    }
}

/// Writes a default `config.yaml` into the configuration directory.
fn init() -> Result<(), Box<dyn Error>> {
    let config_dir = config_dir()?;
    info!("Creating config directory: {}", config_dir.display());
    fs::create_dir_all(&config_dir)?;

    let config_path: PathBuf = config_dir.join("config.yaml");
    info!("Creating config file: {}", config_path.display());
    let config_yaml = serde_yaml::to_string(&SwapConfig::default())?;
    fs::write(&config_path, config_yaml)?;
    println!("Wrote {}", config_path.display());

    Ok(())
}
