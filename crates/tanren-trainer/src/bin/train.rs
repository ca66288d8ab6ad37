use std::path::PathBuf;

use clap::Parser;
use tanren_core::BackendConfig;
use tanren_trainer::{TrainerConfig, run_training};
use tracing_subscriber::EnvFilter;

/// Train the text classifier and write vocabulary, IDF and metadata artifacts.
#[derive(Parser)]
#[command(name = "train")]
#[command(version)]
struct Args {
    /// Output directory
    #[arg(long, default_value = "./models")]
    out: PathBuf,

    /// Tab-separated `label<TAB>text` corpus; the built-in demo corpus if omitted
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Maximum vocabulary size
    #[arg(long, default_value_t = 5000)]
    max_vocab: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let config = TrainerConfig::new().with_max_vocab_size(args.max_vocab);
    if let Err(e) = run_training(
        &args.out,
        args.corpus.as_deref(),
        config,
        BackendConfig::default(),
    ) {
        eprintln!("Training failed: {e:#}");
        std::process::exit(1);
    }
}
