//! Tanren pipeline CLI
//!
//! Runs the train, export and convert stages individually or end to end, and
//! reports how far an artifact root has progressed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tanren::{
    ArtifactLayout, BackendConfig, Corpus, DeploymentConverter, InterchangeExporter, Pipeline,
    PipelineState, PlaceholderBackend, TrainerConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser)]
#[command(name = "tanren")]
#[command(about = "Build, export and convert a bag-of-words text classifier")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with backend settings (model name, hidden units, seed, ...)
    #[arg(short, long, global = true, env = "TANREN_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build vocabulary, IDF weights and metadata
    Train {
        /// Output directory
        #[arg(long, default_value = "./models")]
        out: PathBuf,
        /// Tab-separated `label<TAB>text` corpus (built-in demo corpus if omitted)
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Maximum vocabulary size
        #[arg(long, default_value_t = 5000)]
        max_vocab: usize,
    },
    /// Export trained artifacts to an interchange descriptor
    Export {
        /// Directory holding the training artifacts
        #[arg(long, default_value = "./models")]
        model_dir: PathBuf,
        /// Output directory
        #[arg(long, default_value = "./models/onnx")]
        out: PathBuf,
    },
    /// Convert an interchange descriptor to a browser model bundle
    Convert {
        /// Interchange descriptor path
        #[arg(long, default_value = "./models/onnx/classifier.onnx")]
        onnx_path: PathBuf,
        /// Output directory
        #[arg(long, default_value = "./models/tfjs")]
        out: PathBuf,
    },
    /// Train, export and convert under one artifact root
    Run {
        #[arg(long, default_value = "./models")]
        root: PathBuf,
        #[arg(long)]
        corpus: Option<PathBuf>,
        #[arg(long, default_value_t = 5000)]
        max_vocab: usize,
    },
    /// Show which stage an artifact root has reached
    Status {
        #[arg(long, default_value = "./models")]
        root: PathBuf,
    },
}

/// Load backend settings, falling back to defaults.
fn load_backend_config(path: Option<&Path>) -> Result<BackendConfig> {
    let Some(path) = path else {
        return Ok(BackendConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: BackendConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn load_corpus(path: Option<&Path>) -> Result<Corpus> {
    match path {
        Some(path) => tanren_trainer::load_corpus(path)
            .with_context(|| format!("failed to load corpus from {}", path.display())),
        None => Ok(Corpus::phishing_demo()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let backend = load_backend_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Train {
            out,
            corpus,
            max_vocab,
        } => {
            info!("Starting classifier training...");
            let config = TrainerConfig::new().with_max_vocab_size(max_vocab);
            tanren_trainer::run_training(&out, corpus.as_deref(), config, backend)?;
            info!(out = %out.display(), "Training complete");
        }
        Commands::Export { model_dir, out } => {
            info!("Starting export...");
            InterchangeExporter::new(PlaceholderBackend::new(backend))
                .export(&model_dir, &out)
                .context("export failed")?;
        }
        Commands::Convert { onnx_path, out } => {
            info!("Starting conversion...");
            DeploymentConverter::new(PlaceholderBackend::new(backend))
                .convert(&onnx_path, &out)
                .context("conversion failed")?;
        }
        Commands::Run {
            root,
            corpus,
            max_vocab,
        } => {
            let corpus = load_corpus(corpus.as_deref())?;
            let run = Pipeline::new(&root)
                .with_trainer_config(TrainerConfig::new().with_max_vocab_size(max_vocab))
                .with_backend_config(backend)
                .run(&corpus)
                .context("pipeline failed")?;
            info!(
                vocab = run.training.vocabulary.len(),
                size_mb = run.conversion.manifest.estimated_size_mb,
                "Pipeline complete"
            );
        }
        Commands::Status { root } => {
            let layout = ArtifactLayout::new(&root);
            let state = PipelineState::detect(&layout);
            println!("{}: {state}", root.display());
        }
    }

    Ok(())
}
