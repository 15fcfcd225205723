mod display;
mod shell;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use triage_ai::{CentroidClassifier, Embed, HashEmbedder, LogisticClassifier, MIN_DATASET_SIZE, TrainOptions};
use triage_core::{Document, ReviewLoop, SessionConfig, TextClassifier, export};

use crate::shell::Shell;

#[derive(Parser)]
#[command(name = "triage", version, about = "Sort documents into categories with a human in the loop")]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SessionArgs {
    /// Number of categories (k); a session has 2k buckets.
    #[arg(short = 'k', long, env = "TRIAGE_CATEGORIES", default_value_t = 3, global = true)]
    categories: usize,

    /// Comma-separated category display names.
    #[arg(long, env = "TRIAGE_NAMES", value_delimiter = ',', global = true)]
    names: Vec<String>,

    #[arg(long, value_enum, env = "TRIAGE_MODEL", default_value_t = ModelKind::Centroid, global = true)]
    model: ModelKind,

    #[arg(long, value_enum, env = "TRIAGE_EMBEDDER", default_value_t = EmbedderKind::Hash, global = true)]
    embedder: EmbedderKind,

    /// Directory holding `model.onnx` and `tokenizer.json`.
    #[arg(long, env = "TRIAGE_MODEL_DIR", global = true)]
    model_dir: Option<PathBuf>,

    /// Training sets smaller than this are padded by duplication (logreg only).
    #[arg(long, env = "TRIAGE_MIN_SAMPLES", default_value_t = MIN_DATASET_SIZE, global = true)]
    min_samples: usize,

    /// Output file. Defaults to `sort_results.csv`, or `labelled.csv` for `relabel`.
    #[arg(long, env = "TRIAGE_OUT", global = true)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelKind {
    Centroid,
    Logreg,
}

#[derive(Clone, Copy, ValueEnum)]
enum EmbedderKind {
    Hash,
    Onnx,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive review session on stdin.
    Review {
        /// Seed file (`.jsonl`, or `.parquet` with the `parquet` feature).
        #[arg(long)]
        seed: PathBuf,
        /// Export from a previous session; re-seeds labels by position.
        #[arg(long)]
        prior: Option<PathBuf>,
    },
    /// One retrain-and-predict cycle, then export.
    Predict {
        #[arg(long)]
        seed: PathBuf,
        #[arg(long)]
        prior: Option<PathBuf>,
        /// Print the training report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Apply a previous export and write the named-label report.
    Relabel {
        #[arg(long)]
        seed: PathBuf,
        #[arg(long)]
        prior: PathBuf,
    },
}

const DEFAULT_EXPORT: &str = "sort_results.csv";
const DEFAULT_REPORT: &str = "labelled.csv";

fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("triage v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let args = &cli.session;
    let config = SessionConfig::new(args.categories, args.names.clone())?;

    match &cli.command {
        Command::Review { seed, prior } => {
            let review = open_session(args, seed, prior.as_deref())?;
            let out = args.out.clone().unwrap_or_else(|| DEFAULT_EXPORT.into());
            let mut shell = Shell::new(review, config, out);
            shell.run(std::io::stdin().lock(), &mut std::io::stdout().lock())?;
        }
        Command::Predict { seed, prior, json } => {
            let mut review = open_session(args, seed, prior.as_deref())?;
            let report = review.retrain_and_predict()?;
            let out = args.out.clone().unwrap_or_else(|| DEFAULT_EXPORT.into());
            review
                .export(&out)
                .with_context(|| format!("writing {}", out.display()))?;

            let mut stdout = std::io::stdout().lock();
            if *json {
                serde_json::to_writer_pretty(&mut stdout, &report)?;
                writeln!(stdout)?;
            } else {
                display::write_report(&mut stdout, &report, &config)?;
            }
        }
        Command::Relabel { seed, prior } => {
            let documents = load_documents(seed, Some(prior), args.categories)?;
            let out = args.out.clone().unwrap_or_else(|| DEFAULT_REPORT.into());
            triage_store::write_labelled(&out, &documents, &config)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("wrote {} rows to {}", documents.len(), out.display());
        }
    }
    Ok(())
}

/// Logs go to stderr; stdout belongs to the shell.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(
    args: &SessionArgs,
    seed: &Path,
    prior: Option<&Path>,
) -> anyhow::Result<ReviewLoop<Box<dyn TextClassifier>>> {
    let documents = load_documents(seed, prior, args.categories)?;
    let classifier = build_classifier(args)?;
    let review = ReviewLoop::from_documents(args.categories, classifier, documents)
        .context("registering seed documents")?;
    Ok(review)
}

fn load_documents(
    seed: &Path,
    prior: Option<&Path>,
    categories: usize,
) -> anyhow::Result<Vec<Document>> {
    let mut documents = read_seed(seed).with_context(|| format!("reading {}", seed.display()))?;
    if let Some(prior) = prior {
        let records =
            export::read_file(prior).with_context(|| format!("reading {}", prior.display()))?;
        triage_store::apply_prior_results(&mut documents, &records, categories)
            .with_context(|| format!("applying {}", prior.display()))?;
    }
    Ok(documents)
}

fn read_seed(path: &Path) -> anyhow::Result<Vec<Document>> {
    let is_parquet = path.extension().is_some_and(|ext| ext == "parquet");
    if is_parquet {
        read_parquet_seed(path)
    } else {
        Ok(triage_store::read_seed_jsonl(path)?)
    }
}

#[cfg(feature = "parquet")]
fn read_parquet_seed(path: &Path) -> anyhow::Result<Vec<Document>> {
    Ok(triage_store::read_seed_parquet(path)?)
}

#[cfg(not(feature = "parquet"))]
fn read_parquet_seed(_path: &Path) -> anyhow::Result<Vec<Document>> {
    anyhow::bail!("parquet seed files need the `parquet` feature")
}

fn build_classifier(args: &SessionArgs) -> anyhow::Result<Box<dyn TextClassifier>> {
    let embedder = build_embedder(args)?;
    let classifier: Box<dyn TextClassifier> = match args.model {
        ModelKind::Centroid => Box::new(CentroidClassifier::new(embedder)),
        ModelKind::Logreg => Box::new(LogisticClassifier::new(
            embedder,
            TrainOptions {
                min_samples: args.min_samples,
                ..TrainOptions::default()
            },
        )),
    };
    info!(classifier = classifier.name(), "classifier ready");
    Ok(classifier)
}

fn build_embedder(args: &SessionArgs) -> anyhow::Result<Box<dyn Embed>> {
    match args.embedder {
        EmbedderKind::Hash => Ok(Box::new(HashEmbedder::default())),
        EmbedderKind::Onnx => load_onnx(args.model_dir.as_deref()),
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(model_dir: Option<&Path>) -> anyhow::Result<Box<dyn Embed>> {
    let dir = model_dir.context("--embedder onnx needs --model-dir")?;
    Ok(Box::new(triage_ai::OnnxEmbedder::load(dir)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(_model_dir: Option<&Path>) -> anyhow::Result<Box<dyn Embed>> {
    anyhow::bail!("the ONNX embedder needs the `onnx` feature")
}
