mod display;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sentio_ai::SentimentPipeline;
use sentio_api::PredictResponse;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "sentio=info,tower_http=info";

#[derive(Parser)]
#[command(name = "sentio", version, about = "Text sentiment inference")]
struct Cli {
    /// Directory holding vectorizer.json and model.json
    #[arg(long, env = "SENTIO_MODEL_DIR", default_value = "models", global = true)]
    model_dir: PathBuf,

    /// Stopword list, one word per line (default: $NLTK_DATA, ~/nltk_data, then the bundled list)
    #[arg(long, env = "SENTIO_STOPWORDS", global = true)]
    stopwords: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve /health and /predict over HTTP
    Serve {
        #[arg(long, env = "SENTIO_BIND", default_value = "0.0.0.0:5000")]
        bind: String,
    },

    /// Classify texts given as arguments, or one per stdin line
    Predict {
        texts: Vec<String>,

        /// Print the /predict response body instead of cards
        #[arg(long)]
        json: bool,
    },

    /// Print the cleaned form of each text
    Normalize { texts: Vec<String> },

    /// Show the loaded artifacts and stopword lexicon
    Inspect,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("sentio v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = SentimentPipeline::load(&cli.model_dir, cli.stopwords.as_deref());

    match cli.command {
        Command::Serve { bind } => cmd_serve(pipeline, &bind).await,
        Command::Predict { texts, json } => cmd_predict(&pipeline, texts, json),
        Command::Normalize { texts } => cmd_normalize(&pipeline, texts),
        Command::Inspect => {
            display::print_inspect(&pipeline, &cli.model_dir);
            Ok(())
        }
    }
}

async fn cmd_serve(pipeline: SentimentPipeline, bind: &str) -> anyhow::Result<()> {
    if !pipeline.is_ready() {
        tracing::warn!("starting without a text model; /predict will return 503");
    }
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
        }
        tracing::info!("shutdown signal received");
    };
    sentio_api::serve(listener, Arc::new(pipeline), shutdown)
        .await
        .context("serving HTTP API")
}

fn cmd_predict(pipeline: &SentimentPipeline, texts: Vec<String>, json: bool) -> anyhow::Result<()> {
    let texts = if texts.is_empty() { read_stdin_lines()? } else { texts };
    let scored = pipeline
        .infer_scored(texts.as_slice())
        .context("prediction failed")?;

    if json {
        let predictions = scored.into_iter().map(|s| s.result).collect();
        let body = PredictResponse { predictions };
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    for (text, s) in texts.iter().zip(&scored) {
        display::print_prediction_card(text, &s.cleaned, &s.result);
    }
    Ok(())
}

fn cmd_normalize(pipeline: &SentimentPipeline, texts: Vec<String>) -> anyhow::Result<()> {
    let texts = if texts.is_empty() { read_stdin_lines()? } else { texts };
    for text in &texts {
        println!("{}", pipeline.normalize(text));
    }
    Ok(())
}

/// Non-blank stdin lines, trailing whitespace trimmed.
fn read_stdin_lines() -> anyhow::Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let line = line.trim_end();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}
