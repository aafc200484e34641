//! Vertical card display for predictions and artifact status.
//!
//! Cards are built as strings and printed by the caller-facing `print_*`
//! functions, so the layout can be checked in tests.

use std::fmt::Write;
use std::path::Path;

use sentio_ai::SentimentPipeline;
use sentio_core::{CleanedText, LexiconStatus, PredictionResult};

const LABEL_WIDTH: usize = 16;
const BAR_WIDTH: usize = 20;

// ── Public API ──

/// Print one prediction: label header, input, cleaned tokens, scores
/// highest first.
pub fn print_prediction_card(text: &str, cleaned: &CleanedText, result: &PredictionResult) {
    print!("{}", render_prediction_card(text, cleaned, result));
}

/// Print artifact and lexicon status.
pub fn print_inspect(pipeline: &SentimentPipeline, model_dir: &Path) {
    print!("{}", render_inspect(pipeline, model_dir));
}

// ── Rendering ──

fn render_prediction_card(text: &str, cleaned: &CleanedText, result: &PredictionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", result.sentiment);
    let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "text", text);
    let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "cleaned", cleaned);
    let _ = writeln!(out, "Confidence");
    for (label, pct) in result.confidence.ranked() {
        let _ = writeln!(out, "  {:<LABEL_WIDTH$} {:>6.2}%  {}", label, pct, bar(pct));
    }
    out.push('\n');
    out
}

fn render_inspect(pipeline: &SentimentPipeline, model_dir: &Path) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Text model");
    let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "model_dir", model_dir.display());
    match pipeline.artifacts() {
        Some(artifacts) => {
            let summary = artifacts.describe();
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "vectorizer", summary.vectorizer);
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "classifier", summary.classifier);
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "features", summary.features);
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "classes", summary.classes.join(", "));
        }
        None => {
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} not loaded", "status");
        }
    }
    out.push('\n');

    let _ = writeln!(out, "Stopwords");
    match pipeline.normalizer().lexicon_status() {
        LexiconStatus::Loaded { path, words } => {
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "path", path.display());
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "words", words);
        }
        LexiconStatus::Bundled { words } => {
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} bundled", "source");
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "words", words);
        }
        LexiconStatus::Inline { words } => {
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} inline", "source");
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} {}", "words", words);
        }
        LexiconStatus::Missing { reason } => {
            let _ = writeln!(out, "  {:<LABEL_WIDTH$} missing ({reason})", "status");
        }
    }
    out.push('\n');
    out
}

fn bar(pct: f64) -> String {
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
