// src/main.rs
mod extractors;
mod output;
mod pdf;
mod storage;
mod utils;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use extractors::{InsightsRecord, SectionExtractor};
use output::{write_report, Report};
use pdf::DocumentText;
use storage::StorageManager;
use utils::error::ExtractionFailure;
use utils::AppError;

/// Excerpts the Abstract, Key Findings, Methodology and p-value context of a paper PDF as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the PDF document
    #[arg(env = "PDF_INSIGHTS_INPUT")]
    input: PathBuf,

    /// Print the insights record on a single line
    #[arg(long)]
    compact: bool,

    /// Also save the record and run metadata under this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write the document text with located sections annotated to this file
    #[arg(long, value_name = "FILE")]
    debug_text: Option<PathBuf>,
}

fn main() -> ExitCode {
    // 1. Setup Logging (reads RUST_LOG env var, writes to stderr)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Extract and emit exactly one JSON value on stdout
    let stdout = std::io::stdout();
    match run(&args, &mut stdout.lock()) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            tracing::error!("Failed to write report: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Runs one extraction and writes its report to `out`. Returns the process exit status.
fn run<W: Write>(args: &Args, out: &mut W) -> Result<u8, AppError> {
    let report = match analyze(args) {
        Ok(record) => {
            tracing::info!("Processing finished. Sections found: {}", record.present_keys().len());
            Report::Insights(record)
        }
        Err(e) => {
            tracing::error!("Extraction failed: {}", e);
            Report::error(e.to_string())
        }
    };

    write_report(out, &report, args.compact)?;
    Ok(if report.is_error() { 1 } else { 0 })
}

fn analyze(args: &Args) -> Result<InsightsRecord, ExtractionFailure> {
    // All pages are read before any probe runs, so a failure never leaves a partial record
    let document = pdf::load_document_text(&args.input)?;

    let extractor = SectionExtractor::new();
    let spans = extractor.locate(&document.text);
    let record = extractor.excerpts(&document.text, &spans);

    if let Some(debug_path) = &args.debug_text {
        if let Err(e) = utils::text_debug::save_debug_text(&document.text, &spans, debug_path) {
            tracing::warn!("Failed to create debug text: {}", e);
        }
    }

    if let Some(output_dir) = &args.output_dir {
        save_outputs(output_dir, &args.input, &document, &record);
    }

    Ok(record)
}

fn save_outputs(
    output_dir: &Path,
    source: &Path,
    document: &DocumentText,
    record: &InsightsRecord,
) {
    let storage = match StorageManager::new(output_dir) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Failed to prepare output directory {}: {}", output_dir.display(), e);
            return;
        }
    };

    match storage.save_insights(source, record) {
        Ok(path) => tracing::info!("Saved insights to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save insights: {}", e),
    }

    match storage.save_metadata(source, document, record) {
        Ok(path) => tracing::info!("Saved run metadata to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save run metadata: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn args_for(input: PathBuf) -> Args {
        Args { input, compact: false, output_dir: None, debug_text: None }
    }

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn cli_parses_input_and_flags() {
        let args = Args::try_parse_from([
            "pdf_insights",
            "paper.pdf",
            "--compact",
            "--output-dir",
            "out",
            "--debug-text",
            "dump.txt",
        ])
        .unwrap();
        assert_eq!(args.input, PathBuf::from("paper.pdf"));
        assert!(args.compact);
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.debug_text, Some(PathBuf::from("dump.txt")));
    }

    #[test]
    fn missing_file_emits_error_record_and_status_1() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("no-such-paper.pdf");
        let mut out = Vec::new();

        let status = run(&args_for(input.clone()), &mut out).unwrap();
        assert_eq!(status, 1);

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        let message = object["error"].as_str().unwrap();
        assert!(message.contains(&input.display().to_string()), "message was: {}", message);
    }

    #[test]
    fn two_page_pdf_emits_insights_and_status_0() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("study.pdf");
        pdf::write_sample_pdf(
            &input,
            &["Abstract XYZ Introduction", "Key Findings: up. Discussion p-value 0.01"],
        );
        let output_dir = dir.path().join("out");
        let debug_path = dir.path().join("debug.txt");

        let mut args = args_for(input);
        args.compact = true;
        args.output_dir = Some(output_dir.clone());
        args.debug_text = Some(debug_path.clone());
        let mut out = Vec::new();

        assert_eq!(run(&args, &mut out).unwrap(), 0);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "abstract": "XYZ",
                "keyFindings": "up.",
                "statSig": "Abstract XYZ Introduction\nKey Findings: up. Discussion p-value 0.01",
            })
        );

        assert!(output_dir.join("study_insights.json").is_file());
        assert!(output_dir.join("study_meta.json").is_file());
        let dump = std::fs::read_to_string(&debug_path).unwrap();
        assert!(dump.contains("[[abstract marker @0]]Abstract "));
    }

    #[test]
    fn malformed_pdf_emits_error_and_writes_no_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.pdf");
        std::fs::write(&input, b"%PDF-1.4 truncated garbage").unwrap();
        let output_dir = dir.path().join("out");

        let mut args = args_for(input);
        args.output_dir = Some(output_dir.clone());
        let mut out = Vec::new();

        assert_eq!(run(&args, &mut out).unwrap(), 1);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value.get("error").is_some());
        assert!(!output_dir.exists());
    }
}
