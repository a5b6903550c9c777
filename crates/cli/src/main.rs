//! CLI tool for extracting plain text from PDF, DOCX, and PPTX files.

use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use xtotxt_core::{resolve, route, DocumentFormat, Error, ExtractorRegistry, OutputTarget};

/// Extract text from PDF, DOCX, and PPTX files.
#[derive(Parser, Debug)]
#[command(name = "extract-text")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Example: extract-text -o output_dir presentation.pptx document.pdf")]
struct Args {
    /// One or more files to extract text from
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// File format (pdf, docx, pptx); inferred from the extension if omitted
    #[arg(short, long)]
    format: Option<String>,

    /// Output file (single input) or directory (multiple inputs); prints to the console if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output, including page, paragraph, and slide counts
    #[arg(short, long)]
    verbose: bool,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    /// Every input was attempted; per-file errors were reported.
    Completed,
    /// An input needed an extractor that is not compiled in.
    MissingDependency(DocumentFormat),
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let registry = build_registry();
    log::debug!("Available formats: {:?}", registry.formats());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let status = run(&args, &registry, &mut out)?;
    out.flush()?;

    Ok(match status {
        RunStatus::Completed => ExitCode::SUCCESS,
        RunStatus::MissingDependency(_) => ExitCode::FAILURE,
    })
}

/// Register the extractors enabled at build time.
fn build_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    #[cfg(feature = "pdf")]
    registry.register(xtotxt_pdf::PdfExtractor::new());
    #[cfg(feature = "docx")]
    registry.register(xtotxt_docx::DocxExtractor::new());
    #[cfg(feature = "pptx")]
    registry.register(xtotxt_pptx::PptxExtractor::new());
    registry
}

/// Process every input in order, reporting errors to `out` as they happen.
fn run<W: Write>(args: &Args, registry: &ExtractorRegistry, out: &mut W) -> io::Result<RunStatus> {
    let target = OutputTarget::from_args(args.output.as_deref(), args.input.len());
    log::debug!("Output target: {:?}", target);

    for input_path in &args.input {
        if args.verbose {
            writeln!(out, "Processing file: {}", input_path.display())?;
        }

        match process_file(input_path, args, registry, &target, out) {
            Ok(()) => {}
            Err(Error::MissingDependency(format)) => {
                writeln!(
                    out,
                    "Error: {} support is not installed. Reinstall with `cargo install xtotxt-cli --features {}`.",
                    format.label(),
                    format.tag()
                )?;
                return Ok(RunStatus::MissingDependency(format));
            }
            Err(e) => {
                writeln!(out, "Error: {}", e)?;
            }
        }
    }

    Ok(RunStatus::Completed)
}

/// Resolve, extract, and route a single file.
///
/// Extraction and write failures are reported here and do not propagate.
/// Missing inputs, unresolvable formats, and missing extractors do.
fn process_file<W: Write>(
    input_path: &Path,
    args: &Args,
    registry: &ExtractorRegistry,
    target: &OutputTarget,
    out: &mut W,
) -> xtotxt_core::Result<()> {
    if !input_path.exists() {
        return Err(Error::MissingFile(input_path.to_path_buf()));
    }

    let format = resolve(input_path, args.format.as_deref())?;
    log::debug!("{} resolved as {}", input_path.display(), format);
    let extractor = registry.get(format)?;

    let text = match extractor.extract(input_path) {
        Ok(extracted) => {
            if args.verbose {
                writeln!(out, "{}", extracted.stats.summary(&input_path.display().to_string()))?;
            }
            extracted.text
        }
        Err(e) => {
            writeln!(out, "Error extracting text from {}: {}", format.label(), e)?;
            String::new()
        }
    };

    let written = target
        .destination_for(input_path)
        .and_then(|destination| route(out, &text, destination.as_deref(), input_path));
    if let Err(e) = written {
        writeln!(out, "Error writing to output file: {}", e)?;
    }

    Ok(())
}
