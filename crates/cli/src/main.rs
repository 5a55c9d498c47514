//! unredact - infer the content hidden behind PDF redactions
//!
//! Reads a layout dump (pages with text spans and filled rectangles), runs
//! the inference pipeline and writes a JSON report.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use unredact_core::ingest;
use unredact_core::model::DocumentState;
use unredact_core::sources::{CompositeSource, WordListSource};
use unredact_core::{Pipeline, PipelineParams, RunOptions, RunReport, Stage};

/// Exit status for a run that halted at a failing stage.
const EXIT_HALTED: i32 = 2;

/// Infer likely content behind black-box redactions from page layout,
/// typography and width-matched candidates.
#[derive(Parser, Debug)]
#[command(name = "unredact")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline over a layout dump
    Run(RunArgs),
    /// List the pipeline stages in execution order
    Steps,
    /// Print the default parameters as JSON
    Params,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Layout dump to process (JSON)
    #[arg(required_unless_present = "resume")]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this stage
    #[arg(long = "stop-after", value_name = "STAGE")]
    stop_after: Option<String>,

    /// Comma-separated stages to skip
    #[arg(long, value_name = "STAGES")]
    skip: Option<String>,

    /// Continue from a saved state snapshot; stages with output are skipped
    #[arg(long, value_name = "SNAPSHOT")]
    resume: Option<PathBuf>,

    /// Save the final document state to this path
    #[arg(long = "save-state", value_name = "PATH")]
    save_state: Option<PathBuf>,

    /// Parameters file (JSON); missing fields take defaults
    #[arg(long, value_name = "PATH")]
    params: Option<PathBuf>,

    /// Extra candidate word lists (JSON object keyed by category)
    #[arg(long, value_name = "PATH")]
    dictionary: Option<PathBuf>,

    /// Worker threads
    #[arg(long)]
    threads: Option<usize>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

fn build_options(args: &RunArgs) -> Result<RunOptions> {
    let stop_after = args
        .stop_after
        .as_deref()
        .map(str::parse::<Stage>)
        .transpose()
        .context("invalid --stop-after")?;
    let skip = match args.skip.as_deref() {
        Some(list) => Stage::parse_list(list).context("invalid --skip")?,
        None => Default::default(),
    };
    Ok(RunOptions {
        stop_after,
        skip,
        resume: args.resume.is_some(),
    })
}

fn build_pipeline(args: &RunArgs) -> Result<Pipeline> {
    let mut params = match &args.params {
        Some(path) => PipelineParams::from_json_file(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => PipelineParams::default(),
    };
    if args.threads.is_some() {
        params.threads = args.threads;
    }
    let mut pipeline = Pipeline::new(params)?;
    if let Some(path) = &args.dictionary {
        let words = WordListSource::from_json_file(path)
            .with_context(|| format!("failed to load dictionary {}", path.display()))?;
        pipeline = pipeline.with_source(CompositeSource::with_builtin_after(words));
    }
    Ok(pipeline)
}

fn load_state(args: &RunArgs) -> Result<DocumentState> {
    match (&args.resume, &args.input) {
        (Some(snapshot), _) => DocumentState::load(snapshot)
            .with_context(|| format!("failed to load snapshot {}", snapshot.display())),
        (None, Some(input)) => ingest::load_document(input)
            .with_context(|| format!("failed to read layout dump {}", input.display())),
        (None, None) => anyhow::bail!("an input file or --resume snapshot is required"),
    }
}

/// Consolidated output when the run got that far, otherwise a diagnostic.
fn report_json(report: &RunReport) -> Result<String> {
    if report.halted.is_none()
        && let Some(output) = &report.state.output
    {
        return Ok(serde_json::to_string_pretty(output)?);
    }
    let halted = report.halted.as_ref().map(|h| {
        json!({
            "stage": h.stage,
            "last_completed": h.last_completed,
            "error": h.error.to_string(),
        })
    });
    let diagnostic = json!({
        "status": if halted.is_some() { "halted" } else { "partial" },
        "completed": report.completed,
        "skipped": report.skipped,
        "halted": halted,
        "redactions": report.state.redaction_count(),
        "stage_timings": report.state.stage_timings,
    });
    Ok(serde_json::to_string_pretty(&diagnostic)?)
}

fn print_timings(report: &RunReport) {
    for (stage, seconds) in &report.state.stage_timings {
        eprintln!("  {stage:<20} {seconds:>9.4}s");
    }
}

fn run(args: &RunArgs) -> Result<i32> {
    let options = build_options(args)?;
    let pipeline = build_pipeline(args)?;
    let state = load_state(args)?;

    let report = pipeline.run(state, &options)?;
    print_timings(&report);

    let mut out = open_output(args.output.as_deref())?;
    writeln!(out, "{}", report_json(&report)?)?;
    out.flush()?;

    if let Some(path) = &args.save_state {
        report
            .state
            .save(path)
            .with_context(|| format!("failed to save state to {}", path.display()))?;
    }

    match &report.halted {
        Some(halt) => {
            eprintln!("Error: {halt}");
            Ok(EXIT_HALTED)
        }
        None => Ok(0),
    }
}

fn list_steps() {
    for stage in Stage::ALL {
        println!("{:<20} {}", stage.name(), stage.description());
    }
}

fn print_params() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&PipelineParams::default())?);
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Run(args) => run(args),
        Command::Steps => {
            list_steps();
            Ok(0)
        }
        Command::Params => print_params().map(|()| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
