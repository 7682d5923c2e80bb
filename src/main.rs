// Forcebeat command-line caller
// Analyzes recorded sessions and prints or writes their reports

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use forcebeat_lib::pipeline::{analyze_batch, SessionAnalyzer, TraceWriter};
use forcebeat_lib::{AnalysisConfig, PressureCalibration, SessionInput, SessionReport};

#[derive(Parser)]
#[command(name = "forcebeat")]
#[command(about = "Force-trace gesture analysis for rhythm sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one session and print its report
    Analyze {
        /// Session JSON file (forceTrace, expectedNotes)
        session: PathBuf,

        /// Analysis config JSON (defaults to the per-user config file)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Lane count, when the session does not state it
        #[arg(short, long)]
        lanes: Option<usize>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append stage progress to this JSONL file
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Treat pressure as raw sensor readings, normalized with this calibration file
        #[arg(long)]
        raw_calibration: Option<PathBuf>,
    },

    /// Analyze several sessions concurrently
    Batch {
        /// Session JSON files
        #[arg(required = true)]
        sessions: Vec<PathBuf>,

        /// Analysis config JSON (defaults to the per-user config file)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Lane count, for sessions that do not state it
        #[arg(short, long)]
        lanes: Option<usize>,

        /// Directory for `<session>.report.json` files (defaults to each session's directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the effective analysis config
    Config {
        /// Analysis config JSON (defaults to the per-user config file)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            session,
            config,
            lanes,
            output,
            trace,
            raw_calibration,
        } => {
            let config = AnalysisConfig::load(config.as_deref())?;
            let mut input = read_session(&session).await?;

            if let Some(path) = raw_calibration {
                let data = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("reading calibration {}", path.display()))?;
                let calibration = PressureCalibration::from_json_bytes(&data)
                    .with_context(|| format!("parsing calibration {}", path.display()))?;
                input.normalize_raw(&calibration)?;
            }

            let writer = trace.map(TraceWriter::new);
            let mut analyzer = SessionAnalyzer::new(&config);
            if let Some(writer) = writer.as_ref() {
                analyzer = analyzer.with_trace(writer);
            }

            let report = SessionReport::build_with(&analyzer, &input, lanes)
                .with_context(|| format!("analyzing {}", session.display()))?;

            match output {
                Some(path) => {
                    report.write_to(&path)?;
                    log::info!("Wrote report to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }

        Commands::Batch {
            sessions,
            config,
            lanes,
            output_dir,
        } => {
            let config = Arc::new(AnalysisConfig::load(config.as_deref())?);

            let failures = run_batch(&sessions, lanes, output_dir.as_deref(), config).await;
            if failures > 0 {
                bail!("{} of {} sessions failed", failures, sessions.len());
            }
        }

        Commands::Config { config } => {
            let config = AnalysisConfig::load(config.as_deref())?;
            println!("{}", config.to_json()?);
        }
    }

    Ok(())
}

/// Analyze every session file and write its report; returns the number of failures
///
/// A file that cannot be read, parsed, analyzed, or written is logged and skipped.
async fn run_batch(
    sessions: &[PathBuf],
    lanes: Option<usize>,
    output_dir: Option<&Path>,
    config: Arc<AnalysisConfig>,
) -> usize {
    let mut failures = 0;
    let mut loaded = Vec::with_capacity(sessions.len());
    let mut inputs = Vec::with_capacity(sessions.len());

    for path in sessions {
        match read_session(path).await {
            Ok(input) => {
                loaded.push(path);
                inputs.push(input);
            }
            Err(e) => {
                log::error!("{:#}", e);
                failures += 1;
            }
        }
    }

    let results = analyze_batch(inputs, lanes, config).await;

    for (path, result) in loaded.into_iter().zip(results) {
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                failures += 1;
                continue;
            }
        };

        let out = report_path(path, output_dir);
        match report.write_to(&out) {
            Ok(()) => log::info!(
                "{}: {} gestures -> {}",
                path.display(),
                report.gestures.len(),
                out.display()
            ),
            Err(e) => {
                log::error!("{}: writing {}: {}", path.display(), out.display(), e);
                failures += 1;
            }
        }
    }

    failures
}

async fn read_session(path: &Path) -> Result<SessionInput> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading session {}", path.display()))?;
    SessionInput::from_json_bytes(&data).with_context(|| format!("parsing session {}", path.display()))
}

fn report_path(session: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = session
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session".to_string());
    let file_name = format!("{}.report.json", stem);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => session.with_file_name(file_name),
    }
}
