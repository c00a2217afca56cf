//! Fitts CLI - Command-line interface for Fitts Throughput
//!
//! Commands:
//! - replay: Run a recorded pointer log through the experiment session
//! - analyze: Aggregate previously recorded data sets
//! - layout: Print the target ring of a condition
//! - config: Print the default configuration
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use fitts_throughput::encoder::ReportEncoder;
use fitts_throughput::layout::layout_ring;
use fitts_throughput::pipeline::{parse_array, parse_data_sets, parse_ndjson, FittsProcessor};
use fitts_throughput::{aggregate, ExperimentConfig, FittsError, CRATE_VERSION, PRODUCER_NAME};

/// Fitts - Fitts's Law tapping experiment analysis
#[derive(Parser)]
#[command(name = "fitts")]
#[command(version = CRATE_VERSION)]
#[command(about = "Replay and analyze Fitts's Law tapping experiments", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded pointer log through the session and report throughput
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Experiment configuration (JSON); defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Aggregate recorded data sets (JSON array)
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Print the target ring for one condition
    Layout {
        /// Experiment configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Condition index (0-based)
        #[arg(long, default_value = "0")]
        condition: usize,
    },

    /// Print the default configuration
    Config,

    /// Diagnose configuration and environment
    Doctor {
        /// Configuration file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one pointer event per line)
    Ndjson,
    /// JSON array of pointer events
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
    /// One annotated trial per line
    Ndjson,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), FittsCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            config,
            input_format,
            output_format,
        } => cmd_replay(&input, &output, config.as_deref(), input_format, output_format),

        Commands::Analyze {
            input,
            output,
            output_format,
        } => cmd_analyze(&input, &output, output_format),

        Commands::Layout { config, condition } => cmd_layout(config.as_deref(), condition),

        Commands::Config => cmd_config(),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), FittsCliError> {
    let config = load_config(config)?;
    let input_data = read_input(input)?;

    let events = match input_format {
        InputFormat::Ndjson => parse_ndjson(&input_data)?,
        InputFormat::Json => parse_array(&input_data)?,
    };

    if events.is_empty() {
        return Err(FittsCliError::NoEvents);
    }

    let mut processor = FittsProcessor::new(config)?;
    processor.process_log(&events)?;

    let output_data = match output_format {
        OutputFormat::JsonPretty => processor.encode_report()?,
        OutputFormat::Json => {
            let payload = ReportEncoder::new().encode(&processor.aggregate(), processor.data_sets());
            serde_json::to_string(&payload)?
        }
        OutputFormat::Ndjson => processor.encode_rows()?,
    };

    write_output(output, &output_data)
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), FittsCliError> {
    let input_data = read_input(input)?;
    let data_sets = parse_data_sets(&input_data)?;

    if data_sets.iter().all(|set| set.records.is_empty()) {
        return Err(FittsCliError::NoRecords);
    }

    let report = aggregate(&data_sets);
    let encoder = ReportEncoder::new();

    let output_data = match output_format {
        OutputFormat::JsonPretty => encoder.encode_to_json(&report, &data_sets)?,
        OutputFormat::Json => serde_json::to_string(&encoder.encode(&report, &data_sets))?,
        OutputFormat::Ndjson => encoder.encode_rows(&report)?,
    };

    write_output(output, &output_data)
}

fn cmd_layout(config: Option<&Path>, condition: usize) -> Result<(), FittsCliError> {
    let config = load_config(config)?;
    let Some(trial) = config.conditions.get(condition) else {
        return Err(FittsCliError::UnknownCondition(condition));
    };

    let targets = layout_ring(
        config.targets_per_ring,
        trial.amplitude,
        trial.width,
        config.display.center(),
    );
    println!("{}", serde_json::to_string_pretty(&targets)?);
    Ok(())
}

fn cmd_config() -> Result<(), FittsCliError> {
    println!("{}", ExperimentConfig::default().to_json()?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), FittsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} {}", PRODUCER_NAME, CRATE_VERSION),
    });

    if let Some(config_path) = config {
        let check = match fs::read_to_string(config_path) {
            Ok(content) => match ExperimentConfig::from_json(&content) {
                Ok(parsed) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Configuration valid ({} conditions, {} targets per ring)",
                        parsed.conditions.len(),
                        parsed.targets_per_ring
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read configuration file: {}", e),
            },
        };
        checks.push(check);
    } else {
        checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "No configuration given, defaults apply".to_string(),
        });
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (interactive mode)"
    } else {
        "stdin is a pipe (replay from stdin ready)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: CRATE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Fitts Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(FittsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn load_config(path: Option<&Path>) -> Result<ExperimentConfig, FittsCliError> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(ExperimentConfig::from_json(&content)?)
        }
        None => Ok(ExperimentConfig::default()),
    }
}

fn read_input(input: &Path) -> Result<String, FittsCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), FittsCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
        if !data.ends_with('\n') {
            println!();
        }
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum FittsCliError {
    Io(io::Error),
    Fitts(FittsError),
    Json(serde_json::Error),
    NoEvents,
    NoRecords,
    UnknownCondition(usize),
    DoctorFailed,
}

impl From<io::Error> for FittsCliError {
    fn from(e: io::Error) -> Self {
        FittsCliError::Io(e)
    }
}

impl From<FittsError> for FittsCliError {
    fn from(e: FittsError) -> Self {
        FittsCliError::Fitts(e)
    }
}

impl From<serde_json::Error> for FittsCliError {
    fn from(e: serde_json::Error) -> Self {
        FittsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FittsCliError> for CliError {
    fn from(e: FittsCliError) -> Self {
        match e {
            FittsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FittsCliError::Fitts(FittsError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'fitts config' for a valid starting point".to_string()),
            },
            FittsCliError::Fitts(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is a pointer log or a data set array".to_string()),
            },
            FittsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FittsCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No pointer events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            FittsCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "Data sets contain no trial records".to_string(),
                hint: None,
            },
            FittsCliError::UnknownCondition(index) => CliError {
                code: "UNKNOWN_CONDITION".to_string(),
                message: format!("No condition with index {}", index),
                hint: Some("Condition indices are 0-based".to_string()),
            },
            FittsCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
