// crates/fleetcheck-cli/src/main.rs
// ============================================================================
// Module: Fleetcheck CLI Entry Point
// Description: Command dispatcher for fleet verification runs.
// Purpose: Load operator files, execute the catalog, and render reports.
// Dependencies: clap, fleetcheck-checks, fleetcheck-config, fleetcheck-core,
// fleetcheck-eapi, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The fleetcheck CLI wires the pieces together: operator YAML files are
//! loaded into engine inputs, the built-in check registry resolves catalog
//! identifiers, and the scheduler executes the plan over the eAPI transport.
//! Exit codes are stable: 0 when every result passed or was skipped, 1 when
//! any check failed or errored, 2 when setup failed before execution.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod report;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use fleetcheck_checks::CheckRegistry;
use fleetcheck_config::load_catalog;
use fleetcheck_config::load_inventory;
use fleetcheck_core::ProgressEvent;
use fleetcheck_core::ProgressSink;
use fleetcheck_core::RunPolicy;
use fleetcheck_core::RunSummary;
use fleetcheck_core::Scheduler;
use fleetcheck_core::UnitPhase;
use fleetcheck_core::UnitPolicy;
use fleetcheck_core::build_plan;
use fleetcheck_eapi::EapiConfig;
use fleetcheck_eapi::EapiTransport;
use thiserror::Error;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Exit code when at least one check failed or errored.
const EXIT_CHECKS_FAILED: u8 = 1;

/// Exit code for fatal setup failures before execution.
const EXIT_SETUP_FAILURE: u8 = 2;

// ============================================================================
// SECTION: Command Line
// ============================================================================

/// Top-level command line parser.
#[derive(Parser, Debug)]
#[command(name = "fleetcheck", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute the catalog against the inventory.
    Run(RunCommand),
    /// Load configuration and build the plan without executing it.
    Validate(ValidateCommand),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
struct RunCommand {
    /// Device inventory file.
    #[arg(long, value_name = "PATH")]
    inventory: PathBuf,
    /// Check catalog file.
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,
    /// Maximum simultaneously running test units.
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
    /// Overall run deadline in seconds.
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,
    /// Default collection timeout per attempt in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
    /// Default collection attempts per unit.
    #[arg(long, value_name = "N")]
    attempts: Option<u32>,
    /// Build and print the plan without executing it.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Stream per-unit progress lines to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
    /// Accept self-signed device certificates.
    #[arg(long, action = ArgAction::SetTrue)]
    insecure: bool,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Device inventory file.
    #[arg(long, value_name = "PATH")]
    inventory: PathBuf,
    /// Check catalog file.
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper; every variant is a fatal setup failure.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::Validate(command) => command_validate(&command),
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let devices =
        load_inventory(&command.inventory).map_err(|err| CliError::new(err.to_string()))?;
    let entries = load_catalog(&command.catalog).map_err(|err| CliError::new(err.to_string()))?;
    let registry = CheckRegistry::with_builtins();
    let policy = build_policy(&command);
    let plan = build_plan(&devices, &entries, &registry, &policy)
        .map_err(|err| CliError::new(err.to_string()))?;

    if policy.dry_run {
        for line in report::render_plan(&plan) {
            print_stdout(&line)?;
        }
        print_stdout(&format!(
            "dry run: {} units planned across {} devices",
            plan.len(),
            devices.len()
        ))?;
        return Ok(ExitCode::SUCCESS);
    }

    let transport = EapiTransport::new(&EapiConfig {
        accept_invalid_certs: command.insecure,
        ..EapiConfig::default()
    })
    .map_err(|err| CliError::new(err.to_string()))?;
    let scheduler = Scheduler::new(Arc::new(transport), policy);

    let (sink, printer) = if command.verbose {
        let (sink, mut rx) = ProgressSink::channel();
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let _ = write_stderr_line(&progress_line(&event));
            }
        });
        (sink, Some(printer))
    } else {
        (ProgressSink::disabled(), None)
    };

    let summary = scheduler.run(&devices, &plan, &sink).await;
    drop(sink);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    for line in report::render_table(&summary) {
        print_stdout(&line)?;
    }
    print_stdout(&summary.totals_line())?;
    Ok(ExitCode::from(completion_code(&summary)))
}

/// Builds the run policy from command-line overrides.
fn build_policy(command: &RunCommand) -> RunPolicy {
    let defaults = RunPolicy::default();
    RunPolicy {
        limit: command.limit.unwrap_or(defaults.limit),
        deadline: command.deadline.map(Duration::from_secs),
        unit: UnitPolicy {
            collect_timeout: command
                .timeout
                .map_or(defaults.unit.collect_timeout, Duration::from_secs),
            max_attempts: command.attempts.unwrap_or(defaults.unit.max_attempts),
        },
        dry_run: command.dry_run,
    }
}

/// Maps the run outcome to the process exit code.
fn completion_code(summary: &RunSummary) -> u8 {
    if summary.all_passed() { 0 } else { EXIT_CHECKS_FAILED }
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let devices =
        load_inventory(&command.inventory).map_err(|err| CliError::new(err.to_string()))?;
    let entries = load_catalog(&command.catalog).map_err(|err| CliError::new(err.to_string()))?;
    let registry = CheckRegistry::with_builtins();
    let plan = build_plan(&devices, &entries, &registry, &RunPolicy::default())
        .map_err(|err| CliError::new(err.to_string()))?;

    print_stdout(&format!(
        "validated: {} units across {} devices from {} catalog entries",
        plan.len(),
        devices.len(),
        entries.len()
    ))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Progress Rendering
// ============================================================================

/// Renders one progress event as a stderr line.
fn progress_line(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::UnitStarted {
            device,
            check,
        } => format!("start {device} {check}"),
        ProgressEvent::UnitAdvanced {
            device,
            check,
            phase,
        } => format!("phase {device} {check} {}", phase_label(*phase)),
        ProgressEvent::UnitFinished {
            device,
            check,
            status,
            duration,
        } => {
            format!("done {device} {check} {} in {}ms", status.as_str(), duration.as_millis())
        }
    }
}

/// Returns the stable label for a unit phase.
const fn phase_label(phase: UnitPhase) -> &'static str {
    match phase {
        UnitPhase::Pending => "pending",
        UnitPhase::Collecting => "collecting",
        UnitPhase::Evaluating => "evaluating",
        UnitPhase::Terminal(status) => status.as_str(),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes one line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Writes one line to stdout, mapping failures into CLI errors.
fn print_stdout(message: &str) -> CliResult<()> {
    write_stdout_line(message)
        .map_err(|err| CliError::new(format!("cannot write to stdout: {err}")))
}

/// Writes the error to stderr and returns the setup failure code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_SETUP_FAILURE)
}
