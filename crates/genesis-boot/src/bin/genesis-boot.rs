//! `genesis-boot` command line
//!
//! Loads a store snapshot, runs the boot sequence or a single check, and
//! prints the report. Exit code 2 means the boot is held for review.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use genesis_boot::{
    BootConfig, BootError, BootOutcome, BootReport, BootSequencer, BootStart, ProgressEvent,
};
use genesis_diagnostics::{
    CheckKey, Environment, HostEnvironment, ProgressStatus, StaticEnvironment,
};
use genesis_store::{MemoryStore, Schema, Snapshot};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Held for review and not acknowledged
const EXIT_HELD: u8 = 2;

fn cli() -> Command {
    Command::new("genesis-boot")
        .version(genesis_boot::VERSION)
        .about("Point-of-sale boot diagnostics with self-repair")
        .subcommand_required(true)
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON snapshot of the local store (empty store if missing)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML boot configuration"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Data directory measured for storage usage"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Treat the device as offline"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("run")
                .about("Run the full boot sequence")
                .arg(
                    Arg::new("paced")
                        .long("paced")
                        .action(ArgAction::SetTrue)
                        .help("Keep the interactive pacing delays"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .action(ArgAction::SetTrue)
                        .help("Write repairs and the report back to the snapshot"),
                )
                .arg(
                    Arg::new("acknowledge")
                        .long("acknowledge")
                        .action(ArgAction::SetTrue)
                        .help("Accept a non-success outcome and exit cleanly"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Run a single check")
                .arg(
                    Arg::new("key")
                        .required(true)
                        .value_parser(CheckKey::ORDER.map(CheckKey::as_str))
                        .help("Check to run"),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .action(ArgAction::SetTrue)
                        .help("Write repairs back to the snapshot"),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Show the last persisted boot report")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                ),
        )
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match dispatch(&matches).await {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(error = %error, "genesis-boot failed");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("genesis_boot=info,genesis_diagnostics=info,genesis_store=warn")
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn dispatch(matches: &ArgMatches) -> Result<ExitCode> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => BootConfig::load(path)?,
        None => BootConfig::default(),
    };
    if matches.get_flag("offline") {
        config.online = false;
    }
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config.data_dir = Some(dir.clone());
    }

    let snapshot_path = matches.get_one::<PathBuf>("snapshot").cloned();
    let store = Arc::new(open_store(snapshot_path.as_deref())?);

    match matches.subcommand() {
        Some(("run", args)) => {
            if !args.get_flag("paced") {
                config = config.with_headless(true);
            }
            let sequencer = BootSequencer::assemble(store.clone(), environment(&config), config).await?;
            let started = sequencer.start(&print_progress).await;
            // repairs already applied must reach the snapshot even when the run fails
            persist(args, &store, snapshot_path.as_deref())?;
            if let Some(report) = started.as_ref().err().and_then(BootError::unsaved_report) {
                print_report(report, args.get_flag("json"))?;
            }
            let started = started?;

            let outcome = match started {
                BootStart::Skipped => {
                    println!("Diagnostics skipped");
                    return Ok(ExitCode::SUCCESS);
                }
                BootStart::Completed(outcome) => outcome,
            };
            print_report(outcome.report(), args.get_flag("json"))?;

            match outcome {
                BootOutcome::Ready(_) => Ok(ExitCode::SUCCESS),
                BootOutcome::AwaitingAcknowledgement(pending) => {
                    if args.get_flag("acknowledge") {
                        let _report = pending.acknowledge();
                        Ok(ExitCode::SUCCESS)
                    } else {
                        eprintln!("Boot held: review the report and rerun with --acknowledge");
                        Ok(ExitCode::from(EXIT_HELD))
                    }
                }
            }
        }
        Some(("check", args)) => {
            let Some(name) = args.get_one::<String>("key") else {
                bail!("missing check key");
            };
            let key: CheckKey = name.parse()?;
            let sequencer = BootSequencer::assemble(store.clone(), environment(&config), config).await?;
            let run = sequencer.diagnostics().run_check(key).await;

            println!("{:<9} {}: {}", run.result.status, key.label(), run.result.message);
            for repair in &run.repairs {
                println!("  repaired: {}", repair.description);
            }
            persist(args, &store, snapshot_path.as_deref())?;
            Ok(if run.result.status.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_HELD)
            })
        }
        Some(("report", args)) => {
            let reports = genesis_boot::BootReportStore::new(config.report_key.clone());
            match reports.load(store.as_ref()).await? {
                Some(report) => {
                    print_report(&report, args.get_flag("json"))?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("No boot report recorded");
                    Ok(ExitCode::from(EXIT_HELD))
                }
            }
        }
        _ => bail!("unknown subcommand"),
    }
}

fn open_store(path: Option<&Path>) -> Result<MemoryStore> {
    match path {
        Some(path) if path.exists() => {
            let snapshot = Snapshot::load(path)
                .with_context(|| format!("loading snapshot {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = snapshot.row_count(), "snapshot loaded");
            Ok(MemoryStore::from_snapshot(Schema::genesis(), snapshot)?)
        }
        Some(path) => {
            tracing::warn!(path = %path.display(), "snapshot not found, starting empty");
            Ok(MemoryStore::genesis())
        }
        None => Ok(MemoryStore::genesis()),
    }
}

fn environment(config: &BootConfig) -> Arc<dyn Environment> {
    match &config.data_dir {
        Some(dir) => Arc::new(HostEnvironment::new(dir.clone()).with_online(config.online)),
        None => Arc::new(StaticEnvironment::new().with_online(config.online)),
    }
}

fn persist(args: &ArgMatches, store: &MemoryStore, path: Option<&Path>) -> Result<()> {
    if !args.get_flag("save") {
        return Ok(());
    }
    let Some(path) = path else {
        bail!("--save needs --snapshot");
    };
    store
        .snapshot()
        .save(path)
        .with_context(|| format!("writing snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), "snapshot saved");
    Ok(())
}

fn print_progress(event: &ProgressEvent) {
    let state = match event.status {
        ProgressStatus::Checking => "...".to_string(),
        ProgressStatus::Done(status) => status.to_string(),
    };
    eprintln!(
        "[{}/{} {:>3}%] {} {}",
        event.current,
        event.total,
        event.percent(),
        event.check.label(),
        state
    );
}

fn print_report(report: &BootReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Overall: {}", report.overall);
    for (key, result) in &report.results {
        println!("  {:<9} {}: {}", result.status, key.label(), result.message);
    }
    if !report.repairs.is_empty() {
        println!("Repairs:");
        for repair in &report.repairs {
            println!("  - {repair}");
        }
    }
    println!("At: {}", report.timestamp.to_rfc3339());
    Ok(())
}
