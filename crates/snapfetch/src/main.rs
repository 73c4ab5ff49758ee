mod cli;
mod ui;

use anyhow::Context;
use clap::Parser;
use console::style;
use snapfetch_core::{OutputState, PreparedRun, ReconciliationReport, RunTally};
use snapfetch_fetch::{ReqwestClient, TokioPause};
use snapfetch_verify::DirectoryScanner;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::ui::{RowTrackerBuilder, Tracker, confirm};

const LOG_ENV: &str = "SNAPFETCH_LOG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);
    tracing::debug!(?args, "parsed arguments");

    let config = args.run_config().context("invalid options")?;
    let prepared = PreparedRun::prepare(config)
        .with_context(|| format!("cannot use manifest {}", args.input_file.display()))?;
    if !preflight(&prepared, &args)? {
        return Ok(());
    }

    let client = ReqwestClient::new(args.timeout()).context("failed to set up the HTTP client")?;
    let tracker = RowTrackerBuilder::default()
        .with_rows(prepared.manifest().named_count())
        .with_prefix("Downloading")
        .with_finish("done")
        .hidden(args.quiet)
        .build();
    let tally = prepared
        .download(client, TokioPause, |row, _| {
            tracker.step(&row.image_name);
        })
        .await
        .context("download pass aborted")?;
    tracker.finish();
    print_tally(&prepared, &tally);

    let report = prepared
        .reconcile(DirectoryScanner::new())
        .context("could not check the output directory")?;
    print_report(&prepared, &report);
    Ok(())
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Questions asked before anything is written. `false` means stop quietly.
fn preflight(prepared: &PreparedRun, args: &Args) -> anyhow::Result<bool> {
    let manifest = prepared.manifest();
    let unnamed = manifest.unnamed_with_url();
    if unnamed > 0 {
        let question = format!("{unnamed} rows have a URL but no file name and will be ignored. Continue?");
        if !confirm(&question, args.yes)? {
            println!("Nothing was downloaded.");
            return Ok(false);
        }
    }

    let root = prepared.layout().root().display();
    match prepared.inspect_output()? {
        OutputState::Absent => Ok(true),
        state if state.is_complete() => {
            println!("{root} already contains all images.");
            Ok(false)
        }
        OutputState::Existing { present, .. } => {
            println!("There are {present} of the desired files already in {root}.");
            let proceed = confirm("Existing files are kept and only missing ones are fetched. Continue?", args.yes)?;
            if !proceed {
                println!("Nothing was downloaded.");
            }
            Ok(proceed)
        }
    }
}

fn print_tally(prepared: &PreparedRun, tally: &RunTally) {
    println!(
        "Downloaded {}, failed {}, without URL {}, already present {}.",
        style(tally.delivered).green(),
        style(tally.failed).red(),
        tally.missing_url,
        tally.already_present
    );
    if tally.before_start > 0 {
        println!("Skipped {} rows before the starting index.", tally.before_start);
    }
    if prepared.config().side_length.is_some() {
        println!(
            "Downsized {} copies into {}.",
            tally.downsized,
            prepared.layout().downsized_root().display()
        );
    }
    for warning in &tally.warnings {
        println!("{} {warning}", style("warning:").yellow());
    }

    let logs = &prepared.artifacts().logs;
    println!("Logs: {} and {}", logs.success.display(), logs.error.display());
}

fn print_report(prepared: &PreparedRun, report: &ReconciliationReport) {
    let artifacts = prepared.artifacts();
    let counts = format!(
        "{} of {} expected files are in {}.",
        report.actual_count,
        report.expected_count,
        prepared.layout().root().display()
    );
    if report.counts_match() {
        println!("{}", style(counts).green());
    } else {
        println!("{}", style(counts).yellow());
    }
    println!("Checksums: {}", artifacts.checksums.display());

    if let Some(verification) = &report.verification {
        if verification.missing.is_empty() {
            println!("{}", style(format!("All {} checksums match.", verification.checked)).green());
        } else {
            println!(
                "{}",
                style(format!(
                    "{} of {} rows are missing or do not match their checksum; see {}",
                    verification.missing.len(),
                    verification.checked,
                    artifacts.missing.display()
                ))
                .red()
            );
        }
    }
}
