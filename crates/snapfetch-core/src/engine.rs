//! Sequential per-row download pass.

use snapfetch_fetch::{FetchOutcome, FetchReport, Fetcher, HttpClient, Pause};

use crate::downsample::{Downsampled, Downsampler};
use crate::error::Result;
use crate::layout::OutputLayout;
use crate::log::{AttemptRecord, DownloadLog, NO_URL_STATUS, Outcome};
use crate::manifest::{Manifest, ManifestRow};

/// Counters threaded through every row of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTally {
    pub delivered:       usize,
    pub failed:          usize,
    pub missing_url:     usize,
    pub already_present: usize,
    pub before_start:    usize,
    pub downsized:       usize,
    /// Non-fatal problems, currently downsampling failures.
    pub warnings:        Vec<String>,
}

impl RunTally {
    /// Rows that reached the engine, whatever their outcome.
    pub fn processed(&self) -> usize {
        self.delivered + self.failed + self.missing_url + self.already_present + self.before_start
    }
}

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Index below the starting index; nothing was done.
    BeforeStart,
    /// The target already existed; nothing was fetched or logged.
    AlreadyPresent,
    MissingUrl,
    Fetched(FetchReport),
}

pub struct DownloadEngine<C: HttpClient, P: Pause> {
    fetcher:      Fetcher<C, P>,
    layout:       OutputLayout,
    downsampler:  Option<Downsampler>,
    starting_idx: usize,
}

impl<C: HttpClient, P: Pause> DownloadEngine<C, P> {
    pub fn new(fetcher: Fetcher<C, P>, layout: OutputLayout) -> Self {
        Self {
            fetcher,
            layout,
            downsampler: None,
            starting_idx: 0,
        }
    }

    #[must_use]
    pub fn downsampler(mut self, downsampler: Option<Downsampler>) -> Self {
        self.downsampler = downsampler;
        self
    }

    /// Skip rows whose manifest index is below `starting_idx`.
    #[must_use]
    pub fn starting_idx(mut self, starting_idx: usize) -> Self {
        self.starting_idx = starting_idx;
        self
    }

    pub fn layout(&self) -> &OutputLayout { &self.layout }

    /// Process every named row in manifest order.
    ///
    /// Row failures are recorded in the log and the tally; only a log write
    /// failure stops the pass. `on_row` is called once per row after its
    /// outcome is known.
    pub async fn run<F>(&self, manifest: &Manifest, log: &mut DownloadLog, mut on_row: F) -> Result<RunTally>
    where
        F: FnMut(&ManifestRow, &RowOutcome),
    {
        let mut tally = RunTally::default();
        for row in manifest.rows() {
            let (next, outcome) = self.process_row(row, log, tally).await?;
            tally = next;
            on_row(row, &outcome);
        }

        tracing::info!(
            delivered = tally.delivered,
            failed = tally.failed,
            missing_url = tally.missing_url,
            already_present = tally.already_present,
            "download pass finished"
        );
        Ok(tally)
    }

    /// Drive one row to a terminal state and fold it into `tally`.
    pub async fn process_row(
        &self,
        row: &ManifestRow,
        log: &mut DownloadLog,
        mut tally: RunTally,
    ) -> Result<(RunTally, RowOutcome)> {
        if row.index < self.starting_idx {
            tally.before_start += 1;
            return Ok((tally, RowOutcome::BeforeStart));
        }

        let Some(url) = row.url.as_deref() else {
            tracing::info!(index = row.index, image = %row.image_name, "no url provided");
            log.append(&AttemptRecord::new(
                row.index,
                &row.image_name,
                None,
                Outcome::Error,
                NO_URL_STATUS,
            ))?;
            tally.missing_url += 1;
            return Ok((tally, RowOutcome::MissingUrl));
        };

        let target = self.layout.target(row);
        if target.is_file() {
            tracing::debug!(index = row.index, target = %target.display(), "already present");
            tally.already_present += 1;
            let tally = self.downsize(row, tally);
            return Ok((tally, RowOutcome::AlreadyPresent));
        }

        let report = self.fetcher.fetch(url, &target).await;
        let outcome = match &report.outcome {
            FetchOutcome::Delivered { status, bytes } => {
                tracing::info!(index = row.index, image = %row.image_name, status, bytes, attempts = report.attempts, "downloaded");
                tally.delivered += 1;
                Outcome::Success
            }
            FetchOutcome::Failed(failure) => {
                tracing::info!(index = row.index, image = %row.image_name, %failure, attempts = report.attempts, "download failed");
                tally.failed += 1;
                Outcome::Error
            }
        };
        let record = AttemptRecord::new(
            row.index,
            &row.image_name,
            Some(url.to_string()),
            outcome,
            report.outcome.status_text(),
        )
        .attempts(report.attempts);
        log.append(&record)?;

        if report.outcome.is_delivered() {
            tally = self.downsize(row, tally);
        }
        Ok((tally, RowOutcome::Fetched(report)))
    }

    fn downsize(&self, row: &ManifestRow, mut tally: RunTally) -> RunTally {
        let Some(downsampler) = &self.downsampler else {
            return tally;
        };
        let source = self.layout.target(row);
        let destination = self.layout.downsized_target(row);
        match downsampler.downsample(&source, &destination) {
            Ok(Downsampled::Written { .. }) => tally.downsized += 1,
            Ok(Downsampled::AlreadyPresent) => {}
            Err(e) => {
                tracing::warn!(index = row.index, image = %row.image_name, error = %e, "could not downsize");
                tally.warnings.push(format!("{}: {e}", row.image_name));
            }
        }
        tally
    }
}
