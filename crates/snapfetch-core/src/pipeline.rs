//! Run configuration and the validate → download → reconcile sequence.
//!
//! Stages are exposed separately so a front end can stop between them, for
//! example to ask the user before touching an existing output directory.
//! [`run`] chains them without any interaction.

use std::path::{Path, PathBuf};

use snapfetch_fetch::{Fetcher, HttpClient, Pause, RetryPolicy};
use snapfetch_verify::{ChecksumAlgorithm, ChecksumScanner};

use crate::downsample::Downsampler;
use crate::engine::{DownloadEngine, RowOutcome, RunTally};
use crate::error::{Error, Result};
use crate::existing::{OutputState, inspect_output};
use crate::layout::OutputLayout;
use crate::log::{DownloadLog, LogPaths, read_last_records};
use crate::manifest::{ColumnSpec, Manifest, ManifestRow};
use crate::reconcile::{JoinKey, ReconciliationReport, Reconciler, write_missing_csv};

/// Everything a run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input:        PathBuf,
    pub output_dir:   PathBuf,
    pub columns:      ColumnSpec,
    pub retry:        RetryPolicy,
    /// Produce downsized copies fitting this square, if set.
    pub side_length:  Option<u32>,
    pub starting_idx: usize,
    pub algorithm:    ChecksumAlgorithm,
    pub join_key:     JoinKey,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input:        PathBuf::new(),
            output_dir:   PathBuf::new(),
            columns:      ColumnSpec::default(),
            retry:        RetryPolicy::default(),
            side_length:  None,
            starting_idx: 0,
            algorithm:    ChecksumAlgorithm::default(),
            join_key:     JoinKey::default(),
        }
    }
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn columns(mut self, columns: ColumnSpec) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn side_length(mut self, side_length: Option<u32>) -> Self {
        self.side_length = side_length;
        self
    }

    #[must_use]
    pub fn starting_idx(mut self, starting_idx: usize) -> Self {
        self.starting_idx = starting_idx;
        self
    }

    #[must_use]
    pub fn algorithm(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn join_key(mut self, join_key: JoinKey) -> Self {
        self.join_key = join_key;
        self
    }
}

/// Files written beside the manifest, named after its stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub logs:      LogPaths,
    pub checksums: PathBuf,
    pub missing:   PathBuf,
}

impl ArtifactPaths {
    pub fn for_manifest(input: &Path) -> Self {
        let dir = input.parent().unwrap_or(Path::new(""));
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "manifest".to_string());
        let beside = |suffix: &str| dir.join(format!("{stem}{suffix}"));

        Self {
            logs:      LogPaths {
                success: beside("_log.jsonl"),
                error:   beside("_error_log.jsonl"),
            },
            checksums: beside("_checksums.csv"),
            missing:   beside("_missing.csv"),
        }
    }
}

/// A validated run, ready for its download and reconciliation stages.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    config:    RunConfig,
    manifest:  Manifest,
    layout:    OutputLayout,
    artifacts: ArtifactPaths,
}

impl PreparedRun {
    /// Load and validate the manifest. Nothing is written.
    pub fn prepare(config: RunConfig) -> Result<Self> {
        let manifest = Manifest::load(&config.input, &config.columns)?;
        let layout = OutputLayout::new(&config.output_dir);
        let artifacts = ArtifactPaths::for_manifest(&config.input);
        tracing::info!(
            manifest = %config.input.display(),
            rows = manifest.total_rows(),
            candidates = manifest.expected_count(),
            "manifest loaded"
        );

        Ok(Self {
            config,
            manifest,
            layout,
            artifacts,
        })
    }

    pub fn config(&self) -> &RunConfig { &self.config }

    pub fn manifest(&self) -> &Manifest { &self.manifest }

    pub fn layout(&self) -> &OutputLayout { &self.layout }

    pub fn artifacts(&self) -> &ArtifactPaths { &self.artifacts }

    pub fn inspect_output(&self) -> Result<OutputState> { inspect_output(&self.layout, &self.manifest) }

    /// Create the output root and run the sequential download pass,
    /// appending to the logs.
    pub async fn download<C, P, F>(&self, client: C, pause: P, on_row: F) -> Result<RunTally>
    where
        C: HttpClient,
        P: Pause,
        F: FnMut(&ManifestRow, &RowOutcome),
    {
        let root = self.layout.root();
        std::fs::create_dir_all(root).map_err(|source| Error::CreateOutput {
            path: root.to_path_buf(),
            source,
        })?;

        let fetcher = Fetcher::new(client, pause).with_policy(self.config.retry);
        let engine = DownloadEngine::new(fetcher, self.layout.clone())
            .downsampler(self.config.side_length.map(Downsampler::new))
            .starting_idx(self.config.starting_idx);
        let mut log = DownloadLog::new(self.artifacts.logs.clone());

        tracing::info!(output = %self.layout.root().display(), starting_idx = self.config.starting_idx, "starting downloads");
        engine.run(&self.manifest, &mut log, on_row).await
    }

    /// Scan the output directory, write the checksum table and, when the
    /// manifest has a verifier column, the missing report.
    ///
    /// The missing report is rewritten on every verified run, so a clean run
    /// leaves only its header.
    pub fn reconcile<S: ChecksumScanner>(&self, scanner: S) -> Result<ReconciliationReport> {
        let logged = read_last_records(&self.artifacts.logs)?;
        let report = Reconciler::new(scanner, self.config.algorithm)
            .join_key(self.config.join_key)
            .reconcile(self.layout.root(), &self.manifest, &logged)?;

        report.table.write_csv(&self.artifacts.checksums)?;
        if let Some(verification) = &report.verification {
            write_missing_csv(&self.artifacts.missing, self.manifest.headers(), &verification.missing)?;
            tracing::info!(path = %self.artifacts.missing.display(), rows = verification.missing.len(), "missing report written");
        }
        Ok(report)
    }
}

/// Outcome of a complete non-interactive run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub tally:  RunTally,
    pub report: ReconciliationReport,
}

/// Validate, download and reconcile without stopping in between.
pub async fn run<C, P, S>(config: RunConfig, client: C, pause: P, scanner: S) -> Result<RunSummary>
where
    C: HttpClient,
    P: Pause,
    S: ChecksumScanner,
{
    let prepared = PreparedRun::prepare(config)?;
    let tally = prepared.download(client, pause, |_, _| {}).await?;
    let report = prepared.reconcile(scanner)?;
    Ok(RunSummary { tally, report })
}
