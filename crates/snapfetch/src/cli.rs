use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use snapfetch_core::{ColumnSpec, ConfigError, RunConfig};
use snapfetch_fetch::RetryPolicy;
use snapfetch_verify::ChecksumAlgorithm;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "snapfetch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Download the images listed in a CSV manifest, then verify them by count and checksum",
    long_about = None
)]
pub struct Args {
    /// CSV manifest listing the images to download
    #[arg(short = 'i', long)]
    pub input_file: PathBuf,

    /// Directory the images are written to
    #[arg(short = 'o', long)]
    pub output_dir: PathBuf,

    /// Column whose value names a subfolder for each image
    #[arg(short = 's', long)]
    pub subdir_col: Option<String>,

    /// Column holding the file name of each image
    #[arg(short = 'n', long, default_value = "filename")]
    pub img_name_col: String,

    /// Column holding the URL of each image
    #[arg(short = 'u', long, default_value = "file_url")]
    pub url_col: String,

    /// Seconds to wait between attempts on a transient failure
    #[arg(short = 'w', long, default_value_t = 3)]
    pub wait_time: u64,

    /// Total attempts per image
    #[arg(short = 'r', long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: u32,

    /// Also write copies fitting within a square of this many pixels
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub side_length: Option<u32>,

    /// Checksum algorithm: md5, sha1, sha256, sha512 or blake3
    #[arg(short = 'a', long, default_value = "md5")]
    pub checksum_algorithm: String,

    /// Column holding expected checksums to verify downloads against
    #[arg(short = 'v', long)]
    pub verifier_col: Option<String>,

    /// Skip manifest rows before this index
    #[arg(long, default_value_t = 0)]
    pub starting_idx: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,

    /// Answer yes to every prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Args {
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let algorithm: ChecksumAlgorithm = self.checksum_algorithm.parse()?;
        let columns = ColumnSpec::default()
            .name(&self.img_name_col)
            .url(&self.url_col)
            .subfolder(self.subdir_col.clone())
            .verifier(self.verifier_col.clone());

        Ok(RunConfig::new(&self.input_file, &self.output_dir)
            .columns(columns)
            .retry(RetryPolicy::new(self.max_retries, Duration::from_secs(self.wait_time)))
            .side_length(self.side_length)
            .starting_idx(self.starting_idx)
            .algorithm(algorithm))
    }

    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("snapfetch").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["-i", "birds.csv", "-o", "out"]).unwrap();
        let config = args.run_config().unwrap();

        assert_eq!(config.columns.name, "filename");
        assert_eq!(config.columns.url, "file_url");
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.algorithm, ChecksumAlgorithm::Md5);
        assert_eq!(config.side_length, None);
        assert_eq!(config.starting_idx, 0);
        assert_eq!(args.timeout(), Duration::from_secs(120));
        assert!(!args.yes);
    }

    #[test]
    fn test_full_flag_set() {
        let args = parse(&[
            "-i", "m.csv", "-o", "out", "-s", "species", "-n", "name", "-u", "link", "-w", "1", "-r", "2", "-l", "128",
            "-a", "SHA-256", "-v", "sha256", "--starting-idx", "7", "--timeout", "30", "-y", "-q",
        ])
        .unwrap();
        let config = args.run_config().unwrap();

        assert_eq!(config.columns.subfolder.as_deref(), Some("species"));
        assert_eq!(config.columns.verifier.as_deref(), Some("sha256"));
        assert_eq!(config.retry, RetryPolicy::new(2, Duration::from_secs(1)));
        assert_eq!(config.side_length, Some(128));
        assert_eq!(config.algorithm, ChecksumAlgorithm::Sha256);
        assert_eq!(config.starting_idx, 7);
        assert!(args.yes && args.quiet);
    }

    #[test]
    fn test_unknown_algorithm_is_a_config_error() {
        let args = parse(&["-i", "m.csv", "-o", "out", "-a", "crc32"]).unwrap();
        assert!(matches!(args.run_config(), Err(ConfigError::InvalidAlgorithm(_))));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(parse(&["-i", "m.csv", "-o", "out", "-r", "0"]).is_err());
    }

    #[test]
    fn test_input_and_output_required() {
        assert!(parse(&["-i", "m.csv"]).is_err());
    }
}
