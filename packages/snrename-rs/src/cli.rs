//! Command line arguments backing the `snrename` binary.
use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use snrename_ocr::{AzureSettings, PollPolicy};
use snrename_rs::{CollisionPolicy, RunConfig, DEFAULT_LABELS};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
  name = "snrename",
  about = "Rename images after the serial numbers printed on them",
  version
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Print version information
  Version,
  /// OCR every image under a folder and rename it after its serial number(s)
  Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
  /// Folder to process, including subfolders
  pub folder: PathBuf,

  /// Maximum number of files considered in each folder
  #[arg(long, short = 'l')]
  pub limit: Option<usize>,

  /// Folder the CSV log is written to
  #[arg(long, short = 'o', default_value = "outputs")]
  pub output_dir: PathBuf,

  /// Computer Vision endpoint, e.g. https://<resource>.cognitiveservices.azure.com
  #[arg(long, env = "AZURE_VISION_ENDPOINT")]
  pub endpoint: Option<String>,

  /// Computer Vision subscription key
  #[arg(long, env = "AZURE_VISION_KEY", hide_env_values = true)]
  pub key: Option<String>,

  /// Label preceding a serial number (repeatable, case-insensitive)
  #[arg(long = "label", value_name = "LABEL")]
  pub labels: Vec<String>,

  /// What to do when the new name is already taken
  #[arg(long, value_enum, default_value_t = CollisionPolicy::Suffix)]
  pub on_collision: CollisionPolicy,

  /// Leave images without a serial number under their current name
  #[arg(long)]
  pub keep_unmatched: bool,

  /// Compute new names and write the log without renaming anything
  #[arg(long)]
  pub dry_run: bool,

  /// Number of images processed at the same time
  #[arg(long, short = 'j', default_value_t = 1)]
  pub jobs: usize,

  /// Delay before the first status check of a read job
  #[arg(long, default_value_t = 500)]
  pub poll_interval_ms: u64,

  /// Longest delay between two status checks
  #[arg(long, default_value_t = 5000)]
  pub poll_max_interval_ms: u64,

  /// Give up on a read job after this many seconds (0 waits forever)
  #[arg(long, default_value_t = 120)]
  pub poll_timeout_secs: u64,

  /// Log filter used when RUST_LOG is not set
  #[arg(long, default_value = "info")]
  pub log_level: String,

  /// Emit logs as JSON lines
  #[arg(long)]
  pub log_json: bool,
}

impl RunArgs {
  pub fn azure_settings(&self) -> Result<AzureSettings> {
    let endpoint = self
      .endpoint
      .clone()
      .filter(|e| !e.trim().is_empty())
      .ok_or_else(|| anyhow!("missing OCR endpoint: pass --endpoint or set AZURE_VISION_ENDPOINT"))?;
    let subscription_key = self
      .key
      .clone()
      .filter(|k| !k.trim().is_empty())
      .ok_or_else(|| anyhow!("missing OCR key: pass --key or set AZURE_VISION_KEY"))?;

    Ok(AzureSettings {
      endpoint,
      subscription_key,
    })
  }

  pub fn poll_policy(&self) -> PollPolicy {
    let timeout = match self.poll_timeout_secs {
      0 => None,
      secs => Some(Duration::from_secs(secs)),
    };
    PollPolicy {
      initial_delay: Duration::from_millis(self.poll_interval_ms),
      max_delay: Duration::from_millis(self.poll_max_interval_ms.max(self.poll_interval_ms)),
      timeout,
    }
  }

  pub fn run_config(&self) -> RunConfig {
    let labels = if self.labels.is_empty() {
      DEFAULT_LABELS.iter().map(|s| s.to_string()).collect()
    } else {
      self.labels.clone()
    };

    RunConfig {
      root: self.folder.clone(),
      limit: self.limit,
      output_dir: self.output_dir.clone(),
      labels,
      collision: self.on_collision,
      keep_unmatched: self.keep_unmatched,
      dry_run: self.dry_run,
      jobs: self.jobs.max(1),
    }
  }
}
