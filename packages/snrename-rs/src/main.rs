mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use snrename_ocr::AzureOcrEngine;
use snrename_rs::{init_logging, Pipeline};

async fn run(args: RunArgs) -> Result<()> {
  let settings = args.azure_settings()?;
  let engine = AzureOcrEngine::azure(settings, args.poll_policy())
    .context("failed to configure the OCR client")?;
  let config = args.run_config();
  let output_dir = config.output_dir.clone();

  let pipeline = Pipeline::new(engine, config);
  let result = pipeline.run().await.context("run aborted")?;
  let csv_path = result
    .write_csv(&output_dir)
    .context("failed to save the CSV log")?;

  let mut summary = result.summary();
  summary.output = Some(csv_path);
  tracing::info!(
    files = summary.files,
    renamed = summary.renamed,
    unmatched = summary.unmatched,
    failed = summary.failed,
    "run finished"
  );
  println!("{}", serde_json::to_string_pretty(&summary)?);
  Ok(())
}

#[tokio::main]
async fn main() {
  let cli = Cli::parse();

  match cli.command {
    Commands::Version => {
      println!("snrename {}", env!("CARGO_PKG_VERSION"));
    }
    Commands::Run(args) => {
      init_logging(&args.log_level, args.log_json);
      if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
      }
    }
  }
}
