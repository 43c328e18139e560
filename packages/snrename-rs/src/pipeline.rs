//! Drives a run: walk the folder, OCR each file, extract serials, rename, record.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use snrename_ocr::{OcrEngine, OcrInput};
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};

use crate::extractor::{SerialExtractor, DEFAULT_LABELS, SERIAL_LENGTH};
use crate::renamer::{rename_image, resolve_destination, CollisionPolicy};
use crate::report::{ImageRecord, Outcome, RunResult};
use crate::walker::{walk, WalkError};

/// Parameters of a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub root: PathBuf,
    /// Maximum number of files considered per directory.
    pub limit: Option<usize>,
    pub output_dir: PathBuf,
    pub labels: Vec<String>,
    pub collision: CollisionPolicy,
    /// Leave files without a serial under their current name instead of `unnamed.<ext>`.
    pub keep_unmatched: bool,
    pub dry_run: bool,
    /// Files processed at the same time; 1 processes them one after another.
    pub jobs: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            limit: None,
            output_dir: PathBuf::from("outputs"),
            labels: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
            collision: CollisionPolicy::default(),
            keep_unmatched: false,
            dry_run: false,
            jobs: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("worker pool closed: {0}")]
    Pool(String),
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Everything needed to process one file; cheap to clone into spawned tasks.
struct FileProcessor<E> {
    engine: Arc<E>,
    extractor: Arc<SerialExtractor>,
    collision: CollisionPolicy,
    keep_unmatched: bool,
    dry_run: bool,
    rename_lock: Arc<Mutex<()>>,
}

impl<E> Clone for FileProcessor<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            extractor: self.extractor.clone(),
            collision: self.collision,
            keep_unmatched: self.keep_unmatched,
            dry_run: self.dry_run,
            rename_lock: self.rename_lock.clone(),
        }
    }
}

impl<E: OcrEngine> FileProcessor<E> {
    fn failed(
        &self,
        path: PathBuf,
        serials: Vec<String>,
        name: &str,
        err: &dyn std::fmt::Display,
    ) -> ImageRecord {
        let message = format!("Error processing `{}`: {}", name, err);
        tracing::error!(path = %path.display(), "{}", message);
        ImageRecord {
            output_path: path.clone(),
            input_path: path,
            extracted_serials: serials,
            status_message: message,
            outcome: Outcome::Failed,
        }
    }

    async fn process(&self, path: PathBuf) -> ImageRecord {
        let name = display_name(&path);

        let output = match self.engine.recognize(&OcrInput::FilePath(path.clone())).await {
            Ok(output) => output,
            Err(err) => return self.failed(path, Vec::new(), &name, &err),
        };
        let serials = self.extractor.extract_all(output.lines());
        tracing::debug!(path = %path.display(), ?serials, "extracted serial numbers");

        let unmatched_message = format!("No valid serial number found in {}", name);

        if serials.is_empty() && self.keep_unmatched {
            tracing::info!(path = %path.display(), "{}", unmatched_message);
            return ImageRecord {
                output_path: path.clone(),
                input_path: path,
                extracted_serials: serials,
                status_message: unmatched_message,
                outcome: Outcome::Unmatched,
            };
        }

        // collision checks and moves must not interleave between workers
        let moved = {
            let _guard = self.rename_lock.lock().await;
            if self.dry_run {
                resolve_destination(&path, &serials, self.collision).await
            } else {
                rename_image(&path, &serials, self.collision).await
            }
        };
        let dest = match moved {
            Ok(dest) => dest,
            Err(err) => return self.failed(path, serials, &name, &err),
        };
        let new_name = display_name(&dest);

        let (message, outcome, output_path) = if serials.is_empty() {
            let output_path = if self.dry_run { path.clone() } else { dest };
            (unmatched_message, Outcome::Unmatched, output_path)
        } else if self.dry_run {
            let message = format!("Dry run: would rename `{}` to `{}`", name, new_name);
            (message, Outcome::Planned, path.clone())
        } else {
            let message = format!("Success: Renamed `{}` to `{}`", name, new_name);
            (message, Outcome::Renamed, dest)
        };

        tracing::info!(path = %path.display(), "{}", message);
        ImageRecord {
            input_path: path,
            extracted_serials: serials,
            output_path,
            status_message: message,
            outcome,
        }
    }
}

/// A configured run over one folder tree.
pub struct Pipeline<E> {
    processor: FileProcessor<E>,
    config: RunConfig,
}

impl<E: OcrEngine + 'static> Pipeline<E> {
    pub fn new(engine: E, config: RunConfig) -> Self {
        let extractor = SerialExtractor::new(&config.labels, SERIAL_LENGTH);
        Self {
            processor: FileProcessor {
                engine: Arc::new(engine),
                extractor: Arc::new(extractor),
                collision: config.collision,
                keep_unmatched: config.keep_unmatched,
                dry_run: config.dry_run,
                rename_lock: Arc::new(Mutex::new(())),
            },
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Processes every file under the root. Failures of single files end up in
    /// their records; only an unusable root folder fails the whole run.
    pub async fn run(&self) -> Result<RunResult, PipelineError> {
        let started_at = Local::now();
        let files = walk(&self.config.root, self.config.limit)?;

        tracing::info!(
            root = %self.config.root.display(),
            limit = ?self.config.limit,
            jobs = self.config.jobs,
            dry_run = self.config.dry_run,
            "processing images"
        );

        let records = if self.config.jobs <= 1 {
            let mut records = Vec::new();
            for path in files {
                records.push(self.processor.process(path).await);
            }
            records
        } else {
            self.run_concurrent(files).await?
        };

        Ok(RunResult::new(started_at, records))
    }

    /// Bounded parallel variant; records still come back in walk order.
    async fn run_concurrent(
        &self,
        files: impl Iterator<Item = PathBuf>,
    ) -> Result<Vec<ImageRecord>, PipelineError> {
        let semaphore = Arc::new(Semaphore::new(self.config.jobs));
        let mut tasks = Vec::new();

        for path in files {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Pool(e.to_string()))?;
            let processor = self.processor.clone();
            let task_path = path.clone();
            let task = tokio::spawn(async move {
                let _permit = permit;
                processor.process(task_path).await
            });
            tasks.push((path, task));
        }

        let mut records = Vec::with_capacity(tasks.len());
        for (path, task) in tasks {
            match task.await {
                Ok(record) => records.push(record),
                Err(e) => {
                    let name = display_name(&path);
                    records.push(self.processor.failed(path, Vec::new(), &name, &e));
                }
            }
        }
        Ok(records)
    }
}
