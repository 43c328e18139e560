//! Per-file records of a run and the CSV log they are written to.
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How processing of a single file ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// At least one serial was found and the file was moved.
    Renamed,
    /// No serial was found.
    Unmatched,
    /// Dry run: the destination was computed but nothing was moved.
    Planned,
    /// OCR, extraction, or the rename failed.
    Failed,
}

/// Result of processing one file. Built once and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub input_path: PathBuf,
    pub extracted_serials: Vec<String>,
    /// Equal to `input_path` when the file was not moved.
    pub output_path: PathBuf,
    pub status_message: String,
    pub outcome: Outcome,
}

/// One line of the CSV log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub input_image_path: String,
    pub serial_numbers_list: String,
    pub output_image_path: String,
    pub log: String,
}

impl ImageRecord {
    /// One row per serial, or a single row with an empty serial when none were found.
    pub fn rows(&self) -> Vec<ReportRow> {
        let row = |serial: &str| ReportRow {
            input_image_path: self.input_path.display().to_string(),
            serial_numbers_list: serial.to_string(),
            output_image_path: self.output_path.display().to_string(),
            log: self.status_message.clone(),
        };

        if self.extracted_serials.is_empty() {
            vec![row("")]
        } else {
            self.extracted_serials.iter().map(|s| row(s.as_str())).collect()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub renamed: usize,
    pub unmatched: usize,
    pub planned: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot create output folder {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write CSV log: {0}")]
    Csv(#[from] csv::Error),
}

/// All records of one invocation, in walk order.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub started_at: DateTime<Local>,
    pub records: Vec<ImageRecord>,
}

impl RunResult {
    pub fn new(started_at: DateTime<Local>, records: Vec<ImageRecord>) -> Self {
        Self {
            started_at,
            records,
        }
    }

    /// Records flattened to CSV rows.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.records.iter().flat_map(ImageRecord::rows).collect()
    }

    pub fn summary(&self) -> RunSummary {
        let count = |outcome: Outcome| self.records.iter().filter(|r| r.outcome == outcome).count();
        RunSummary {
            files: self.records.len(),
            renamed: count(Outcome::Renamed),
            unmatched: count(Outcome::Unmatched),
            planned: count(Outcome::Planned),
            failed: count(Outcome::Failed),
            output: None,
        }
    }

    /// `output_<YYYY-MM-DD_HH-MM-SS>.csv`, stamped with the run's start time.
    pub fn file_name(&self) -> String {
        format!("output_{}.csv", self.started_at.format("%Y-%m-%d_%H-%M-%S"))
    }

    /// Writes the CSV log into `dir`, creating the folder if needed.
    pub fn write_csv(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(dir).map_err(|source| ReportError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(self.file_name());
        let mut writer = csv::Writer::from_path(&path)?;
        let rows = self.rows();
        if rows.is_empty() {
            writer.write_record(["input_image_path", "serial_numbers_list", "output_image_path", "log"])?;
        }
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(csv::Error::from)?;

        tracing::info!(path = %path.display(), "output saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(name: &str, serials: &[&str], outcome: Outcome) -> ImageRecord {
        ImageRecord {
            input_path: PathBuf::from(format!("/photos/{}", name)),
            extracted_serials: serials.iter().map(|s| s.to_string()).collect(),
            output_path: PathBuf::from(format!("/photos/{}", name)),
            status_message: format!("status of {}", name),
            outcome,
        }
    }

    fn run(records: Vec<ImageRecord>) -> RunResult {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        RunResult::new(started, records)
    }

    #[test]
    fn test_rows_explode_serials() {
        let result = run(vec![
            record("a.jpg", &["AB123456", "XY987654"], Outcome::Renamed),
            record("b.jpg", &[], Outcome::Unmatched),
        ]);
        let rows = result.rows();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].serial_numbers_list, "AB123456");
        assert_eq!(rows[1].serial_numbers_list, "XY987654");
        assert_eq!(rows[1].input_image_path, rows[0].input_image_path);
        assert_eq!(rows[2].serial_numbers_list, "");
        assert_eq!(rows[2].log, "status of b.jpg");
    }

    #[test]
    fn test_file_name_uses_start_time() {
        assert_eq!(run(vec![]).file_name(), "output_2024-03-09_07-05-01.csv");
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let summary = run(vec![
            record("a.jpg", &["AB123456"], Outcome::Renamed),
            record("b.jpg", &[], Outcome::Unmatched),
            record("c.jpg", &[], Outcome::Failed),
            record("d.jpg", &["CD123456"], Outcome::Renamed),
        ])
        .summary();

        assert_eq!(summary.files, 4);
        assert_eq!(summary.renamed, 2);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.planned, 0);
    }

    #[test]
    fn test_write_csv_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path().join("outputs");
        let result = run(vec![
            record("a.jpg", &["AB123456", "XY987654"], Outcome::Renamed),
            record("b, c.jpg", &[], Outcome::Unmatched),
        ]);

        let path = result.write_csv(&out_dir).unwrap();
        assert_eq!(path, out_dir.join("output_2024-03-09_07-05-01.csv"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("input_image_path,serial_numbers_list,output_image_path,log\n"));

        let rows: Vec<ReportRow> = csv::Reader::from_path(&path)
            .unwrap()
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows, result.rows());
    }

    #[test]
    fn test_write_csv_without_records_has_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = run(vec![]).write_csv(tmp.path()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.trim_end(), "input_image_path,serial_numbers_list,output_image_path,log");
    }
}
