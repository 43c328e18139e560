//! End-to-end runs against a scripted OCR engine

use async_trait::async_trait;
use snrename_ocr::{OcrEngine, OcrError, OcrInput, OcrOutput, OcrPage, TextLine};
use snrename_rs::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Serves fixed OCR lines per file name; files listed in `failing` raise an error.
struct ScriptedEngine {
    pages: HashMap<&'static str, Vec<Vec<&'static str>>>,
    failing: HashSet<&'static str>,
}

impl ScriptedEngine {
    fn new() -> Self {
        Self {
            pages: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    fn with(mut self, file: &'static str, pages: Vec<Vec<&'static str>>) -> Self {
        self.pages.insert(file, pages);
        self
    }

    fn failing(mut self, file: &'static str) -> Self {
        self.failing.insert(file);
        self
    }
}

#[async_trait]
impl OcrEngine for ScriptedEngine {
    async fn recognize(&self, input: &OcrInput) -> Result<OcrOutput, OcrError> {
        let OcrInput::FilePath(path) = input else {
            return Err(OcrError::InvalidInput("expected a file path".into()));
        };
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if self.failing.contains(name.as_str()) {
            return Err(OcrError::Service {
                status: 429,
                message: "Rate limit is exceeded".into(),
            });
        }
        let pages = self.pages.get(name.as_str()).cloned().unwrap_or_default();
        Ok(OcrOutput {
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(i, lines)| OcrPage {
                    number: i as u32 + 1,
                    lines: lines.into_iter().map(TextLine::new).collect(),
                })
                .collect(),
        })
    }
}

fn write_image(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"\xff\xd8\xff\xe0fake-jpeg").unwrap();
}

fn config(root: &Path) -> RunConfig {
    RunConfig {
        root: root.to_path_buf(),
        output_dir: root.join("outputs"),
        ..RunConfig::default()
    }
}

fn read_rows(path: &Path) -> Vec<ReportRow> {
    csv::Reader::from_path(path)
        .unwrap()
        .deserialize()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[tokio::test]
async fn test_single_laptop_is_renamed() {
    let tmp = tempfile::tempdir().unwrap();
    let photos = tmp.path().join("photos");
    std::fs::create_dir(&photos).unwrap();
    write_image(&photos, "laptop1.jpg");

    let engine = ScriptedEngine::new().with("laptop1.jpg", vec![vec!["ThinkPad T14", "S/N: AB123456"]]);
    let result = Pipeline::new(engine, config(&photos)).run().await.unwrap();

    assert!(photos.join("AB123456.jpg").exists());
    assert!(!photos.join("laptop1.jpg").exists());

    let csv_path = result.write_csv(&tmp.path().join("outputs")).unwrap();
    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].serial_numbers_list, "AB123456");
    assert!(rows[0].input_image_path.ends_with("laptop1.jpg"));
    assert!(rows[0].output_image_path.ends_with("AB123456.jpg"));
    assert_eq!(rows[0].log, "Success: Renamed `laptop1.jpg` to `AB123456.jpg`");
}

#[tokio::test]
async fn test_duplicate_serials_across_pages_collapse() {
    let tmp = tempfile::tempdir().unwrap();
    write_image(tmp.path(), "box.png");

    let engine = ScriptedEngine::new().with(
        "box.png",
        vec![
            vec!["S/N: ABC12345", "Serial Number: ABC12345"],
            vec!["s/n: xyz98765"],
        ],
    );
    let result = Pipeline::new(engine, config(tmp.path())).run().await.unwrap();

    let record = &result.records[0];
    let serials: HashSet<_> = record.extracted_serials.iter().map(String::as_str).collect();
    assert_eq!(serials, HashSet::from(["ABC12345", "XYZ98765"]));

    let name = record.output_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(
        name == "ABC12345 + XYZ98765.png" || name == "XYZ98765 + ABC12345.png",
        "unexpected name {}",
        name
    );
    assert!(record.output_path.exists());
    assert_eq!(result.rows().len(), 2);
}

#[tokio::test]
async fn test_no_serial_renames_to_unnamed() {
    let tmp = tempfile::tempdir().unwrap();
    write_image(tmp.path(), "IMG_0042.jpeg");

    let engine = ScriptedEngine::new().with("IMG_0042.jpeg", vec![vec!["Made in Taiwan", "S/N: too-long-value"]]);
    let result = Pipeline::new(engine, config(tmp.path())).run().await.unwrap();

    let record = &result.records[0];
    assert_eq!(record.outcome, Outcome::Unmatched);
    assert!(record.extracted_serials.is_empty());
    assert_eq!(record.status_message, "No valid serial number found in IMG_0042.jpeg");
    assert_eq!(record.output_path.file_name().unwrap(), "unnamed.jpeg");
    assert!(record.output_path.exists());
    assert!(!record.input_path.exists());

    let rows = result.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].serial_numbers_list, "");
}

#[tokio::test]
async fn test_one_failing_file_does_not_abort_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    for name in ["1.jpg", "2.jpg", "3.jpg"] {
        write_image(tmp.path(), name);
    }

    let engine = ScriptedEngine::new()
        .with("1.jpg", vec![vec!["S/N: AA111111"]])
        .failing("2.jpg")
        .with("3.jpg", vec![vec!["Serial Number: CC333333"]]);
    let result = Pipeline::new(engine, config(tmp.path())).run().await.unwrap();

    let csv_path = result.write_csv(&tmp.path().join("outputs")).unwrap();
    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 3);

    let failed = &rows[1];
    assert!(failed.input_image_path.ends_with("2.jpg"));
    assert_eq!(failed.output_image_path, failed.input_image_path);
    assert_eq!(failed.serial_numbers_list, "");
    assert!(failed.log.starts_with("Error processing `2.jpg`:"));
    assert!(failed.log.contains("Rate limit is exceeded"));
    assert!(tmp.path().join("2.jpg").exists());

    assert!(tmp.path().join("AA111111.jpg").exists());
    assert!(tmp.path().join("CC333333.jpg").exists());

    let summary = result.summary();
    assert_eq!((summary.files, summary.renamed, summary.failed), (3, 2, 1));
}

#[tokio::test]
async fn test_limit_and_subfolders() {
    let tmp = tempfile::tempdir().unwrap();
    let lab = tmp.path().join("lab");
    std::fs::create_dir(&lab).unwrap();
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        write_image(tmp.path(), name);
    }
    write_image(&lab, "d.jpg");

    let engine = ScriptedEngine::new()
        .with("a.jpg", vec![vec!["S/N: AA000001"]])
        .with("b.jpg", vec![vec!["S/N: BB000002"]])
        .with("d.jpg", vec![vec!["S/N: DD000004"]]);
    let result = Pipeline::new(
        engine,
        RunConfig {
            limit: Some(2),
            ..config(tmp.path())
        },
    )
    .run()
    .await
    .unwrap();

    let inputs: Vec<_> = result
        .records
        .iter()
        .map(|r| r.input_path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(inputs, vec!["a.jpg", "b.jpg", "d.jpg"]);
    assert!(tmp.path().join("c.jpg").exists());
    assert!(lab.join("DD000004.jpg").exists());
}

#[tokio::test]
async fn test_missing_root_fails_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    let err = Pipeline::new(ScriptedEngine::new(), config(&tmp.path().join("missing")))
        .run()
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("cannot open folder"));
}

#[tokio::test]
async fn test_serial_shaped_like_a_path_keeps_file_in_its_folder() {
    let tmp = tempfile::tempdir().unwrap();
    let photos = tmp.path().join("a").join("b").join("photos");
    std::fs::create_dir_all(&photos).unwrap();
    write_image(&photos, "laptop1.jpg");

    let engine = ScriptedEngine::new().with("laptop1.jpg", vec![vec!["S/N: ../../x1", "S/N: AB/12345"]]);
    let result = Pipeline::new(engine, config(&photos)).run().await.unwrap();

    let record = &result.records[0];
    assert!(record.extracted_serials.is_empty());
    assert_eq!(record.outcome, Outcome::Unmatched);
    assert_eq!(record.output_path.parent(), Some(std::fs::canonicalize(&photos).unwrap().as_path()));
    assert_eq!(record.output_path.file_name().unwrap(), "unnamed.jpg");
    assert!(!tmp.path().join("a").join("X1.jpg").exists());
}
