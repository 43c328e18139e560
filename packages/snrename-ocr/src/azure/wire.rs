use serde::Deserialize;

use crate::engine::OcrOutput;
use crate::job::JobStatus;
use crate::region::{BoundingBox, OcrPage, TextLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOperationResult {
    pub status: OperationStatus,
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub read_results: Vec<ReadResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    pub page: u32,
    #[serde(default)]
    pub lines: Vec<Line>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub text: String,
    #[serde(default)]
    pub bounding_box: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    pub message: String,
}

impl ReadOperationResult {
    pub fn into_status(self) -> JobStatus {
        match self.status {
            OperationStatus::NotStarted | OperationStatus::Running => JobStatus::Pending,
            OperationStatus::Failed => JobStatus::Failed("service reported status `failed`".into()),
            OperationStatus::Succeeded => {
                let pages = self
                    .analyze_result
                    .unwrap_or_default()
                    .read_results
                    .into_iter()
                    .map(|result| OcrPage {
                        number: result.page,
                        lines: result
                            .lines
                            .into_iter()
                            .map(|line| TextLine {
                                bounding_box: BoundingBox::from_polygon(&line.bounding_box),
                                text: line.text,
                            })
                            .collect(),
                    })
                    .collect();
                JobStatus::Succeeded(OcrOutput { pages })
            }
        }
    }
}

/// Extracts a readable message from an error response body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if envelope.error.code.is_empty() => envelope.error.message,
        Ok(envelope) => format!("{} ({})", envelope.error.message, envelope.error.code),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
