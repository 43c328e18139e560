use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::region::OcrPage;

#[derive(Debug, Clone)]
pub enum OcrInput {
    FilePath(PathBuf),
    Bytes(Vec<u8>),
}

impl OcrInput {
    /// Loads the image content, reading from disk for `FilePath`.
    pub async fn into_bytes(self) -> Result<Vec<u8>, OcrError> {
        match self {
            OcrInput::FilePath(path) => Ok(tokio::fs::read(&path).await?),
            OcrInput::Bytes(data) => Ok(data),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    pub pages: Vec<OcrPage>,
}

impl OcrOutput {
    /// Every recognized line, page by page, in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter().map(|line| line.text.as_str()))
    }

    pub fn text(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("response is missing the Operation-Location header")]
    MissingOperationLocation,
    #[error("read job failed: {0}")]
    JobFailed(String),
    #[error("read job did not finish within {0:?}")]
    Timeout(Duration),
    #[error("engine error: {0}")]
    EngineError(String),
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, input: &OcrInput) -> Result<OcrOutput, OcrError>;
}
