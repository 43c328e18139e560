//! Azure Computer Vision Read API: submit an image, then poll its analyze result.
mod client;
mod wire;

pub use client::{AzureReadClient, AzureSettings};
pub use wire::OperationStatus;

use crate::job::PollingEngine;
use crate::poll::PollPolicy;

/// OCR engine backed by the Azure Read API.
pub type AzureOcrEngine = PollingEngine<AzureReadClient>;

impl AzureOcrEngine {
    pub fn azure(settings: AzureSettings, policy: PollPolicy) -> Result<Self, crate::OcrError> {
        Ok(PollingEngine::new(AzureReadClient::new(settings)?, policy))
    }
}
