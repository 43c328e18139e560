use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Response};

use crate::engine::OcrError;
use crate::job::{JobHandle, JobStatus, ReadApi};

use super::wire::{error_message, ReadOperationResult};

const API_PATH: &str = "vision/v3.2/read";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION: &str = "Operation-Location";

/// Credentials for a Computer Vision resource.
#[derive(Clone)]
pub struct AzureSettings {
    pub endpoint: String,
    pub subscription_key: String,
}

impl std::fmt::Debug for AzureSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSettings")
            .field("endpoint", &self.endpoint)
            .field("subscription_key", &"[REDACTED]")
            .finish()
    }
}

/// Client for the Azure Computer Vision Read API (v3.2).
pub struct AzureReadClient {
    client: Client,
    base_url: String,
    subscription_key: String,
}

impl AzureReadClient {
    pub fn new(settings: AzureSettings) -> Result<Self, OcrError> {
        let endpoint = settings.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(OcrError::InvalidInput("endpoint is empty".into()));
        }
        if settings.subscription_key.trim().is_empty() {
            return Err(OcrError::InvalidInput("subscription key is empty".into()));
        }

        Ok(Self {
            client: Client::new(),
            base_url: format!("{}/{}", endpoint, API_PATH),
            subscription_key: settings.subscription_key,
        })
    }

    fn analyze_url(&self) -> String {
        format!("{}/analyze", self.base_url)
    }

    fn result_url(&self, job: &JobHandle) -> String {
        format!("{}/analyzeResults/{}", self.base_url, job.as_str())
    }
}

/// Turns a non-success response into `OcrError::Service`.
async fn check_status(resp: Response) -> Result<Response, OcrError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(OcrError::Service {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// The job id is the last path segment of the `Operation-Location` URL.
pub(crate) fn operation_id(headers: &HeaderMap) -> Result<JobHandle, OcrError> {
    let location = headers
        .get(OPERATION_LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(OcrError::MissingOperationLocation)?;

    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(|id| JobHandle(id.to_string()))
        .ok_or(OcrError::MissingOperationLocation)
}

#[async_trait]
impl ReadApi for AzureReadClient {
    async fn submit(&self, image: Vec<u8>) -> Result<JobHandle, OcrError> {
        let resp = self
            .client
            .post(self.analyze_url())
            .header(KEY_HEADER, &self.subscription_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        operation_id(resp.headers())
    }

    async fn poll(&self, job: &JobHandle) -> Result<JobStatus, OcrError> {
        let resp = self
            .client
            .get(self.result_url(job))
            .header(KEY_HEADER, &self.subscription_key)
            .send()
            .await?;

        let result: ReadOperationResult = check_status(resp).await?.json().await?;
        tracing::trace!(job = job.as_str(), status = ?result.status, "polled read job");
        Ok(result.into_status())
    }
}
