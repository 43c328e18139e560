//! Submit-then-poll read services and the engine that drives them to completion.
use async_trait::async_trait;

use crate::engine::{OcrEngine, OcrError, OcrInput, OcrOutput};
use crate::poll::{poll_until, PollPolicy, PollState};

/// Identifier of a submitted read job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(pub String);

impl JobHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub enum JobStatus {
    Pending,
    Succeeded(OcrOutput),
    Failed(String),
}

/// A text-recognition service that works asynchronously: an image is
/// submitted once, then its job is polled until it reaches a terminal state.
#[async_trait]
pub trait ReadApi: Send + Sync {
    async fn submit(&self, image: Vec<u8>) -> Result<JobHandle, OcrError>;
    async fn poll(&self, job: &JobHandle) -> Result<JobStatus, OcrError>;
}

/// Adapts a [`ReadApi`] to [`OcrEngine`] by waiting on each job under a [`PollPolicy`].
pub struct PollingEngine<A> {
    api: A,
    policy: PollPolicy,
}

impl<A: ReadApi> PollingEngine<A> {
    pub fn new(api: A, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }
}

#[async_trait]
impl<A: ReadApi> OcrEngine for PollingEngine<A> {
    async fn recognize(&self, input: &OcrInput) -> Result<OcrOutput, OcrError> {
        let image = input.clone().into_bytes().await?;
        if image.is_empty() {
            return Err(OcrError::InvalidInput("image is empty".into()));
        }

        let submit = self.api.submit(image);
        let job = match self.policy.timeout {
            Some(limit) => tokio::time::timeout(limit, submit)
                .await
                .map_err(|_| OcrError::Timeout(limit))??,
            None => submit.await?,
        };
        tracing::debug!(job = job.as_str(), "submitted read job");

        let api = &self.api;
        let job = &job;
        poll_until(&self.policy, || async move {
            match api.poll(job).await? {
                JobStatus::Pending => Ok(PollState::Pending),
                JobStatus::Succeeded(output) => Ok(PollState::Ready(output)),
                JobStatus::Failed(reason) => Err(OcrError::JobFailed(reason)),
            }
        })
        .await
    }
}
