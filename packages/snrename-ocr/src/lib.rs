pub mod azure;
pub mod engine;
pub mod job;
pub mod poll;
pub mod region;

pub use azure::{AzureOcrEngine, AzureReadClient, AzureSettings};
pub use engine::{OcrEngine, OcrError, OcrInput, OcrOutput};
pub use job::{JobHandle, JobStatus, PollingEngine, ReadApi};
pub use poll::{poll_until, PollPolicy, PollState};
pub use region::{BoundingBox, OcrPage, TextLine};
