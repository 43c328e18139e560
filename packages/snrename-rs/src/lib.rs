//! # snrename-rs
//!
//! Renames photos of labels (laptops, appliances, equipment plates) after the
//! serial numbers printed on them.
//!
//! A run walks a folder tree, sends every image to an OCR service, looks for
//! lines such as `S/N: AB123456` or `Serial Number: AB123456`, renames the file
//! to the serial number(s) it found, and writes a CSV log of what happened.
//!
//! ## Quick Start
//!
//! ```ignore
//! use snrename_rs::prelude::*;
//! use snrename_ocr::{AzureOcrEngine, AzureSettings, PollPolicy};
//!
//! let engine = AzureOcrEngine::azure(
//!     AzureSettings { endpoint, subscription_key },
//!     PollPolicy::default(),
//! )?;
//! let config = RunConfig { root: "photos".into(), ..RunConfig::default() };
//! let result = Pipeline::new(engine, config).run().await?;
//! let csv = result.write_csv(Path::new("outputs"))?;
//! ```

pub mod extractor;
pub mod logging;
pub mod pipeline;
pub mod renamer;
pub mod report;
pub mod walker;

// Re-export commonly used types at the root level
pub use extractor::{SerialExtractor, DEFAULT_LABELS, SERIAL_LENGTH};
pub use logging::init_logging;
pub use pipeline::{Pipeline, PipelineError, RunConfig};
pub use renamer::{rename_image, resolve_destination, target_file_name, CollisionPolicy, RenameError};
pub use report::{ImageRecord, Outcome, ReportError, ReportRow, RunResult, RunSummary};
pub use walker::{walk, ImageWalker, WalkError};

/// Prelude module for convenient imports
///
/// ```ignore
/// use snrename_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        rename_image, target_file_name, walk, CollisionPolicy, ImageRecord, Outcome, Pipeline, ReportRow,
        RunConfig, RunResult, RunSummary, SerialExtractor,
    };
}
