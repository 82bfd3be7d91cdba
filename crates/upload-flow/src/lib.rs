//! Single-flight upload/analyze/download task flow
//!
//! Shared core for the browser apps: input collection, the request
//! lifecycle state machine, response classification, and error
//! normalization. Everything here is pure Rust with no browser APIs,
//! so the whole workflow is testable natively; the fetch transport and
//! the download trigger live in `upload-flow-web`.

pub mod config;
pub mod error;
pub mod input;
pub mod outcome;
pub mod results;
pub mod task;

pub use config::ServiceConfig;
pub use error::{FlowError, Phase};
pub use input::InputCollector;
pub use outcome::{interpret, Expectation, Outcome, RawBody, RawResponse};
pub use results::{AnalysisResult, ArtifactNaming};
pub use task::{TaskController, TaskState, TaskTicket};
