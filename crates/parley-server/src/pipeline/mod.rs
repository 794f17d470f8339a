//! Pipeline orchestration and the blocking worker pool it runs on.

pub mod orchestrator;
pub mod workers;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use workers::{WorkerError, WorkerPool};
