pub mod coordinator;
pub mod error;
pub mod worker;

pub use coordinator::Coordinator;
pub use error::PipelineError;
pub use worker::{Worker, WorkerBase};

#[cfg(test)]
mod tests;
