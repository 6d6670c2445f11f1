pub mod orchestrator;
pub mod progress;

pub use orchestrator::BatchConverter;
pub use progress::{format_duration, BatchProgress, BatchSummary};
