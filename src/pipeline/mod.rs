pub mod item_pipeline;

pub use item_pipeline::{ItemOutcome, ItemPipeline, ItemResult};
