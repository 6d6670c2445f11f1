pub mod logger;

pub use logger::{Level, LogFormat, Logger};
#[cfg(test)]
pub use logger::LogCapture;
