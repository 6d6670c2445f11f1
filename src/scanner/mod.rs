pub mod input_scanner;

pub use input_scanner::{InputFile, InputScanner, ScanResult};
