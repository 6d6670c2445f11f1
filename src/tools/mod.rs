pub mod commands;
pub mod invoker;
pub mod markers;

pub use commands::{compile_command, extract_command};
pub use invoker::{ProcessOutput, ProcessRunner, SystemRunner, ToolCommand, ToolInvoker};
pub use markers::{classify_compile_output, CompileOutput};
