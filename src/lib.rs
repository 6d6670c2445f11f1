pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scanner;
pub mod tools;
pub mod ui;
pub mod workspace;

// Public API re-exports
pub use cli::Cli;
pub use config::{CliOverrides, Config, RunConfiguration};
pub use error::{ConverterError, Result, UserFriendlyError};

// Core functionality re-exports
pub use batch::{BatchConverter, BatchProgress, BatchSummary};
pub use pipeline::{ItemOutcome, ItemPipeline, ItemResult};
pub use scanner::{InputFile, InputScanner};
pub use tools::{ProcessOutput, ProcessRunner, SystemRunner, ToolCommand, ToolInvoker};
pub use ui::{LogFormat, Logger};
pub use workspace::{ItemLayout, PathResolver};

use std::path::Path;

/// Builds the logger and batch converter described by the CLI arguments.
pub fn converter_from_cli(cli_args: &Cli) -> Result<BatchConverter> {
    let config = cli_args.load_config()?;
    let run = cli_args.run_configuration(&config)?;
    let logger = Logger::new(
        &config.logging.source,
        config.logging.format,
        config.logging.diagnostics,
    );

    Ok(BatchConverter::new(run, logger))
}

/// Generate sample configuration file
pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let sample_config = Config::create_sample_config();
    std::fs::write(output_path.as_ref(), sample_config).map_err(ConverterError::Io)?;
    Ok(())
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
