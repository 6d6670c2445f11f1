use crate::config::{CliOverrides, Config, RunConfiguration};
use crate::error::{ConverterError, Result};
use crate::ui::LogFormat;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pbit-converter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Batch-convert Power BI .pbix reports into .pbit templates")]
#[command(
    long_about = "pbit-converter finds every .pbix file under a report folder, extracts it \
                  with pbi-tools and compiles the extracted sources into a .pbit template \
                  with pbi-tools.core, mirroring the folder layout in the output folder."
)]
#[command(after_help = "EXAMPLES:\n  \
    pbit-converter -r reports -o templates -t work --cli-path tools/pbi-tools --core-path tools/core\n  \
    pbit-converter -r reports -o templates -t work --cli-path tools/pbi-tools --core-path tools/core --clean\n  \
    pbit-converter --generate-config --config pbit-converter.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Folder searched recursively for .pbix files
    #[arg(short = 'r', long, required_unless_present = "generate_config")]
    pub report_folder: Option<PathBuf>,

    /// Folder receiving the compiled templates
    #[arg(short = 'o', long, required_unless_present = "generate_config")]
    pub pbit_output: Option<PathBuf>,

    /// Folder receiving the extracted report sources
    #[arg(short = 't', long, required_unless_present = "generate_config")]
    pub temp_folder: Option<PathBuf>,

    /// Folder holding the pbi-tools executable
    #[arg(long, required_unless_present = "generate_config")]
    pub cli_path: Option<PathBuf>,

    /// Folder holding the pbi-tools.core executable
    #[arg(long, required_unless_present = "generate_config")]
    pub core_path: Option<PathBuf>,

    /// Delete each report's extracted sources after a successful conversion
    #[arg(long)]
    pub clean: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Log line format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Disable the diagnostic channel (command lines and raw tool output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_clean(self.clean.then_some(true))
            .with_log_format(self.log_format)
            .with_diagnostics(self.quiet.then_some(false))
    }

    /// Fixes the folders and executable paths for one run.
    pub fn run_configuration(&self, config: &Config) -> Result<RunConfiguration> {
        Ok(RunConfiguration::new(
            required(&self.report_folder, "--report-folder")?.to_path_buf(),
            required(&self.pbit_output, "--pbit-output")?.to_path_buf(),
            required(&self.temp_folder, "--temp-folder")?.to_path_buf(),
            required(&self.cli_path, "--cli-path")?,
            required(&self.core_path, "--core-path")?,
            config,
        ))
    }
}

fn required<'a>(value: &'a Option<PathBuf>, flag: &str) -> Result<&'a Path> {
    value.as_deref().ok_or_else(|| ConverterError::Config {
        message: format!("Missing required argument {}", flag),
    })
}
