use crate::error::{ConverterError, Result};
use crate::ui::LogFormat;
use serde::{Deserialize, Serialize};
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub conversion: ConversionConfig,
    pub logging: LoggingConfig,
}

/// Executable file names looked up inside `--cli-path` and `--core-path`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub extractor_executable: String,
    pub compiler_executable: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub input_extension: String,
    pub output_format: String,
    pub template_mode: bool,
    pub clean: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub diagnostics: bool,
    pub source: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            extractor_executable: format!("pbi-tools{}", EXE_SUFFIX),
            compiler_executable: format!("pbi-tools.core{}", EXE_SUFFIX),
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input_extension: "pbix".to_string(),
            output_format: "PBIT".to_string(),
            template_mode: true,
            clean: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            diagnostics: true,
            source: "pbit_converter".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConverterError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConverterError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConverterError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["pbit-converter.toml", ".pbit-converter.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        // --clean can only switch cleanup on; a config file may also enable it
        if cli_args.clean == Some(true) {
            self.conversion.clean = true;
        }

        if let Some(format) = cli_args.log_format {
            self.logging.format = format;
        }

        if let Some(diagnostics) = cli_args.diagnostics {
            self.logging.diagnostics = diagnostics;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ConverterError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| ConverterError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tools.extractor_executable.trim().is_empty()
            || self.tools.compiler_executable.trim().is_empty()
        {
            return Err(ConverterError::Config {
                message: "Both tool executable names must be non-empty".to_string(),
            });
        }

        let extension = self.conversion.input_extension.trim();
        if extension.is_empty() || extension.starts_with('.') {
            return Err(ConverterError::Config {
                message: format!(
                    "Input extension must be a bare extension such as 'pbix', got '{}'",
                    self.conversion.input_extension
                ),
            });
        }

        if self.conversion.output_format.trim().is_empty() {
            return Err(ConverterError::Config {
                message: "Output format token must be non-empty".to_string(),
            });
        }

        if self.logging.source.trim().is_empty() {
            return Err(ConverterError::Config {
                message: "Log source name must be non-empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub clean: Option<bool>,
    pub log_format: Option<LogFormat>,
    pub diagnostics: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clean(mut self, clean: Option<bool>) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_log_format(mut self, format: Option<LogFormat>) -> Self {
        self.log_format = format;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Option<bool>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// Everything one batch run needs, fixed before the first file is touched.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub report_folder: PathBuf,
    pub output_folder: PathBuf,
    pub temp_folder: PathBuf,
    pub extractor: PathBuf,
    pub compiler: PathBuf,
    pub clean: bool,
    pub conversion: ConversionConfig,
}

impl RunConfiguration {
    /// Builds the run from the folder arguments, joining the configured
    /// executable names onto the two tool directories.
    pub fn new(
        report_folder: PathBuf,
        output_folder: PathBuf,
        temp_folder: PathBuf,
        cli_dir: &Path,
        core_dir: &Path,
        config: &Config,
    ) -> Self {
        Self {
            report_folder,
            output_folder,
            temp_folder,
            extractor: cli_dir.join(&config.tools.extractor_executable),
            compiler: core_dir.join(&config.tools.compiler_executable),
            clean: config.conversion.clean,
            conversion: config.conversion.clone(),
        }
    }
}
