use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{tool} executable not found: {path}")]
    ToolNotFound { tool: String, path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{path} is not inside the input root {root}")]
    OutsideRoot { path: String, root: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ConverterError {
    fn user_message(&self) -> String {
        match self {
            ConverterError::ToolNotFound { tool, path } => {
                format!("{} executable not found: {}", tool, path)
            }
            ConverterError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            ConverterError::OutsideRoot { path, root } => {
                format!("File {} does not lie under the report folder {}", path, root)
            }
            ConverterError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ConverterError::ToolNotFound { .. } => Some(
                "Point --cli-path and --core-path at the folders holding the pbi-tools and pbi-tools.core binaries, or set the executable names in the [tools] section of the configuration file.".to_string()
            ),
            ConverterError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            ConverterError::OutsideRoot { .. } => Some(
                "Pass the folder that contains the reports as --report-folder.".to_string()
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConverterError>;
