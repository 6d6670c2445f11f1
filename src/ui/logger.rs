use chrono::Local;
use clap::ValueEnum;
use console::{style, Term};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::Mutex;
#[cfg(test)]
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `timestamp | LEVEL | source | message` lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

type Sink = Mutex<Box<dyn Write + Send>>;

/// Two-channel log context.
///
/// Info and above go to the normal sink (stdout by default). Debug records
/// carry command lines and raw tool output and go only to the diagnostic
/// sink (stderr by default), which may be switched off entirely.
pub struct Logger {
    source: String,
    format: LogFormat,
    use_colors: bool,
    normal: Sink,
    diagnostic: Option<Sink>,
}

impl Logger {
    pub fn new(source: &str, format: LogFormat, diagnostics: bool) -> Self {
        let use_colors =
            format == LogFormat::Text && Term::stdout().features().colors_supported();
        let diagnostic: Option<Box<dyn Write + Send>> = if diagnostics {
            Some(Box::new(io::stderr()))
        } else {
            None
        };

        Self::with_sinks(source, format, Box::new(io::stdout()), diagnostic).colored(use_colors)
    }

    pub fn with_sinks(
        source: &str,
        format: LogFormat,
        normal: Box<dyn Write + Send>,
        diagnostic: Option<Box<dyn Write + Send>>,
    ) -> Self {
        Self {
            source: source.to_string(),
            format,
            use_colors: false,
            normal: Mutex::new(normal),
            diagnostic: diagnostic.map(Mutex::new),
        }
    }

    /// Logger writing both channels into memory.
    #[cfg(test)]
    pub fn capture(source: &str) -> (Self, LogCapture) {
        let capture = LogCapture::default();
        let logger = Self::with_sinks(
            source,
            LogFormat::Text,
            Box::new(CaptureSink(capture.normal.clone())),
            Some(Box::new(CaptureSink(capture.diagnostic.clone()))),
        );
        (logger, capture)
    }

    pub fn colored(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors && self.format == LogFormat::Text;
        self
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn separator(&self) {
        if self.format == LogFormat::Text {
            self.info(&"-".repeat(70));
        }
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn log(&self, level: Level, message: &str) {
        let sink = match level {
            Level::Debug => match self.diagnostic {
                Some(ref sink) => sink,
                None => return,
            },
            _ => &self.normal,
        };

        let line = self.format_line(level, message);

        // A broken log pipe must not take the batch down with it
        if let Ok(mut writer) = sink.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }

    fn format_line(&self, level: Level, message: &str) -> String {
        match self.format {
            LogFormat::Text => {
                let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
                let label = format!("{:<8}", level.label());
                let label = if self.use_colors {
                    match level {
                        Level::Error => style(label).red().bold().to_string(),
                        Level::Warning => style(label).yellow().bold().to_string(),
                        Level::Info => style(label).cyan().to_string(),
                        Level::Debug => style(label).dim().to_string(),
                    }
                } else {
                    label
                };
                format!("{} | {} | {} | {}", timestamp, label, self.source, message)
            }
            LogFormat::Json => {
                let record = serde_json::json!({
                    "timestamp": Local::now().to_rfc3339(),
                    "level": level.label().to_lowercase(),
                    "source": self.source,
                    "message": message,
                });
                serde_json::to_string(&record).unwrap_or_else(|_| "{}".to_string())
            }
        }
    }
}

/// In-memory copies of both log channels, filled by [`Logger::capture`].
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    normal: Arc<Mutex<Vec<u8>>>,
    diagnostic: Arc<Mutex<Vec<u8>>>,
}

#[cfg(test)]
impl LogCapture {
    pub fn normal_output(&self) -> String {
        Self::read(&self.normal)
    }

    pub fn diagnostic_output(&self) -> String {
        Self::read(&self.diagnostic)
    }

    fn read(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        buffer
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
struct CaptureSink(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut bytes) => {
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "capture buffer poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
