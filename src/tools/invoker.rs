use crate::tools::markers;
use crate::ui::Logger;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Command;

pub const UNSUPPORTED_MODEL_MESSAGE: &str = "File model is not supported. Model required: V3";
pub const PROCESSING_FAILED_MESSAGE: &str =
    "Error while processing the file. Check the logs for more information.";

/// An external program invocation plus a short label for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub description: String,
}

impl ToolCommand {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(program: P, description: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    pub fn arg<A: Into<OsString>>(mut self, arg: A) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(|a| a.as_os_str()))
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a command to completion. Blocking, no timeout.
pub trait ProcessRunner {
    fn execute(&self, command: &ToolCommand) -> io::Result<ProcessOutput>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn execute(&self, command: &ToolCommand) -> io::Result<ProcessOutput> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .output()?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub struct ToolInvoker<R: ProcessRunner> {
    runner: R,
}

impl<R: ProcessRunner> ToolInvoker<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs `command` and returns its stdout on a zero exit status with
    /// non-empty output.
    ///
    /// Every failure, including a clean exit that printed nothing, is
    /// reported through `logger` and collapses to `None`; callers only learn
    /// that the step produced no output. Command line and
    /// captured streams are logged at debug level only.
    pub fn invoke(&self, command: &ToolCommand, logger: &Logger) -> Option<String> {
        logger.debug(&format!(
            "Running {}: {}",
            command.description,
            command.command_line()
        ));

        let output = match self.runner.execute(command) {
            Ok(output) => output,
            Err(e) => {
                logger.error(&format!(
                    "Unexpected error during {}: {}",
                    command.description, e
                ));
                return None;
            }
        };

        if output.success() {
            logger.debug(&format!(
                "{} succeeded\nStdout: {}\nStderr: {}",
                command.description, output.stdout, output.stderr
            ));

            if output.stdout.is_empty() {
                logger.debug(&format!("{} produced no output", command.description));
                return None;
            }
            return Some(output.stdout);
        }

        if markers::is_undeserializable_model(&output.stdout) {
            logger.error(UNSUPPORTED_MODEL_MESSAGE);
        } else {
            logger.error(PROCESSING_FAILED_MESSAGE);
        }

        let status = output
            .exit_code
            .map(|code| format!("exit code {}", code))
            .unwrap_or_else(|| "termination by signal".to_string());
        logger.debug(&format!(
            "{} failed with {}\nCommand: {}\nStdout: {}\nStderr: {}",
            command.description,
            status,
            command.command_line(),
            output.stdout,
            output.stderr
        ));

        None
    }
}

impl Default for ToolInvoker<SystemRunner> {
    fn default() -> Self {
        Self::new(SystemRunner)
    }
}
