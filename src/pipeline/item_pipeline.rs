use crate::config::RunConfiguration;
use crate::error::Result;
use crate::scanner::InputFile;
use crate::tools::{
    classify_compile_output, compile_command, extract_command, CompileOutput, ProcessRunner,
    SystemRunner, ToolInvoker,
};
use crate::ui::Logger;
use crate::workspace::{ItemLayout, PathResolver};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Template written; holds the path reported by the compiler.
    Succeeded(PathBuf),
    /// The report lacks the model version the compiler needs.
    SkippedUnsupportedFormat,
    ExtractionFailed,
    CompilationFailed,
    /// The compiler exited cleanly but printed no result marker.
    ParseFailed,
    /// Unexpected error inside the pipeline, e.g. an uncreatable directory.
    Failed(String),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Succeeded(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ItemOutcome::SkippedUnsupportedFormat)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success() && !self.is_skipped()
    }
}

#[derive(Debug, Clone)]
pub struct ItemResult {
    pub input: InputFile,
    pub outcome: ItemOutcome,
    pub elapsed: Duration,
}

/// Extract, compile, parse and optionally clean up one report.
pub struct ItemPipeline<R: ProcessRunner = SystemRunner> {
    invoker: ToolInvoker<R>,
    resolver: PathResolver,
    run: RunConfiguration,
}

impl ItemPipeline<SystemRunner> {
    pub fn new(run: RunConfiguration) -> Self {
        Self::with_runner(run, SystemRunner)
    }
}

impl<R: ProcessRunner> ItemPipeline<R> {
    pub fn with_runner(run: RunConfiguration, runner: R) -> Self {
        let resolver = PathResolver::new(
            run.report_folder.clone(),
            run.output_folder.clone(),
            run.temp_folder.clone(),
        );

        Self {
            invoker: ToolInvoker::new(runner),
            resolver,
            run,
        }
    }

    pub fn runner(&self) -> &R {
        self.invoker.runner()
    }

    /// Processes one file. Only a file outside the report root is returned
    /// as an error; every other problem becomes the item's outcome.
    pub fn process(&self, input: &InputFile, logger: &Logger) -> Result<ItemResult> {
        let start = Instant::now();
        let layout = self.resolver.resolve(input)?;

        logger.separator();
        logger.info(&format!("Processing: {}", input.display_path()));

        let outcome = match self.run_steps(&layout, logger) {
            Ok(outcome) => outcome,
            Err(e) => {
                logger.error(&format!(
                    "Unexpected error processing {}: {}",
                    input.display_path(),
                    e
                ));
                ItemOutcome::Failed(e.to_string())
            }
        };

        Ok(ItemResult {
            input: input.clone(),
            outcome,
            elapsed: start.elapsed(),
        })
    }

    fn run_steps(&self, layout: &ItemLayout, logger: &Logger) -> Result<ItemOutcome> {
        let name = &layout.input.filename;

        self.resolver.ensure_directories(layout)?;

        let extract = extract_command(
            &self.run.extractor,
            &layout.input.source_path,
            &layout.extract_dir,
        );
        if self.invoker.invoke(&extract, logger).is_none() {
            logger.error(&format!("Extraction failed for {}", name));
            return Ok(ItemOutcome::ExtractionFailed);
        }

        let compile = compile_command(
            &self.run.compiler,
            &layout.extract_dir,
            &layout.target_dir,
            &self.run.conversion.output_format,
            self.run.conversion.template_mode,
        );
        let compile_stdout = match self.invoker.invoke(&compile, logger) {
            Some(stdout) => stdout,
            None => {
                logger.error(&format!("Compilation failed for {}", name));
                return Ok(ItemOutcome::CompilationFailed);
            }
        };

        let outcome = match classify_compile_output(&compile_stdout) {
            CompileOutput::Written(path) => {
                logger.info(&format!("Output: {}", path.display()));
                ItemOutcome::Succeeded(path)
            }
            CompileOutput::UnsupportedModel => {
                logger.warning("Skipping: PBIX requires V3 model");
                ItemOutcome::SkippedUnsupportedFormat
            }
            CompileOutput::NoMarker => {
                logger.error("Failed to parse PBIT output path");
                ItemOutcome::ParseFailed
            }
        };

        if outcome.is_success() {
            if self.run.clean {
                self.clean_extract_dir(layout, logger);
            }
        } else {
            logger.warning(&format!("No PBIT file generated for {}", name));
        }

        Ok(outcome)
    }

    fn clean_extract_dir(&self, layout: &ItemLayout, logger: &Logger) {
        match fs::remove_dir_all(&layout.extract_dir) {
            Ok(()) => logger.info(&format!(
                "Extract folder cleaned: {}",
                layout.extract_dir.display()
            )),
            Err(e) => logger.debug(&format!(
                "Could not clean extract folder {}: {}",
                layout.extract_dir.display(),
                e
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ConverterError;
    use crate::tools::{ProcessOutput, ToolCommand};
    use std::cell::RefCell;
    use std::io;
    use std::path::Path;
    use tempfile::TempDir;

    /// Answers extract and compile calls with canned output and records
    /// every command it sees.
    struct ScriptedRunner {
        extract: ProcessOutput,
        compile: ProcessOutput,
        calls: RefCell<Vec<ToolCommand>>,
    }

    impl ScriptedRunner {
        fn new(extract: ProcessOutput, compile: ProcessOutput) -> Self {
            Self {
                extract,
                compile,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn execute(&self, command: &ToolCommand) -> io::Result<ProcessOutput> {
            self.calls.borrow_mut().push(command.clone());
            if command.args.first().is_some_and(|a| a == "extract") {
                Ok(self.extract.clone())
            } else {
                Ok(self.compile.clone())
            }
        }
    }

    fn ok(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn failed(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code: Some(1),
            stdout: stdout.to_string(),
            stderr: "trace".to_string(),
        }
    }

    struct Fixture {
        _temp: TempDir,
        run: RunConfiguration,
        input: InputFile,
    }

    fn fixture(clean: bool) -> Fixture {
        let temp = TempDir::new().unwrap();
        let base = temp.path().to_path_buf();
        let mut config = Config::default();
        config.conversion.clean = clean;

        let run = RunConfiguration::new(
            base.join("reports"),
            base.join("pbit"),
            base.join("temp"),
            &base.join("cli"),
            &base.join("core"),
            &config,
        );

        let source = base.join("reports").join("sales").join("q1.pbix");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, b"PK").unwrap();

        Fixture {
            _temp: temp,
            run,
            input: InputFile::new(source),
        }
    }

    fn extract_dir(run: &RunConfiguration) -> PathBuf {
        run.temp_folder.join("sales")
    }

    #[test]
    fn test_success_reports_written_path() {
        let fx = fixture(false);
        let runner = ScriptedRunner::new(
            ok("Extracted."),
            ok("PBIT file written to:  /out/sales/q1.pbit \n"),
        );
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, capture) = Logger::capture("test");

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert_eq!(
            result.outcome,
            ItemOutcome::Succeeded(PathBuf::from("/out/sales/q1.pbit"))
        );
        assert!(capture.normal_output().contains("Output: /out/sales/q1.pbit"));
        assert!(fx.run.output_folder.join("sales").is_dir());
        assert!(extract_dir(&fx.run).is_dir());

        let calls = pipeline.runner().calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args[3], extract_dir(&fx.run).into_os_string());
        assert_eq!(calls[1].args[1], extract_dir(&fx.run).into_os_string());
        assert_eq!(
            calls[1].args[2],
            fx.run.output_folder.join("sales").into_os_string()
        );
        assert_eq!(calls[1].args[3], "PBIT");
        assert_eq!(calls[1].args[4], "True");
    }

    #[test]
    fn test_missing_v3_model_is_skipped_not_failed() {
        let fx = fixture(false);
        let runner = ScriptedRunner::new(ok("Extracted."), ok("File does not contain a V3 model."));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, capture) = Logger::capture("test");

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert_eq!(result.outcome, ItemOutcome::SkippedUnsupportedFormat);
        assert!(!result.outcome.is_failure());
        let normal = capture.normal_output();
        assert!(normal.contains("WARNING  | test | Skipping: PBIX requires V3 model"));
        assert!(!normal.contains("ERROR"));
    }

    #[test]
    fn test_no_marker_is_parse_failure() {
        let fx = fixture(false);
        let runner = ScriptedRunner::new(ok("Extracted."), ok("Compilation finished."));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, capture) = Logger::capture("test");

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert_eq!(result.outcome, ItemOutcome::ParseFailed);
        assert!(capture.normal_output().contains("No PBIT file generated for q1.pbix"));
    }

    #[test]
    fn test_extraction_failure_stops_before_compile() {
        let fx = fixture(false);
        let runner = ScriptedRunner::new(
            failed("Model could not be deserialized"),
            ok("PBIT file written to: x"),
        );
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, capture) = Logger::capture("test");

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert_eq!(result.outcome, ItemOutcome::ExtractionFailed);
        assert_eq!(pipeline.runner().calls.borrow().len(), 1);
        let normal = capture.normal_output();
        assert!(normal.contains("File model is not supported"));
        assert!(normal.contains("Extraction failed for q1.pbix"));
        assert!(!normal.contains("trace"));
        assert!(capture.diagnostic_output().contains("trace"));
    }

    #[test]
    fn test_silent_extraction_stops_before_compile() {
        let fx = fixture(false);
        let runner = ScriptedRunner::new(ok(""), ok("PBIT file written to: /out/q1.pbit"));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, capture) = Logger::capture("test");

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert_eq!(result.outcome, ItemOutcome::ExtractionFailed);
        assert_eq!(pipeline.runner().calls.borrow().len(), 1);
        assert!(capture.normal_output().contains("Extraction failed for q1.pbix"));
    }

    #[test]
    fn test_silent_compilation_is_compilation_failure() {
        let fx = fixture(false);
        let runner = ScriptedRunner::new(ok("Extracted."), ok(""));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, capture) = Logger::capture("test");

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert_eq!(result.outcome, ItemOutcome::CompilationFailed);
        assert_eq!(pipeline.runner().calls.borrow().len(), 2);
        assert!(capture.normal_output().contains("Compilation failed for q1.pbix"));
    }

    #[test]
    fn test_compilation_failure() {
        let fx = fixture(true);
        let runner = ScriptedRunner::new(ok("Extracted."), failed("crash"));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, _capture) = Logger::capture("test");

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert_eq!(result.outcome, ItemOutcome::CompilationFailed);
        // Failed items keep their extraction output even with cleanup on
        assert!(extract_dir(&fx.run).is_dir());
    }

    #[test]
    fn test_clean_removes_extract_dir_after_success() {
        let fx = fixture(true);
        let runner = ScriptedRunner::new(ok("Extracted."), ok("PBIT file written to: /out/q1.pbit"));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, capture) = Logger::capture("test");

        fs::create_dir_all(extract_dir(&fx.run).join("Model")).unwrap();
        fs::write(extract_dir(&fx.run).join("Model").join("tables.json"), b"{}").unwrap();

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert!(result.outcome.is_success());
        assert!(!extract_dir(&fx.run).exists());
        assert!(fx.run.temp_folder.is_dir());
        assert!(capture.normal_output().contains("Extract folder cleaned"));
    }

    #[test]
    fn test_parse_failure_keeps_extract_dir_with_clean() {
        let fx = fixture(true);
        let runner = ScriptedRunner::new(ok("Extracted."), ok("nothing useful"));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, _capture) = Logger::capture("test");

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert_eq!(result.outcome, ItemOutcome::ParseFailed);
        assert!(extract_dir(&fx.run).is_dir());
    }

    #[test]
    fn test_siblings_share_extract_dir_under_clean() {
        let fx = fixture(true);
        let sibling_path = fx.run.report_folder.join("sales").join("q2.pbix");
        fs::write(&sibling_path, b"PK").unwrap();
        let sibling = InputFile::new(sibling_path);
        let (logger, _capture) = Logger::capture("test");

        let failing = ItemPipeline::with_runner(
            fx.run.clone(),
            ScriptedRunner::new(ok("Extracted."), ok("nothing useful")),
        );
        let failed = failing.process(&fx.input, &logger).unwrap();
        assert_eq!(failed.outcome, ItemOutcome::ParseFailed);

        let leftover = extract_dir(&fx.run).join("Model").join("tables.json");
        fs::create_dir_all(leftover.parent().unwrap()).unwrap();
        fs::write(&leftover, b"{}").unwrap();

        let succeeding = ItemPipeline::with_runner(
            fx.run.clone(),
            ScriptedRunner::new(ok("Extracted."), ok("PBIT file written to: /out/q2.pbit")),
        );
        let succeeded = succeeding.process(&sibling, &logger).unwrap();
        assert!(succeeded.outcome.is_success());

        // Both reports extract into temp/sales, so the failed one's output goes too
        assert!(!leftover.exists());
        assert!(!extract_dir(&fx.run).exists());
    }

    #[test]
    fn test_clean_for_report_at_root_removes_temp_root() {
        let fx = fixture(true);
        let top_path = fx.run.report_folder.join("top.pbix");
        fs::write(&top_path, b"PK").unwrap();
        let runner = ScriptedRunner::new(ok("Extracted."), ok("PBIT file written to: /out/top.pbit"));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, _capture) = Logger::capture("test");

        fs::create_dir_all(extract_dir(&fx.run)).unwrap();

        let result = pipeline.process(&InputFile::new(top_path), &logger).unwrap();

        assert!(result.outcome.is_success());
        assert!(!fx.run.temp_folder.exists());
        assert!(fx.run.output_folder.is_dir());
    }

    #[test]
    fn test_unexpected_error_becomes_item_failure() {
        let fx = fixture(false);
        fs::create_dir_all(&fx.run.output_folder).unwrap();
        fs::write(fx.run.output_folder.join("sales"), b"blocking file").unwrap();

        let runner = ScriptedRunner::new(ok("Extracted."), ok("PBIT file written to: x"));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, capture) = Logger::capture("test");

        let result = pipeline.process(&fx.input, &logger).unwrap();

        assert!(matches!(result.outcome, ItemOutcome::Failed(_)));
        assert!(pipeline.runner().calls.borrow().is_empty());
        assert!(capture
            .normal_output()
            .contains(&format!("Unexpected error processing {}", fx.input.display_path())));
    }

    #[test]
    fn test_file_outside_root_is_fatal() {
        let fx = fixture(false);
        let runner = ScriptedRunner::new(ok(""), ok(""));
        let pipeline = ItemPipeline::with_runner(fx.run.clone(), runner);
        let (logger, _capture) = Logger::capture("test");

        let stray = InputFile::new(Path::new("/somewhere/else.pbix").to_path_buf());
        assert!(matches!(
            pipeline.process(&stray, &logger),
            Err(ConverterError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_outcome_classes() {
        assert!(ItemOutcome::Succeeded(PathBuf::from("a")).is_success());
        assert!(ItemOutcome::SkippedUnsupportedFormat.is_skipped());
        for outcome in [
            ItemOutcome::ExtractionFailed,
            ItemOutcome::CompilationFailed,
            ItemOutcome::ParseFailed,
            ItemOutcome::Failed("x".to_string()),
        ] {
            assert!(outcome.is_failure());
        }
    }
}
