use crate::batch::progress::{format_duration, BatchProgress, BatchSummary};
use crate::config::RunConfiguration;
use crate::error::Result;
use crate::pipeline::ItemPipeline;
use crate::scanner::{InputFile, InputScanner};
use crate::tools::{ProcessRunner, SystemRunner};
use crate::ui::Logger;
use crate::workspace::validate_tools;

/// Converts every report under the report folder, one at a time.
pub struct BatchConverter<R: ProcessRunner = SystemRunner> {
    run: RunConfiguration,
    scanner: InputScanner,
    pipeline: ItemPipeline<R>,
    logger: Logger,
}

impl BatchConverter<SystemRunner> {
    pub fn new(run: RunConfiguration, logger: Logger) -> Self {
        Self::with_runner(run, SystemRunner, logger)
    }
}

impl<R: ProcessRunner> BatchConverter<R> {
    pub fn with_runner(run: RunConfiguration, runner: R, logger: Logger) -> Self {
        Self {
            scanner: InputScanner::new(&run.conversion.input_extension),
            pipeline: ItemPipeline::with_runner(run.clone(), runner),
            run,
            logger,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn runner(&self) -> &R {
        self.pipeline.runner()
    }

    /// Runs the whole batch.
    ///
    /// Returns an error only for fatal conditions: a missing tool executable
    /// (checked before anything else) or a discovered file that does not lie
    /// under the report folder. Per-item failures are logged and counted in
    /// the summary.
    pub fn run(&self) -> Result<BatchSummary> {
        validate_tools(&self.run.extractor, &self.run.compiler)?;

        let files = self.discover();
        if files.is_empty() {
            self.logger.warning(&format!(
                "No .{} files found. Exiting.",
                self.scanner.extension()
            ));
            return Ok(BatchSummary::default());
        }

        let mut progress = BatchProgress::new(files.len());
        let mut summary = BatchSummary::new(files.len());

        for file in &files {
            let result = self.pipeline.process(file, &self.logger)?;
            progress.record(result.elapsed);
            summary.record(&result.outcome);

            self.logger.info(&format!(
                "Completed {} in {}",
                file.filename,
                format_duration(result.elapsed)
            ));

            if !progress.is_complete() {
                self.logger.info(&format!(
                    "Progress: {}/{} files processed ({:.1}%). ETA: {}",
                    progress.processed(),
                    progress.total(),
                    progress.percentage(),
                    format_duration(progress.estimated_remaining())
                ));
            }
        }

        summary.total_time = progress.cumulative();

        self.logger.separator();
        self.logger.info(&format!(
            "Results: {} succeeded, {} skipped, {} failed",
            summary.succeeded, summary.skipped, summary.failed
        ));
        self.logger.info(&format!(
            "Conversion process completed. Total time: {}",
            format_duration(summary.total_time)
        ));

        Ok(summary)
    }

    fn discover(&self) -> Vec<InputFile> {
        self.logger.info(&format!(
            "Searching for .{} files in {}...",
            self.scanner.extension(),
            self.run.report_folder.display()
        ));

        let scan = self.scanner.scan_directory(&self.run.report_folder);
        if let Some(root_error) = &scan.root_error {
            self.logger.warning(root_error);
        }
        for error in &scan.errors {
            self.logger.debug(error);
        }

        self.logger.info(&format!("Found {} files.", scan.files.len()));
        scan.files
    }
}
