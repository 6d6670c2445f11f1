//! Phrases printed by pbi-tools that the converter reacts to.
//!
//! These are tool-version specific and carry no stability guarantee, so they
//! are kept here and nowhere else. Raw tool output is always logged at debug
//! level so a change in phrasing can be diagnosed from the logs.

use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Printed by the compiler before the path of the produced template.
pub const RESULT_MARKER: &str = "PBIT file written to";

/// Printed by the extractor when the report's data model cannot be read.
pub const UNDESERIALIZABLE_MODEL_MARKER: &str = "could not be deserialized";

/// Printed by the compiler when the report has no V3 model to compile.
pub const MISSING_V3_MODEL_MARKER: &str = "does not contain a V3 model";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutput {
    Written(PathBuf),
    UnsupportedModel,
    NoMarker,
}

fn result_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?i){}: (.*)", regex::escape(RESULT_MARKER)))
            .expect("result marker pattern is a valid regex")
    })
}

pub fn classify_compile_output(stdout: &str) -> CompileOutput {
    let written = result_pattern()
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|path| !path.is_empty());

    match written {
        Some(path) => CompileOutput::Written(PathBuf::from(path)),
        None if stdout.contains(MISSING_V3_MODEL_MARKER) => CompileOutput::UnsupportedModel,
        None => CompileOutput::NoMarker,
    }
}

/// True when a failed extraction says the data model is too old to read.
pub fn is_undeserializable_model(stdout: &str) -> bool {
    stdout.contains(UNDESERIALIZABLE_MODEL_MARKER)
}
