use crate::error::{ConverterError, Result};
use crate::scanner::InputFile;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Per-item locations: where the template lands and where the package is
/// extracted, both mirroring the input's folder under the report root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLayout {
    pub input: InputFile,
    pub relative_path: PathBuf,
    pub target_dir: PathBuf,
    pub extract_dir: PathBuf,
}

pub struct PathResolver {
    report_root: PathBuf,
    output_root: PathBuf,
    temp_root: PathBuf,
}

impl PathResolver {
    pub fn new<P: Into<PathBuf>>(report_root: P, output_root: P, temp_root: P) -> Self {
        Self {
            report_root: report_root.into(),
            output_root: output_root.into(),
            temp_root: temp_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    pub fn resolve(&self, input: &InputFile) -> Result<ItemLayout> {
        let relative_path = self.relative_path(&input.source_path)?;
        let relative_dir = relative_path.parent().unwrap_or_else(|| Path::new(""));

        Ok(ItemLayout {
            input: input.clone(),
            target_dir: self.output_root.join(relative_dir),
            extract_dir: self.temp_root.join(relative_dir),
            relative_path,
        })
    }

    fn relative_path(&self, file_path: &Path) -> Result<PathBuf> {
        let outside = || ConverterError::OutsideRoot {
            path: file_path.display().to_string(),
            root: self.report_root.display().to_string(),
        };

        let relative = file_path.strip_prefix(&self.report_root).map_err(|_| outside())?;

        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(outside());
        }

        Ok(relative.to_path_buf())
    }

    /// Creates every directory the item writes into. Existing directories
    /// are fine.
    pub fn ensure_directories(&self, layout: &ItemLayout) -> Result<()> {
        for dir in [
            &self.output_root,
            &layout.target_dir,
            &layout.extract_dir,
            &self.temp_root,
        ] {
            fs::create_dir_all(dir).map_err(|e| ConverterError::InvalidPath {
                path: format!("Cannot create directory {}: {}", dir.display(), e),
            })?;
        }
        Ok(())
    }
}

/// Fails on the first missing executable, extractor first.
pub fn validate_tools(extractor: &Path, compiler: &Path) -> Result<()> {
    for (tool, path) in [("pbi-tools", extractor), ("pbi-tools.core", compiler)] {
        if !path.exists() {
            return Err(ConverterError::ToolNotFound {
                tool: tool.to_string(),
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}
