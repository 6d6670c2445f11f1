use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One report package found under the input root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputFile {
    pub source_path: PathBuf,
    pub filename: String,
}

impl InputFile {
    pub fn new(source_path: PathBuf) -> Self {
        let filename = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            source_path,
            filename,
        }
    }

    pub fn display_path(&self) -> String {
        self.source_path.display().to_string()
    }
}

/// Files found by a scan plus the entries that could not be read.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<InputFile>,
    pub errors: Vec<String>,
    /// Set when the root itself is missing or unreadable.
    pub root_error: Option<String>,
}

pub struct InputScanner {
    extension: String,
}

impl InputScanner {
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_lowercase(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Walks `root` recursively and returns every file carrying the target
    /// extension, in traversal order. Unreadable entries, including a
    /// missing root, end up in `errors` instead of failing the scan.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> ScanResult {
        let root_path = root.as_ref();
        let mut result = ScanResult::default();

        let walker = WalkDir::new(root_path).follow_links(false).into_iter();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.depth() == 0 {
                        result.root_error = Some(format!(
                            "Cannot read report folder {}: {}",
                            root_path.display(),
                            err
                        ));
                    }
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        result.errors.push(format!("Permission denied: {}", err));
                    } else {
                        result.errors.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            if self.is_input_file(&entry) {
                result.files.push(InputFile::new(entry.into_path()));
            }
        }

        result
    }

    fn is_input_file(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_file() && self.matches_extension(entry.path())
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.to_lowercase() == self.extension)
    }
}

impl Default for InputScanner {
    fn default() -> Self {
        Self::new("pbix")
    }
}
