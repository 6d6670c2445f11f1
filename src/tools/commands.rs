use crate::tools::invoker::ToolCommand;
use std::path::Path;

/// `pbi-tools extract <input> -extractFolder <extract_dir>`
pub fn extract_command(extractor: &Path, input: &Path, extract_dir: &Path) -> ToolCommand {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    ToolCommand::new(extractor, format!("extraction of {}", name))
        .arg("extract")
        .arg(input)
        .arg("-extractFolder")
        .arg(extract_dir)
}

/// `pbi-tools.core compile <extract_dir> <target_dir> <format> <template>`
pub fn compile_command(
    compiler: &Path,
    extract_dir: &Path,
    target_dir: &Path,
    output_format: &str,
    template_mode: bool,
) -> ToolCommand {
    ToolCommand::new(
        compiler,
        format!("compilation to {} in {}", output_format, target_dir.display()),
    )
    .arg("compile")
    .arg(extract_dir)
    .arg(target_dir)
    .arg(output_format)
    .arg(if template_mode { "True" } else { "False" })
}
