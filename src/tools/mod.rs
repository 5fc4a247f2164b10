pub mod arxiv;
pub mod latex;
pub mod paper;
pub mod pdf;
pub mod process;
pub mod registry;
pub mod render;
pub mod schema;

pub use arxiv::ArxivSearchTool;
pub use paper::GeneratePaperTool;
pub use pdf::{PdfReaderConfig, ReadPdfTool};
pub use registry::{FnTool, RegistryError, Tool, ToolRegistry};
pub use render::{RenderConfig, RenderPdfTool};
pub use schema::{ArgSpec, ArgType, ToolError, ToolOutput, ToolSpec};

use crate::config::Settings;
use crate::runtime::StatePaths;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Output directory from settings; relative paths live under the state root.
pub fn resolve_output_dir(settings: &Settings, paths: &StatePaths) -> PathBuf {
    resolve_under(&paths.root, &settings.output.dir)
}

fn resolve_under(root: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        root.join(dir)
    }
}

/// The research-assistant tool set in the order advertised to the model.
pub fn research_registry(
    settings: &Settings,
    paths: &StatePaths,
) -> Result<ToolRegistry, RegistryError> {
    let tools = &settings.tools;
    let output_dir = resolve_output_dir(settings, paths);
    let http_timeout = Duration::from_secs(tools.http_timeout_seconds);

    ToolRegistry::new()
        .with_tool(ArxivSearchTool::new(
            &tools.arxiv_api_base,
            tools.search_max_results as usize,
            http_timeout,
        ))?
        .with_tool(ReadPdfTool::new(PdfReaderConfig {
            pdftotext_binary: tools.pdftotext_binary.clone(),
            scratch_dir: paths.cache_dir(),
            max_chars: tools.pdf_max_chars,
            max_bytes: tools.pdf_max_bytes,
            timeout: http_timeout,
            allow_local_files: false,
        }))?
        .with_tool(GeneratePaperTool::new(output_dir.clone()))?
        .with_tool(RenderPdfTool::new(RenderConfig {
            tectonic_binary: tools.tectonic_binary.clone(),
            output_dir,
            download_base_url: settings.output.download_base_url.clone(),
            timeout: Duration::from_secs(tools.compile_timeout_seconds),
        }))
}
