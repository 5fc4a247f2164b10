use super::latex::{latest_paper_source, write_paper_source};
use super::process::{run_command, CommandSpec};
use super::registry::Tool;
use super::schema::{io_error, optional_str, ArgSpec, ArgType, ToolError, ToolOutput, ToolSpec};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TOOL_NAME: &str = "render_latex_pdf";

pub const NO_SOURCE_NOTICE: &str = "Error: No LaTeX content provided and no existing .tex files found. Please generate a paper first.";

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub tectonic_binary: String,
    pub output_dir: PathBuf,
    pub download_base_url: String,
    pub timeout: Duration,
}

pub fn render_confirmation(pdf_name: &str, download_base_url: &str) -> String {
    let download_url = format!("{}/{pdf_name}", download_base_url.trim_end_matches('/'));
    format!(
        "## ✅ PDF Successfully Generated!\n\n**📄 Filename:** `{pdf_name}`\n\n**🎉 Your research paper is ready!**\n\nThe PDF compiled successfully with:\n• All formatting rendered\n• Mathematical equations displayed\n• Tables included\n• References formatted\n\n**📥 [Click here to download your PDF]({download_url})**"
    )
}

pub struct RenderPdfTool {
    spec: ToolSpec,
    config: RenderConfig,
}

impl RenderPdfTool {
    pub fn new(config: RenderConfig) -> Self {
        let spec = ToolSpec::new(
            TOOL_NAME,
            "Compile a LaTeX research paper to PDF. Leave latex_content empty to compile the most recently generated paper.",
        )
        .arg(
            "latex_content",
            ArgSpec::optional(
                ArgType::String,
                "Complete LaTeX document; empty to use the latest generated paper",
            ),
        );
        Self { spec, config }
    }

    /// File name of the `.tex` to compile, or `None` when there is nothing
    /// to compile.
    fn source_file_name(
        &self,
        output_dir: &Path,
        latex_content: Option<&str>,
    ) -> Result<Option<String>, ToolError> {
        match latex_content.map(str::trim).filter(|content| !content.is_empty()) {
            Some(content) => write_paper_source(output_dir, content).map(Some),
            None => Ok(latest_paper_source(output_dir)?
                .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))),
        }
    }
}

impl Tool for RenderPdfTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn call(&self, args: &Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let configured_dir = &self.config.output_dir;
        fs::create_dir_all(configured_dir).map_err(|err| io_error(configured_dir, err))?;
        let output_dir =
            fs::canonicalize(configured_dir).map_err(|err| io_error(configured_dir, err))?;

        let latex_content = optional_str(args, "latex_content")?;
        let Some(tex_name) = self.source_file_name(&output_dir, latex_content)? else {
            return Ok(ToolOutput::notice(NO_SOURCE_NOTICE));
        };
        let pdf_name = match tex_name.strip_suffix(".tex") {
            Some(stem) => format!("{stem}.pdf"),
            None => format!("{tex_name}.pdf"),
        };

        run_command(&CommandSpec {
            binary: self.config.tectonic_binary.clone(),
            args: vec![
                tex_name,
                "--outdir".to_string(),
                output_dir.display().to_string(),
            ],
            cwd: output_dir.clone(),
            timeout: self.config.timeout,
        })?;

        let pdf_path = output_dir.join(&pdf_name);
        if !pdf_path.is_file() {
            return Err(ToolError::Failed(format!(
                "PDF file was not generated. Expected: {}",
                pdf_path.display()
            )));
        }
        Ok(ToolOutput::payload(render_confirmation(
            &pdf_name,
            &self.config.download_base_url,
        )))
    }
}
