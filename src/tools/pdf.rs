use super::process::{run_command, CommandSpec};
use super::registry::Tool;
use super::schema::{io_error, required_str, ArgSpec, ArgType, ToolError, ToolOutput, ToolSpec};
use crate::shared::time::now_nanos;
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TOOL_NAME: &str = "read_pdf";

pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated for analysis...]";
const SUMMARY_PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Clone)]
pub struct PdfReaderConfig {
    pub pdftotext_binary: String,
    pub scratch_dir: PathBuf,
    pub max_chars: usize,
    pub max_bytes: u64,
    pub timeout: Duration,
    /// Accept `file://` URLs. Never set for model-facing registries.
    pub allow_local_files: bool,
}

/// Cuts `text` to `max_chars` characters, marking the cut.
pub fn truncate_for_analysis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_index]),
        None => text.to_string(),
    }
}

pub fn format_analysis(text: &str) -> String {
    let preview: String = text.chars().take(SUMMARY_PREVIEW_CHARS).collect();
    format!(
        "# 📖 **Paper Summary**

## 📄 **Summary:**
{preview}...

## 🔬 **Key Research Directions:**
Based on this paper, here are potential research directions:

1. **Advanced Methodologies** - Improving current approaches
2. **Cross-Domain Applications** - Applying concepts to new fields
3. **Performance Optimization** - Enhancing efficiency and accuracy
4. **Theoretical Foundations** - Strengthening mathematical basis
5. **Practical Implementation** - Real-world deployment strategies

---

## 🎯 **Next Step**
**Should I choose the best topics for you, or would you like to decide?**

You can say:
- \"Choose best topics for me\"
- \"I will decide myself\"
"
    )
}

fn too_large(url: &str, max_bytes: u64) -> ToolError {
    ToolError::Http {
        url: url.to_string(),
        reason: format!("document exceeds {max_bytes} bytes"),
    }
}

/// Loads the document behind `url`. `file://` URLs read from disk when
/// `allow_local_files` is set and are refused otherwise; anything else is
/// fetched over HTTP. Bodies above `max_bytes` are rejected.
pub fn fetch_document(
    url: &str,
    max_bytes: u64,
    timeout: Duration,
    allow_local_files: bool,
) -> Result<Vec<u8>, ToolError> {
    if let Some(local) = url.strip_prefix("file://") {
        if !allow_local_files {
            return Err(ToolError::Failed(format!(
                "local file URLs are not accepted: {url}"
            )));
        }
        let path = Path::new(local);
        let size = fs::metadata(path)
            .map_err(|err| io_error(path, err))?
            .len();
        if size > max_bytes {
            return Err(too_large(url, max_bytes));
        }
        return fs::read(path).map_err(|err| io_error(path, err));
    }

    let http_error = |reason: String| ToolError::Http {
        url: url.to_string(),
        reason,
    };
    let response = ureq::get(url)
        .timeout(timeout)
        .call()
        .map_err(|err| http_error(err.to_string()))?;

    let mut body = Vec::new();
    response
        .into_reader()
        .take(max_bytes + 1)
        .read_to_end(&mut body)
        .map_err(|err| http_error(err.to_string()))?;
    if body.len() as u64 > max_bytes {
        return Err(too_large(url, max_bytes));
    }
    Ok(body)
}

pub fn extract_text(
    pdf_path: &Path,
    config: &PdfReaderConfig,
) -> Result<String, ToolError> {
    let cwd = pdf_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.scratch_dir.clone());
    let output = run_command(&CommandSpec {
        binary: config.pdftotext_binary.clone(),
        args: vec![
            "-layout".to_string(),
            pdf_path.display().to_string(),
            "-".to_string(),
        ],
        cwd,
        timeout: config.timeout,
    })?;
    Ok(output.stdout)
}

pub struct ReadPdfTool {
    spec: ToolSpec,
    config: PdfReaderConfig,
}

impl ReadPdfTool {
    pub fn new(config: PdfReaderConfig) -> Self {
        let spec = ToolSpec::new(
            TOOL_NAME,
            "Download a paper PDF from its URL, extract the text and return a structured summary with research directions. Use when the user selects a paper from a search listing.",
        )
        .arg(
            "url",
            ArgSpec::required(ArgType::String, "The URL of the PDF file to read"),
        );
        Self { spec, config }
    }

    fn read_text(&self, url: &str) -> Result<String, ToolError> {
        let body = fetch_document(
            url,
            self.config.max_bytes,
            self.config.timeout,
            self.config.allow_local_files,
        )?;
        let scratch = &self.config.scratch_dir;
        fs::create_dir_all(scratch).map_err(|err| io_error(scratch, err))?;
        let pdf_path = scratch.join(format!("read_pdf_{}.pdf", now_nanos()));
        fs::write(&pdf_path, &body).map_err(|err| io_error(&pdf_path, err))?;

        let extracted = extract_text(&pdf_path, &self.config);
        let _ = fs::remove_file(&pdf_path);
        extracted
    }
}

impl Tool for ReadPdfTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn call(&self, args: &Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let url = required_str(args, "url")?.trim();
        let text = self.read_text(url)?;
        if text.trim().is_empty() {
            return Err(ToolError::Failed(format!(
                "no extractable text in document at {url}"
            )));
        }
        let text = truncate_for_analysis(&text, self.config.max_chars);
        Ok(ToolOutput::payload(format_analysis(&text)))
    }
}
