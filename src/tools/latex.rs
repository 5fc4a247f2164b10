use super::schema::{io_error, ToolError};
use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::time::file_stamp;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

pub const PAPER_FILE_PREFIX: &str = "paper_";

const DROPPED_PACKAGES: &[&str] = &[r"\usepackage{algorithm}", r"\usepackage{algorithmic}"];

fn blank_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank-line pattern"))
}

/// Replaces `{{name}}` placeholders from `values`; an unknown or empty
/// placeholder is an error rather than silently left in the document.
pub fn render_template(
    template: &str,
    values: &BTreeMap<&str, String>,
) -> Result<String, ToolError> {
    let mut rendered = String::with_capacity(template.len());
    let mut cursor = template;

    while let Some(mut start) = cursor.find("{{") {
        // `{{{name}}}` keeps one literal brace around the value.
        while cursor[start + 2..].starts_with('{') {
            start += 1;
        }
        rendered.push_str(&cursor[..start]);
        let after_open = &cursor[start + 2..];
        let Some(close_offset) = after_open.find("}}") else {
            return Err(ToolError::Failed(
                "unclosed placeholder in paper template".to_string(),
            ));
        };
        let token = after_open[..close_offset].trim();
        let value = values.get(token).ok_or_else(|| {
            ToolError::Failed(format!("unknown placeholder `{token}` in paper template"))
        })?;
        rendered.push_str(value);
        cursor = &after_open[close_offset + 2..];
    }

    rendered.push_str(cursor);
    Ok(rendered)
}

fn escape_bare_ampersands(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len() + 4);
    for (idx, ch) in chars.iter().enumerate() {
        if *ch == '&' {
            let escaped = idx > 0 && chars[idx - 1] == '\\';
            let entity_like = chars
                .get(idx + 1)
                .is_some_and(|next| next.is_ascii_alphabetic());
            if !escaped && !entity_like {
                out.push('\\');
            }
        }
        out.push(*ch);
    }
    out
}

fn is_reference_heading(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed == r"\section{References}" || trimmed.starts_with(r"\bibliographystyle")
}

fn insert_reference_page_breaks(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 2);
    for line in lines {
        if is_reference_heading(&line) {
            let preceded_by_break = out
                .iter()
                .rev()
                .map(|prev| prev.trim())
                .find(|prev| !prev.is_empty() && !prev.starts_with('%'))
                .is_some_and(|prev| prev == r"\newpage");
            if !preceded_by_break {
                out.push(r"\newpage".to_string());
            }
        }
        out.push(line);
    }
    out
}

/// Repairs the LaTeX mistakes that most often break compilation of generated
/// papers: bare `&` in prose, packages tectonic cannot resolve, references
/// not on their own page, and a missing document skeleton.
pub fn fix_latex(content: &str) -> String {
    let mut in_tabular = false;
    let mut lines = Vec::new();
    for line in content.split('\n') {
        if line.trim_start().starts_with('%') {
            lines.push(line.to_string());
            continue;
        }
        if line.contains(r"\begin{tabular}") || line.contains(r"\begin{array}") {
            in_tabular = true;
        } else if line.contains(r"\end{tabular}") || line.contains(r"\end{array}") {
            in_tabular = false;
        }

        if !in_tabular && line.contains('&') && !line.contains(r"\&") {
            lines.push(escape_bare_ampersands(line));
        } else {
            lines.push(line.to_string());
        }
    }

    let mut fixed = insert_reference_page_breaks(lines).join("\n");
    for package in DROPPED_PACKAGES {
        fixed = fixed.replace(package, "");
    }

    if !fixed.contains(r"\documentclass") {
        fixed = format!("\\documentclass[11pt]{{article}}\n{fixed}");
    }
    if !fixed.contains(r"\begin{document}") {
        fixed.push_str("\n\n\\begin{document}");
    }
    if !fixed.contains(r"\end{document}") {
        fixed.push_str("\n\n\\end{document}");
    }

    blank_run_pattern().replace_all(&fixed, "\n\n").into_owned()
}

/// Fixes `content` and stores it as `paper_<stamp>.tex` under `output_dir`.
/// Returns the file name.
pub fn write_paper_source(output_dir: &Path, content: &str) -> Result<String, ToolError> {
    fs::create_dir_all(output_dir).map_err(|err| io_error(output_dir, err))?;
    let file_name = format!("{PAPER_FILE_PREFIX}{}.tex", file_stamp());
    let path = output_dir.join(&file_name);
    atomic_write_file(&path, fix_latex(content).as_bytes()).map_err(|err| io_error(&path, err))?;
    Ok(file_name)
}

/// Most recently modified `paper_*.tex` in `output_dir`, if any.
pub fn latest_paper_source(output_dir: &Path) -> Result<Option<PathBuf>, ToolError> {
    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_error(output_dir, err)),
    };

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|err| io_error(output_dir, err))?;
        let path = entry.path();
        let is_paper = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(PAPER_FILE_PREFIX) && name.ends_with(".tex"));
        if !is_paper {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .map_err(|err| io_error(&path, err))?;
        if latest.as_ref().map_or(true, |(best, _)| modified > *best) {
            latest = Some((modified, path));
        }
    }
    Ok(latest.map(|(_, path)| path))
}
