use research_genie::tools::render::{RenderConfig, RenderPdfTool, NO_SOURCE_NOTICE};
use research_genie::tools::{Tool, ToolError};
use serde_json::{json, Map, Value};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}

/// Stands in for tectonic: writes `<stem>.pdf` into the `--outdir` directory.
const TECTONIC_MOCK: &str = "#!/bin/sh\nsrc=\"$1\"\nout=\"$3\"\ntest -f \"$src\" || exit 2\ncp \"$src\" \"$out/${src%.tex}.pdf\"\n";

fn tool(tectonic: &Path, output_dir: &Path) -> RenderPdfTool {
    RenderPdfTool::new(RenderConfig {
        tectonic_binary: tectonic.display().to_string(),
        output_dir: output_dir.to_path_buf(),
        download_base_url: "http://localhost:8000/papers/download".to_string(),
        timeout: Duration::from_secs(5),
    })
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object")
}

#[test]
fn provided_content_is_fixed_written_and_compiled() {
    let dir = tempdir().expect("tempdir");
    let tectonic = dir.path().join("tectonic-mock");
    write_script(&tectonic, TECTONIC_MOCK);
    let output_dir = dir.path().join("output");

    let output = tool(&tectonic, &output_dir)
        .call(&args(json!({"latex_content": "Profit & loss"})))
        .expect("render");
    assert!(output.featured);
    assert!(output.content.starts_with("## ✅ PDF Successfully Generated!"));

    let tex = fs::read_dir(&output_dir)
        .expect("read dir")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .find(|path| path.extension().is_some_and(|ext| ext == "tex"))
        .expect("tex written");
    let source = fs::read_to_string(&tex).expect("tex");
    assert!(source.contains(r"Profit \& loss"));
    assert!(source.contains(r"\end{document}"));

    let pdf_name = tex
        .with_extension("pdf")
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .expect("pdf name");
    assert!(output_dir.join(&pdf_name).is_file());
    assert!(output
        .content
        .contains(&format!("http://localhost:8000/papers/download/{pdf_name}")));
}

#[test]
fn empty_content_compiles_latest_generated_paper() {
    let dir = tempdir().expect("tempdir");
    let tectonic = dir.path().join("tectonic-mock");
    write_script(&tectonic, TECTONIC_MOCK);
    let output_dir = dir.path().join("output");
    fs::create_dir_all(&output_dir).expect("mkdir");
    fs::write(output_dir.join("paper_20240101_000000.tex"), "old").expect("old");
    std::thread::sleep(Duration::from_millis(20));
    fs::write(output_dir.join("paper_20250101_000000.tex"), "new").expect("new");
    fs::write(output_dir.join("notes.tex"), "ignored").expect("notes");

    let output = tool(&tectonic, &output_dir)
        .call(&args(json!({"latex_content": "  "})))
        .expect("render");
    assert!(output.content.contains("`paper_20250101_000000.pdf`"));
    assert_eq!(
        fs::read_to_string(output_dir.join("paper_20250101_000000.pdf")).expect("pdf"),
        "new"
    );
    assert!(!output_dir.join("paper_20240101_000000.pdf").exists());
}

#[test]
fn missing_source_is_a_notice() {
    let dir = tempdir().expect("tempdir");
    let output = tool(&dir.path().join("tectonic-mock"), &dir.path().join("output"))
        .call(&Map::new())
        .expect("notice");
    assert!(!output.featured);
    assert_eq!(output.content, NO_SOURCE_NOTICE);
}

#[test]
fn compiler_failures_are_tool_errors() {
    let dir = tempdir().expect("tempdir");
    let output_dir = dir.path().join("output");

    let failing = dir.path().join("tectonic-fail");
    write_script(&failing, "#!/bin/sh\necho 'Undefined control sequence' >&2\nexit 1\n");
    let err = tool(&failing, &output_dir)
        .call(&args(json!({"latex_content": "x"})))
        .expect_err("compile failure");
    assert!(err.to_string().contains("Undefined control sequence"));

    let silent = dir.path().join("tectonic-silent");
    write_script(&silent, "#!/bin/sh\nexit 0\n");
    let err = tool(&silent, &output_dir)
        .call(&Map::new())
        .expect_err("no pdf");
    assert!(matches!(err, ToolError::Failed(ref reason) if reason.contains("PDF file was not generated")));

    let err = tool(&dir.path().join("tectonic-missing"), &output_dir)
        .call(&Map::new())
        .expect_err("missing binary");
    assert!(err.to_string().contains("is not installed"));
}
