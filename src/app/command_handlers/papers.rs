use crate::app::command_support::{ensure_runtime_root, load_settings, output_dir};
use crate::papers::{list_papers, resolve_download};

pub fn cmd_papers(args: &[String]) -> Result<String, String> {
    if !args.is_empty() {
        return Err("usage: papers".to_string());
    }
    let paths = ensure_runtime_root()?;
    let settings = load_settings(&paths)?;
    let listing = list_papers(
        &output_dir(&settings, &paths),
        &settings.output.download_base_url,
    )
    .map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&listing).map_err(|e| format!("failed to encode papers: {e}"))
}

pub fn cmd_download(args: &[String]) -> Result<String, String> {
    let [filename] = args else {
        return Err("usage: download <filename>".to_string());
    };
    let paths = ensure_runtime_root()?;
    let settings = load_settings(&paths)?;
    let path = resolve_download(&output_dir(&settings, &paths), filename).map_err(|e| e.to_string())?;
    Ok(path.display().to_string())
}
