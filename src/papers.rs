use crate::tools::arxiv::title_case;
use crate::tools::latex::PAPER_FILE_PREFIX;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, thiserror::Error)]
pub enum PapersError {
    #[error("invalid filename `{filename}`")]
    InvalidFilename { filename: String },
    #[error("only PDF files can be downloaded, got `{filename}`")]
    UnsupportedExtension { filename: String },
    #[error("PDF file `{filename}` not found")]
    NotFound { filename: String },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path, source: std::io::Error) -> PapersError {
    PapersError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperInfo {
    pub filename: String,
    pub title: String,
    pub created_at: String,
    pub file_size: u64,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PapersListing {
    pub papers: Vec<PaperInfo>,
    pub total_count: usize,
}

/// `paper_graph_study` becomes `Graph Study`.
pub fn paper_title(stem: &str) -> String {
    title_case(&stem.replacen(PAPER_FILE_PREFIX, "", 1).replace('_', " "))
}

/// Generated PDFs in `output_dir`, newest first. The directory is created
/// when missing.
pub fn list_papers(output_dir: &Path, download_base_url: &str) -> Result<PapersListing, PapersError> {
    fs::create_dir_all(output_dir).map_err(|err| io_error(output_dir, err))?;
    let base = download_base_url.trim_end_matches('/');

    let mut dated = Vec::new();
    for entry in fs::read_dir(output_dir).map_err(|err| io_error(output_dir, err))? {
        let entry = entry.map_err(|err| io_error(output_dir, err))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("pdf") {
            continue;
        }
        let (Some(filename), Some(stem)) = (
            path.file_name().and_then(|name| name.to_str()),
            path.file_stem().and_then(|stem| stem.to_str()),
        ) else {
            continue;
        };

        let metadata = entry.metadata().map_err(|err| io_error(&path, err))?;
        let created: SystemTime = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map_err(|err| io_error(&path, err))?;
        dated.push((
            created,
            PaperInfo {
                filename: filename.to_string(),
                title: paper_title(stem),
                created_at: DateTime::<Local>::from(created).to_rfc3339(),
                file_size: metadata.len(),
                download_url: format!("{base}/{filename}"),
            },
        ));
    }

    dated.sort_by(|(left, left_info), (right, right_info)| {
        right
            .cmp(left)
            .then_with(|| right_info.filename.cmp(&left_info.filename))
    });
    let papers: Vec<PaperInfo> = dated.into_iter().map(|(_, info)| info).collect();
    Ok(PapersListing {
        total_count: papers.len(),
        papers,
    })
}

/// Absolute path of a downloadable PDF. Names that could escape the output
/// directory are rejected before touching the filesystem.
pub fn resolve_download(output_dir: &Path, filename: &str) -> Result<PathBuf, PapersError> {
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return Err(PapersError::InvalidFilename {
            filename: filename.to_string(),
        });
    }
    if !filename.ends_with(".pdf") {
        return Err(PapersError::UnsupportedExtension {
            filename: filename.to_string(),
        });
    }

    let path = output_dir.join(filename);
    if !path.is_file() {
        return Err(PapersError::NotFound {
            filename: filename.to_string(),
        });
    }
    fs::canonicalize(&path).map_err(|err| io_error(&path, err))
}
