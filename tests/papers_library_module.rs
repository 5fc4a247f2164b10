use research_genie::papers::{list_papers, resolve_download, PapersError};
use std::fs;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn listing_creates_directory_and_orders_newest_first() {
    let dir = tempdir().expect("tempdir");
    let output_dir = dir.path().join("output");

    let empty = list_papers(&output_dir, "http://host/papers/download").expect("empty");
    assert_eq!(empty.total_count, 0);
    assert!(output_dir.is_dir());

    fs::write(output_dir.join("paper_first_draft.pdf"), b"one").expect("first");
    thread::sleep(Duration::from_millis(20));
    fs::write(output_dir.join("paper_second_draft.pdf"), b"second").expect("second");
    fs::write(output_dir.join("paper_second_draft.tex"), b"tex").expect("tex");

    let listing = list_papers(&output_dir, "http://host/papers/download/").expect("listing");
    assert_eq!(listing.total_count, 2);
    let names: Vec<&str> = listing
        .papers
        .iter()
        .map(|paper| paper.filename.as_str())
        .collect();
    assert_eq!(names, vec!["paper_second_draft.pdf", "paper_first_draft.pdf"]);

    let newest = &listing.papers[0];
    assert_eq!(newest.title, "Second Draft");
    assert_eq!(newest.file_size, 6);
    assert_eq!(
        newest.download_url,
        "http://host/papers/download/paper_second_draft.pdf"
    );
    assert!(chrono::DateTime::parse_from_rfc3339(&newest.created_at).is_ok());
}

#[test]
fn download_resolves_existing_pdf_only() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("paper_x.pdf"), b"%PDF").expect("pdf");
    fs::write(dir.path().join("paper_x.tex"), b"tex").expect("tex");

    let path = resolve_download(dir.path(), "paper_x.pdf").expect("resolve");
    assert!(path.is_absolute());
    assert!(path.ends_with("paper_x.pdf"));

    assert!(matches!(
        resolve_download(dir.path(), "paper_x.tex"),
        Err(PapersError::UnsupportedExtension { .. })
    ));
    assert!(matches!(
        resolve_download(dir.path(), "..%2fpaper_x.pdf"),
        Err(PapersError::InvalidFilename { .. })
    ));
    assert!(matches!(
        resolve_download(dir.path(), "paper_y.pdf"),
        Err(PapersError::NotFound { .. })
    ));
}
