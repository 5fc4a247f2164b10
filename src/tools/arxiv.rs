use super::registry::Tool;
use super::schema::{required_str, ArgSpec, ArgType, ToolError, ToolOutput, ToolSpec};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};
use std::time::Duration;

pub const TOOL_NAME: &str = "arxiv_search";

const SUMMARY_PREVIEW_CHARS: usize = 300;
const LISTED_AUTHORS: usize = 3;

const SELECTION_PHRASES: &[&str] = &[
    "interested in paper",
    "paper 1",
    "paper 2",
    "paper 3",
    "paper 4",
    "paper 5",
    "1st paper",
    "2nd paper",
    "3rd paper",
    "4th paper",
    "5th paper",
    "first paper",
    "second paper",
    "third paper",
    "fourth paper",
    "fifth paper",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArxivEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub pdf_url: String,
}

/// True when `topic` reads like the user picking a paper from an earlier
/// listing rather than naming a subject.
pub fn is_paper_selection(topic: &str) -> bool {
    let lowered = topic.to_lowercase();
    SELECTION_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

pub fn build_query_url(api_base: &str, topic: &str, max_results: usize) -> String {
    let query = topic
        .to_lowercase()
        .replace(['(', ')', '"'], "")
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+");
    format!(
        "{api_base}?search_query=all:{query}&max_results={max_results}&sortBy=submittedDate&sortOrder=descending"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryField {
    Id,
    Title,
    Summary,
    AuthorName,
}

fn parse_error(reason: impl std::fmt::Display) -> ToolError {
    ToolError::Parse {
        what: "arXiv feed".to_string(),
        reason: reason.to_string(),
    }
}

fn apply_link(entry: &mut ArxivEntry, link: &BytesStart<'_>) -> Result<(), ToolError> {
    let mut href = None;
    let mut is_pdf = false;
    for attr in link.attributes() {
        let attr = attr.map_err(parse_error)?;
        let value = attr.unescape_value().map_err(parse_error)?;
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value.into_owned()),
            b"type" => is_pdf = value == "application/pdf",
            _ => {}
        }
    }
    if is_pdf && entry.pdf_url.is_empty() {
        if let Some(href) = href {
            entry.pdf_url = href;
        }
    }
    Ok(())
}

/// Extracts the entries of an arXiv Atom feed. Feed-level elements are
/// ignored; an entry without a PDF link falls back to its `/pdf/` id URL.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<ArxivEntry>, ToolError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<ArxivEntry> = None;
    let mut in_author = false;
    let mut field: Option<EntryField> = None;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(start) => match start.local_name().as_ref() {
                b"entry" => current = Some(ArxivEntry::default()),
                b"author" if current.is_some() => in_author = true,
                b"name" if in_author => field = Some(EntryField::AuthorName),
                b"id" if current.is_some() && !in_author => field = Some(EntryField::Id),
                b"title" if current.is_some() && !in_author => field = Some(EntryField::Title),
                b"summary" if current.is_some() && !in_author => {
                    field = Some(EntryField::Summary)
                }
                b"link" => {
                    if let Some(entry) = current.as_mut() {
                        apply_link(entry, &start)?;
                    }
                }
                _ => {}
            },
            Event::Empty(empty) => {
                if empty.local_name().as_ref() == b"link" {
                    if let Some(entry) = current.as_mut() {
                        apply_link(entry, &empty)?;
                    }
                }
            }
            Event::Text(chunk) if field.is_some() => {
                text.push_str(&chunk.unescape().map_err(parse_error)?);
            }
            Event::CData(chunk) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&chunk.into_inner()));
            }
            Event::End(end) => match end.local_name().as_ref() {
                b"entry" => {
                    if let Some(mut entry) = current.take() {
                        if entry.pdf_url.is_empty() && !entry.id.is_empty() {
                            entry.pdf_url = entry.id.replace("/abs/", "/pdf/");
                        }
                        entries.push(entry);
                    }
                    in_author = false;
                }
                b"author" => in_author = false,
                _ => {
                    if let (Some(done), Some(entry)) = (field.take(), current.as_mut()) {
                        let value = std::mem::take(&mut text).trim().to_string();
                        match done {
                            EntryField::Id => entry.id = value,
                            EntryField::Title => entry.title = value,
                            EntryField::Summary => entry.summary = value,
                            EntryField::AuthorName => entry.authors.push(value),
                        }
                    }
                    text.clear();
                }
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

/// Capitalizes the first letter of every alphabetic run, lowercasing the rest.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn author_line(authors: &[String]) -> String {
    let mut line = authors
        .iter()
        .take(LISTED_AUTHORS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if authors.len() > LISTED_AUTHORS {
        line.push_str(&format!(" and {} others", authors.len() - LISTED_AUTHORS));
    }
    line
}

fn summary_preview(summary: &str) -> String {
    let collapsed = collapse_whitespace(summary);
    if collapsed.chars().count() > SUMMARY_PREVIEW_CHARS {
        let cut: String = collapsed.chars().take(SUMMARY_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        collapsed
    }
}

pub fn format_listing(topic: &str, entries: &[ArxivEntry]) -> String {
    let mut listing = format!(
        "# 📚 **Recent Papers on {}**\n\nFound **{} papers** from arXiv:\n\n",
        title_case(topic),
        entries.len()
    );

    for (index, entry) in entries.iter().enumerate() {
        listing.push_str(&format!(
            "## **Paper {}: {}**\n\n👥 **Authors:** {}\n\n📄 **Summary:** {}\n\n🔗 **PDF:** [Download Paper]({})\n\n---\n\n",
            index + 1,
            collapse_whitespace(&entry.title),
            author_line(&entry.authors),
            summary_preview(&entry.summary),
            entry.pdf_url,
        ));
    }

    listing.push_str("## 🎯 **Next Step**\n\n**Which paper are you interested in?** You can say:\n");
    for number in 1..=entries.len().max(1) {
        listing.push_str(&format!("- \"I am interested in paper {number}\"\n"));
    }
    listing.push('\n');
    listing
}

pub fn no_results_notice(topic: &str) -> String {
    format!(
        "📚 No recent papers found for topic: {topic}\n\nTry a different search term or let me know if you'd like to explore a related topic."
    )
}

pub const SELECTION_NOTICE: &str = "This looks like a paper selection rather than a search topic. Use the read_pdf tool with the chosen paper's PDF link instead of arxiv_search.";

pub struct ArxivSearchTool {
    spec: ToolSpec,
    api_base: String,
    max_results: usize,
    timeout: Duration,
}

impl ArxivSearchTool {
    pub fn new(api_base: &str, max_results: usize, timeout: Duration) -> Self {
        let spec = ToolSpec::new(
            TOOL_NAME,
            "Search arXiv for recently submitted papers on a topic. Use only for a new research topic, never for a paper the user selected from a previous listing.",
        )
        .arg(
            "topic",
            ArgSpec::required(ArgType::String, "The topic to search for papers about"),
        );
        Self {
            spec,
            api_base: api_base.trim_end_matches('/').to_string(),
            max_results,
            timeout,
        }
    }

    fn fetch_feed(&self, url: &str) -> Result<String, ToolError> {
        let http_error = |reason: String| ToolError::Http {
            url: url.to_string(),
            reason,
        };
        let response = ureq::get(url)
            .timeout(self.timeout)
            .call()
            .map_err(|err| http_error(err.to_string()))?;
        response
            .into_string()
            .map_err(|err| http_error(err.to_string()))
    }
}

impl Tool for ArxivSearchTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn call(&self, args: &Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let topic = required_str(args, "topic")?.trim();
        if is_paper_selection(topic) {
            return Ok(ToolOutput::notice(SELECTION_NOTICE));
        }

        let url = build_query_url(&self.api_base, topic, self.max_results);
        let entries = parse_atom_feed(&self.fetch_feed(&url)?)?;
        if entries.is_empty() {
            return Ok(ToolOutput::notice(no_results_notice(topic)));
        }
        Ok(ToolOutput::payload(format_listing(topic, &entries)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query: search_query=all:graph</title>
  <id>http://arxiv.org/api/query</id>
  <entry>
    <id>http://arxiv.org/abs/2501.00001v1</id>
    <title>Graph Learning
      at Scale</title>
    <summary>  We study graphs &amp; scale.
    </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name><arxiv:affiliation>Cambridge</arxiv:affiliation></author>
    <link href="http://arxiv.org/abs/2501.00001v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2501.00001v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2501.00002v1</id>
    <title>No Pdf Link</title>
    <summary>Short.</summary>
    <author><name>Grace Hopper</name></author>
  </entry>
</feed>"#;

    #[test]
    fn query_url_normalizes_topic() {
        let url = build_query_url(
            "http://export.arxiv.org/api/query",
            "Graph (Neural) \"Networks\"",
            5,
        );
        assert_eq!(
            url,
            "http://export.arxiv.org/api/query?search_query=all:graph+neural+networks&max_results=5&sortBy=submittedDate&sortOrder=descending"
        );
    }

    #[test]
    fn atom_feed_entries_are_extracted() {
        let entries = parse_atom_feed(FEED).expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Graph Learning\n      at Scale");
        assert_eq!(entries[0].summary, "We study graphs & scale.");
        assert_eq!(entries[0].authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(entries[0].pdf_url, "http://arxiv.org/pdf/2501.00001v1");
        assert_eq!(entries[1].pdf_url, "http://arxiv.org/pdf/2501.00002v1");
    }

    #[test]
    fn malformed_feed_is_a_parse_error() {
        let err = parse_atom_feed("<feed><entry><title>x</entry></feed>").expect_err("bad xml");
        assert!(matches!(err, ToolError::Parse { .. }));
    }

    #[test]
    fn listing_collapses_text_and_limits_authors() {
        let entry = ArxivEntry {
            id: "id".to_string(),
            title: "Deep\n   Nets".to_string(),
            summary: "word ".repeat(100),
            authors: ["A", "B", "C", "D", "E"].map(String::from).to_vec(),
            pdf_url: "http://arxiv.org/pdf/1".to_string(),
        };
        let listing = format_listing("machine learning", &[entry]);
        assert!(listing.starts_with("# 📚 **Recent Papers on Machine Learning**"));
        assert!(listing.contains("Found **1 papers** from arXiv:"));
        assert!(listing.contains("## **Paper 1: Deep Nets**"));
        assert!(listing.contains("👥 **Authors:** A, B, C and 2 others"));
        assert!(listing.contains("🔗 **PDF:** [Download Paper](http://arxiv.org/pdf/1)"));
        assert!(listing.contains(&format!("📄 **Summary:** {}...\n", "word ".repeat(60))));
        assert!(listing.contains("- \"I am interested in paper 1\""));
    }

    #[test]
    fn selection_phrasing_is_detected() {
        assert!(is_paper_selection("I am interested in Paper 2"));
        assert!(is_paper_selection("the third paper please"));
        assert!(!is_paper_selection("graph neural networks"));
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("machine LEARNING for x-ray"), "Machine Learning For X-Ray");
    }

    #[test]
    fn selection_request_returns_guidance_notice() {
        let tool = ArxivSearchTool::new("http://127.0.0.1:9", 5, Duration::from_secs(1));
        let mut args = Map::new();
        args.insert("topic".to_string(), Value::String("paper 1".to_string()));
        let output = tool.call(&args).expect("notice");
        assert!(!output.featured);
        assert_eq!(output.content, SELECTION_NOTICE);
    }
}
