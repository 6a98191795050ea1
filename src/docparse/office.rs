//! DOCX and XLSX parsing
//!
//! Office Open XML files are zip archives. Hyperlinks live in the
//! `_rels` relationship parts as `Target` attributes, and visible text
//! sits in a handful of well-known XML parts. Nothing here needs a
//! full XML parser, so the parts are scanned with regexes.

use crate::docparse::{harvest_urls, DocLink, ParseResult};
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::OnceLock;
use tracing::warn;
use zip::ZipArchive;

/// XML parts that hold user-visible text
const TEXT_PARTS: &[&str] = &[
    "word/document.xml",
    "word/footnotes.xml",
    "word/endnotes.xml",
    "xl/sharedStrings.xml",
];

fn target_pattern() -> &'static Regex {
    static TARGET: OnceLock<Regex> = OnceLock::new();
    TARGET.get_or_init(|| Regex::new(r#"Target="(https?://[^"]+)""#).expect("target regex"))
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag regex"))
}

pub(crate) fn parse_office(bytes: &[u8]) -> ParseResult {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(err) => {
            warn!(%err, "failed to open office archive");
            return ParseResult::failure();
        }
    };

    let mut links = Vec::new();
    let mut text = String::new();

    for index in 0..archive.len() {
        let Ok(mut entry) = archive.by_index(index) else {
            continue;
        };
        let name = entry.name().to_string();

        let is_rels = name.ends_with(".rels");
        let is_text_part = TEXT_PARTS.contains(&name.as_str());
        if !is_rels && !is_text_part {
            continue;
        }

        let mut content = String::new();
        if entry.read_to_string(&mut content).is_err() {
            continue;
        }

        if is_rels {
            for capture in target_pattern().captures_iter(&content) {
                let url = unescape_xml(&capture[1]);
                if links.iter().all(|l: &DocLink| l.url != url) {
                    links.push(DocLink { url, text: None });
                }
            }
        } else {
            let stripped = tag_pattern().replace_all(&content, " ");
            let part_text = unescape_xml(stripped.trim());
            if !part_text.is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&part_text);
            }
        }
    }

    harvest_urls(&text, &mut links);

    ParseResult {
        text,
        links,
        failed: false,
    }
}

/// Undoes the XML entity escapes that show up in attribute values
fn unescape_xml(value: &str) -> String {
    value
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}
