//! PDF parsing via lopdf
//!
//! Link annotations carry the clickable URLs; the page text is also
//! scanned for URLs written out in prose.

use crate::docparse::{harvest_urls, DocLink, ParseResult};
use lopdf::{Document, Object};
use tracing::{debug, warn};

pub(crate) fn parse_pdf(bytes: &[u8]) -> ParseResult {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(%err, "failed to load pdf");
            return ParseResult::failure();
        }
    };

    let mut links = Vec::new();
    let pages = doc.get_pages();

    for page_id in pages.values() {
        collect_annotation_uris(&doc, *page_id, &mut links);
    }

    let page_numbers: Vec<u32> = pages.keys().copied().collect();
    let text = match doc.extract_text(&page_numbers) {
        Ok(text) => text,
        Err(err) => {
            // Annotations may still have given us links
            debug!(%err, "pdf text extraction failed");
            String::new()
        }
    };

    harvest_urls(&text, &mut links);

    ParseResult {
        text,
        links,
        failed: false,
    }
}

/// Follows a single level of indirection to the referenced object
fn deref<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Pulls /URI actions out of a page's /Annots array
fn collect_annotation_uris(doc: &Document, page_id: (u32, u16), out: &mut Vec<DocLink>) {
    let Ok(page) = doc.get_object(page_id) else {
        return;
    };
    let Ok(page_dict) = page.as_dict() else {
        return;
    };
    let Ok(annots) = page_dict.get(b"Annots") else {
        return;
    };
    let Ok(annots) = deref(doc, annots).as_array() else {
        return;
    };

    for annot in annots {
        let Ok(annot_dict) = deref(doc, annot).as_dict() else {
            continue;
        };
        let Ok(action) = annot_dict.get(b"A") else {
            continue;
        };
        let Ok(action_dict) = deref(doc, action).as_dict() else {
            continue;
        };
        let Ok(uri) = action_dict.get(b"URI") else {
            continue;
        };
        let Ok(uri_bytes) = deref(doc, uri).as_str() else {
            continue;
        };
        let Ok(uri) = std::str::from_utf8(uri_bytes) else {
            continue;
        };

        if uri.starts_with("http://") || uri.starts_with("https://") {
            let url = uri.to_string();
            if out.iter().all(|l| l.url != url) {
                out.push(DocLink { url, text: None });
            }
        }
    }
}
