pub mod detail;
pub mod index;

use scraper::{ElementRef, Html, Selector};

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First element matching `selector` whose collapsed text equals `text`.
pub(crate) fn find_exact<'a>(
    doc: &'a Html,
    selector: &Selector,
    text: &str,
) -> Option<ElementRef<'a>> {
    doc.select(selector)
        .find(|el| collapse_ws(&el.text().collect::<String>()) == text)
}
