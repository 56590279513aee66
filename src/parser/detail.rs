use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{collapse_ws, find_exact};
use crate::catalog::ResourceDetails;

static H3_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static TERM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.term").unwrap());
static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

// Longest run of description characters after "returns [the] ", up to the
// closing period or comma.
static REF_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|.* )[Rr]eturns (?:the )?([\w\\'": ()|/<>-]*)[,.]"#).unwrap()
});

const REF_HEADING: &str = "Ref";
const GETATT_HEADING: &str = "Fn::GetAtt";

// Some pages have the Ref heading with nothing under it, so the next text is
// the Fn::GetAtt heading or something else entirely. Some state outright
// that Ref is not supported and document nothing.
const BAD_REFS: &[&str] = &["Fn::GetAtt", "Examples", ""];

/// One `Fn::GetAtt` attribute as documented: the term name plus the
/// paragraph describing it (the description is logged, not persisted).
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub description: Option<String>,
}

/// Parse a resource detail page. Missing Ref or Fn::GetAtt sections are a
/// normal condition, not an error: the corresponding fields stay empty.
pub fn resource_details(html: &str) -> ResourceDetails {
    let doc = Html::parse_document(html);

    let (ref_text, ref_orig) = match ref_section(&doc) {
        Some((parsed, orig)) => (Some(parsed), Some(orig)),
        None => (None, None),
    };

    let attrs = getatt_attributes(&doc);
    for attr in &attrs {
        debug!(
            name = %attr.name,
            description = attr.description.as_deref().unwrap_or("-"),
            "attribute"
        );
    }

    ResourceDetails {
        ref_text,
        ref_orig,
        attrs: attrs.into_iter().map(|a| a.name).collect(),
    }
}

/// (parsed description, raw sibling text), or None when the heading is
/// absent or the extracted value is block-listed.
fn ref_section(doc: &Html) -> Option<(String, String)> {
    let heading = find_exact(doc, &H3_SEL, REF_HEADING)?;
    let raw = following_text(heading)?;
    let parsed = parse_ref(&raw);
    if BAD_REFS.contains(&parsed.as_str()) {
        return None;
    }
    Some((parsed, raw))
}

/// Text of whatever immediately follows the heading: the first non-blank
/// text node, or the full text of the first element sibling.
fn following_text(heading: ElementRef) -> Option<String> {
    for sib in heading.next_siblings() {
        if let Some(text) = sib.value().as_text() {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
            continue;
        }
        if let Some(el) = ElementRef::wrap(sib) {
            return Some(el.text().collect());
        }
    }
    None
}

/// Collapse the raw section text and pull out the documented return value.
/// Falls back to the whole collapsed text when the pattern is absent.
pub fn parse_ref(raw: &str) -> String {
    let collapsed = collapse_ws(&raw.replace('\n', ""));
    match REF_DESCRIPTION_RE.captures(&collapsed) {
        Some(caps) => caps[1].to_string(),
        None => collapsed,
    }
}

/// Attribute names (document order, first occurrence wins) from the
/// definition list following the Fn::GetAtt heading.
fn getatt_attributes(doc: &Html) -> Vec<Attribute> {
    let Some(heading) = find_exact(doc, &H3_SEL, GETATT_HEADING) else {
        return Vec::new();
    };

    let mut attrs: Vec<Attribute> = Vec::new();
    for sib in heading.next_siblings() {
        let Some(el) = ElementRef::wrap(sib) else { continue };
        for term in el.select(&TERM_SEL) {
            let name = collapse_ws(&term.text().collect::<String>());
            if name.is_empty() || attrs.iter().any(|a| a.name == name) {
                continue;
            }
            let description = term_description(term);
            attrs.push(Attribute { name, description });
        }
    }
    attrs
}

/// Nearest following paragraph within the same definition-list entry:
/// `<dt><span class="term">X</span></dt><dd><p>description</p></dd>`.
fn term_description(term: ElementRef) -> Option<String> {
    let mut level = Some(term);
    while let Some(el) = level {
        for sib in el.next_siblings() {
            if let Some(sib_el) = ElementRef::wrap(sib) {
                if let Some(text) = paragraph_text(sib_el) {
                    return Some(text);
                }
            }
        }
        level = el
            .parent()
            .and_then(ElementRef::wrap)
            .filter(|parent| parent.value().name() != "dl");
    }
    None
}

fn paragraph_text(el: ElementRef) -> Option<String> {
    if el.value().name() == "p" {
        return Some(collapse_ws(&el.text().collect::<String>()));
    }
    el.select(&P_SEL)
        .next()
        .map(|p| collapse_ws(&p.text().collect::<String>()))
}

// ── Tests ──
