use std::sync::LazyLock;

use anyhow::{bail, Result};
use scraper::{ElementRef, Html, Selector};

use super::{collapse_ws, find_exact};

static H6_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h6").unwrap());
static B_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("b").unwrap());
static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static A_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

const SERVICE_LIST_MARKER: &str = "Service resource type";
const RESOURCE_LIST_MARKER: &str = "Resource types";

/// One list entry on an index page: display text + raw href.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub name: String,
    pub href: String,
}

/// Service entries from the top-level resource type reference page.
pub fn service_links(html: &str) -> Result<Vec<Link>> {
    marked_list(html, &H6_SEL, SERVICE_LIST_MARKER)
}

/// Resource type entries from a per-service reference page.
pub fn resource_links(html: &str) -> Result<Vec<Link>> {
    marked_list(html, &B_SEL, RESOURCE_LIST_MARKER)
}

/// Locate the marker heading, then take the first link list that follows it.
/// A missing marker means the page structure changed: fatal.
fn marked_list(html: &str, marker_sel: &Selector, marker: &str) -> Result<Vec<Link>> {
    let doc = Html::parse_document(html);
    let Some(heading) = find_exact(&doc, marker_sel, marker) else {
        bail!("marker {marker:?} not found; page structure changed");
    };
    let links = links_after(heading);
    if links.is_empty() {
        bail!("no link list follows marker {marker:?}; page structure changed");
    }
    Ok(links)
}

/// Walk forward from `start` in document order: scan its following siblings,
/// climbing to the parent when a level is exhausted, until an element
/// containing `li`/`a` items turns up.
fn links_after(start: ElementRef) -> Vec<Link> {
    let mut level = Some(start);
    while let Some(el) = level {
        for sib in el.next_siblings() {
            let Some(sib_el) = ElementRef::wrap(sib) else { continue };
            let items = list_items(sib_el);
            if !items.is_empty() {
                return items;
            }
        }
        level = el.parent().and_then(ElementRef::wrap);
    }
    Vec::new()
}

fn list_items(el: ElementRef) -> Vec<Link> {
    el.select(&LI_SEL)
        .filter_map(|li| li.select(&A_SEL).next())
        .map(|a| Link {
            name: collapse_ws(&a.text().collect::<String>()),
            href: a.value().attr("href").unwrap_or_default().to_string(),
        })
        .collect()
}

// ── Tests ──
