use std::collections::BTreeMap;

use crate::catalog::{split_name, Resource};
use crate::classify::{AttrCategory, Classification, RefCategory};

pub const REPORT_PATH: &str = "report.md";

const TITLE: &str = "# The big table of \"How do I get an ARN?\"";

/// Render the whole report: summary table cross-tabulating the two
/// taxonomies, then one section per cell in table order (row-major),
/// including empty cells so every table anchor resolves.
pub fn render(resources: &BTreeMap<&str, &Resource>, classification: &Classification) -> String {
    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');

    // Header row + separator
    out.push_str("| |");
    for attr_cat in AttrCategory::ALL {
        out.push_str(&format!(" {} |", attr_cat.name()));
    }
    out.push_str("\n|");
    for _ in 0..=AttrCategory::ALL.len() {
        out.push_str(" - |");
    }
    out.push('\n');

    for ref_cat in RefCategory::ALL {
        out.push_str(&format!("| {} |", ref_cat.name()));
        for attr_cat in AttrCategory::ALL {
            let count = classification.cell((ref_cat, attr_cat)).len();
            let heading = section_heading(ref_cat, attr_cat, count);
            out.push_str(&format!(" [{}]({}) |", count, anchor(&heading)));
        }
        out.push('\n');
    }

    out.push_str("\n---\n");

    for ref_cat in RefCategory::ALL {
        for attr_cat in AttrCategory::ALL {
            let names = classification.cell((ref_cat, attr_cat));
            out.push_str(&format!(
                "\n# {}\n\n",
                section_heading(ref_cat, attr_cat, names.len())
            ));
            render_cell(&mut out, names, resources, classification, ref_cat, attr_cat);
        }
    }

    out
}

fn section_heading(ref_cat: RefCategory, attr_cat: AttrCategory, count: usize) -> String {
    format!(
        "{} and {} - {} resources",
        ref_cat.name(),
        attr_cat.name(),
        count
    )
}

/// Same-document anchor for a section heading: spaces become dashes,
/// Markdown punctuation drops out, the rest lowercases.
fn anchor(heading: &str) -> String {
    let mut out = String::with_capacity(heading.len() + 1);
    out.push('#');
    for c in heading.chars() {
        match c {
            ' ' => out.push('-'),
            '!' | '`' | '<' | '>' | '.' => {}
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// One `* [name](url) (hints)` entry per resource, grouped by prefix,
/// prefixes sorted, suffixes sorted within each prefix.
fn render_cell(
    out: &mut String,
    names: &[String],
    resources: &BTreeMap<&str, &Resource>,
    classification: &Classification,
    ref_cat: RefCategory,
    attr_cat: AttrCategory,
) {
    let mut by_prefix: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
    for name in names {
        let (prefix, suffix) = split_name(name);
        by_prefix.entry(prefix).or_default().push((suffix, name.as_str()));
    }

    for entries in by_prefix.values_mut() {
        entries.sort_unstable();
        for (_, name) in entries.iter() {
            let Some(resource) = resources.get(name) else { continue };

            let mut hints: Vec<String> = Vec::new();
            if let Some(label) = ref_cat.label() {
                hints.push(label.to_string());
            }
            if let Some(label) = attr_cat.label() {
                hints.push(label.to_string());
            }
            if let Some(matched) = classification.matched_attrs.get(*name) {
                for attr in matched {
                    hints.push(format!("!GetAtt <Name>.{}", attr));
                }
            }

            if hints.is_empty() {
                out.push_str(&format!("* [`{}`]({})\n", name, resource.url));
            } else {
                let joined = hints
                    .iter()
                    .map(|h| format!("`{}`", h))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!("* [`{}`]({}) ({})\n", name, resource.url, joined));
            }
        }
    }
}

// ── Tests ──
