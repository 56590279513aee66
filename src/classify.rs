use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{split_name, Resource};

/// How the ARN attribute is exposed through `Fn::GetAtt`, if at all.
/// Variant order is the summary table's column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttrCategory {
    TitleCaseArn,
    UpperCaseArn,
    TitleCaseArnEnd,
    UpperCaseArnEnd,
    OtherAttrs,
    NoAttrs,
}

impl AttrCategory {
    pub const ALL: [AttrCategory; 6] = [
        AttrCategory::TitleCaseArn,
        AttrCategory::UpperCaseArn,
        AttrCategory::TitleCaseArnEnd,
        AttrCategory::UpperCaseArnEnd,
        AttrCategory::OtherAttrs,
        AttrCategory::NoAttrs,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AttrCategory::TitleCaseArn => "title_case_arn",
            AttrCategory::UpperCaseArn => "upper_case_arn",
            AttrCategory::TitleCaseArnEnd => "title_case_arn_end",
            AttrCategory::UpperCaseArnEnd => "upper_case_arn_end",
            AttrCategory::OtherAttrs => "other_attrs",
            AttrCategory::NoAttrs => "no_attrs",
        }
    }

    /// Column and section heading text.
    pub fn name(self) -> &'static str {
        match self {
            AttrCategory::TitleCaseArn => "`!GetAtt <Name>.Arn` exists",
            AttrCategory::UpperCaseArn => "`!GetAtt <Name>.ARN` exists",
            AttrCategory::TitleCaseArnEnd => "`!GetAtt <Name>.<Thing>Arn` exists",
            AttrCategory::UpperCaseArnEnd => "`!GetAtt <Name>.<Thing>ARN` exists",
            AttrCategory::OtherAttrs => "`!GetAtt` has no ARN attribute",
            AttrCategory::NoAttrs => "`!GetAtt` is unsupported",
        }
    }

    /// Fixed access hint for every resource in the category. The `*_end`
    /// categories hint per matched attribute name instead.
    pub fn label(self) -> Option<&'static str> {
        match self {
            AttrCategory::TitleCaseArn => Some("!GetAtt <Name>.Arn"),
            AttrCategory::UpperCaseArn => Some("!GetAtt <Name>.ARN"),
            _ => None,
        }
    }
}

/// What the documented `Ref` return value is.
/// Variant order is the summary table's row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RefCategory {
    RefIsArn,
    RefIsName,
    RefIsId,
    RefIsOther,
    NoRef,
}

impl RefCategory {
    pub const ALL: [RefCategory; 5] = [
        RefCategory::RefIsArn,
        RefCategory::RefIsName,
        RefCategory::RefIsId,
        RefCategory::RefIsOther,
        RefCategory::NoRef,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RefCategory::RefIsArn => "ref_is_arn",
            RefCategory::RefIsName => "ref_is_name",
            RefCategory::RefIsId => "ref_is_id",
            RefCategory::RefIsOther => "ref_is_other",
            RefCategory::NoRef => "no_ref",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RefCategory::RefIsArn => "`!Ref` is ARN",
            RefCategory::RefIsName => "`!Ref` is Name",
            RefCategory::RefIsId => "`!Ref` is ID",
            RefCategory::RefIsOther => "`!Ref` is something else",
            RefCategory::NoRef => "`!Ref` is unsupported",
        }
    }

    /// The `!Ref` hint applies where the documented return value is a
    /// concrete usable identifier.
    pub fn label(self) -> Option<&'static str> {
        match self {
            RefCategory::RefIsArn | RefCategory::RefIsName | RefCategory::RefIsId => Some("!Ref"),
            RefCategory::RefIsOther | RefCategory::NoRef => None,
        }
    }
}

pub type Cell = (RefCategory, AttrCategory);

pub struct AttrRule {
    pub category: AttrCategory,
    /// On match, the attribute names backing it; empty for categories that
    /// carry no per-attribute hints.
    pub test: fn(&[String]) -> Option<Vec<String>>,
}

/// Priority order, first match wins. Differs from column order: exact names
/// beat suffix matches, and the empty set is decided before the catch-all.
pub const ATTR_RULES: &[AttrRule] = &[
    AttrRule {
        category: AttrCategory::TitleCaseArn,
        test: |attrs| attrs.iter().any(|a| a == "Arn").then(Vec::new),
    },
    AttrRule {
        category: AttrCategory::UpperCaseArn,
        test: |attrs| attrs.iter().any(|a| a == "ARN").then(Vec::new),
    },
    AttrRule {
        category: AttrCategory::TitleCaseArnEnd,
        test: |attrs| ending_with(attrs, "Arn"),
    },
    AttrRule {
        category: AttrCategory::UpperCaseArnEnd,
        test: |attrs| ending_with(attrs, "ARN"),
    },
    AttrRule {
        category: AttrCategory::NoAttrs,
        test: |attrs| attrs.is_empty().then(Vec::new),
    },
    AttrRule {
        category: AttrCategory::OtherAttrs,
        test: |_| Some(Vec::new()),
    },
];

fn ending_with(attrs: &[String], suffix: &str) -> Option<Vec<String>> {
    let matched: Vec<String> = attrs
        .iter()
        .filter(|a| a.ends_with(suffix))
        .cloned()
        .collect();
    (!matched.is_empty()).then_some(matched)
}

pub struct RefRule {
    pub category: RefCategory,
    pub test: fn(&str) -> bool,
}

/// Priority order, first match wins; the no-text case short-circuits to
/// `NoRef` before these run.
pub const REF_RULES: &[RefRule] = &[
    RefRule {
        category: RefCategory::RefIsArn,
        test: |t| t.contains("Arn") || t.contains("ARN") || t.contains("Amazon Resource Name"),
    },
    RefRule {
        category: RefCategory::RefIsName,
        test: |t| t.to_lowercase().contains("name"),
    },
    RefRule {
        category: RefCategory::RefIsId,
        test: |t| t.to_lowercase().contains(" id "),
    },
    RefRule {
        category: RefCategory::RefIsOther,
        test: |_| true,
    },
];

pub fn classify_attrs(attrs: &[String]) -> (AttrCategory, Vec<String>) {
    for rule in ATTR_RULES {
        if let Some(matched) = (rule.test)(attrs) {
            return (rule.category, matched);
        }
    }
    unreachable!("catch-all attribute rule always matches")
}

pub fn classify_ref(ref_text: Option<&str>) -> RefCategory {
    let Some(text) = ref_text else {
        return RefCategory::NoRef;
    };
    for rule in REF_RULES {
        if (rule.test)(text) {
            return rule.category;
        }
    }
    unreachable!("catch-all ref rule always matches")
}

/// The derived matrix: every resource name in exactly one of the 30 cells.
pub struct Classification {
    /// All 30 cells are present, possibly empty.
    pub cells: BTreeMap<Cell, Vec<String>>,
    /// For `*_end` resources, the attribute names that carried the suffix.
    pub matched_attrs: BTreeMap<String, Vec<String>>,
    /// Prefixes whose resources all land in a single cell. Available as a
    /// derived fact (shown by `stats`); the report does not collapse on it.
    pub unique_prefixes: BTreeSet<String>,
    pub total: usize,
}

impl Classification {
    pub fn cell(&self, cell: Cell) -> &[String] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn attr_count(&self, attr_cat: AttrCategory) -> usize {
        RefCategory::ALL
            .iter()
            .map(|r| self.cell((*r, attr_cat)).len())
            .sum()
    }

    pub fn ref_count(&self, ref_cat: RefCategory) -> usize {
        AttrCategory::ALL
            .iter()
            .map(|a| self.cell((ref_cat, *a)).len())
            .sum()
    }
}

pub fn classify(resources: &BTreeMap<&str, &Resource>) -> Classification {
    let mut cells: BTreeMap<Cell, Vec<String>> = BTreeMap::new();
    for ref_cat in RefCategory::ALL {
        for attr_cat in AttrCategory::ALL {
            cells.insert((ref_cat, attr_cat), Vec::new());
        }
    }

    let mut matched_attrs = BTreeMap::new();
    for (name, resource) in resources {
        let (attr_cat, matched) = classify_attrs(&resource.details.attrs);
        let ref_cat = classify_ref(resource.details.ref_text.as_deref());
        cells.entry((ref_cat, attr_cat)).or_default().push(name.to_string());
        if !matched.is_empty() {
            matched_attrs.insert(name.to_string(), matched);
        }
    }

    let unique_prefixes = single_cell_prefixes(&cells);
    Classification {
        total: resources.len(),
        cells,
        matched_attrs,
        unique_prefixes,
    }
}

fn single_cell_prefixes(cells: &BTreeMap<Cell, Vec<String>>) -> BTreeSet<String> {
    let mut cells_by_prefix: BTreeMap<&str, BTreeSet<Cell>> = BTreeMap::new();
    for (cell, names) in cells {
        for name in names {
            cells_by_prefix
                .entry(split_name(name).0)
                .or_default()
                .insert(*cell);
        }
    }
    cells_by_prefix
        .into_iter()
        .filter(|(_, seen)| seen.len() == 1)
        .map(|(prefix, _)| prefix.to_string())
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceDetails;

    fn attrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_beats_suffix_match() {
        let (cat, matched) = classify_attrs(&attrs(&["Arn", "FooArn"]));
        assert_eq!(cat, AttrCategory::TitleCaseArn);
        assert!(matched.is_empty());
    }

    #[test]
    fn attr_priority_order() {
        assert_eq!(classify_attrs(&attrs(&["Arn"])).0, AttrCategory::TitleCaseArn);
        assert_eq!(classify_attrs(&attrs(&["ARN"])).0, AttrCategory::UpperCaseArn);
        assert_eq!(
            classify_attrs(&attrs(&["ARN", "Arn"])).0,
            AttrCategory::TitleCaseArn
        );
        assert_eq!(
            classify_attrs(&attrs(&["QueueArn"])).0,
            AttrCategory::TitleCaseArnEnd
        );
        assert_eq!(
            classify_attrs(&attrs(&["TopicARN"])).0,
            AttrCategory::UpperCaseArnEnd
        );
        assert_eq!(classify_attrs(&[]).0, AttrCategory::NoAttrs);
        assert_eq!(
            classify_attrs(&attrs(&["DomainName"])).0,
            AttrCategory::OtherAttrs
        );
    }

    #[test]
    fn suffix_matches_record_attr_names() {
        let (cat, matched) = classify_attrs(&attrs(&["QueueArn", "QueueName", "DeadLetterArn"]));
        assert_eq!(cat, AttrCategory::TitleCaseArnEnd);
        assert_eq!(matched, attrs(&["QueueArn", "DeadLetterArn"]));
    }

    #[test]
    fn ref_priority_order() {
        assert_eq!(classify_ref(None), RefCategory::NoRef);
        assert_eq!(
            classify_ref(Some("Amazon Resource Name (ARN) of the bucket")),
            RefCategory::RefIsArn
        );
        // Arn beats name even though "Name" is present
        assert_eq!(
            classify_ref(Some("Amazon Resource Name of the thing")),
            RefCategory::RefIsArn
        );
        assert_eq!(classify_ref(Some("name of the bucket")), RefCategory::RefIsName);
        assert_eq!(
            classify_ref(Some("the physical ID of the instance, such as i-0123")),
            RefCategory::RefIsId
        );
        assert_eq!(classify_ref(Some("the queue URL")), RefCategory::RefIsOther);
    }

    #[test]
    fn every_input_gets_exactly_one_category() {
        let attr_cases: Vec<Vec<String>> = vec![
            vec![],
            attrs(&["Arn"]),
            attrs(&["ARN"]),
            attrs(&["FooArn"]),
            attrs(&["FooARN"]),
            attrs(&["Name", "Endpoint"]),
        ];
        for case in &attr_cases {
            let hits = ATTR_RULES.iter().filter(|r| (r.test)(case).is_some()).count();
            assert!(hits >= 1, "unclassified attrs: {case:?}");
        }
        let ref_cases = ["arn:aws:...", "the name", "the ID", " id ", "something"];
        for case in ref_cases {
            let hits = REF_RULES.iter().filter(|r| (r.test)(case)).count();
            assert!(hits >= 1, "unclassified ref: {case:?}");
        }
    }

    fn resource(ref_text: Option<&str>, attr_names: &[&str]) -> Resource {
        Resource {
            url: "https://example.com".to_string(),
            details: ResourceDetails {
                ref_text: ref_text.map(|s| s.to_string()),
                ref_orig: None,
                attrs: attrs(attr_names),
            },
        }
    }

    #[test]
    fn classification_covers_every_resource_once() {
        let a = resource(Some("Name of the bucket"), &["Arn"]);
        let b = resource(None, &[]);
        let c = resource(Some("the queue URL"), &["QueueArn"]);
        let mut resources: BTreeMap<&str, &Resource> = BTreeMap::new();
        resources.insert("AWS::S3::Bucket", &a);
        resources.insert("AWS::X::Y", &b);
        resources.insert("AWS::SQS::Queue", &c);

        let classification = classify(&resources);
        assert_eq!(classification.cells.len(), 30);
        let placed: usize = classification.cells.values().map(Vec::len).sum();
        assert_eq!(placed, classification.total);
        assert_eq!(placed, 3);

        assert_eq!(
            classification.cell((RefCategory::RefIsName, AttrCategory::TitleCaseArn)),
            ["AWS::S3::Bucket"]
        );
        assert_eq!(
            classification.cell((RefCategory::NoRef, AttrCategory::NoAttrs)),
            ["AWS::X::Y"]
        );
        assert_eq!(
            classification.matched_attrs.get("AWS::SQS::Queue").unwrap(),
            &attrs(&["QueueArn"])
        );
    }

    #[test]
    fn single_cell_prefixes_computed() {
        let a = resource(Some("Name of the bucket"), &["Arn"]);
        let b = resource(Some("Name of the policy"), &["Arn"]);
        let c = resource(None, &[]);
        let d = resource(Some("the topic ARN"), &["TopicArn"]);
        let mut resources: BTreeMap<&str, &Resource> = BTreeMap::new();
        // Both S3 resources land in the same cell; SNS spreads over two.
        resources.insert("AWS::S3::Bucket", &a);
        resources.insert("AWS::S3::BucketPolicy", &b);
        resources.insert("AWS::SNS::Subscription", &c);
        resources.insert("AWS::SNS::Topic", &d);

        let classification = classify(&resources);
        assert!(classification.unique_prefixes.contains("AWS::S3"));
        assert!(!classification.unique_prefixes.contains("AWS::SNS"));
    }
}
