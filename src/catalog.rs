use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CATALOGUE_PATH: &str = "services.json";

/// Whole-scrape snapshot: service display name → service entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue {
    pub services: BTreeMap<String, Service>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub details: ServiceDetails,
    pub resources: BTreeMap<String, Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDetails {
    /// Raw href as found on the index page (not absolutized).
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Absolute detail-page URL.
    pub url: String,
    pub details: ResourceDetails,
}

/// What the detail page documents. Field names match the snapshot format:
/// `Ref`/`Ref_orig` are omitted when the section is missing, unsupported,
/// or block-listed; `attrs` is omitted when no attribute names were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDetails {
    #[serde(rename = "Ref", skip_serializing_if = "Option::is_none")]
    pub ref_text: Option<String>,
    #[serde(rename = "Ref_orig", skip_serializing_if = "Option::is_none")]
    pub ref_orig: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<String>,
}

impl Catalogue {
    /// Flatten all services into one name → resource map. Resource names are
    /// unique across services in practice; a collision lets the later
    /// service win.
    pub fn flatten(&self) -> BTreeMap<&str, &Resource> {
        let mut out = BTreeMap::new();
        for service in self.services.values() {
            for (name, resource) in &service.resources {
                out.insert(name.as_str(), resource);
            }
        }
        out
    }

    pub fn resource_count(&self) -> usize {
        self.services.values().map(|s| s.resources.len()).sum()
    }
}

/// `Namespace::Service` prefix and `Type` suffix of a fully qualified name.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rsplit_once("::") {
        Some((prefix, suffix)) => (prefix, suffix),
        None => (name, ""),
    }
}

pub fn load(path: impl AsRef<Path>) -> Result<Catalogue> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn save(catalogue: &Catalogue, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let raw = serde_json::to_string(catalogue)?;
    std::fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalogue() -> Catalogue {
        let mut resources = BTreeMap::new();
        resources.insert(
            "AWS::S3::Bucket".to_string(),
            Resource {
                url: "https://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-properties-s3-bucket.html".to_string(),
                details: ResourceDetails {
                    ref_text: Some("Name of the bucket".to_string()),
                    ref_orig: Some("Ref returns the name of the bucket.".to_string()),
                    attrs: vec!["Arn".to_string(), "DomainName".to_string()],
                },
            },
        );
        resources.insert(
            "AWS::S3::AccessPoint".to_string(),
            Resource {
                url: "https://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-resource-s3-accesspoint.html".to_string(),
                details: ResourceDetails::default(),
            },
        );

        let mut services = BTreeMap::new();
        services.insert(
            "Amazon S3".to_string(),
            Service {
                details: ServiceDetails { url: "./AWS_S3.html".to_string() },
                resources,
            },
        );
        Catalogue { services }
    }

    #[test]
    fn json_round_trip_is_identity() {
        let catalogue = sample_catalogue();
        let raw = serde_json::to_string(&catalogue).unwrap();
        let reloaded: Catalogue = serde_json::from_str(&raw).unwrap();
        assert_eq!(catalogue, reloaded);
    }

    #[test]
    fn snapshot_field_names_match_format() {
        let raw = serde_json::to_string(&sample_catalogue()).unwrap();
        assert!(raw.contains("\"Ref\":\"Name of the bucket\""));
        assert!(raw.contains("\"Ref_orig\""));
        assert!(raw.contains("\"attrs\":[\"Arn\",\"DomainName\"]"));
        // Empty details serialize as an empty object, no null keys
        assert!(raw.contains("\"details\":{}"));
    }

    #[test]
    fn missing_attrs_key_loads_as_empty() {
        let raw = r#"{"Amazon S3":{"details":{"url":"x"},"resources":{"AWS::S3::Bucket":{"url":"y","details":{"Ref":"the bucket name"}}}}}"#;
        let catalogue: Catalogue = serde_json::from_str(raw).unwrap();
        let flat = catalogue.flatten();
        let bucket = flat["AWS::S3::Bucket"];
        assert!(bucket.details.attrs.is_empty());
        assert_eq!(bucket.details.ref_text.as_deref(), Some("the bucket name"));
        assert!(bucket.details.ref_orig.is_none());
    }

    #[test]
    fn flatten_lets_later_service_overwrite() {
        let mut catalogue = sample_catalogue();
        let mut resources = BTreeMap::new();
        resources.insert(
            "AWS::S3::Bucket".to_string(),
            Resource { url: "https://example.com/dup".to_string(), details: ResourceDetails::default() },
        );
        catalogue.services.insert(
            "Amazon S3 Duplicate".to_string(),
            Service { details: ServiceDetails { url: "./dup.html".to_string() }, resources },
        );

        let flat = catalogue.flatten();
        assert_eq!(flat["AWS::S3::Bucket"].url, "https://example.com/dup");
        assert_eq!(catalogue.resource_count(), 3);
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn split_name_prefix_suffix() {
        assert_eq!(split_name("AWS::S3::Bucket"), ("AWS::S3", "Bucket"));
        assert_eq!(split_name("Alexa::ASK::Skill"), ("Alexa::ASK", "Skill"));
        assert_eq!(split_name("NoSeparator"), ("NoSeparator", ""));
    }
}
