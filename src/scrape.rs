use std::collections::BTreeMap;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::catalog::{Catalogue, Resource, Service, ServiceDetails};
use crate::fetch;
use crate::parser::{detail, index};

pub const START_URL: &str =
    "https://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-template-resource-type-ref.html";

// Listed alongside the services on the index page, but holds property types
// rather than resource types.
const EXCLUDED_SERVICES: &[&str] = &["Shared property types"];

/// Walk the whole reference: index page → per-service resource lists →
/// per-resource detail pages, one request at a time.
pub async fn build_catalogue(client: &Client, start_url: &str) -> Result<Catalogue> {
    let base = Url::parse(start_url).context("invalid start URL")?;
    let index_html = fetch::fetch_text(client, start_url).await?;
    let services: Vec<index::Link> = index::service_links(&index_html)
        .context("service index")?
        .into_iter()
        .filter(|link| !EXCLUDED_SERVICES.contains(&link.name.as_str()))
        .collect();
    info!("{} services listed", services.len());

    let pb = ProgressBar::new(services.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut catalogue = Catalogue::default();
    for link in services {
        let service_url = base
            .join(&link.href)
            .with_context(|| format!("bad service href {:?}", link.href))?;
        info!("- {}", link.name);

        let service_html = fetch::fetch_text(client, service_url.as_str()).await?;
        let resources = index::resource_links(&service_html)
            .with_context(|| format!("resource list for {}", link.name))?;

        let mut service = Service {
            details: ServiceDetails { url: link.href },
            resources: BTreeMap::new(),
        };
        for entry in resources {
            let resource_url = service_url
                .join(&entry.href)
                .with_context(|| format!("bad resource href {:?}", entry.href))?;
            let page = fetch::fetch_text(client, resource_url.as_str()).await?;
            let details = detail::resource_details(&page);
            debug!(
                resource = %entry.name,
                ref_text = details.ref_text.as_deref().unwrap_or("-"),
                attrs = ?details.attrs,
                "parsed"
            );
            service.resources.insert(
                entry.name,
                Resource { url: resource_url.to_string(), details },
            );
        }

        catalogue.services.insert(link.name, service);
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
        "catalogue complete: {} services, {} resources",
        catalogue.services.len(),
        catalogue.resource_count()
    );
    Ok(catalogue)
}
