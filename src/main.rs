mod catalog;
mod classify;
mod fetch;
mod parser;
mod report;
mod scrape;

use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::catalog::Catalogue;
use crate::classify::{AttrCategory, RefCategory};

#[derive(Parser)]
#[command(
    name = "cfn_scraper",
    about = "CloudFormation docs scraper: Ref/GetAtt catalogue + ARN report"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the resource type reference into services.json
    Scrape,
    /// Classify services.json and render report.md
    Report,
    /// Scrape + report in one pipeline
    Run,
    /// Show catalogue statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scrape => {
            run_scrape().await?;
            Ok(())
        }
        Commands::Report => {
            let catalogue = catalog::load(catalog::CATALOGUE_PATH)?;
            run_report(&catalogue)
        }
        Commands::Run => {
            let catalogue = run_scrape().await?;
            run_report(&catalogue)
        }
        Commands::Stats => {
            let catalogue = catalog::load(catalog::CATALOGUE_PATH)?;
            run_stats(&catalogue)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_scrape() -> anyhow::Result<Catalogue> {
    let client = fetch::client()?;
    let catalogue = scrape::build_catalogue(&client, scrape::START_URL).await?;
    catalog::save(&catalogue, catalog::CATALOGUE_PATH)?;
    println!(
        "Saved {} services / {} resources to {}",
        catalogue.services.len(),
        catalogue.resource_count(),
        catalog::CATALOGUE_PATH
    );
    Ok(catalogue)
}

fn run_report(catalogue: &Catalogue) -> anyhow::Result<()> {
    let resources = catalogue.flatten();
    let classification = classify::classify(&resources);
    let markdown = report::render(&resources, &classification);
    std::fs::write(report::REPORT_PATH, markdown)?;
    println!(
        "Wrote {} ({} resources across {} cells)",
        report::REPORT_PATH,
        classification.total,
        classification.cells.len()
    );
    Ok(())
}

fn run_stats(catalogue: &Catalogue) -> anyhow::Result<()> {
    let resources = catalogue.flatten();
    let classification = classify::classify(&resources);

    let with_ref = resources
        .values()
        .filter(|r| r.details.ref_text.is_some())
        .count();
    let with_attrs = resources
        .values()
        .filter(|r| !r.details.attrs.is_empty())
        .count();
    let prefixes: std::collections::BTreeSet<&str> = resources
        .keys()
        .map(|name| catalog::split_name(name).0)
        .collect();

    println!("Services:   {}", catalogue.services.len());
    println!("Resources:  {}", classification.total);
    println!("With Ref:   {}", with_ref);
    println!("With attrs: {}", with_attrs);

    println!("\nAttribute categories:");
    for attr_cat in AttrCategory::ALL {
        println!("  {:<20} {}", attr_cat.key(), classification.attr_count(attr_cat));
    }

    println!("\nRef categories:");
    for ref_cat in RefCategory::ALL {
        println!("  {:<20} {}", ref_cat.key(), classification.ref_count(ref_cat));
    }

    println!(
        "\nSingle-cell prefixes: {} of {}",
        classification.unique_prefixes.len(),
        prefixes.len()
    );
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
