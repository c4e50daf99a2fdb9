//! Implementation of the `archforge formats` command.

use archforge_adapters::ResourceRegistry;
use archforge_core::{
    application::{CatalogService, FormatInfo},
    domain::{CloudProvider, IacFormat},
};
use serde::Serialize;

use crate::{
    cli::{FormatsArgs, ListFormat},
    error::CliResult,
    output::OutputManager,
};

/// One row of the listing.  `coverage` is only filled when a provider was
/// given.
#[derive(Debug, Serialize)]
struct FormatRow {
    #[serde(flatten)]
    info: FormatInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    coverage: Option<Vec<String>>,
}

pub fn execute(args: FormatsArgs, output: OutputManager) -> CliResult<()> {
    let provider = args.provider.map(CloudProvider::from);
    let rows = rows(provider);

    if output.is_json() {
        output.json(&rows)?;
        return Ok(());
    }

    match args.format {
        ListFormat::Table => {
            match provider {
                Some(p) => output.header(&format!("Formats for {}:", p.display_name()))?,
                None => output.header("Available Formats:")?,
            }
            for row in &rows {
                let providers: Vec<_> = row.info.providers.iter().map(|p| p.to_string()).collect();
                output.raw(&format!(
                    "  {:<16} {:<24} .{:<5} {}\n",
                    row.info.id,
                    row.info.name,
                    row.info.extension,
                    providers.join(", ")
                ))?;
                if let Some(coverage) = &row.coverage {
                    output.raw(&format!("  {:<16} maps: {}\n", "", coverage.join(", ")))?;
                }
            }
        }

        ListFormat::Json => output.json(&rows)?,

        ListFormat::List => {
            for row in &rows {
                output.raw(&format!("{}\n", row.info.id))?;
            }
        }
    }

    Ok(())
}

fn rows(provider: Option<CloudProvider>) -> Vec<FormatRow> {
    let catalog = CatalogService::new();
    let Some(provider) = provider else {
        return catalog
            .list_formats()
            .into_iter()
            .map(|info| FormatRow { info, coverage: None })
            .collect();
    };

    let registry = ResourceRegistry::builtin();
    catalog
        .formats_for_provider(provider)
        .into_iter()
        .map(|info| {
            let coverage = info
                .id
                .parse::<IacFormat>()
                .map(|format| {
                    registry
                        .coverage(format, provider)
                        .into_iter()
                        .map(|t| t.to_string())
                        .collect()
                })
                .ok();
            FormatRow { info, coverage }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_listing_has_every_format() {
        let rows = rows(None);
        assert_eq!(rows.len(), IacFormat::ALL.len());
        assert!(rows.iter().all(|r| r.coverage.is_none()));
    }

    #[test]
    fn aws_listing_excludes_arm_and_reports_coverage() {
        let rows = rows(Some(CloudProvider::Aws));
        assert!(rows.iter().all(|r| r.info.id != "arm"));
        let terraform = rows.iter().find(|r| r.info.id == "terraform").unwrap();
        let coverage = terraform.coverage.as_ref().unwrap();
        assert!(coverage.iter().any(|t| t == "compute"));
    }
}
