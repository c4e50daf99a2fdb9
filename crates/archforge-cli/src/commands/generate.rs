//! Implementation of the `archforge generate` command.
//!
//! Responsibility: merge CLI flags over the configured defaults, call the
//! generator facade, and write or print the result.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use archforge_adapters::{
    FixedClock, LocalFilesystem, ResourceRegistry, SystemClock, default_emitters,
    load_architecture,
};
use archforge_core::{
    application::{ExportService, GeneratorService, ports::Clock},
    domain::{
        Architecture, CloudProvider, Degradation, DomainError, Environment, GeneratorConfig,
        Generation, IacFormat,
    },
};

use crate::{
    cli::GenerateArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Machine-readable summary printed with `--output-format json`.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    architecture: &'a str,
    format: IacFormat,
    provider: CloudProvider,
    environment: Environment,
    written: bool,
    files: Vec<PathBuf>,
    degradations: &'a [Degradation],
}

/// Execute the `archforge generate` command.
#[instrument(skip_all, fields(file = %args.file.display()))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let architecture = load_architecture(&args.file)?;
    let generator_config = resolve_config(&args, &config, &architecture)?;
    let clock = resolve_clock(args.timestamp.as_deref())?;

    debug!(
        format = %generator_config.format(),
        provider = %generator_config.provider(),
        region = generator_config.region(),
        "Request resolved"
    );

    let registry = Arc::new(ResourceRegistry::builtin());
    let service = GeneratorService::new(default_emitters(registry), clock);
    let generation = service.generate_with_report(&architecture, &generator_config)?;

    if args.stdout {
        for file in &generation.outputs {
            output.raw(&format!("==> {} <==\n{}", file.filename(), file.content))?;
            if !file.content.ends_with('\n') {
                output.raw("\n")?;
            }
        }
        report_degradations(&generation, &output)?;
        return Ok(());
    }

    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| config.defaults.output_dir.clone());

    let files = if args.dry_run {
        generation
            .outputs
            .iter()
            .map(|o| out_dir.join(o.path.as_path()))
            .collect()
    } else {
        ExportService::new(Box::new(LocalFilesystem::new())).export(
            &generation.outputs,
            &out_dir,
            args.force,
        )?
    };
    info!(files = files.len(), dir = %out_dir.display(), dry_run = args.dry_run, "Export finished");

    if output.is_json() {
        output.json(&Summary {
            architecture: &architecture.name,
            format: generator_config.format(),
            provider: generator_config.provider(),
            environment: generator_config.environment(),
            written: !args.dry_run,
            files,
            degradations: &generation.degradations,
        })?;
        return Ok(());
    }

    report_degradations(&generation, &output)?;

    if args.dry_run {
        output.info(&format!(
            "Dry run: would write {} files to {}",
            files.len(),
            out_dir.display()
        ))?;
        for (path, file) in files.iter().zip(&generation.outputs) {
            output.print(&format!("  {} ({} bytes)", path.display(), file.size()))?;
        }
        return Ok(());
    }

    output.success(&format!(
        "Generated {} {} files for {} in {}",
        files.len(),
        generator_config.format(),
        generator_config.provider(),
        out_dir.display()
    ))?;
    for path in &files {
        output.print(&format!("  {}", path.display()))?;
    }

    Ok(())
}

/// CLI flags win over config defaults; the project name falls back to the
/// architecture name.
fn resolve_config(
    args: &GenerateArgs,
    config: &AppConfig,
    architecture: &Architecture,
) -> CliResult<GeneratorConfig> {
    let format = match args.format {
        Some(f) => f.into(),
        None => parse_default::<IacFormat>(&config.defaults.format)?,
    };
    let provider = match args.provider {
        Some(p) => p.into(),
        None => parse_default::<CloudProvider>(&config.defaults.provider)?,
    };
    let environment = match args.environment {
        Some(e) => e.into(),
        None => parse_default::<Environment>(&config.defaults.environment)?,
    };

    let mut builder = GeneratorConfig::builder()
        .format(format)
        .provider(provider)
        .environment(environment)
        .project_name(
            args.project
                .clone()
                .unwrap_or_else(|| architecture.name.clone()),
        );

    let region = args
        .region
        .clone()
        .filter(|r| !r.trim().is_empty())
        .or_else(|| Some(config.defaults.region.clone()).filter(|r| !r.trim().is_empty()));
    if let Some(region) = region {
        builder = builder.region(region);
    }

    Ok(builder.build()?)
}

fn parse_default<T>(raw: &str) -> CliResult<T>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(|e| CliError::ConfigError {
        message: format!("invalid default '{raw}'"),
        source: Some(Box::new(e)),
    })
}

fn resolve_clock(timestamp: Option<&str>) -> CliResult<Box<dyn Clock>> {
    match timestamp {
        Some(raw) => FixedClock::parse(raw)
            .map(|clock| Box::new(clock) as Box<dyn Clock>)
            .map_err(|e| CliError::InvalidTimestamp {
                value: raw.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(Box::new(SystemClock)),
    }
}

fn report_degradations(generation: &Generation, output: &OutputManager) -> CliResult<()> {
    for degradation in &generation.degradations {
        output.warning(&degradation.describe())?;
    }
    Ok(())
}
