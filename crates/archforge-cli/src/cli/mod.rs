//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use archforge_core::domain::{CloudProvider, Environment, IacFormat};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "archforge",
    bin_name = "archforge",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Compile cloud architectures into infrastructure-as-code",
    long_about = "Archforge turns a provider-agnostic architecture description \
                  into Terraform, CloudFormation, ARM, Kubernetes or Docker \
                  Compose files.",
    after_help = "EXAMPLES:\n\
        \x20 archforge generate shop.yaml --format terraform --provider aws\n\
        \x20 archforge generate shop.yaml --format k8s --out deploy/ --force\n\
        \x20 archforge formats --provider azure\n\
        \x20 archforge completions bash > /usr/share/bash-completion/completions/archforge",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate infrastructure-as-code from an architecture file.
    #[command(
        visible_alias = "gen",
        about = "Generate IaC files from an architecture",
        after_help = "EXAMPLES:\n\
            \x20 archforge generate shop.yaml --format terraform --provider gcp --region europe-west1\n\
            \x20 archforge generate shop.json --format arm --provider azure --env prod\n\
            \x20 archforge generate shop.toml --format compose --stdout"
    )]
    Generate(GenerateArgs),

    /// List output formats and the providers they support.
    #[command(
        visible_alias = "ls",
        about = "List supported output formats",
        after_help = "EXAMPLES:\n\
            \x20 archforge formats\n\
            \x20 archforge formats --provider aws\n\
            \x20 archforge formats --format json"
    )]
    Formats(FormatsArgs),

    /// Initialise an Archforge configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 archforge init           # user config directory\n\
            \x20 archforge init --local   # .archforge.toml in the current directory"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 archforge completions bash > ~/.local/share/bash-completion/completions/archforge\n\
            \x20 archforge completions zsh  > ~/.zfunc/_archforge\n\
            \x20 archforge completions fish > ~/.config/fish/completions/archforge.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Archforge configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 archforge config get defaults.provider\n\
            \x20 archforge config list\n\
            \x20 archforge config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `archforge generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Architecture file (`.json`, `.yaml`, `.yml` or `.toml`).
    #[arg(value_name = "ARCH_FILE", help = "Architecture description file")]
    pub file: PathBuf,

    /// Output format.  Falls back to `defaults.format` from the config.
    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        value_enum,
        help = "Output format"
    )]
    pub format: Option<FormatArg>,

    /// Target cloud provider.  Falls back to `defaults.provider`.
    #[arg(
        short = 'p',
        long = "provider",
        value_name = "PROVIDER",
        value_enum,
        help = "Target cloud provider"
    )]
    pub provider: Option<ProviderArg>,

    /// Region; defaults to the provider's home region.
    #[arg(short = 'r', long = "region", value_name = "REGION", help = "Target region")]
    pub region: Option<String>,

    /// Project name used in resource names and tags.
    #[arg(
        long = "project",
        value_name = "NAME",
        help = "Project name (default: the architecture name)"
    )]
    pub project: Option<String>,

    /// Deployment environment.
    #[arg(
        short = 'e',
        long = "env",
        value_name = "ENV",
        value_enum,
        help = "Deployment environment"
    )]
    pub environment: Option<EnvironmentArg>,

    /// Directory the files are written under.
    #[arg(
        short = 'o',
        long = "out",
        value_name = "DIR",
        help = "Output directory (default: defaults.output_dir)"
    )]
    pub out: Option<PathBuf>,

    /// Overwrite files that already exist.
    #[arg(long = "force", help = "Overwrite existing files")]
    pub force: bool,

    /// Show what would be written without touching the disk.
    #[arg(
        long = "dry-run",
        conflicts_with = "stdout",
        help = "List files without writing them"
    )]
    pub dry_run: bool,

    /// Print every file to stdout instead of writing it.
    #[arg(long = "stdout", help = "Print generated files to stdout")]
    pub stdout: bool,

    /// Freeze the generation timestamp for reproducible output.
    #[arg(
        long = "timestamp",
        value_name = "RFC3339",
        env = "ARCHFORGE_TIMESTAMP",
        help = "Generation timestamp, e.g. 2024-01-01T00:00:00Z"
    )]
    pub timestamp: Option<String>,
}

// ── formats ───────────────────────────────────────────────────────────────────

/// Arguments for `archforge formats`.
#[derive(Debug, Args)]
pub struct FormatsArgs {
    /// Only show formats that support this provider.
    #[arg(short = 'p', long = "provider", value_enum, help = "Filter by provider")]
    pub provider: Option<ProviderArg>,

    /// Listing style.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Listing style"
    )]
    pub format: ListFormat,
}

/// Output format for the `formats` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One id per line.
    List,
    /// JSON array.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `archforge init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write `.archforge.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `archforge completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `archforge config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.provider`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the user configuration file.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Output formats accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    #[value(alias = "tf")]
    Terraform,
    #[value(name = "cloudformation", alias = "cfn")]
    CloudFormation,
    Arm,
    #[value(alias = "k8s")]
    Kubernetes,
    #[value(name = "docker-compose", alias = "compose")]
    DockerCompose,
}

impl From<FormatArg> for IacFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Terraform => Self::Terraform,
            FormatArg::CloudFormation => Self::CloudFormation,
            FormatArg::Arm => Self::Arm,
            FormatArg::Kubernetes => Self::Kubernetes,
            FormatArg::DockerCompose => Self::DockerCompose,
        }
    }
}

/// Cloud providers accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ProviderArg {
    Aws,
    Azure,
    Gcp,
}

impl From<ProviderArg> for CloudProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Aws => Self::Aws,
            ProviderArg::Azure => Self::Azure,
            ProviderArg::Gcp => Self::Gcp,
        }
    }
}

/// Deployment environments accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum EnvironmentArg {
    Dev,
    Staging,
    Prod,
}

impl From<EnvironmentArg> for Environment {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Dev => Self::Dev,
            EnvironmentArg::Staging => Self::Staging,
            EnvironmentArg::Prod => Self::Prod,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn format_args_map_onto_core_formats() {
        assert_eq!(IacFormat::from(FormatArg::Terraform), IacFormat::Terraform);
        assert_eq!(IacFormat::from(FormatArg::DockerCompose), IacFormat::DockerCompose);
        for format in FormatArg::value_variants() {
            let name = format.to_possible_value().unwrap();
            assert_eq!(name.get_name(), IacFormat::from(*format).as_str());
        }
    }

    #[test]
    fn provider_args_map_onto_core_providers() {
        for provider in ProviderArg::value_variants() {
            let name = provider.to_possible_value().unwrap();
            assert_eq!(name.get_name(), CloudProvider::from(*provider).as_str());
        }
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from([
            "archforge",
            "generate",
            "shop.yaml",
            "--format",
            "terraform",
            "--provider",
            "aws",
            "--env",
            "prod",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert_eq!(args.file, PathBuf::from("shop.yaml"));
        assert_eq!(args.format, Some(FormatArg::Terraform));
        assert_eq!(args.environment, Some(EnvironmentArg::Prod));
        assert!(args.out.is_none());
    }

    #[test]
    fn format_aliases() {
        let cli = Cli::parse_from(["archforge", "gen", "a.json", "-f", "k8s", "-p", "gcp"]);
        if let Commands::Generate(args) = cli.command {
            assert_eq!(args.format, Some(FormatArg::Kubernetes));
        } else {
            panic!("expected Generate command");
        }
    }

    #[test]
    fn dry_run_and_stdout_conflict() {
        let result = Cli::try_parse_from(["archforge", "generate", "a.json", "--dry-run", "--stdout"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        // clap should reject --quiet --verbose together
        let result = Cli::try_parse_from(["archforge", "--quiet", "--verbose", "formats"]);
        assert!(result.is_err());
    }
}
