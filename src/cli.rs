//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`.
//! It supports three commands: running a probe round and ranking the
//! results, listing the endpoint registry, and exporting it.

use crate::config::RunConfig;
use crate::probe::ProbeKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// match cli.command {
///     Some(Commands::Run(args)) => { /* ... */ }
///     Some(Commands::List { .. }) => { /* ... */ }
///     None => { /* run with defaults */ }
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "dnsrank",
    version,
    about = "Probe DNS resolvers concurrently and rank them by latency",
    infer_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format (default, human-readable)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// TSV format (tab-separated)
    Tsv,
}

impl OutputFormat {
    /// Get all available output format names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["table", "json", "csv", "tsv"]
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            _ => Err(format!(
                "Unknown format: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
        }
    }
}

/// Where the endpoints come from.
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// Endpoint list file (JSON format)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Custom endpoints (format: IP#Name#Region, name and region optional)
    #[arg(long = "dns")]
    pub dns: Vec<String>,

    /// Only use endpoints tagged with this region
    #[arg(long)]
    pub region: Option<String>,
}

/// Options of the `run` command.
///
/// Unset options fall back to the settings file, then to built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub endpoints: EndpointArgs,

    /// Settings file (JSON format)
    #[arg(long, env = "DNSRANK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Probe to use (dns, icmp)
    #[arg(long, env = "DNSRANK_PROBE")]
    pub probe: Option<ProbeKind>,

    /// Attempts per endpoint
    #[arg(short, long, env = "DNSRANK_ATTEMPTS")]
    pub attempts: Option<usize>,

    /// Maximum endpoints probed at once
    #[arg(short, long, env = "DNSRANK_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Number of endpoints to recommend
    #[arg(short, long, env = "DNSRANK_TOP")]
    pub top: Option<usize>,

    /// Per-attempt timeout in milliseconds (0 disables it)
    #[arg(long = "timeout-ms", env = "DNSRANK_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Domain resolved by the DNS probe
    #[arg(short, long, env = "DNSRANK_DOMAIN")]
    pub domain: Option<String>,
}

impl RunArgs {
    /// Overlay the options that were given on top of `base`.
    #[must_use]
    pub fn apply(&self, mut base: RunConfig) -> RunConfig {
        if let Some(probe) = self.probe {
            base.probe = probe;
        }
        if let Some(attempts) = self.attempts {
            base.attempts = attempts;
        }
        if let Some(concurrency) = self.concurrency {
            base.concurrency = concurrency;
        }
        if let Some(top) = self.top {
            base.top_k = top;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            base.timeout_ms = timeout_ms;
        }
        if let Some(domain) = &self.domain {
            base.domain.clone_from(domain);
        }
        base
    }
}

/// Available commands for the dnsrank CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Probe every endpoint and rank them
    ///
    /// Runs the configured probe against each endpoint with bounded
    /// concurrency, then prints the full ranking and the recommended subset.
    #[command(alias = "r")]
    Run(RunArgs),

    /// List the endpoint registry
    #[command(alias = "l")]
    List {
        #[command(flatten)]
        endpoints: EndpointArgs,

        /// Show only IPv4 endpoints
        #[arg(long = "ipv4", conflicts_with = "ipv6_only")]
        ipv4_only: bool,

        /// Show only IPv6 endpoints
        #[arg(long = "ipv6")]
        ipv6_only: bool,
    },

    /// Export the endpoint registry
    ///
    /// Writes the resolved endpoint list to a JSON file that can be passed
    /// back with `--file` or placed in the config directory.
    #[command(alias = "e")]
    Export {
        #[command(flatten)]
        endpoints: EndpointArgs,

        /// Output file path
        #[arg(short, long, default_value = "endpoints.json")]
        output: PathBuf,
    },
}

/// Parse CLI arguments and return verbose flag.
///
/// # Returns
///
/// Returns a tuple of `(Cli, verbose)` where `verbose` indicates
/// whether verbose logging was enabled.
#[must_use]
pub fn parse_verbose() -> (Cli, bool) {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    (cli, verbose)
}
