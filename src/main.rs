//! dnsrank - DNS resolver ranking tool
//!
//! Binary entry point for the dnsrank CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use dnsrank::cli::{Commands, EndpointArgs, OutputFormat, RunArgs};
use dnsrank::config::settings::DEFAULT_TIMEOUT_MS;
use dnsrank::config::{ConfigLoader, RunConfig};
use dnsrank::engine::{best, rank, top_k, Prober, Registry};
use dnsrank::error::Result;
use dnsrank::probe::{DnsQueryProbe, IcmpProbe, Probe, ProbeKind};
use dnsrank::report::{self, Report};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up logging based on verbosity level.
///
/// Logs go to stderr so stdout stays clean for JSON/CSV output.
fn setup_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

/// Resolve the endpoint registry, then apply the region filter.
///
/// A list file and `--dns` endpoints are merged, file first. With neither,
/// the default list (or the built-in one) is used.
fn load_registry(args: &EndpointArgs) -> Result<Registry> {
    let mut lists = Vec::new();
    if let Some(path) = &args.file {
        lists.push(ConfigLoader::load_from_file(path)?);
    }
    if !args.dns.is_empty() {
        lists.push(ConfigLoader::from_args(args.dns.clone())?);
    }

    let registry = if lists.is_empty() {
        ConfigLoader::load_or_builtin()?
    } else {
        ConfigLoader::merge(lists)
    };

    Ok(match &args.region {
        Some(region) => registry.filter_region(region),
        None => registry,
    })
}

/// Build the probe selected by the settings.
fn build_probe(config: &RunConfig) -> Result<Arc<dyn Probe>> {
    // The probes need their own bound even when the prober has none
    let timeout = config
        .attempt_timeout()
        .unwrap_or_else(|| Duration::from_millis(DEFAULT_TIMEOUT_MS));

    let probe: Arc<dyn Probe> = match config.probe {
        ProbeKind::Dns => Arc::new(DnsQueryProbe::new(config.domain.clone()).with_timeout(timeout)),
        ProbeKind::Icmp => Arc::new(IcmpProbe::with_timeout(timeout)?),
    };
    Ok(probe)
}

/// Probe every endpoint, rank the results and print them.
async fn run_probe(args: RunArgs, format: OutputFormat) -> Result<()> {
    let base = match &args.config {
        Some(path) => RunConfig::load_from_file(path)?,
        None => RunConfig::load_default()?,
    };
    let config = args.apply(base);
    config.validate()?;

    let registry = load_registry(&args.endpoints)?;
    let probe = build_probe(&config)?;

    let mut prober = Prober::new(probe, config.prober_settings())?;
    if format == OutputFormat::Table {
        prober = prober.with_progress(|done, total, _| {
            eprint!("\rProbing [{done:>3}/{total}]");
            if done == total {
                eprintln!();
            }
        });
    }

    let stats = prober.run_all(registry.endpoints()).await?;
    let ranked = rank(stats);
    match best(&ranked) {
        Some(winner) => tracing::info!("Fastest endpoint: {}", winner.endpoint),
        None => tracing::warn!("No endpoint answered"),
    }
    let recommended = top_k(&ranked, config.top_k);
    let report = Report::new(ranked, recommended);

    let mut stdout = std::io::stdout().lock();
    report::render(&mut stdout, &report, format)?;
    stdout.flush()?;
    Ok(())
}

/// List endpoints with optional filtering.
fn run_list(args: &EndpointArgs, ipv4_only: bool, ipv6_only: bool) -> Result<()> {
    let registry = load_registry(args)?.filter(|e| {
        if ipv4_only {
            e.is_ipv4()
        } else if ipv6_only {
            e.is_ipv6()
        } else {
            true
        }
    });

    println!("Endpoints ({} total):\n", registry.len());
    println!("{:<4} {:<20} {:<40} {:<10}", "#", "Name", "IP", "Region");
    println!("{}", "-".repeat(76));

    for (idx, e) in registry.endpoints().iter().enumerate() {
        println!(
            "{:<4} {:<20} {:<40} {:<10}",
            idx + 1,
            e.name,
            e.address,
            e.region_or_unknown()
        );
    }

    Ok(())
}

/// Main entry point for the dnsrank CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic hook for better error reporting
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("panic: {panic_info}");
    }));

    let (cli, verbose) = dnsrank::cli::parse_verbose();
    setup_logging(verbose, cli.quiet);

    match cli.command {
        Some(Commands::Run(args)) => {
            run_probe(args, cli.format).await?;
        }

        Some(Commands::List {
            endpoints,
            ipv4_only,
            ipv6_only,
        }) => {
            run_list(&endpoints, ipv4_only, ipv6_only)?;
        }

        Some(Commands::Export { endpoints, output }) => {
            let registry = load_registry(&endpoints)?;
            ConfigLoader::save(&registry, &output)?;
            println!("Exported {} endpoints to {}", registry.len(), output.display());
        }

        None => {
            // Default to a run with default settings
            run_probe(RunArgs::default(), cli.format).await?;
        }
    }

    Ok(())
}
