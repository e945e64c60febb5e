mod aggregate;
mod client;
mod config;
mod dump;
mod hives;
mod render;

use crate::aggregate::{FleetResult, SortMode};
use crate::client::HiveClient;
use crate::config::{EffectiveConfig, resolve};
use crate::hives::HiveId;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "hivevlan",
    version,
    about = "Show the VLAN inventory of one or more hives"
)]
struct Cli {
    #[arg(
        short = 's',
        long,
        value_enum,
        value_name = "MODE",
        help = "Index the result by \"vlan_name\" or \"vlan_id\" (default: vlan_name)"
    )]
    sort_by: Option<SortArg>,

    #[arg(
        short = 'i',
        long,
        value_name = "ID|all|ID,ID,...",
        help = "The hive to query, supports \"all\" for all hives and \"210,213\" for a subset of hives (default: 205)"
    )]
    hive_id: Option<String>,

    #[arg(
        long,
        value_name = "URL",
        help = "URL template for the bulk VLAN endpoint, `{hive}` is replaced with the hive ID"
    )]
    api_url: Option<String>,

    #[arg(
        long,
        short = 'o',
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Output format"
    )]
    output: OutputFormat,

    #[arg(long, short = 'v', help = "Log debug details to stderr")]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    #[value(name = "vlan_name")]
    VlanName,
    #[value(name = "vlan_id")]
    VlanId,
}

impl From<SortArg> for SortMode {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::VlanName => SortMode::VlanName,
            SortArg::VlanId => SortMode::VlanId,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(?cli, "parsed arguments");

    let cwd = std::env::current_dir().context("reading current directory")?;
    let effective = resolve(&cwd, cli.api_url.clone())?;
    let mode = cli.sort_by.map(SortMode::from).unwrap_or(effective.sort_by);
    let selector = cli
        .hive_id
        .clone()
        .unwrap_or_else(|| effective.default_hive.clone());

    let hives = hives::resolve(&selector, &effective.fleet)?;
    debug!(%selector, ?hives, %mode, "resolved hives");

    let fleet = collect_fleet(&effective, &hives, mode, cli.output)?;

    match cli.output {
        OutputFormat::Table => {
            for table in render::fleet_tables(&fleet) {
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&fleet)?);
        }
    }

    Ok(())
}

/// Fetches and aggregates every hive in order. The first failing hive
/// aborts the run, so nothing is rendered unless all of them succeed.
///
/// Progress lines go to stderr for JSON output so stdout stays parseable.
fn collect_fleet(
    effective: &EffectiveConfig,
    hives: &[HiveId],
    mode: SortMode,
    output: OutputFormat,
) -> Result<FleetResult> {
    let client = HiveClient::new(
        &effective.api_url,
        effective.credentials.clone(),
        effective.timeout,
    )?;
    let mut fleet = FleetResult::new(mode);

    for hive in hives {
        match output {
            OutputFormat::Table => println!("Fetching VLANs from hive{hive}"),
            OutputFormat::Json => eprintln!("Fetching VLANs from hive{hive}"),
        }
        let response = client.fetch(hive)?;
        let records = dump::parse_dump(&response.body)
            .with_context(|| format!("parsing VLAN dump from hive{hive}"))?;
        let view = fleet.add_hive(hive.clone(), &records);
        if view.index().is_empty() {
            warn!(hive = %hive, "hive returned no VLANs");
        }
        debug!(
            hive = %hive,
            status = response.status,
            records = records.len(),
            vlans = view.index().len(),
            mode = %view.mode(),
            "aggregated VLAN dump"
        );
    }

    debug!(hives = fleet.len(), mode = %fleet.mode(), "fleet collected");
    Ok(fleet)
}
