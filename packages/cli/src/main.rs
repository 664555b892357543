#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Urban API gateway.
//!
//! Each subcommand runs one gateway operation against the Urban API at
//! `--base-url` (or `URBAN_API_URL`) and prints the result as JSON, or as
//! a `GeoJSON` `FeatureCollection` for zones and territories.

use clap::{Parser, Subcommand};
use serde::Serialize;
use urbanomy_gateway::{UrbanApiConfig, UrbanApiGateway};

#[derive(Parser)]
#[command(name = "urbanomy", about = "Query the Urban API gateway")]
struct Cli {
    /// Urban API base URL (defaults to the `URBAN_API_URL` env var).
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the functional zone source selected for a scenario
    Sources {
        /// Scenario identifier
        scenario_id: i64,
        /// Require this source label (e.g., "OSM", "PZZ", "User")
        #[arg(long)]
        source: Option<String>,
    },
    /// Fetch the functional zones of a scenario as `GeoJSON`
    Zones {
        /// Scenario identifier
        scenario_id: i64,
        /// Fetch zones for the project context
        #[arg(long)]
        context: bool,
        /// Use this source label instead of the automatic choice
        #[arg(long)]
        source: Option<String>,
    },
    /// Print the project id of a scenario
    Project {
        /// Scenario identifier
        scenario_id: i64,
    },
    /// Fetch the project territory of a scenario, projected to UTM
    Territory {
        /// Scenario identifier
        scenario_id: i64,
    },
    /// Fetch the indicator values of a scenario
    Indicators {
        /// Scenario identifier
        scenario_id: i64,
    },
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let config = match cli.base_url {
        Some(url) => UrbanApiConfig::new(url)?,
        None => UrbanApiConfig::from_env()?,
    };
    log::debug!("Using Urban API at {}", config.base_url);

    let gateway = UrbanApiGateway::from_config(&config);

    match cli.command {
        Commands::Sources {
            scenario_id,
            source,
        } => {
            let selected = gateway
                .get_functional_zone_sources(scenario_id, source.as_deref())
                .await?;
            print_json(&selected)?;
        }
        Commands::Zones {
            scenario_id,
            context,
            source,
        } => {
            let zones = gateway
                .get_functional_zones(scenario_id, context, source.as_deref())
                .await?;
            log::info!(
                "{} zones from {} {}",
                zones.len(),
                zones.source.source,
                zones.source.year
            );
            print_json(&zones.to_feature_collection())?;
        }
        Commands::Project { scenario_id } => {
            let project_id = gateway.get_project_id(scenario_id).await?;
            println!("{project_id}");
        }
        Commands::Territory { scenario_id } => {
            let territory = gateway.get_territory(scenario_id).await?;
            if let Some(area) = territory.area_sq_m() {
                log::info!(
                    "Territory of project {} covers {:.1} ha in {}",
                    territory.project_id,
                    area / 10_000.0,
                    territory.crs
                );
            }
            print_json(&territory.to_feature_collection())?;
        }
        Commands::Indicators { scenario_id } => {
            let values = gateway.get_indicator_values(scenario_id).await?;
            print_json(&values)?;
        }
    }

    Ok(())
}
