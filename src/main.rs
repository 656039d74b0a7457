use delivery_planner::models::{Location, Package, PlanOutput, RoadNetworkSnapshot};
use delivery_planner::utils::init_map::{
    generate_grid_network, generate_packages, load_packages, load_road_network,
};
use delivery_planner::utils::plot::render_route;
use delivery_planner::{plan_trip, PlannerConfig, PlannerResult, SpatialGraph};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;

/// Plans one delivery trip and prints it as JSON
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    /// Planner configuration JSON; defaults apply when omitted
    #[arg(short = 'c', long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Road network snapshot JSON
    #[arg(short = 'r', long, value_name = "ROADS_FILE", requires = "packages")]
    roads: Option<PathBuf>,

    /// Package snapshot JSON
    #[arg(short = 'p', long, value_name = "PACKAGES_FILE", requires = "roads")]
    packages: Option<PathBuf>,

    /// Draw the planned route into this PNG
    #[arg(long, value_name = "PNG_FILE")]
    render: Option<PathBuf>,
}

// Synthetic 10x10 city with 20 packages when no input files are given
fn synthetic_inputs() -> PlannerResult<(RoadNetworkSnapshot, Vec<Package>)> {
    let mut rng = StdRng::seed_from_u64(42);
    let road = generate_grid_network(10, 10, 10.0);
    let packages = generate_packages(20, &road, (1.0, 15.0), &mut rng)?;
    Ok((road, packages))
}

fn run(args: CliArgs) -> PlannerResult<()> {
    let config = match &args.config {
        Some(path) => PlannerConfig::from_json_file(path)?,
        None => PlannerConfig::default(),
    };

    let (road, packages) = match (&args.roads, &args.packages) {
        (Some(roads_path), Some(packages_path)) => {
            (load_road_network(roads_path)?, load_packages(packages_path)?)
        }
        _ => {
            log::info!("No input files given, generating a synthetic city");
            synthetic_inputs()?
        }
    };

    let start_time = Instant::now();
    let graph = SpatialGraph::from_snapshot(&road, &config)?;
    let start = road
        .points
        .first()
        .copied()
        .unwrap_or_else(|| Location::new(0.0, 0.0));

    let route = plan_trip(&graph, &packages, &start, &config)?;
    log::info!(
        "Planned {} packages from {} in {:.2?}",
        route.packages.len(),
        start,
        start_time.elapsed()
    );

    if let Some(png) = &args.render {
        if let Err(e) = render_route(png, &graph, &route) {
            log::warn!("Could not render route to {}: {}", png.display(), e);
        }
    }

    let output = PlanOutput::from(&route);
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
