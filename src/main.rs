use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use osm_traffic_sim::map::{MapGraph, NodeId};
use osm_traffic_sim::simulation::{
    SimConfig, SimVehicle, SimulationObserver, SimulationScheduler, DEFAULT_TICK_INTERVAL,
};

#[derive(Parser)]
#[command(name = "osm_traffic_sim")]
#[command(about = "Shortest routes and traffic simulation on OpenStreetMap extracts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print node, road and component counts of a map
    Info {
        /// OSM XML extract
        map: PathBuf,
    },

    /// List every location of a map, sorted by name
    Locations {
        /// OSM XML extract
        map: PathBuf,
    },

    /// Find the shortest route between two locations
    Route {
        /// OSM XML extract
        map: PathBuf,

        /// Start location (display name or node id)
        #[arg(long)]
        from: String,

        /// End location (display name or node id)
        #[arg(long)]
        to: String,
    },

    /// Run the traffic simulation in headless mode
    Simulate {
        /// OSM XML extract
        map: PathBuf,

        /// Number of vehicles to spawn between random locations
        #[arg(long, default_value = "10")]
        vehicles: usize,

        /// Simulated seconds to run
        #[arg(long, default_value = "60")]
        seconds: f64,

        /// Simulation speed multiplier
        #[arg(long, default_value = "1.0")]
        multiplier: f64,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Print a summary every this many simulated seconds
        #[arg(long, default_value = "10")]
        report_every: f64,

        /// Pace ticks with the wall clock
        #[arg(long)]
        realtime: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,osm_traffic_sim=info"),
    )
    .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Info { map } => run_info(&map),
        Command::Locations { map } => run_locations(&map),
        Command::Route { map, from, to } => run_route(&map, &from, &to),
        Command::Simulate {
            map,
            vehicles,
            seconds,
            multiplier,
            seed,
            report_every,
            realtime,
        } => run_simulation(
            &map,
            vehicles,
            seconds,
            SimConfig {
                tick_interval: DEFAULT_TICK_INTERVAL,
                speed_multiplier: multiplier,
                seed,
            },
            report_every,
            realtime,
        ),
    }
}

fn load_map(path: &Path) -> Result<MapGraph> {
    let mut graph = MapGraph::new();
    graph.load(path)?;
    Ok(graph)
}

/// Resolve a location given by display name, falling back to a raw node id
fn resolve_location(graph: &MapGraph, location: &str) -> Result<NodeId> {
    if let Some(id) = graph.find_node_by_name(location) {
        return Ok(id);
    }

    match location.trim().parse::<i64>() {
        Ok(raw) if graph.has_node(NodeId(raw)) => Ok(NodeId(raw)),
        _ => bail!("Unknown location: {}", location),
    }
}

fn run_info(path: &Path) -> Result<()> {
    let graph = load_map(path)?;

    println!("Map: {}", path.display());
    println!("Nodes: {}", graph.node_count());
    println!("Edges: {}", graph.edge_count());
    println!("Connected components: {}", graph.component_count());
    println!("Named locations: {}", graph.named_locations().len());
    Ok(())
}

fn run_locations(path: &Path) -> Result<()> {
    let graph = load_map(path)?;

    for location in graph.named_locations() {
        println!("{}\t{}", location.node_id, location.display_name);
    }
    Ok(())
}

fn run_route(path: &Path, from: &str, to: &str) -> Result<()> {
    let graph = load_map(path)?;
    let source = resolve_location(&graph, from)?;
    let destination = resolve_location(&graph, to)?;

    let route = graph
        .shortest_path(source, destination)
        .context("Route lookup failed")?;

    println!("Total distance: {:.3} km", route.total_distance_km);
    println!("Stops: {}", route.path.len());
    for (index, id) in route.path.iter().enumerate() {
        let label = if index == 0 {
            "START"
        } else if index == route.path.len() - 1 {
            "END"
        } else {
            "via"
        };
        println!("  {:>5}: {}", label, graph.display_name_of(*id));
    }
    Ok(())
}

/// Logs each vehicle once when it reaches the end of its route
#[derive(Default)]
struct ArrivalLogger {
    arrived: BTreeSet<u64>,
}

impl SimulationObserver for ArrivalLogger {
    fn vehicles_updated(&mut self, vehicles: &[SimVehicle]) {
        for vehicle in vehicles.iter().filter(|v| v.is_finished()) {
            if let Some(destination) = vehicle.destination() {
                if self.arrived.insert(vehicle.id.0) {
                    info!("Vehicle {} arrived at node {}", vehicle.id.0, destination);
                }
            }
        }
    }
}

fn run_simulation(
    path: &Path,
    vehicle_count: usize,
    seconds: f64,
    config: SimConfig,
    report_every: f64,
    realtime: bool,
) -> Result<()> {
    let graph = load_map(path)?;
    let locations: Vec<NodeId> = graph
        .named_locations()
        .iter()
        .map(|location| location.node_id)
        .collect();
    if locations.len() < 2 {
        bail!("Map needs at least two locations to simulate traffic");
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut scheduler = SimulationScheduler::with_config(graph, config);
    scheduler.add_observer(Box::new(ArrivalLogger::default()));

    info!("=== SPAWNING VEHICLES ===");
    let mut spawned = 0;
    for _ in 0..vehicle_count.saturating_mul(10) {
        if spawned == vehicle_count {
            break;
        }
        let (Some(source), Some(destination)) =
            (locations.choose(&mut rng), locations.choose(&mut rng))
        else {
            break;
        };
        if source != destination && scheduler.add_vehicle(*source, *destination).is_some() {
            spawned += 1;
        }
    }
    info!("Spawned {} of {} requested vehicles", spawned, vehicle_count);

    let delta = scheduler.delta_time();
    if delta <= 0.0 {
        bail!("Tick interval and multiplier must be positive");
    }
    let total_ticks = (seconds / delta).ceil() as u64;
    let ticks_per_report = ((report_every / delta).ceil() as u64).max(1);
    let wall_clock_tick = Duration::from_secs_f64(scheduler.tick_interval());

    println!("{}", scheduler.summary());

    scheduler.start();
    for tick in 1..=total_ticks {
        scheduler.tick();

        if tick % ticks_per_report == 0 && tick < total_ticks {
            println!("{}", scheduler.summary());
        }
        if realtime {
            std::thread::sleep(wall_clock_tick);
        }
    }
    scheduler.stop();

    println!("{}", scheduler.summary());

    let arrived = scheduler.vehicles().iter().filter(|v| v.is_finished()).count();
    info!("=== SIMULATION COMPLETE ===");
    info!("Elapsed time: {:.2}s", scheduler.elapsed());
    info!("Total vehicles spawned: {}", spawned);
    info!("Total vehicles arrived: {}", arrived);
    info!("Traffic lights: {}", scheduler.traffic_lights().len());
    Ok(())
}
