use std::path::PathBuf;
use std::process;

use bevy::app::App;
use clap::Parser;
use tracing::{error, info, warn};

use dark_forest_sim::queries::{colonization_ships, uncolonized_planets};
use dark_forest_sim::{
    attach_notification_feed, build_app_with_config, build_ship, capture_snapshot,
    colonize_planet, load_galaxy_config, research_technology, run_round, CivilizationId,
    CivilizationRegistry, ControlType, Notification, ShipType,
};

/// Run the galaxy without a presentation layer and print the final state.
#[derive(Debug, Parser)]
#[command(name = "dark-forest-headless", version)]
struct Args {
    /// Full rounds to simulate (one turn per civilization each).
    #[arg(long, default_value_t = 10)]
    rounds: u32,
    /// Override the configured world seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Galaxy configuration JSON; defaults to DARK_FOREST_CONFIG_PATH or the builtin document.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Issue a fixed opening for human civilizations (research, build, colonize).
    #[arg(long)]
    demo_orders: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var_os(dark_forest_sim::GALAXY_CONFIG_ENV).map(PathBuf::from));
    let (mut config, metadata) = load_galaxy_config(config_path.as_deref());
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut app = match build_app_with_config(config) {
        Ok(app) => app,
        Err(err) => {
            error!(target: "dark_forest::headless", error = %err, "setup.failed");
            process::exit(1);
        }
    };
    app.insert_resource(metadata);
    let notifications = attach_notification_feed(&mut app);

    info!(
        target: "dark_forest::headless",
        rounds = args.rounds,
        demo_orders = args.demo_orders,
        "Dark Forest headless run ready"
    );

    for round in 0..args.rounds {
        if args.demo_orders {
            issue_demo_orders(&mut app, round);
        }
        match run_round(&mut app) {
            Ok(turn) => info!(target: "dark_forest::headless", round, turn, "round.completed"),
            Err(err) => {
                error!(target: "dark_forest::headless", error = %err, "round.failed");
                process::exit(1);
            }
        }
        for notification in notifications.try_iter() {
            log_notification(&notification);
        }
    }

    match capture_snapshot(&app.world).to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!(target: "dark_forest::headless", error = %err, "snapshot.serialize_failed");
            process::exit(1);
        }
    }
}

fn human_civilizations(app: &App) -> Vec<CivilizationId> {
    app.world
        .resource::<CivilizationRegistry>()
        .iter()
        .filter(|civ| civ.control == ControlType::Human)
        .map(|civ| civ.id)
        .collect()
}

fn issue_demo_orders(app: &mut App, round: u32) {
    for civ in human_civilizations(app) {
        if round == 0 {
            if let Err(err) = research_technology(&mut app.world, civ, "Basic Spaceflight") {
                warn!(target: "dark_forest::headless", civilization = %civ, error = %err, "demo.research_rejected");
            }
            if let Err(err) = build_ship(&mut app.world, civ, ShipType::Colonization) {
                warn!(target: "dark_forest::headless", civilization = %civ, error = %err, "demo.build_rejected");
            }
        }

        let idle: Vec<_> = {
            let registry = app.world.resource::<CivilizationRegistry>();
            colonization_ships(&app.world, civ)
                .into_iter()
                .filter(|ship| {
                    registry
                        .get(civ)
                        .map_or(false, |owner| !owner.ship_committed(ship.id))
                })
                .collect()
        };
        for ship in idle {
            let target = uncolonized_planets(&app.world)
                .into_iter()
                .min_by_key(|planet| (ship.position.manhattan_distance(planet.position()), planet.id()));
            let Some(target) = target else {
                break;
            };
            if let Err(err) = colonize_planet(&mut app.world, civ, target.id(), ship.id) {
                warn!(target: "dark_forest::headless", civilization = %civ, error = %err, "demo.colonize_rejected");
            }
        }
    }
}

fn log_notification(notification: &Notification) {
    match notification {
        Notification::TaskCompleted {
            civilization,
            description,
            ..
        } => info!(target: "dark_forest::headless", civilization = %civilization, "task.completed={description}"),
        Notification::ShipBuilt {
            civilization,
            ship_type,
            position,
            ..
        } => info!(target: "dark_forest::headless", civilization = %civilization, position = %position, "ship.built={ship_type}"),
        Notification::PlanetColonized {
            civilization,
            planet,
            ..
        } => info!(target: "dark_forest::headless", civilization = %civilization, "planet.colonized={planet}"),
        Notification::TaskCreated { .. } | Notification::TurnEnded { .. } => {}
    }
}
