//! Core simulation crate for the Dark Forest galaxy prototype.
//!
//! The galaxy lives in a Bevy [`App`]. Each call to [`process_turn`] resolves
//! one civilization's turn (gather, tasks, interactions, finalize) and bumps
//! the global turn counter once.

pub mod actions;
pub mod civilization;
pub mod diplomacy;
pub mod events;
pub mod fleet;
pub mod galaxy;
pub mod galaxy_config;
pub mod ledger;
pub mod mapgen;
pub mod metrics;
pub mod notifications;
pub mod queries;
mod resources;
pub mod snapshot;
mod systems;
pub mod tasks;
pub mod technology;
pub mod visibility;

use bevy::prelude::*;
use crossbeam_channel::Receiver;
use thiserror::Error;

pub use actions::{
    build_ship, colonize_planet, launch_attack, research_technology, resolve_action,
    ActionError, ActionResolution,
};
pub use civilization::{
    Civilization, CivilizationId, CivilizationRegistry, CivilizationTraits, ControlType,
    DiplomacyStatus,
};
pub use diplomacy::{
    break_alliance, declare_war, diplomacy_status, form_alliance, send_message, DiplomacyError,
};
pub use events::{PlanetColonized, ShipBuilt, TaskCompleted, TaskCreated, TurnEnded};
pub use fleet::{Ship, ShipId, ShipType};
pub use galaxy::{Galaxy, GalaxyCell, GalaxyError, GridPosition, Planet, PlanetId};
pub use galaxy_config::{
    load_galaxy_config, load_galaxy_config_from_env, GalaxyConfig, GalaxyConfigError,
    GalaxyConfigMetadata, GALAXY_CONFIG_ENV,
};
pub use ledger::{ResourceBundle, ResourceKind};
pub use mapgen::{
    populate_world, spawn_civilization, spawn_planet, spawn_ship, CivilizationCharter,
    HomeworldSite, SetupError,
};
pub use metrics::SimulationMetrics;
pub use notifications::{Notification, NotificationFeed};
pub use resources::{ActiveCivilization, DetectionRng, IdAllocator, TurnCounter, WorldGenRng};
pub use snapshot::{capture_snapshot, GalaxySnapshot};
pub use tasks::{OngoingTask, PendingAction, TaskId, TaskKind, TaskProgress};
pub use technology::{
    TechTree, Technology, TechnologyCatalog, TechnologyCatalogError, TechnologyEffect,
};
pub use visibility::{detect, detect_civilization, detection_chance, DetectionError};

/// Ordered phases of a single civilization turn.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    Gather,
    Tasks,
    /// Cross-civilization effects. Extra systems may be added here.
    Interactions,
    Finalize,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TurnError {
    #[error("civilization {0} is not registered")]
    UnknownCivilization(CivilizationId),
}

/// Construct the galaxy using configuration from `DARK_FOREST_CONFIG_PATH`
/// (or the builtin document) and populate it.
pub fn build_headless_app() -> Result<App, SetupError> {
    let (config, metadata) = load_galaxy_config_from_env();
    let mut app = build_app_with_config(config)?;
    app.insert_resource(metadata);
    Ok(app)
}

/// Construct and populate a galaxy from an explicit configuration.
pub fn build_app_with_config(config: GalaxyConfig) -> Result<App, SetupError> {
    let mut app = build_empty_app(config)?;
    populate_world(&mut app.world)?;
    Ok(app)
}

/// Turn pipeline and resources with an empty grid and no civilizations.
/// Tests and custom scenarios populate it with the `spawn_*` helpers.
pub fn build_empty_app(config: GalaxyConfig) -> Result<App, SetupError> {
    let catalog = TechnologyCatalog::load_builtin()?;
    let mut app = App::new();
    events::register_events(&mut app);

    app.insert_resource(Galaxy::new(config.grid.width, config.grid.height))
        .insert_resource(WorldGenRng::from_seed(config.seed))
        .insert_resource(DetectionRng::from_seed(config.seed))
        .insert_resource(catalog)
        .insert_resource(config)
        .init_resource::<GalaxyConfigMetadata>()
        .init_resource::<CivilizationRegistry>()
        .init_resource::<IdAllocator>()
        .init_resource::<TurnCounter>()
        .init_resource::<ActiveCivilization>()
        .init_resource::<SimulationMetrics>()
        .configure_sets(
            Update,
            (
                TurnPhase::Gather,
                TurnPhase::Tasks,
                TurnPhase::Interactions,
                TurnPhase::Finalize,
            )
                .chain()
                .run_if(systems::civilization_turn_active),
        )
        .add_systems(
            Update,
            (
                systems::gather_resources.in_set(TurnPhase::Gather),
                systems::advance_tasks.in_set(TurnPhase::Tasks),
                systems::resolve_interactions.in_set(TurnPhase::Interactions),
                (systems::end_turn, metrics::collect_metrics)
                    .chain()
                    .in_set(TurnPhase::Finalize),
            ),
        )
        .add_systems(
            Update,
            notifications::forward_notifications
                .after(TurnPhase::Finalize)
                .run_if(resource_exists::<NotificationFeed>),
        );

    Ok(app)
}

/// Install a [`NotificationFeed`] and return the receiving end.
pub fn attach_notification_feed(app: &mut App) -> Receiver<Notification> {
    let (feed, receiver) = NotificationFeed::channel();
    app.insert_resource(feed);
    receiver
}

/// Resolve one turn for `civilization`. Returns the new global turn count.
pub fn process_turn(app: &mut App, civilization: CivilizationId) -> Result<u64, TurnError> {
    if !app
        .world
        .resource::<CivilizationRegistry>()
        .contains(civilization)
    {
        return Err(TurnError::UnknownCivilization(civilization));
    }

    app.world.resource_mut::<ActiveCivilization>().0 = Some(civilization);
    app.update();
    app.world.resource_mut::<ActiveCivilization>().0 = None;

    Ok(app.world.resource::<TurnCounter>().0)
}

/// One turn for every civilization in registration order.
pub fn run_round(app: &mut App) -> Result<u64, TurnError> {
    let order = app.world.resource::<CivilizationRegistry>().ids();
    let mut turn = app.world.resource::<TurnCounter>().0;
    for civilization in order {
        turn = process_turn(app, civilization)?;
    }
    Ok(turn)
}
