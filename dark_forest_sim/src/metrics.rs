use bevy::prelude::*;

use crate::{
    civilization::{CivilizationId, CivilizationRegistry},
    galaxy::Galaxy,
    resources::{ActiveCivilization, TurnCounter},
};

#[derive(Resource, Default, Debug, Clone, PartialEq)]
pub struct SimulationMetrics {
    pub turn: u64,
    pub last_civilization: Option<CivilizationId>,
    pub civilizations: usize,
    pub colonized_planets: usize,
    pub uncolonized_planets: usize,
    pub ships: usize,
    pub tasks_in_flight: usize,
    pub max_visibility: f64,
}

pub fn collect_metrics(
    counter: Res<TurnCounter>,
    active: Res<ActiveCivilization>,
    registry: Res<CivilizationRegistry>,
    galaxy: Res<Galaxy>,
    mut metrics: ResMut<SimulationMetrics>,
) {
    metrics.turn = counter.0;
    metrics.last_civilization = active.0;
    metrics.civilizations = registry.len();

    let colonized = galaxy.planets().filter(|p| p.is_colonized()).count();
    metrics.colonized_planets = colonized;
    metrics.uncolonized_planets = galaxy.planets().count() - colonized;

    metrics.ships = registry.iter().map(|civ| civ.ships.len()).sum();
    metrics.tasks_in_flight = registry.iter().map(|civ| civ.tasks.len()).sum();
    metrics.max_visibility = registry
        .iter()
        .map(|civ| civ.visibility())
        .fold(0.0, f64::max);
}
