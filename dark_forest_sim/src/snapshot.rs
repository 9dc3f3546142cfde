//! Read-only view of the galaxy for presentation layers.

use bevy::prelude::*;
use serde::Serialize;

use crate::{
    civilization::{CivilizationId, CivilizationRegistry, CivilizationTraits, ControlType, DiplomacyStatus},
    fleet::{ShipId, ShipType},
    galaxy::{Galaxy, GridPosition, PlanetId},
    ledger::ResourceBundle,
    resources::TurnCounter,
    tasks::{TaskId, TaskKind},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalaxySnapshot {
    pub turn: u64,
    pub width: u32,
    pub height: u32,
    pub planets: Vec<PlanetSnapshot>,
    pub civilizations: Vec<CivilizationSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetSnapshot {
    pub id: PlanetId,
    pub name: String,
    pub position: GridPosition,
    pub yields: ResourceBundle,
    pub colonized: bool,
    pub owner: Option<CivilizationId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipSnapshot {
    pub id: ShipId,
    pub name: String,
    pub ship_type: ShipType,
    pub position: GridPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub kind: TaskKind,
    pub description: String,
    pub turns_remaining: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CivilizationSnapshot {
    pub id: CivilizationId,
    pub name: String,
    pub control: ControlType,
    pub tech_level: u32,
    pub visibility: f64,
    pub resources: ResourceBundle,
    pub traits: CivilizationTraits,
    pub planets: Vec<PlanetId>,
    pub ships: Vec<ShipSnapshot>,
    pub researched: Vec<String>,
    pub diplomacy: Vec<(CivilizationId, DiplomacyStatus)>,
    pub tasks: Vec<TaskSnapshot>,
}

impl GalaxySnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub fn capture_snapshot(world: &World) -> GalaxySnapshot {
    let galaxy = world.resource::<Galaxy>();
    let registry = world.resource::<CivilizationRegistry>();

    let planets = galaxy
        .planets()
        .map(|planet| PlanetSnapshot {
            id: planet.id(),
            name: planet.name.clone(),
            position: planet.position(),
            yields: planet.yields,
            colonized: planet.is_colonized(),
            owner: planet.owner(),
        })
        .collect();

    let civilizations = registry
        .iter()
        .map(|civ| CivilizationSnapshot {
            id: civ.id,
            name: civ.name.clone(),
            control: civ.control,
            tech_level: civ.tech_level,
            visibility: civ.visibility(),
            resources: civ.resources,
            traits: civ.traits,
            planets: civ.planets.clone(),
            ships: civ
                .ships
                .iter()
                .map(|ship| ShipSnapshot {
                    id: ship.id,
                    name: ship.name.clone(),
                    ship_type: ship.ship_type,
                    position: ship.position,
                })
                .collect(),
            researched: civ.researched.keys().cloned().collect(),
            diplomacy: civ
                .diplomacy
                .iter()
                .map(|(other, status)| (*other, *status))
                .collect(),
            tasks: civ
                .tasks
                .iter()
                .map(|task| TaskSnapshot {
                    id: task.id,
                    kind: task.kind(),
                    description: task.description.clone(),
                    turns_remaining: task.turns_remaining(),
                })
                .collect(),
        })
        .collect();

    GalaxySnapshot {
        turn: world.resource::<TurnCounter>().0,
        width: galaxy.width(),
        height: galaxy.height(),
        planets,
        civilizations,
    }
}
