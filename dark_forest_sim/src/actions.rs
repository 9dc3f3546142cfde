//! Player and AI action entry points plus completion dispatch.
//!
//! Entry points validate against the current world, deduct cost up front and
//! queue an [`OngoingTask`]. Any `Err` leaves the world untouched.

use bevy::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::{
    civilization::{Civilization, CivilizationId, CivilizationRegistry},
    events::TaskCreated,
    fleet::{Ship, ShipId, ShipType},
    galaxy::{Galaxy, GridPosition, PlanetId},
    galaxy_config::GalaxyConfig,
    ledger::{ResourceBundle, ResourceKind},
    resources::IdAllocator,
    tasks::{duration_turns, OngoingTask, PendingAction, TaskId},
    technology::missing_prerequisites,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    #[error("civilization {0} is not registered")]
    UnknownCivilization(CivilizationId),
    #[error("insufficient {resource}: required {required}, available {available}")]
    InsufficientResources {
        resource: ResourceKind,
        required: i64,
        available: i64,
    },
    #[error("civilization owns no planet to build at")]
    NoHomeworld,
    #[error("technology '{0}' is not in the tech tree")]
    UnknownTechnology(String),
    #[error("technology '{0}' is already researched")]
    TechnologyAlreadyResearched(String),
    #[error("technology '{0}' is already being researched")]
    ResearchInProgress(String),
    #[error("technology '{technology}' is missing prerequisites {missing:?}")]
    MissingPrerequisites {
        technology: String,
        missing: Vec<String>,
    },
    #[error("ship {0} is not in the fleet")]
    UnknownShip(ShipId),
    #[error("ship {ship} is a {actual} ship, expected {expected}")]
    WrongShipType {
        ship: ShipId,
        expected: ShipType,
        actual: ShipType,
    },
    #[error("ship {0} is already committed to a colonization")]
    ShipAlreadyCommitted(ShipId),
    #[error("planet {0} does not exist")]
    UnknownPlanet(PlanetId),
    #[error("planet {0} is already colonized")]
    PlanetAlreadyColonized(PlanetId),
    #[error("target {0} is outside the galaxy")]
    TargetOutOfBounds(GridPosition),
}

/// What a completed task did to the world.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionResolution {
    Researched {
        technology: String,
    },
    ShipBuilt {
        ship: ShipId,
        ship_type: ShipType,
        position: GridPosition,
    },
    PlanetColonized {
        planet: PlanetId,
        ship: ShipId,
        position: GridPosition,
    },
    /// Combat is not modelled; the task completes without touching state.
    AttackResolved {
        ship: ShipId,
        target: GridPosition,
    },
    Skipped {
        reason: String,
    },
}

struct PlannedTask {
    cost: ResourceBundle,
    turns: i32,
    description: String,
    action: PendingAction,
}

fn check_affordable(stock: &ResourceBundle, cost: &ResourceBundle) -> Result<(), ActionError> {
    match stock.shortfall(cost) {
        Some((resource, required, available)) => Err(ActionError::InsufficientResources {
            resource,
            required,
            available,
        }),
        None => Ok(()),
    }
}

fn fleet_ship(
    civilization: &Civilization,
    ship: ShipId,
    expected: ShipType,
) -> Result<&Ship, ActionError> {
    let found = civilization
        .ship(ship)
        .ok_or(ActionError::UnknownShip(ship))?;
    if found.ship_type != expected {
        return Err(ActionError::WrongShipType {
            ship,
            expected,
            actual: found.ship_type,
        });
    }
    Ok(found)
}

fn enqueue<F>(
    world: &mut World,
    civilization: CivilizationId,
    planner: F,
) -> Result<TaskId, ActionError>
where
    F: FnOnce(&Civilization, &Galaxy, &GalaxyConfig) -> Result<PlannedTask, ActionError>,
{
    let created = world.resource_scope(|world, mut registry: Mut<CivilizationRegistry>| {
        let plan = {
            let civ = registry
                .get(civilization)
                .ok_or(ActionError::UnknownCivilization(civilization))?;
            planner(civ, world.resource::<Galaxy>(), world.resource::<GalaxyConfig>())?
        };

        let task = world.resource_mut::<IdAllocator>().next_task();
        let civ = registry
            .get_mut(civilization)
            .ok_or(ActionError::UnknownCivilization(civilization))?;
        civ.resources.debit(&plan.cost);

        let created = TaskCreated {
            civilization,
            task,
            kind: plan.action.kind(),
            description: plan.description.clone(),
            turns: plan.turns.max(1),
        };
        civ.tasks
            .push(OngoingTask::new(task, plan.description, plan.turns, plan.action));
        Ok::<_, ActionError>(created)
    })?;

    tracing::info!(
        target: "dark_forest::actions",
        civilization = %created.civilization,
        task = %created.task,
        kind = ?created.kind,
        turns = created.turns,
        "task.queued={}",
        created.description
    );
    let task = created.task;
    world.send_event(created);
    Ok(task)
}

/// Start researching `technology`, paying its cost in intelligence.
pub fn research_technology(
    world: &mut World,
    civilization: CivilizationId,
    technology: &str,
) -> Result<TaskId, ActionError> {
    enqueue(world, civilization, |civ, _galaxy, config| {
        let tech = civ
            .tech_tree
            .get(technology)
            .ok_or_else(|| ActionError::UnknownTechnology(technology.to_string()))?;
        if civ.has_researched(technology) {
            return Err(ActionError::TechnologyAlreadyResearched(
                technology.to_string(),
            ));
        }
        if civ.is_researching(technology) {
            return Err(ActionError::ResearchInProgress(technology.to_string()));
        }
        let missing = missing_prerequisites(tech, &civ.researched);
        if !missing.is_empty() {
            return Err(ActionError::MissingPrerequisites {
                technology: technology.to_string(),
                missing,
            });
        }
        let cost = ResourceBundle::intelligence(tech.research_cost);
        check_affordable(&civ.resources, &cost)?;

        Ok(PlannedTask {
            cost,
            turns: duration_turns(tech.research_cost, config.durations.research_divisor),
            description: format!("Researching {}", tech.name),
            action: PendingAction::Research {
                technology: tech.clone(),
            },
        })
    })
}

/// Order a new hull at the civilization's first planet, paying in minerals.
pub fn build_ship(
    world: &mut World,
    civilization: CivilizationId,
    ship_type: ShipType,
) -> Result<TaskId, ActionError> {
    enqueue(world, civilization, |civ, _galaxy, config| {
        if civ.homeworld().is_none() {
            return Err(ActionError::NoHomeworld);
        }
        let price = config.ships.costs.cost(ship_type);
        let cost = ResourceBundle::minerals(price);
        check_affordable(&civ.resources, &cost)?;

        Ok(PlannedTask {
            cost,
            turns: duration_turns(price, config.durations.construction_divisor),
            description: format!("Building {ship_type} Ship"),
            action: PendingAction::BuildShip { ship_type },
        })
    })
}

/// Send a colonization ship to an uncolonized planet. Travel time is fixed
/// from the ship's position when the order is given.
pub fn colonize_planet(
    world: &mut World,
    civilization: CivilizationId,
    planet: PlanetId,
    ship: ShipId,
) -> Result<TaskId, ActionError> {
    enqueue(world, civilization, |civ, galaxy, config| {
        let colonizer = fleet_ship(civ, ship, ShipType::Colonization)?;
        if civ.ship_committed(ship) {
            return Err(ActionError::ShipAlreadyCommitted(ship));
        }
        let target = galaxy
            .planet(planet)
            .ok_or(ActionError::UnknownPlanet(planet))?;
        if target.is_colonized() {
            return Err(ActionError::PlanetAlreadyColonized(planet));
        }
        let distance = colonizer.position.manhattan_distance(target.position());

        Ok(PlannedTask {
            cost: ResourceBundle::default(),
            turns: duration_turns(distance as i64, config.durations.colonization_divisor),
            description: format!("Colonizing {}", target.name),
            action: PendingAction::Colonize { planet, ship },
        })
    })
}

pub fn launch_attack(
    world: &mut World,
    civilization: CivilizationId,
    ship: ShipId,
    target: GridPosition,
) -> Result<TaskId, ActionError> {
    enqueue(world, civilization, |civ, galaxy, config| {
        let attacker = fleet_ship(civ, ship, ShipType::Combat)?;
        if !galaxy.contains(target) {
            return Err(ActionError::TargetOutOfBounds(target));
        }
        let distance = attacker.position.manhattan_distance(target);

        Ok(PlannedTask {
            cost: ResourceBundle::default(),
            turns: duration_turns(distance as i64, config.durations.weapon_speed),
            description: format!("Attacking {target}"),
            action: PendingAction::Attack { ship, target },
        })
    })
}

/// Apply the effect of a completed task to its owner.
pub fn resolve_action(
    civilization: &mut Civilization,
    galaxy: &mut Galaxy,
    ids: &mut IdAllocator,
    config: &GalaxyConfig,
    action: &PendingAction,
) -> ActionResolution {
    match action {
        PendingAction::Research { technology } => {
            if civilization.has_researched(&technology.name) {
                return ActionResolution::Skipped {
                    reason: format!("{} already researched", technology.name),
                };
            }
            civilization
                .researched
                .insert(technology.name.clone(), technology.clone());
            technology.apply_effects(civilization);
            ActionResolution::Researched {
                technology: technology.name.clone(),
            }
        }
        PendingAction::BuildShip { ship_type } => {
            let Some(position) = civilization
                .homeworld()
                .and_then(|id| galaxy.planet(id))
                .map(|planet| planet.position())
            else {
                return ActionResolution::Skipped {
                    reason: "no planet to launch from".to_string(),
                };
            };
            let ship = Ship::new(ids.next_ship(), *ship_type, civilization.id, position)
                .with_stats(config.ships.base_stealth, config.ships.base_speed);
            if let Err(err) = galaxy.place_ship(ship.id, position) {
                return ActionResolution::Skipped {
                    reason: err.to_string(),
                };
            }
            let resolution = ActionResolution::ShipBuilt {
                ship: ship.id,
                ship_type: ship.ship_type,
                position,
            };
            civilization.ships.push(ship);
            resolution
        }
        PendingAction::Colonize { planet, ship } => {
            let Some(target) = galaxy.planet(*planet) else {
                return ActionResolution::Skipped {
                    reason: format!("planet {planet} no longer exists"),
                };
            };
            if target.is_colonized() {
                return ActionResolution::Skipped {
                    reason: format!("planet {planet} was colonized first by another civilization"),
                };
            }
            let destination = target.position();
            let Some(mut colonizer) = civilization.remove_ship(*ship) else {
                return ActionResolution::Skipped {
                    reason: format!("ship {ship} is no longer in the fleet"),
                };
            };
            galaxy.remove_ship(colonizer.id, colonizer.position);
            colonizer.position = destination;
            if let Err(err) = galaxy.claim_planet(*planet, civilization.id) {
                civilization.ships.push(colonizer);
                return ActionResolution::Skipped {
                    reason: err.to_string(),
                };
            }
            civilization.planets.push(*planet);
            civilization.raise_visibility(config.visibility.colonization_increase);
            ActionResolution::PlanetColonized {
                planet: *planet,
                ship: colonizer.id,
                position: destination,
            }
        }
        PendingAction::Attack { ship, target } => {
            tracing::debug!(
                target: "dark_forest::actions",
                civilization = %civilization.id,
                ship = %ship,
                destination = %target,
                "attack.resolved=noop"
            );
            ActionResolution::AttackResolved {
                ship: *ship,
                target: *target,
            }
        }
    }
}
