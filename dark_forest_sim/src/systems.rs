use bevy::prelude::*;

use crate::{
    actions::{resolve_action, ActionResolution},
    civilization::CivilizationRegistry,
    events::{PlanetColonized, ShipBuilt, TaskCompleted, TurnEnded},
    galaxy::Galaxy,
    galaxy_config::GalaxyConfig,
    resources::{ActiveCivilization, IdAllocator, TurnCounter},
    tasks::TaskProgress,
};

/// Run condition: a civilization has been marked active for this update.
pub fn civilization_turn_active(active: Res<ActiveCivilization>) -> bool {
    active.0.is_some()
}

/// Credit planet yields to the active civilization and apply its gathering rate.
pub fn gather_resources(
    active: Res<ActiveCivilization>,
    galaxy: Res<Galaxy>,
    mut registry: ResMut<CivilizationRegistry>,
) {
    let Some(civ) = active.0.and_then(|id| registry.get_mut(id)) else {
        return;
    };
    let before = civ.resources;
    civ.gather(&galaxy);
    tracing::debug!(
        target: "dark_forest::turn",
        civilization = %civ.id,
        before = %before,
        after = %civ.resources,
        "resources.gathered"
    );
}

/// Count down the active civilization's tasks in reverse index order,
/// dispatching and removing every task that reaches zero.
#[allow(clippy::too_many_arguments)]
pub fn advance_tasks(
    active: Res<ActiveCivilization>,
    config: Res<GalaxyConfig>,
    mut registry: ResMut<CivilizationRegistry>,
    mut galaxy: ResMut<Galaxy>,
    mut ids: ResMut<IdAllocator>,
    mut completed: EventWriter<TaskCompleted>,
    mut ships_built: EventWriter<ShipBuilt>,
    mut colonized: EventWriter<PlanetColonized>,
) {
    let Some(civ) = active.0.and_then(|id| registry.get_mut(id)) else {
        return;
    };

    let mut index = civ.tasks.len();
    while index > 0 {
        index -= 1;
        let progress = civ.tasks[index].advance();
        if let TaskProgress::InProgress { .. } = progress {
            continue;
        }

        let task = civ.tasks.remove(index);
        if progress == TaskProgress::AlreadyCompleted {
            continue;
        }

        let outcome = resolve_action(civ, &mut galaxy, &mut ids, &config, &task.action);
        match outcome {
            ActionResolution::ShipBuilt {
                ship,
                ship_type,
                position,
            } => {
                ships_built.send(ShipBuilt {
                    civilization: civ.id,
                    ship,
                    ship_type,
                    position,
                });
            }
            ActionResolution::PlanetColonized {
                planet,
                ship,
                position,
            } => {
                colonized.send(PlanetColonized {
                    civilization: civ.id,
                    planet,
                    ship,
                    position,
                });
            }
            ActionResolution::Skipped { ref reason } => {
                tracing::warn!(
                    target: "dark_forest::turn",
                    civilization = %civ.id,
                    task = %task.id,
                    reason = %reason,
                    "task.skipped"
                );
            }
            ActionResolution::Researched { .. } | ActionResolution::AttackResolved { .. } => {}
        }

        tracing::info!(
            target: "dark_forest::turn",
            civilization = %civ.id,
            task = %task.id,
            "task.completed={}",
            task.description
        );
        completed.send(TaskCompleted {
            civilization: civ.id,
            task: task.id,
            description: task.description,
            outcome,
        });
    }
}

/// Extension point for cross-civilization effects. Runs once per
/// civilization turn after its own tasks; performs no resolution itself.
pub fn resolve_interactions(active: Res<ActiveCivilization>, registry: Res<CivilizationRegistry>) {
    if let Some(civ) = active.0.and_then(|id| registry.get(id)) {
        tracing::trace!(
            target: "dark_forest::turn",
            civilization = %civ.id,
            neighbours = registry.len().saturating_sub(1),
            "interactions.resolved=none"
        );
    }
}

pub fn end_turn(
    active: Res<ActiveCivilization>,
    mut counter: ResMut<TurnCounter>,
    mut ended: EventWriter<TurnEnded>,
) {
    let Some(civilization) = active.0 else {
        return;
    };
    counter.0 += 1;
    ended.send(TurnEnded {
        turn: counter.0,
        civilization,
    });
    tracing::debug!(
        target: "dark_forest::turn",
        turn = counter.0,
        civilization = %civilization,
        "turn.ended"
    );
}
