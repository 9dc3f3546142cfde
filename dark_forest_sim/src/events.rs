//! Notifications raised by the turn engine and the action entry points.
//!
//! Each fires exactly once per triggering occurrence. Within a single task
//! completion, the entity notification ([`ShipBuilt`] or [`PlanetColonized`])
//! is sent before [`TaskCompleted`].

use bevy::prelude::*;

use crate::{
    actions::ActionResolution,
    civilization::CivilizationId,
    fleet::{ShipId, ShipType},
    galaxy::{GridPosition, PlanetId},
    tasks::{TaskId, TaskKind},
};

#[derive(Event, Debug, Clone, PartialEq)]
pub struct TaskCreated {
    pub civilization: CivilizationId,
    pub task: TaskId,
    pub kind: TaskKind,
    pub description: String,
    pub turns: i32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct TaskCompleted {
    pub civilization: CivilizationId,
    pub task: TaskId,
    pub description: String,
    pub outcome: ActionResolution,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipBuilt {
    pub civilization: CivilizationId,
    pub ship: ShipId,
    pub ship_type: ShipType,
    pub position: GridPosition,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanetColonized {
    pub civilization: CivilizationId,
    pub planet: PlanetId,
    pub ship: ShipId,
    pub position: GridPosition,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnEnded {
    pub turn: u64,
    pub civilization: CivilizationId,
}

pub(crate) fn register_events(app: &mut App) {
    app.add_event::<TaskCreated>()
        .add_event::<TaskCompleted>()
        .add_event::<ShipBuilt>()
        .add_event::<PlanetColonized>()
        .add_event::<TurnEnded>();
}
