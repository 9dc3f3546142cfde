//! Deferred actions queued by the action entry points.
//!
//! A task owns a closed [`PendingAction`] payload instead of an arbitrary
//! callback; the turn engine dispatches the payload once the countdown ends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    fleet::{ShipId, ShipType},
    galaxy::{GridPosition, PlanetId},
    technology::Technology,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Research,
    BuildShip,
    Colonize,
    Attack,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Research { technology: Technology },
    BuildShip { ship_type: ShipType },
    Colonize { planet: PlanetId, ship: ShipId },
    Attack { ship: ShipId, target: GridPosition },
}

impl PendingAction {
    pub fn kind(&self) -> TaskKind {
        match self {
            PendingAction::Research { .. } => TaskKind::Research,
            PendingAction::BuildShip { .. } => TaskKind::BuildShip,
            PendingAction::Colonize { .. } => TaskKind::Colonize,
            PendingAction::Attack { .. } => TaskKind::Attack,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskProgress {
    InProgress { turns_remaining: i32 },
    /// Returned by the single call that brought the countdown to zero.
    Completed,
    AlreadyCompleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OngoingTask {
    pub id: TaskId,
    pub description: String,
    turns_remaining: i32,
    pub action: PendingAction,
    completed: bool,
}

impl OngoingTask {
    /// Durations below one turn are clamped to one.
    pub fn new(
        id: TaskId,
        description: impl Into<String>,
        turns: i32,
        action: PendingAction,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            turns_remaining: turns.max(1),
            action,
            completed: false,
        }
    }

    pub fn turns_remaining(&self) -> i32 {
        self.turns_remaining
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn kind(&self) -> TaskKind {
        self.action.kind()
    }

    pub fn advance(&mut self) -> TaskProgress {
        if self.completed {
            return TaskProgress::AlreadyCompleted;
        }
        self.turns_remaining -= 1;
        if self.turns_remaining <= 0 {
            self.completed = true;
            TaskProgress::Completed
        } else {
            TaskProgress::InProgress {
                turns_remaining: self.turns_remaining,
            }
        }
    }
}

/// `max(1, amount / divisor)` with a zero divisor treated as one.
pub fn duration_turns(amount: i64, divisor: i64) -> i32 {
    let turns = amount / divisor.max(1);
    turns.clamp(1, i32::MAX as i64) as i32
}
