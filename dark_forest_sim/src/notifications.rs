//! Channel bridge for presentation layers running on another thread.
//!
//! When a [`NotificationFeed`] resource is present, every simulation event is
//! copied into a crossbeam channel as a [`Notification`].

use bevy::prelude::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use crate::{
    actions::ActionResolution,
    civilization::CivilizationId,
    events::{PlanetColonized, ShipBuilt, TaskCompleted, TaskCreated, TurnEnded},
    fleet::{ShipId, ShipType},
    galaxy::{GridPosition, PlanetId},
    tasks::{TaskId, TaskKind},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    TaskCreated {
        civilization: CivilizationId,
        task: TaskId,
        kind: TaskKind,
        description: String,
        turns: i32,
    },
    TaskCompleted {
        civilization: CivilizationId,
        task: TaskId,
        description: String,
        outcome: ActionResolution,
    },
    ShipBuilt {
        civilization: CivilizationId,
        ship: ShipId,
        ship_type: ShipType,
        position: GridPosition,
    },
    PlanetColonized {
        civilization: CivilizationId,
        planet: PlanetId,
        ship: ShipId,
        position: GridPosition,
    },
    TurnEnded {
        turn: u64,
        civilization: CivilizationId,
    },
}

#[derive(Resource, Clone)]
pub struct NotificationFeed {
    sender: Sender<Notification>,
}

impl NotificationFeed {
    pub fn channel() -> (Self, Receiver<Notification>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }

    fn publish(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::trace!(
                target: "dark_forest::notifications",
                "notification.dropped=receiver_closed"
            );
        }
    }
}

/// Forward pending events in the order a presenter expects: creations,
/// entity changes, completions, then the end-of-turn marker.
pub fn forward_notifications(
    feed: Res<NotificationFeed>,
    mut created: EventReader<TaskCreated>,
    mut ships: EventReader<ShipBuilt>,
    mut colonized: EventReader<PlanetColonized>,
    mut completed: EventReader<TaskCompleted>,
    mut ended: EventReader<TurnEnded>,
) {
    for event in created.read() {
        feed.publish(Notification::TaskCreated {
            civilization: event.civilization,
            task: event.task,
            kind: event.kind,
            description: event.description.clone(),
            turns: event.turns,
        });
    }
    for event in ships.read() {
        feed.publish(Notification::ShipBuilt {
            civilization: event.civilization,
            ship: event.ship,
            ship_type: event.ship_type,
            position: event.position,
        });
    }
    for event in colonized.read() {
        feed.publish(Notification::PlanetColonized {
            civilization: event.civilization,
            planet: event.planet,
            ship: event.ship,
            position: event.position,
        });
    }
    for event in completed.read() {
        feed.publish(Notification::TaskCompleted {
            civilization: event.civilization,
            task: event.task,
            description: event.description.clone(),
            outcome: event.outcome.clone(),
        });
    }
    for event in ended.read() {
        feed.publish(Notification::TurnEnded {
            turn: event.turn,
            civilization: event.civilization,
        });
    }
}
