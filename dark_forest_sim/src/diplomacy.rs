//! Pairwise diplomacy ledger.
//!
//! Both directions of a relationship are written in the same call so that
//! `a.diplomacy[b] == b.diplomacy[a]` always holds.

use bevy::prelude::*;
use thiserror::Error;

use crate::{
    civilization::{CivilizationId, CivilizationRegistry, DiplomacyStatus},
    galaxy_config::GalaxyConfig,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DiplomacyError {
    #[error("civilization {0} is not registered")]
    UnknownCivilization(CivilizationId),
    #[error("civilization {0} cannot hold relations with itself")]
    SelfRelation(CivilizationId),
}

impl CivilizationRegistry {
    pub fn set_relation(
        &mut self,
        a: CivilizationId,
        b: CivilizationId,
        status: DiplomacyStatus,
    ) -> Result<(), DiplomacyError> {
        if a == b {
            return Err(DiplomacyError::SelfRelation(a));
        }
        for id in [a, b] {
            if !self.contains(id) {
                return Err(DiplomacyError::UnknownCivilization(id));
            }
        }
        let (first, second) = self
            .pair_mut(a, b)
            .ok_or(DiplomacyError::UnknownCivilization(b))?;
        first.diplomacy.insert(b, status);
        second.diplomacy.insert(a, status);
        tracing::info!(
            target: "dark_forest::diplomacy",
            a = %a,
            b = %b,
            status = ?status,
            "diplomacy.status_changed"
        );
        Ok(())
    }

    /// Status between two civilizations; unset pairs are neutral.
    pub fn relation(&self, a: CivilizationId, b: CivilizationId) -> DiplomacyStatus {
        self.get(a)
            .map(|civ| civ.diplomacy_with(b))
            .unwrap_or_default()
    }
}

pub fn form_alliance(
    world: &mut World,
    a: CivilizationId,
    b: CivilizationId,
) -> Result<(), DiplomacyError> {
    world
        .resource_mut::<CivilizationRegistry>()
        .set_relation(a, b, DiplomacyStatus::Allied)
}

pub fn break_alliance(
    world: &mut World,
    a: CivilizationId,
    b: CivilizationId,
) -> Result<(), DiplomacyError> {
    world
        .resource_mut::<CivilizationRegistry>()
        .set_relation(a, b, DiplomacyStatus::Neutral)
}

pub fn declare_war(
    world: &mut World,
    a: CivilizationId,
    b: CivilizationId,
) -> Result<(), DiplomacyError> {
    world
        .resource_mut::<CivilizationRegistry>()
        .set_relation(a, b, DiplomacyStatus::AtWar)
}

pub fn diplomacy_status(world: &World, a: CivilizationId, b: CivilizationId) -> DiplomacyStatus {
    world.resource::<CivilizationRegistry>().relation(a, b)
}

/// Communicating is loud: the sender's visibility rises. Message content is
/// not modelled.
pub fn send_message(
    world: &mut World,
    from: CivilizationId,
    to: CivilizationId,
) -> Result<(), DiplomacyError> {
    if from == to {
        return Err(DiplomacyError::SelfRelation(from));
    }
    let increase = world.resource::<GalaxyConfig>().visibility.message_increase;
    let mut registry = world.resource_mut::<CivilizationRegistry>();
    if !registry.contains(to) {
        return Err(DiplomacyError::UnknownCivilization(to));
    }
    let sender = registry
        .get_mut(from)
        .ok_or(DiplomacyError::UnknownCivilization(from))?;
    sender.raise_visibility(increase);
    tracing::debug!(
        target: "dark_forest::diplomacy",
        from = %from,
        to = %to,
        visibility = sender.visibility(),
        "diplomacy.message_sent"
    );
    Ok(())
}
