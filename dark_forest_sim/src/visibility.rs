//! Detection model.
//!
//! A civilization's visibility score is a scalar proxy for how loud it is.
//! Every detection query is an independent Bernoulli trial: a uniform sample
//! in `[0, 100)` is compared against the detection chance. Nothing is cached.

use bevy::prelude::*;
use rand::Rng;
use thiserror::Error;

use crate::{
    civilization::{Civilization, CivilizationId, CivilizationRegistry},
    galaxy_config::{GalaxyConfig, VisibilityConfig},
    resources::DetectionRng,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DetectionError {
    #[error("civilization {0} is not registered")]
    UnknownCivilization(CivilizationId),
}

/// Raw detection score in percent. May fall outside `[0, 100]`; the roll
/// treats anything at or below zero as never and at or above 100 as always.
pub fn detection_chance(
    observer: &Civilization,
    target: &Civilization,
    config: &VisibilityConfig,
) -> f64 {
    target.visibility() - observer.tech_level as f64 * config.tech_level_factor
        + observer.traits.stealth_bonus
}

/// One fresh trial against `chance`.
pub fn roll_detection<R: Rng + ?Sized>(chance: f64, rng: &mut R) -> bool {
    rng.gen::<f64>() * 100.0 < chance
}

pub fn detect<R: Rng + ?Sized>(
    observer: &Civilization,
    target: &Civilization,
    config: &VisibilityConfig,
    rng: &mut R,
) -> bool {
    roll_detection(detection_chance(observer, target, config), rng)
}

/// Roll whether `observer` perceives `target`, drawing from the world's
/// [`DetectionRng`].
pub fn detect_civilization(
    world: &mut World,
    observer: CivilizationId,
    target: CivilizationId,
) -> Result<bool, DetectionError> {
    let chance = {
        let registry = world.resource::<CivilizationRegistry>();
        let observer_civ = registry
            .get(observer)
            .ok_or(DetectionError::UnknownCivilization(observer))?;
        let target_civ = registry
            .get(target)
            .ok_or(DetectionError::UnknownCivilization(target))?;
        detection_chance(
            observer_civ,
            target_civ,
            &world.resource::<GalaxyConfig>().visibility,
        )
    };

    let detected = roll_detection(chance, &mut world.resource_mut::<DetectionRng>().0);
    tracing::debug!(
        target: "dark_forest::visibility",
        observer = %observer,
        target_civ = %target,
        chance,
        detected,
        "detection.rolled"
    );
    Ok(detected)
}
