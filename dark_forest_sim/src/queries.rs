//! Read-only helpers for populating menus. Unknown civilizations yield empty
//! lists.

use bevy::prelude::*;

use crate::{
    civilization::{Civilization, CivilizationId, CivilizationRegistry},
    fleet::Ship,
    galaxy::{Galaxy, Planet},
    technology::Technology,
};

fn with_civilization<T>(
    world: &World,
    civilization: CivilizationId,
    f: impl FnOnce(&Civilization) -> Vec<T>,
) -> Vec<T> {
    world
        .resource::<CivilizationRegistry>()
        .get(civilization)
        .map(f)
        .unwrap_or_default()
}

pub fn available_technologies(world: &World, civilization: CivilizationId) -> Vec<Technology> {
    with_civilization(world, civilization, |civ| {
        civ.available_technologies().into_iter().cloned().collect()
    })
}

pub fn uncolonized_planets(world: &World) -> Vec<Planet> {
    world
        .resource::<Galaxy>()
        .uncolonized_planets()
        .into_iter()
        .cloned()
        .collect()
}

pub fn colonization_ships(world: &World, civilization: CivilizationId) -> Vec<Ship> {
    with_civilization(world, civilization, |civ| {
        civ.colonization_ships().into_iter().cloned().collect()
    })
}

pub fn combat_ships(world: &World, civilization: CivilizationId) -> Vec<Ship> {
    with_civilization(world, civilization, |civ| {
        civ.combat_ships().into_iter().cloned().collect()
    })
}
