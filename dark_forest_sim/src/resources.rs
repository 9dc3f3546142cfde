use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{civilization::CivilizationId, fleet::ShipId, tasks::TaskId};

/// Global turn counter. Advances once per civilization turn, not per round.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnCounter(pub u64);

/// Civilization whose turn the next schedule run processes.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveCivilization(pub Option<CivilizationId>);

/// Monotonic id source for ships and tasks.
#[derive(Resource, Default, Debug, Clone)]
pub struct IdAllocator {
    next_ship: u64,
    next_task: u64,
}

impl IdAllocator {
    pub fn next_ship(&mut self) -> ShipId {
        let id = ShipId(self.next_ship);
        self.next_ship += 1;
        id
    }

    pub fn next_task(&mut self) -> TaskId {
        let id = TaskId(self.next_task);
        self.next_task += 1;
        id
    }
}

/// Random stream used by world generation.
#[derive(Resource, Debug, Clone)]
pub struct WorldGenRng(pub ChaCha8Rng);

impl WorldGenRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Random stream used by detection rolls. Kept separate from world generation
/// so extra detection queries never perturb map layout for a given seed.
#[derive(Resource, Debug, Clone)]
pub struct DetectionRng(pub ChaCha8Rng);

impl DetectionRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)))
    }
}
