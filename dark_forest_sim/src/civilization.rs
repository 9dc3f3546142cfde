use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::{
    fleet::{Ship, ShipId, ShipType},
    galaxy::{Galaxy, PlanetId},
    ledger::ResourceBundle,
    tasks::{OngoingTask, PendingAction},
    technology::{TechTree, Technology},
};

/// Identifier for a civilization participating in the turn loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CivilizationId(pub u32);

impl fmt::Display for CivilizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    Human,
    Ai,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiplomacyStatus {
    #[default]
    Neutral,
    Allied,
    AtWar,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CivilizationTraits {
    pub stealth_bonus: f64,
    pub resource_gathering_rate: f64,
    pub military_strength_modifier: f64,
}

impl Default for CivilizationTraits {
    fn default() -> Self {
        Self {
            stealth_bonus: 0.1,
            resource_gathering_rate: 1.0,
            military_strength_modifier: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Civilization {
    pub id: CivilizationId,
    pub name: String,
    pub tech_level: u32,
    visibility: f64,
    pub resources: ResourceBundle,
    pub planets: Vec<PlanetId>,
    pub ships: Vec<Ship>,
    pub diplomacy: BTreeMap<CivilizationId, DiplomacyStatus>,
    pub researched: BTreeMap<String, Technology>,
    pub tech_tree: TechTree,
    pub traits: CivilizationTraits,
    pub control: ControlType,
    pub tasks: Vec<OngoingTask>,
}

impl Civilization {
    pub fn new(
        id: CivilizationId,
        name: impl Into<String>,
        control: ControlType,
        initial_visibility: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            tech_level: 1,
            visibility: initial_visibility,
            resources: ResourceBundle::default(),
            planets: Vec::new(),
            ships: Vec::new(),
            diplomacy: BTreeMap::new(),
            researched: BTreeMap::new(),
            tech_tree: TechTree::default(),
            traits: CivilizationTraits::default(),
            control,
            tasks: Vec::new(),
        }
    }

    pub fn visibility(&self) -> f64 {
        self.visibility
    }

    /// Visibility only ever grows; non-positive amounts are ignored.
    pub fn raise_visibility(&mut self, amount: f64) {
        if amount > 0.0 {
            self.visibility += amount;
        }
    }

    /// Credit every owned planet's yield, then scale the extracted stockpile
    /// (post-gather total) by the gathering rate.
    pub fn gather(&mut self, galaxy: &Galaxy) {
        for planet_id in &self.planets {
            if let Some(planet) = galaxy.planet(*planet_id) {
                self.resources.credit(&planet.yields);
            }
        }
        self.resources
            .scale_extraction(self.traits.resource_gathering_rate);
    }

    pub fn available_technologies(&self) -> Vec<&Technology> {
        self.tech_tree.available(&self.researched).collect()
    }

    pub fn has_researched(&self, name: &str) -> bool {
        self.researched.contains_key(name)
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.id == id)
    }

    pub fn remove_ship(&mut self, id: ShipId) -> Option<Ship> {
        let index = self.ships.iter().position(|ship| ship.id == id)?;
        Some(self.ships.remove(index))
    }

    pub fn ships_of_type(&self, ship_type: ShipType) -> Vec<&Ship> {
        self.ships
            .iter()
            .filter(|ship| ship.ship_type == ship_type)
            .collect()
    }

    pub fn colonization_ships(&self) -> Vec<&Ship> {
        self.ships_of_type(ShipType::Colonization)
    }

    pub fn combat_ships(&self) -> Vec<&Ship> {
        self.ships_of_type(ShipType::Combat)
    }

    pub fn homeworld(&self) -> Option<PlanetId> {
        self.planets.first().copied()
    }

    pub fn diplomacy_with(&self, other: CivilizationId) -> DiplomacyStatus {
        self.diplomacy.get(&other).copied().unwrap_or_default()
    }

    /// True while an unfinished research task for `technology` is queued.
    pub fn is_researching(&self, technology: &str) -> bool {
        self.tasks.iter().any(|task| {
            !task.is_completed()
                && matches!(&task.action, PendingAction::Research { technology: tech } if tech.name == technology)
        })
    }

    /// True while an unfinished colonization task has claimed `ship`.
    pub fn ship_committed(&self, ship: ShipId) -> bool {
        self.tasks.iter().any(|task| {
            !task.is_completed()
                && matches!(task.action, PendingAction::Colonize { ship: committed, .. } if committed == ship)
        })
    }
}

/// Every civilization in the galaxy, in registration (turn) order.
#[derive(Resource, Debug, Clone, Default)]
pub struct CivilizationRegistry {
    civilizations: Vec<Civilization>,
}

impl CivilizationRegistry {
    pub fn insert(&mut self, civilization: Civilization) {
        match self.index_of(civilization.id) {
            Some(index) => self.civilizations[index] = civilization,
            None => self.civilizations.push(civilization),
        }
    }

    fn index_of(&self, id: CivilizationId) -> Option<usize> {
        self.civilizations.iter().position(|civ| civ.id == id)
    }

    pub fn get(&self, id: CivilizationId) -> Option<&Civilization> {
        self.civilizations.iter().find(|civ| civ.id == id)
    }

    pub fn get_mut(&mut self, id: CivilizationId) -> Option<&mut Civilization> {
        self.civilizations.iter_mut().find(|civ| civ.id == id)
    }

    pub fn contains(&self, id: CivilizationId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Civilization> {
        self.civilizations.iter()
    }

    pub fn ids(&self) -> Vec<CivilizationId> {
        self.civilizations.iter().map(|civ| civ.id).collect()
    }

    pub fn len(&self) -> usize {
        self.civilizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.civilizations.is_empty()
    }

    pub fn next_id(&self) -> CivilizationId {
        CivilizationId(
            self.civilizations
                .iter()
                .map(|civ| civ.id.0 + 1)
                .max()
                .unwrap_or(0),
        )
    }

    /// Mutable access to two distinct civilizations at once.
    pub fn pair_mut(
        &mut self,
        a: CivilizationId,
        b: CivilizationId,
    ) -> Option<(&mut Civilization, &mut Civilization)> {
        let first = self.index_of(a)?;
        let second = self.index_of(b)?;
        if first == second {
            return None;
        }
        if first < second {
            let (head, tail) = self.civilizations.split_at_mut(second);
            Some((&mut head[first], &mut tail[0]))
        } else {
            let (head, tail) = self.civilizations.split_at_mut(first);
            Some((&mut tail[0], &mut head[second]))
        }
    }
}
