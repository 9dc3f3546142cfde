use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{civilization::CivilizationId, galaxy::GridPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(pub u64);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipType {
    Exploration,
    Combat,
    Espionage,
    Colonization,
}

impl ShipType {
    pub const ALL: [ShipType; 4] = [
        ShipType::Exploration,
        ShipType::Combat,
        ShipType::Espionage,
        ShipType::Colonization,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShipType::Exploration => "Exploration",
            ShipType::Combat => "Combat",
            ShipType::Espionage => "Espionage",
            ShipType::Colonization => "Colonization",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: ShipId,
    pub name: String,
    pub ship_type: ShipType,
    pub stealth: f64,
    pub speed: f64,
    pub owner: CivilizationId,
    pub position: GridPosition,
}

impl Ship {
    pub fn new(
        id: ShipId,
        ship_type: ShipType,
        owner: CivilizationId,
        position: GridPosition,
    ) -> Self {
        Self {
            id,
            name: format!("{ship_type} Ship"),
            ship_type,
            stealth: 1.0,
            speed: 1.0,
            owner,
            position,
        }
    }

    pub fn with_stats(mut self, stealth: f64, speed: f64) -> Self {
        self.stealth = stealth;
        self.speed = speed;
        self
    }
}
