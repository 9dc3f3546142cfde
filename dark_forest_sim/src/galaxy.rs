//! Fixed-size grid of star systems.
//!
//! Each cell hosts at most one [`Planet`] and any number of ships. Planets are
//! owned by the [`Galaxy`] and never move, so the coordinates a planet reports
//! always match the cell that references it.

use std::fmt;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{civilization::CivilizationId, fleet::ShipId, ledger::ResourceBundle};

/// Integer coordinates of a grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: u32,
    pub y: u32,
}

impl GridPosition {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(self, other: GridPosition) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanetId(pub u32);

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    id: PlanetId,
    pub name: String,
    /// Per-turn yield credited to the owner while gathering.
    pub yields: ResourceBundle,
    colonized: bool,
    owner: Option<CivilizationId>,
    position: GridPosition,
}

impl Planet {
    pub fn id(&self) -> PlanetId {
        self.id
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn is_colonized(&self) -> bool {
        self.colonized
    }

    pub fn owner(&self) -> Option<CivilizationId> {
        self.owner
    }
}

#[derive(Debug, Clone, Default)]
pub struct GalaxyCell {
    pub position: GridPosition,
    pub planet: Option<PlanetId>,
    pub ships: Vec<ShipId>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GalaxyError {
    #[error("position {0} is outside the galaxy")]
    OutOfBounds(GridPosition),
    #[error("cell {position} already hosts planet {occupant}")]
    CellOccupied {
        position: GridPosition,
        occupant: PlanetId,
    },
    #[error("planet {0} does not exist")]
    UnknownPlanet(PlanetId),
}

/// The galaxy grid plus every planet placed on it.
#[derive(Resource, Debug, Clone)]
pub struct Galaxy {
    width: u32,
    height: u32,
    cells: Vec<GalaxyCell>,
    planets: Vec<Planet>,
}

fn cell_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl Galaxy {
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity(cell_count(width, height));
        for y in 0..height {
            for x in 0..width {
                cells.push(GalaxyCell {
                    position: GridPosition::new(x, y),
                    ..Default::default()
                });
            }
        }
        Self {
            width,
            height,
            cells,
            planets: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: GridPosition) -> bool {
        position.x < self.width && position.y < self.height
    }

    #[inline]
    fn index(&self, position: GridPosition) -> Option<usize> {
        if self.contains(position) {
            Some((position.y * self.width + position.x) as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, position: GridPosition) -> Option<&GalaxyCell> {
        self.index(position).and_then(|idx| self.cells.get(idx))
    }

    fn cell_mut(&mut self, position: GridPosition) -> Option<&mut GalaxyCell> {
        self.index(position).and_then(|idx| self.cells.get_mut(idx))
    }

    pub fn cells(&self) -> impl Iterator<Item = &GalaxyCell> {
        self.cells.iter()
    }

    /// Cells without a planet, in row-major order.
    pub fn free_cells(&self) -> Vec<GridPosition> {
        self.cells
            .iter()
            .filter(|cell| cell.planet.is_none())
            .map(|cell| cell.position)
            .collect()
    }

    /// Place a new, uncolonized planet on an empty cell.
    pub fn add_planet(
        &mut self,
        name: impl Into<String>,
        yields: ResourceBundle,
        position: GridPosition,
    ) -> Result<PlanetId, GalaxyError> {
        let id = PlanetId(self.planets.len() as u32);
        let cell = self
            .cell_mut(position)
            .ok_or(GalaxyError::OutOfBounds(position))?;
        if let Some(occupant) = cell.planet {
            return Err(GalaxyError::CellOccupied { position, occupant });
        }
        cell.planet = Some(id);
        self.planets.push(Planet {
            id,
            name: name.into(),
            yields,
            colonized: false,
            owner: None,
            position,
        });
        Ok(id)
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id.0 as usize)
    }

    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.get_mut(id.0 as usize)
    }

    pub fn planets(&self) -> impl Iterator<Item = &Planet> {
        self.planets.iter()
    }

    pub fn uncolonized_planets(&self) -> Vec<&Planet> {
        self.planets.iter().filter(|p| !p.colonized).collect()
    }

    /// Mark a planet colonized and owned by `owner`.
    pub fn claim_planet(&mut self, id: PlanetId, owner: CivilizationId) -> Result<(), GalaxyError> {
        let planet = self.planet_mut(id).ok_or(GalaxyError::UnknownPlanet(id))?;
        planet.colonized = true;
        planet.owner = Some(owner);
        Ok(())
    }

    pub fn place_ship(&mut self, ship: ShipId, position: GridPosition) -> Result<(), GalaxyError> {
        let cell = self
            .cell_mut(position)
            .ok_or(GalaxyError::OutOfBounds(position))?;
        if !cell.ships.contains(&ship) {
            cell.ships.push(ship);
        }
        Ok(())
    }

    pub fn remove_ship(&mut self, ship: ShipId, position: GridPosition) {
        if let Some(cell) = self.cell_mut(position) {
            cell.ships.retain(|id| *id != ship);
        }
    }
}
