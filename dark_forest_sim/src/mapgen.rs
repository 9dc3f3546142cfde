//! World generation and setup helpers.
//!
//! Neutral planets are scattered first, then each civilization is founded with
//! a homeworld on a random free cell. Every draw comes from [`WorldGenRng`] so
//! a seed reproduces the same galaxy.

use bevy::prelude::*;
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

use crate::{
    civilization::{
        Civilization, CivilizationId, CivilizationRegistry, CivilizationTraits, ControlType,
    },
    fleet::{Ship, ShipId, ShipType},
    galaxy::{Galaxy, GalaxyError, GridPosition, PlanetId},
    galaxy_config::{GalaxyConfig, GridConfig, YieldRange},
    ledger::ResourceBundle,
    resources::{IdAllocator, WorldGenRng},
    technology::{TechnologyCatalog, TechnologyCatalogError},
};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no free cell left in the galaxy")]
    GalaxyFull,
    #[error(transparent)]
    Galaxy(#[from] GalaxyError),
    #[error("technology catalog is invalid: {0}")]
    Catalog(#[from] TechnologyCatalogError),
    #[error("civilization {0} is not registered")]
    UnknownCivilization(CivilizationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworldSite {
    Random,
    At(GridPosition),
}

/// Founding parameters for one civilization.
#[derive(Debug, Clone)]
pub struct CivilizationCharter {
    pub name: String,
    pub control: ControlType,
    pub starting_resources: ResourceBundle,
    pub traits: CivilizationTraits,
    pub homeworld: Option<HomeworldSite>,
}

impl CivilizationCharter {
    pub fn new(name: impl Into<String>, control: ControlType) -> Self {
        Self {
            name: name.into(),
            control,
            starting_resources: ResourceBundle::default(),
            traits: CivilizationTraits::default(),
            homeworld: Some(HomeworldSite::Random),
        }
    }

    pub fn human(index: u32, config: &GalaxyConfig) -> Self {
        Self::new(format!("Player {index} Civilization"), ControlType::Human)
            .with_resources(config.civilizations.human_starting_resources)
            .with_traits(config.civilizations.traits)
    }

    pub fn ai(index: u32, config: &GalaxyConfig) -> Self {
        Self::new(format!("AI Civilization {index}"), ControlType::Ai)
            .with_resources(config.civilizations.ai_starting_resources)
            .with_traits(config.civilizations.traits)
    }

    pub fn with_resources(mut self, resources: ResourceBundle) -> Self {
        self.starting_resources = resources;
        self
    }

    pub fn with_traits(mut self, traits: CivilizationTraits) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_homeworld(mut self, site: HomeworldSite) -> Self {
        self.homeworld = Some(site);
        self
    }

    pub fn without_homeworld(mut self) -> Self {
        self.homeworld = None;
        self
    }
}

pub fn roll_yield<R: Rng + ?Sized>(range: YieldRange, rng: &mut R) -> i64 {
    if range.max <= range.min {
        range.min
    } else {
        rng.gen_range(range.min..range.max)
    }
}

pub fn random_free_cell<R: Rng + ?Sized>(galaxy: &Galaxy, rng: &mut R) -> Option<GridPosition> {
    galaxy.free_cells().choose(rng).copied()
}

/// Empty grid scattered with uncolonized planets named `Planet 1..=n`.
pub fn generate_galaxy<R: Rng + ?Sized>(
    config: &GalaxyConfig,
    rng: &mut R,
) -> Result<Galaxy, SetupError> {
    let grid = &config.grid;
    let mut galaxy = Galaxy::new(grid.width, grid.height);
    for index in 1..=grid.planet_count {
        let position = random_free_cell(&galaxy, rng).ok_or(SetupError::GalaxyFull)?;
        let yields = ResourceBundle::new(
            roll_yield(grid.planet_minerals, rng),
            roll_yield(grid.planet_energy, rng),
            0,
        );
        galaxy.add_planet(format!("Planet {index}"), yields, position)?;
    }
    Ok(galaxy)
}

pub fn found_civilization(
    id: CivilizationId,
    charter: &CivilizationCharter,
    catalog: &TechnologyCatalog,
    config: &GalaxyConfig,
) -> Civilization {
    let mut civilization = Civilization::new(
        id,
        charter.name.clone(),
        charter.control,
        config.visibility.initial,
    );
    civilization.resources = charter.starting_resources;
    civilization.traits = charter.traits;
    civilization.tech_tree = catalog.tech_tree();
    civilization
}

/// Place an already-colonized homeworld owned by `civilization`.
pub fn place_homeworld<R: Rng + ?Sized>(
    galaxy: &mut Galaxy,
    civilization: &Civilization,
    site: HomeworldSite,
    grid: &GridConfig,
    rng: &mut R,
) -> Result<PlanetId, SetupError> {
    let position = match site {
        HomeworldSite::Random => random_free_cell(galaxy, rng).ok_or(SetupError::GalaxyFull)?,
        HomeworldSite::At(position) => position,
    };
    let yields = ResourceBundle::new(
        roll_yield(grid.homeworld_minerals, rng),
        roll_yield(grid.homeworld_energy, rng),
        0,
    );
    let planet = galaxy.add_planet(format!("{} Homeworld", civilization.name), yields, position)?;
    galaxy.claim_planet(planet, civilization.id)?;
    Ok(planet)
}

pub fn spawn_civilization(
    world: &mut World,
    charter: CivilizationCharter,
) -> Result<CivilizationId, SetupError> {
    let id = world.resource::<CivilizationRegistry>().next_id();
    let mut civilization = found_civilization(
        id,
        &charter,
        world.resource::<TechnologyCatalog>(),
        world.resource::<GalaxyConfig>(),
    );

    if let Some(site) = charter.homeworld {
        let grid = world.resource::<GalaxyConfig>().grid.clone();
        let homeworld = world.resource_scope(|world, mut galaxy: Mut<Galaxy>| {
            let mut rng = world.resource_mut::<WorldGenRng>();
            place_homeworld(&mut galaxy, &civilization, site, &grid, &mut rng.0)
        })?;
        civilization.planets.push(homeworld);
    }

    tracing::info!(
        target: "dark_forest::setup",
        civilization = %id,
        name = %civilization.name,
        control = ?civilization.control,
        homeworld = ?civilization.homeworld(),
        "civilization.founded"
    );
    world
        .resource_mut::<CivilizationRegistry>()
        .insert(civilization);
    Ok(id)
}

/// Add a planet at `position`, optionally already colonized by `owner`.
pub fn spawn_planet(
    world: &mut World,
    name: impl Into<String>,
    yields: ResourceBundle,
    position: GridPosition,
    owner: Option<CivilizationId>,
) -> Result<PlanetId, SetupError> {
    if let Some(owner) = owner {
        if !world.resource::<CivilizationRegistry>().contains(owner) {
            return Err(SetupError::UnknownCivilization(owner));
        }
    }
    let planet = {
        let mut galaxy = world.resource_mut::<Galaxy>();
        let planet = galaxy.add_planet(name, yields, position)?;
        if let Some(owner) = owner {
            galaxy.claim_planet(planet, owner)?;
        }
        planet
    };
    if let Some(owner) = owner {
        if let Some(civ) = world.resource_mut::<CivilizationRegistry>().get_mut(owner) {
            civ.planets.push(planet);
        }
    }
    Ok(planet)
}

/// Commission a ship directly, outside the build queue.
pub fn spawn_ship(
    world: &mut World,
    owner: CivilizationId,
    ship_type: ShipType,
    position: GridPosition,
) -> Result<ShipId, SetupError> {
    if !world.resource::<CivilizationRegistry>().contains(owner) {
        return Err(SetupError::UnknownCivilization(owner));
    }
    if !world.resource::<Galaxy>().contains(position) {
        return Err(GalaxyError::OutOfBounds(position).into());
    }
    let (stealth, speed) = {
        let ships = &world.resource::<GalaxyConfig>().ships;
        (ships.base_stealth, ships.base_speed)
    };
    let id = world.resource_mut::<IdAllocator>().next_ship();
    world.resource_mut::<Galaxy>().place_ship(id, position)?;
    let ship = Ship::new(id, ship_type, owner, position).with_stats(stealth, speed);
    if let Some(civ) = world.resource_mut::<CivilizationRegistry>().get_mut(owner) {
        civ.ships.push(ship);
    }
    Ok(id)
}

/// Scatter neutral planets, then found the configured human and AI
/// civilizations in that order.
pub fn populate_world(world: &mut World) -> Result<(), SetupError> {
    let config = world.resource::<GalaxyConfig>().clone();
    let galaxy = {
        let mut rng = world.resource_mut::<WorldGenRng>();
        generate_galaxy(&config, &mut rng.0)?
    };
    world.insert_resource(galaxy);

    for index in 1..=config.civilizations.human_count {
        spawn_civilization(world, CivilizationCharter::human(index, &config))?;
    }
    for index in 1..=config.civilizations.ai_count {
        spawn_civilization(world, CivilizationCharter::ai(index, &config))?;
    }
    Ok(())
}
