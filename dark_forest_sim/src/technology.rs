use std::collections::{BTreeMap, HashSet};

use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

use crate::civilization::Civilization;

pub const BUILTIN_TECHNOLOGY_CATALOG: &str = include_str!("data/technologies.json");

/// Effect applied to the researching civilization once research completes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TechnologyEffect {
    TechLevel { delta: u32 },
    StealthBonus { delta: f64 },
    GatheringRate { delta: f64 },
    MilitaryStrength { delta: f64 },
}

impl TechnologyEffect {
    pub fn apply(&self, civilization: &mut Civilization) {
        match *self {
            TechnologyEffect::TechLevel { delta } => civilization.tech_level += delta,
            TechnologyEffect::StealthBonus { delta } => civilization.traits.stealth_bonus += delta,
            TechnologyEffect::GatheringRate { delta } => {
                civilization.traits.resource_gathering_rate += delta
            }
            TechnologyEffect::MilitaryStrength { delta } => {
                civilization.traits.military_strength_modifier += delta
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Technology {
    pub name: String,
    pub description: String,
    pub research_cost: i64,
    pub prerequisites: Vec<String>,
    pub effects: Vec<TechnologyEffect>,
    pub unique: bool,
}

impl Technology {
    pub fn new(name: impl Into<String>, description: impl Into<String>, research_cost: i64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            research_cost,
            prerequisites: Vec::new(),
            effects: Vec::new(),
            unique: false,
        }
    }

    pub fn with_prerequisite(mut self, name: impl Into<String>) -> Self {
        self.prerequisites.push(name.into());
        self
    }

    pub fn with_effect(mut self, effect: TechnologyEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn apply_effects(&self, civilization: &mut Civilization) {
        for effect in &self.effects {
            effect.apply(civilization);
        }
    }
}

/// Per-civilization mapping of researchable technologies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechTree {
    technologies: BTreeMap<String, Technology>,
}

impl TechTree {
    pub fn add_technology(&mut self, technology: Technology) {
        self.technologies
            .insert(technology.name.clone(), technology);
    }

    pub fn get(&self, name: &str) -> Option<&Technology> {
        self.technologies.get(name)
    }

    pub fn technologies(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.values()
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }

    /// Technologies not yet researched whose prerequisites are all researched.
    pub fn available<'a>(
        &'a self,
        researched: &'a BTreeMap<String, Technology>,
    ) -> impl Iterator<Item = &'a Technology> + 'a {
        self.technologies.values().filter(move |technology| {
            !researched.contains_key(&technology.name)
                && missing_prerequisites(technology, researched).is_empty()
        })
    }
}

pub fn missing_prerequisites(
    technology: &Technology,
    researched: &BTreeMap<String, Technology>,
) -> Vec<String> {
    technology
        .prerequisites
        .iter()
        .filter(|name| !researched.contains_key(name.as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Error)]
pub enum TechnologyCatalogError {
    #[error("failed to parse technology catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate technology '{0}'")]
    DuplicateTechnology(String),
    #[error("technology '{technology}' requires unknown technology '{prerequisite}'")]
    UnknownPrerequisite {
        technology: String,
        prerequisite: String,
    },
}

/// Authored technology definitions. Every civilization receives its own
/// [`TechTree`] built from the catalog at founding time.
#[derive(Resource, Debug, Clone, Default)]
pub struct TechnologyCatalog {
    technologies: Vec<Technology>,
}

impl TechnologyCatalog {
    pub fn load_builtin() -> Result<Self, TechnologyCatalogError> {
        Self::load_from_str(BUILTIN_TECHNOLOGY_CATALOG)
    }

    pub fn load_from_str(json: &str) -> Result<Self, TechnologyCatalogError> {
        let catalog: TechnologyCatalogFile = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        for entry in &catalog.technologies {
            if !seen.insert(entry.name.clone()) {
                return Err(TechnologyCatalogError::DuplicateTechnology(
                    entry.name.clone(),
                ));
            }
        }
        for entry in &catalog.technologies {
            if let Some(prerequisite) = entry
                .prerequisites
                .iter()
                .find(|name| !seen.contains(name.as_str()))
            {
                return Err(TechnologyCatalogError::UnknownPrerequisite {
                    technology: entry.name.clone(),
                    prerequisite: prerequisite.clone(),
                });
            }
        }

        let technologies = catalog
            .technologies
            .into_iter()
            .map(|entry| Technology {
                name: entry.name,
                description: entry.description.unwrap_or_default(),
                research_cost: entry.research_cost,
                prerequisites: entry.prerequisites,
                effects: entry.effects,
                unique: entry.unique,
            })
            .collect();

        Ok(Self { technologies })
    }

    pub fn technologies(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.iter()
    }

    pub fn tech_tree(&self) -> TechTree {
        let mut tree = TechTree::default();
        for technology in &self.technologies {
            tree.add_technology(technology.clone());
        }
        tree
    }
}

#[derive(Deserialize)]
struct TechnologyCatalogFile {
    technologies: Vec<TechnologyCatalogEntry>,
}

#[derive(Deserialize)]
struct TechnologyCatalogEntry {
    name: String,
    #[serde(default)]
    description: Option<String>,
    research_cost: i64,
    #[serde(default)]
    prerequisites: Vec<String>,
    #[serde(default)]
    effects: Vec<TechnologyEffect>,
    #[serde(default)]
    unique: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn researched(names: &[&str]) -> BTreeMap<String, Technology> {
        names
            .iter()
            .map(|name| (name.to_string(), Technology::new(*name, "", 0)))
            .collect()
    }

    #[test]
    fn builtin_catalog_parses() {
        let catalog = TechnologyCatalog::load_builtin().expect("catalog parses");
        let spaceflight = catalog
            .technologies()
            .find(|tech| tech.name == "Basic Spaceflight")
            .expect("basic spaceflight is authored");
        assert_eq!(spaceflight.research_cost, 100);
        assert!(spaceflight.prerequisites.is_empty());
        assert_eq!(
            spaceflight.effects,
            vec![TechnologyEffect::TechLevel { delta: 1 }]
        );
    }

    #[test]
    fn availability_requires_every_prerequisite() {
        let mut tree = TechTree::default();
        tree.add_technology(Technology::new("Root", "", 100));
        tree.add_technology(Technology::new("Left", "", 100).with_prerequisite("Root"));
        tree.add_technology(
            Technology::new("Capstone", "", 100)
                .with_prerequisite("Left")
                .with_prerequisite("Root"),
        );

        let names = |done: &BTreeMap<String, Technology>| -> Vec<String> {
            tree.available(done).map(|tech| tech.name.clone()).collect()
        };

        assert_eq!(names(&researched(&[])), vec!["Root".to_string()]);
        assert_eq!(names(&researched(&["Root"])), vec!["Left".to_string()]);
        assert_eq!(
            names(&researched(&["Root", "Left"])),
            vec!["Capstone".to_string()]
        );
        assert!(names(&researched(&["Root", "Left", "Capstone"])).is_empty());
    }

    #[test]
    fn duplicate_and_dangling_entries_are_rejected() {
        let duplicate = r#"{"technologies": [
            {"name": "A", "research_cost": 10},
            {"name": "A", "research_cost": 20}
        ]}"#;
        assert!(matches!(
            TechnologyCatalog::load_from_str(duplicate),
            Err(TechnologyCatalogError::DuplicateTechnology(name)) if name == "A"
        ));

        let dangling = r#"{"technologies": [
            {"name": "B", "research_cost": 10, "prerequisites": ["Missing"]}
        ]}"#;
        assert!(matches!(
            TechnologyCatalog::load_from_str(dangling),
            Err(TechnologyCatalogError::UnknownPrerequisite { prerequisite, .. }) if prerequisite == "Missing"
        ));
    }

    #[test]
    fn each_tree_is_an_independent_copy() {
        let catalog = TechnologyCatalog::load_builtin().expect("catalog parses");
        let mut first = catalog.tech_tree();
        let second = catalog.tech_tree();
        first.add_technology(Technology::new("Homebrew", "", 1));
        assert_eq!(first.len(), second.len() + 1);
    }
}
