use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// The three stockpiled quantities tracked by the economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Minerals,
    Energy,
    Intelligence,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Minerals => "minerals",
            ResourceKind::Energy => "energy",
            ResourceKind::Intelligence => "intelligence",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Additive bundle of minerals, energy and intelligence.
///
/// Used both as a civilization's stockpile and as a planet's per-turn yield.
/// Subtraction is unchecked: counters may go negative, callers that must not
/// overdraw check [`ResourceBundle::can_afford`] first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceBundle {
    pub minerals: i64,
    pub energy: i64,
    pub intelligence: i64,
}

impl ResourceBundle {
    pub const fn new(minerals: i64, energy: i64, intelligence: i64) -> Self {
        Self {
            minerals,
            energy,
            intelligence,
        }
    }

    pub const fn minerals(amount: i64) -> Self {
        Self::new(amount, 0, 0)
    }

    pub const fn intelligence(amount: i64) -> Self {
        Self::new(0, 0, amount)
    }

    pub fn get(&self, kind: ResourceKind) -> i64 {
        match kind {
            ResourceKind::Minerals => self.minerals,
            ResourceKind::Energy => self.energy,
            ResourceKind::Intelligence => self.intelligence,
        }
    }

    /// Counters saturate at the `i64` bounds instead of wrapping.
    pub fn credit(&mut self, other: &ResourceBundle) {
        self.minerals = self.minerals.saturating_add(other.minerals);
        self.energy = self.energy.saturating_add(other.energy);
        self.intelligence = self.intelligence.saturating_add(other.intelligence);
    }

    pub fn debit(&mut self, other: &ResourceBundle) {
        self.minerals = self.minerals.saturating_sub(other.minerals);
        self.energy = self.energy.saturating_sub(other.energy);
        self.intelligence = self.intelligence.saturating_sub(other.intelligence);
    }

    /// First counter that cannot cover `cost`, as `(kind, required, available)`.
    pub fn shortfall(&self, cost: &ResourceBundle) -> Option<(ResourceKind, i64, i64)> {
        [
            ResourceKind::Minerals,
            ResourceKind::Energy,
            ResourceKind::Intelligence,
        ]
        .into_iter()
        .find(|kind| self.get(*kind) < cost.get(*kind))
        .map(|kind| (kind, cost.get(kind), self.get(kind)))
    }

    pub fn can_afford(&self, cost: &ResourceBundle) -> bool {
        self.shortfall(cost).is_none()
    }

    /// Scale minerals and energy by `rate`, truncating toward zero and
    /// saturating at the `i64` bounds.
    /// Intelligence is not an extracted resource and is left untouched.
    pub fn scale_extraction(&mut self, rate: f64) {
        self.minerals = (self.minerals as f64 * rate) as i64;
        self.energy = (self.energy as f64 * rate) as i64;
    }
}

impl Add for ResourceBundle {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.credit(&rhs);
        self
    }
}

impl AddAssign for ResourceBundle {
    fn add_assign(&mut self, rhs: Self) {
        self.credit(&rhs);
    }
}

impl Sub for ResourceBundle {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self::Output {
        self.debit(&rhs);
        self
    }
}

impl SubAssign for ResourceBundle {
    fn sub_assign(&mut self, rhs: Self) {
        self.debit(&rhs);
    }
}

impl fmt::Display for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "minerals={} energy={} intelligence={}",
            self.minerals, self.energy, self.intelligence
        )
    }
}
