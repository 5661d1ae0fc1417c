//! Primary/secondary attributes and resource caps (spec.md §4.3).

pub mod archetype;
pub mod recompute;

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Primary attributes, and also the shape used for equipment/effect
/// attribute bonuses (spec.md §4.3 `Σ equipment.attribute_bonuses`).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryAttributes {
    pub strength: i64,
    pub agility: i64,
    pub intelligence: i64,
    pub spirit: i64,
}

impl Add for PrimaryAttributes {
    type Output = PrimaryAttributes;
    fn add(self, rhs: Self) -> Self {
        PrimaryAttributes {
            strength: self.strength + rhs.strength,
            agility: self.agility + rhs.agility,
            intelligence: self.intelligence + rhs.intelligence,
            spirit: self.spirit + rhs.spirit,
        }
    }
}

impl std::iter::Sum for PrimaryAttributes {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(PrimaryAttributes::default(), Add::add)
    }
}

impl PrimaryAttributes {
    pub fn scaled(self, factor: i64) -> Self {
        PrimaryAttributes {
            strength: self.strength * factor,
            agility: self.agility * factor,
            intelligence: self.intelligence * factor,
            spirit: self.spirit * factor,
        }
    }
}

/// Resource caps, and also the shape for resource bonuses.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCaps {
    pub max_health: i64,
    pub max_mana: i64,
}

impl Add for ResourceCaps {
    type Output = ResourceCaps;
    fn add(self, rhs: Self) -> Self {
        ResourceCaps {
            max_health: self.max_health + rhs.max_health,
            max_mana: self.max_mana + rhs.max_mana,
        }
    }
}

impl std::iter::Sum for ResourceCaps {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ResourceCaps::default(), Add::add)
    }
}

impl ResourceCaps {
    pub fn scaled(self, factor: i64) -> Self {
        ResourceCaps {
            max_health: self.max_health * factor,
            max_mana: self.max_mana * factor,
        }
    }
}

/// Current resources (spec.md §3.1: "current resources {health, mana,
/// exhaustion}").
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub health: i64,
    pub mana: i64,
    pub exhaustion: i64,
}

/// Secondary attributes: functions of primary attributes plus direct
/// bonuses from equipment/effects (spec.md §4.3).
#[derive(Clone, Copy, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecondaryAttributes {
    pub attack_power: i64,
    pub defense: i64,
    pub accuracy: f64,
    pub avoidance: f64,
    pub crit_rate: f64,
    pub spell_power: i64,
    pub resilience: i64,
}

impl Add for SecondaryAttributes {
    type Output = SecondaryAttributes;
    fn add(self, rhs: Self) -> Self {
        SecondaryAttributes {
            attack_power: self.attack_power + rhs.attack_power,
            defense: self.defense + rhs.defense,
            accuracy: self.accuracy + rhs.accuracy,
            avoidance: self.avoidance + rhs.avoidance,
            crit_rate: self.crit_rate + rhs.crit_rate,
            spell_power: self.spell_power + rhs.spell_power,
            resilience: self.resilience + rhs.resilience,
        }
    }
}

impl std::iter::Sum for SecondaryAttributes {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(SecondaryAttributes::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_attributes_sum() {
        let a = PrimaryAttributes { strength: 1, agility: 2, intelligence: 3, spirit: 4 };
        let b = PrimaryAttributes { strength: 10, agility: 10, intelligence: 10, spirit: 10 };
        let sum = a + b;
        assert_eq!(sum.strength, 11);
        assert_eq!(sum.spirit, 14);
    }
}
