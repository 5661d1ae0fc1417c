//! The effect engine (spec.md §4.6): timed modifiers carried by mobs as
//! `Mob.active_effects`. An effect template is authored content; an effect
//! instance is the live, ticking binding of a template to a caster/target
//! pair.

pub mod engine;

use serde::{Deserialize, Serialize};

use crate::attributes::{PrimaryAttributes, ResourceCaps};
use crate::entity::object::{DamageType, HitType};
use crate::ids::ObjectId;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EffectType {
    DamageOverTime,
    HealOverTime,
    Passive,
    Shield,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DamageCategory {
    Physical,
    Magical,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectTemplate {
    pub id: String,
    pub effect_type: EffectType,
    pub duration_ticks: u32,
    pub tick_period: u32,
    /// Required for `DamageOverTime`.
    pub hit_type: Option<HitType>,
    pub category: DamageCategory,
    /// Per-tick base amount for DoT/HoT, or the absorb capacity for Shield.
    pub base_amount: i64,
    pub shield_damage_type: Option<DamageType>,
    pub primary_bonuses: Option<PrimaryAttributes>,
    pub resource_bonuses: Option<ResourceCaps>,
    pub outgoing_damage_multiplier: Option<f64>,
    pub incoming_damage_multiplier: Option<f64>,
    pub on_apply_message: Option<String>,
    pub on_tick_message: Option<String>,
    pub on_expire_message: Option<String>,
}

/// A live binding of a template to a caster/target pair (spec.md §4.6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectInstance {
    pub template: EffectTemplate,
    pub caster: ObjectId,
    pub target: ObjectId,
    pub start_tick: u64,
    pub next_tick: u64,
    pub remaining_ticks: u32,
    /// Remaining absorb for `Shield`; unused otherwise.
    pub shield_remaining: i64,
}

impl EffectInstance {
    pub fn new(template: EffectTemplate, caster: ObjectId, target: ObjectId, now_tick: u64) -> Self {
        let shield_remaining = if template.effect_type == EffectType::Shield { template.base_amount } else { 0 };
        let ticks = if template.tick_period == 0 { 0 } else { template.duration_ticks / template.tick_period };
        EffectInstance {
            next_tick: now_tick + template.tick_period as u64,
            start_tick: now_tick,
            remaining_ticks: ticks,
            shield_remaining,
            template,
            caster,
            target,
        }
    }

    pub fn is_due(&self, now_tick: u64) -> bool {
        self.template.tick_period > 0 && now_tick >= self.next_tick
    }

    /// Advances past one tick. Returns true once no ticks remain, meaning
    /// the instance should be removed and derived attributes recomputed
    /// (spec.md §4.6: "On expiration: remove the instance and recompute
    /// derived attributes").
    pub fn advance(&mut self) -> bool {
        self.next_tick += self.template.tick_period as u64;
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        self.remaining_ticks == 0
    }

    /// Absorbs `amount` of incoming damage up to the remaining shield
    /// capacity; returns the unabsorbed remainder.
    pub fn absorb(&mut self, amount: i64) -> i64 {
        if self.template.effect_type != EffectType::Shield {
            return amount;
        }
        let absorbed = amount.min(self.shield_remaining);
        self.shield_remaining -= absorbed;
        amount - absorbed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot_template() -> EffectTemplate {
        EffectTemplate {
            id: "poison".to_string(),
            effect_type: EffectType::DamageOverTime,
            duration_ticks: 30,
            tick_period: 10,
            hit_type: None,
            category: DamageCategory::Physical,
            base_amount: 5,
            shield_damage_type: None,
            primary_bonuses: None,
            resource_bonuses: None,
            outgoing_damage_multiplier: None,
            incoming_damage_multiplier: None,
            on_apply_message: None,
            on_tick_message: None,
            on_expire_message: None,
        }
    }

    #[test]
    fn ticks_down_to_expiration() {
        let mut inst = EffectInstance::new(dot_template(), ObjectId(1), ObjectId(2), 0);
        assert_eq!(inst.remaining_ticks, 3);
        assert!(!inst.is_due(5));
        assert!(inst.is_due(10));
        assert!(!inst.advance());
        assert!(!inst.advance());
        assert!(inst.advance());
    }

    #[test]
    fn shield_absorbs_up_to_capacity() {
        let mut template = dot_template();
        template.effect_type = EffectType::Shield;
        template.base_amount = 10;
        let mut inst = EffectInstance::new(template, ObjectId(1), ObjectId(2), 0);
        assert_eq!(inst.absorb(4), 0);
        assert_eq!(inst.shield_remaining, 6);
        assert_eq!(inst.absorb(10), 4);
        assert_eq!(inst.shield_remaining, 0);
    }
}
