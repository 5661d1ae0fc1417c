//! Hit resolution (spec.md §4.5, §4.5.1): `one_hit` and its magical
//! variant, built on a shared eight-step damage pipeline.

use rand::Rng;

use crate::entity::object::{DamageType, HitType};
use crate::ids::ObjectId;
use crate::messaging::MessageGroup;
use crate::world::World;

#[derive(Clone, Debug)]
pub struct HitOptions {
    pub weapon: Option<ObjectId>,
    pub guaranteed_hit: bool,
    pub ability_name: Option<String>,
    pub hit_type_override: Option<HitType>,
    pub attack_power_bonus: i64,
    pub attack_power_multiplier: f64,
    pub variation_pct_override: Option<f64>,
}

impl Default for HitOptions {
    fn default() -> Self {
        HitOptions {
            weapon: None,
            guaranteed_hit: false,
            ability_name: None,
            hit_type_override: None,
            attack_power_bonus: 0,
            attack_power_multiplier: 1.0,
            variation_pct_override: None,
        }
    }
}

fn default_hit_type() -> HitType {
    HitType { verb: "hit".to_string(), third_person_verb: "hits".to_string(), damage_type: DamageType::physical(), color: "white".to_string() }
}

/// Random variation (spec.md §4.5.1): symmetric floor-bounded range around
/// `dmg`, drawn uniformly.
pub fn apply_variation(dmg: f64, range_pct: f64, rng: &mut impl Rng) -> f64 {
    let min = (dmg * (1.0 - range_pct / 200.0)).floor();
    let max = (dmg * (1.0 + range_pct / 200.0)).floor().max(min);
    if min >= max {
        return min;
    }
    rng.gen_range(min as i64..=max as i64) as f64
}

/// Steps 5, 7, 8 of the damage pipeline, shared by melee/magic hits and the
/// effect engine's DoT ticks (spec.md §4.6: "pipeline identical to §4.5
/// steps 5-8, skipping accuracy and crit").
pub fn apply_mitigation_pipeline(
    dmg: f64,
    mitigation_source: i64,
    mitigation_coefficient: f64,
    type_multiplier: f64,
    outgoing_multiplier: f64,
    incoming_multiplier: f64,
) -> i64 {
    let mitigated = (dmg - mitigation_source as f64 * mitigation_coefficient).floor().max(0.0);
    let typed = mitigated * type_multiplier;
    (typed * outgoing_multiplier * incoming_multiplier).floor().max(0.0) as i64
}

impl World {
    /// `one_hit` (spec.md §4.5).
    pub fn one_hit(&mut self, attacker: ObjectId, target: ObjectId, options: HitOptions) -> i64 {
        self.resolve_hit(attacker, target, options, false)
    }

    /// `one_magic_hit` (spec.md §4.5): substitutes spell_power/resilience
    /// for attack_power/defense and requires an ability name.
    pub fn one_magic_hit(&mut self, attacker: ObjectId, target: ObjectId, options: HitOptions) -> i64 {
        debug_assert!(options.ability_name.is_some(), "magic hits require an ability_name");
        self.resolve_hit(attacker, target, options, true)
    }

    fn resolve_hit(&mut self, attacker: ObjectId, target: ObjectId, options: HitOptions, magical: bool) -> i64 {
        let Some(attacker_obj) = self.graph.get(attacker) else { return 0 };
        let Some(attacker_mob) = attacker_obj.as_mob() else { return 0 };
        if attacker_mob.is_shopkeeper() {
            return 0;
        }

        let same_room = self.graph.room_ancestor(attacker).is_some()
            && self.graph.room_ancestor(attacker) == self.graph.room_ancestor(target);
        if !same_room {
            return 0;
        }

        let Some(target_mob) = self.graph.get(target).and_then(|o| o.as_mob()) else { return 0 };
        if target_mob.is_dead() {
            return 0;
        }

        let attacker_mob = self.graph.get(attacker).and_then(|o| o.as_mob()).unwrap().clone();
        let target_mob = self.graph.get(target).and_then(|o| o.as_mob()).unwrap().clone();

        let mut rng = rand::thread_rng();

        if !options.guaranteed_hit {
            let chance = (50.0 + attacker_mob.secondary.accuracy - target_mob.secondary.avoidance)
                .clamp(self.config.accuracy_floor, self.config.accuracy_ceiling);
            if rng.gen_range(0.0..100.0) >= chance {
                self.push_message(attacker, MessageGroup::Combat, "You miss.");
                self.push_message(target, MessageGroup::Combat, "The attack misses you.");
                return 0;
            }
        }

        let weapon_stats = options.weapon.and_then(|w| self.graph.get(w)).and_then(|o| o.as_equipment()).and_then(|e| e.as_weapon());
        let weapon_ap = weapon_stats.map(|w| w.attack_power).unwrap_or(0);
        let hit_type = options
            .hit_type_override
            .clone()
            .or_else(|| weapon_stats.map(|w| w.hit_type.clone()))
            .unwrap_or_else(default_hit_type);

        let mut base = if magical { attacker_mob.secondary.spell_power } else { attacker_mob.secondary.attack_power } as f64;
        base += weapon_ap as f64;
        if attacker_mob.knows("pure_power") {
            let p = attacker_mob.proficiency("pure_power") as f64;
            base *= 1.0 + self.config.pure_power_coefficient * p / 100.0;
        }

        let mut dmg = (base + options.attack_power_bonus as f64) * options.attack_power_multiplier;
        let range_pct = options.variation_pct_override.unwrap_or(self.config.default_damage_variation_pct);
        dmg = apply_variation(dmg, range_pct, &mut rng);

        let mitigation_source = if magical { target_mob.secondary.resilience } else { target_mob.secondary.defense };
        let mitigated = (dmg - mitigation_source as f64 * self.config.mitigation_coefficient).floor().max(0.0);

        let crit = rng.gen_range(0.0..100.0) < attacker_mob.secondary.crit_rate;
        let after_crit = if crit { mitigated * 2.0 } else { mitigated };

        let type_multiplier = target_mob.relationship(&hit_type.damage_type).multiplier();
        let outgoing = passive_outgoing_multiplier(&attacker_mob);
        let incoming = passive_incoming_multiplier(&target_mob);
        let amount = (after_crit * type_multiplier * outgoing * incoming).floor().max(0.0) as i64;

        self.damage(target, attacker, amount, hit_type.damage_type.clone());
        self.emit_hit_messages(attacker, target, &hit_type, magical);
        amount
    }

    fn emit_hit_messages(&mut self, attacker: ObjectId, target: ObjectId, hit_type: &HitType, magical: bool) {
        let target_name = self.graph.get(target).map(|o| o.base.display_name.clone()).unwrap_or_default();
        let attacker_name = self.graph.get(attacker).map(|o| o.base.display_name.clone()).unwrap_or_default();
        if !magical {
            self.push_message(attacker, MessageGroup::Combat, format!("You {} {}.", hit_type.verb, target_name));
        }
        self.push_message(target, MessageGroup::Combat, format!("{} {} you.", attacker_name, hit_type.third_person_verb));
        if let Some(room) = self.graph.room_ancestor(attacker) {
            let text = format!("{} {} {}.", attacker_name, hit_type.third_person_verb, target_name);
            self.broadcast_room(room, Some(attacker), MessageGroup::Combat, text);
        }
    }
}

pub(crate) fn passive_outgoing_multiplier(mob: &crate::entity::object::Mob) -> f64 {
    mob.active_effects.iter().filter_map(|e| e.template.outgoing_damage_multiplier).product()
}

pub(crate) fn passive_incoming_multiplier(mob: &crate::entity::object::Mob) -> f64 {
    mob.active_effects.iter().filter_map(|e| e.template.incoming_damage_multiplier).product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variation_stays_within_symmetric_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let out = apply_variation(100.0, 20.0, &mut rng);
            assert!(out >= 80.0 && out <= 120.0);
        }
    }

    #[test]
    fn mitigation_pipeline_floors_and_clamps_nonnegative() {
        let amount = apply_mitigation_pipeline(10.0, 1000, 0.05, 1.0, 1.0, 1.0);
        assert_eq!(amount, 0);
    }

    #[test]
    fn mitigation_pipeline_applies_type_multiplier() {
        let amount = apply_mitigation_pipeline(100.0, 0, 0.05, 0.5, 1.0, 1.0);
        assert_eq!(amount, 50);
    }
}
