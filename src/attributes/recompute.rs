//! Derived-attribute recomputation (spec.md §4.3).

use super::archetype::{ArchetypeRegistry, ArchetypeTable};
use super::{PrimaryAttributes, ResourceCaps, Resources, SecondaryAttributes};
use crate::ids::ObjectId;
use crate::world::World;

/// Recomputes `mob`'s primary/secondary attributes and resource caps from
/// its race/job archetype plus live equipment and effect bonuses, then
/// rescales current resources to the new caps (spec.md §4.3, and §4.6: "On
/// expiration: remove the instance and recompute derived attributes").
pub fn recompute_mob(world: &mut World, mob: ObjectId, archetypes: &dyn ArchetypeRegistry) {
    let Some(m) = world.graph.get(mob).and_then(|o| o.as_mob()) else { return };
    let race = archetypes.race(&m.race).copied().unwrap_or_default();
    let job = archetypes.job(&m.job).copied().unwrap_or_default();
    let level = m.level;

    let equipped: Vec<ObjectId> = m.equipped.values().copied().collect();
    let (mut equip_primary, mut equip_resources, mut equip_secondary) = (PrimaryAttributes::default(), ResourceCaps::default(), SecondaryAttributes::default());
    for item in equipped {
        if let Some(eq) = world.graph.get(item).and_then(|o| o.as_equipment()) {
            equip_primary = equip_primary + eq.bonuses.primary;
            equip_resources = equip_resources + eq.bonuses.resources;
            equip_secondary = equip_secondary + eq.bonuses.secondary;
        }
    }

    let Some(m) = world.graph.get(mob).and_then(|o| o.as_mob()) else { return };
    let (mut effect_primary, mut effect_resources) = (PrimaryAttributes::default(), ResourceCaps::default());
    for effect in &m.active_effects {
        if let Some(p) = effect.template.primary_bonuses {
            effect_primary = effect_primary + p;
        }
        if let Some(r) = effect.template.resource_bonuses {
            effect_resources = effect_resources + r;
        }
    }

    let old_caps = m.caps;
    let current = m.current;
    let primary = compute_primary(level, &race, &job, equip_primary, effect_primary);
    let new_caps = compute_resource_caps(level, &race, &job, equip_resources, effect_resources);
    let secondary = compute_secondary(primary, equip_secondary);
    let rescaled = rescale_resources(old_caps, new_caps, current);

    if let Some(mob) = world.graph.get_mut(mob).and_then(|o| o.as_mob_mut()) {
        mob.primary = primary;
        mob.caps = new_caps;
        mob.secondary = secondary;
        mob.current = rescaled;
    }
}

/// `base_primary + growth_primary * (L-1) + equipment bonuses + effect
/// bonuses` (spec.md §4.3), applied identically to primary attributes and
/// resource caps.
pub fn compute_primary(
    level: u32,
    race: &ArchetypeTable,
    job: &ArchetypeTable,
    equipment_bonuses: PrimaryAttributes,
    effect_bonuses: PrimaryAttributes,
) -> PrimaryAttributes {
    let base = race.base_primary + job.base_primary;
    let growth = race.growth_primary + job.growth_primary;
    base + growth.scaled(level.saturating_sub(1) as i64) + equipment_bonuses + effect_bonuses
}

pub fn compute_resource_caps(
    level: u32,
    race: &ArchetypeTable,
    job: &ArchetypeTable,
    equipment_bonuses: ResourceCaps,
    effect_bonuses: ResourceCaps,
) -> ResourceCaps {
    let base = race.base_resources + job.base_resources;
    let growth = race.growth_resources + job.growth_resources;
    base + growth.scaled(level.saturating_sub(1) as i64) + equipment_bonuses + effect_bonuses
}

/// Secondary attributes as linear functions of primary attributes, plus
/// direct bonuses from equipment/effects (spec.md §4.3: "functions of
/// primary attributes plus direct bonuses").
pub fn compute_secondary(primary: PrimaryAttributes, direct_bonuses: SecondaryAttributes) -> SecondaryAttributes {
    SecondaryAttributes {
        attack_power: primary.strength * 2,
        defense: primary.strength,
        accuracy: primary.agility as f64 * 0.5,
        avoidance: primary.agility as f64 * 0.5,
        crit_rate: primary.agility as f64 * 0.2,
        spell_power: primary.intelligence * 2,
        resilience: primary.intelligence,
    } + direct_bonuses
}

/// Recomputation rule (spec.md §4.3): recompute caps, then scale current
/// resources so each pre-change ratio is preserved via floor rounding. No
/// resource ever exceeds its new cap, and damage taken is never silently
/// healed by a ratio-preserving rescale.
pub fn rescale_resources(old_caps: ResourceCaps, new_caps: ResourceCaps, current: Resources) -> Resources {
    let rescale = |value: i64, old_cap: i64, new_cap: i64| -> i64 {
        if old_cap <= 0 {
            return new_cap.max(0);
        }
        let scaled = (value as i128 * new_cap as i128) / old_cap as i128;
        scaled.clamp(0, new_cap.max(0) as i128) as i64
    };

    Resources {
        health: rescale(current.health, old_caps.max_health, new_caps.max_health),
        mana: rescale(current.mana, old_caps.max_mana, new_caps.max_mana),
        exhaustion: current.exhaustion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(base: i64, growth: i64) -> ArchetypeTable {
        ArchetypeTable {
            base_primary: PrimaryAttributes { strength: base, agility: base, intelligence: base, spirit: base },
            growth_primary: PrimaryAttributes { strength: growth, agility: growth, intelligence: growth, spirit: growth },
            base_resources: ResourceCaps { max_health: 100, max_mana: 50 },
            growth_resources: ResourceCaps { max_health: 10, max_mana: 5 },
        }
    }

    #[test]
    fn primary_scales_with_level() {
        let race = table(5, 1);
        let job = table(3, 2);
        let primary = compute_primary(1, &race, &job, Default::default(), Default::default());
        assert_eq!(primary.strength, 8);

        let primary_l10 = compute_primary(10, &race, &job, Default::default(), Default::default());
        // base(8) + growth(3) * 9 = 35
        assert_eq!(primary_l10.strength, 35);
    }

    #[test]
    fn rescale_preserves_ratio_and_never_exceeds_new_cap() {
        let old_caps = ResourceCaps { max_health: 100, max_mana: 50 };
        let new_caps = ResourceCaps { max_health: 200, max_mana: 50 };
        let current = Resources { health: 50, mana: 50, exhaustion: 3 };

        let rescaled = rescale_resources(old_caps, new_caps, current);
        assert_eq!(rescaled.health, 100); // 50/100 preserved against a doubled cap
        assert_eq!(rescaled.mana, 50);
        assert_eq!(rescaled.exhaustion, 3);
    }

    #[test]
    fn rescale_never_exceeds_shrunk_cap() {
        let old_caps = ResourceCaps { max_health: 100, max_mana: 50 };
        let new_caps = ResourceCaps { max_health: 40, max_mana: 50 };
        let current = Resources { health: 100, mana: 50, exhaustion: 0 };

        let rescaled = rescale_resources(old_caps, new_caps, current);
        assert_eq!(rescaled.health, 40);
    }
}
