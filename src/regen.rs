//! Regeneration (spec.md §4.8): health/mana/exhaustion recovery for every
//! mob in `World.regen_set`.

use crate::ids::ObjectId;
use crate::world::World;

fn spirit_multiplier(spirit: i64) -> f64 {
    1.0 + spirit as f64 * 0.05
}

impl World {
    fn apply_regen_fraction(&mut self, mob: ObjectId, fraction: f64, exhaustion_recovery: i64) {
        let Some(m) = self.graph.get_mut(mob).and_then(|o| o.as_mob_mut()) else { return };
        let mult = spirit_multiplier(m.primary.spirit);
        let health_gain = (m.caps.max_health as f64 * fraction * mult).floor() as i64;
        let mana_gain = (m.caps.max_mana as f64 * fraction * mult).floor() as i64;
        m.current.health = (m.current.health + health_gain).min(m.caps.max_health);
        m.current.mana = (m.current.mana + mana_gain).min(m.caps.max_mana);
        m.current.exhaustion = (m.current.exhaustion - exhaustion_recovery).max(0);
    }

    /// `regeneration tick` (spec.md §4.8), run at the regeneration cadence.
    pub fn process_regen_tick(&mut self) {
        let candidates: Vec<ObjectId> = self.regen_set.iter().copied().collect();
        for mob in candidates {
            if !self.graph.exists(mob) {
                self.regen_set.remove(&mob);
                continue;
            }

            let Some(m) = self.graph.get(mob).and_then(|o| o.as_mob()) else {
                self.regen_set.remove(&mob);
                continue;
            };
            let fully_recovered = m.current.health >= m.caps.max_health && m.current.mana >= m.caps.max_mana && m.current.exhaustion <= 0;
            if fully_recovered {
                self.regen_set.remove(&mob);
                continue;
            }

            let in_combat = self.combat_set.contains(&mob);
            let (fraction, exhaustion_recovery) =
                if in_combat { (self.config.regen_combat_fraction, self.config.exhaustion_combat_recovery) } else { (self.config.regen_rest_fraction, self.config.exhaustion_rest_recovery) };
            self.apply_regen_fraction(mob, fraction, exhaustion_recovery);
        }
    }

    /// A one-shot "rest" action: a higher recovery profile applied once,
    /// outside the regular cadence (spec.md §4.8).
    pub fn apply_rest_action(&mut self, mob: ObjectId) {
        self.apply_regen_fraction(mob, self.config.regen_action_fraction, self.config.exhaustion_action_recovery);
        let Some(m) = self.graph.get(mob).and_then(|o| o.as_mob()) else { return };
        let fully_recovered = m.current.health >= m.caps.max_health && m.current.mana >= m.caps.max_mana && m.current.exhaustion <= 0;
        if fully_recovered {
            self.regen_set.remove(&mob);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{PrimaryAttributes, ResourceCaps, Resources, SecondaryAttributes};
    use crate::config::EngineConfig;
    use crate::entity::object::{BehaviorFlags, DungeonObject, Mob, ObjectBase, ObjectKind};
    use std::collections::HashMap;

    fn hurt_mob(id: u64) -> DungeonObject {
        DungeonObject {
            base: ObjectBase::new(ObjectId(id), vec!["mob".to_string()], "a mob"),
            kind: ObjectKind::Mob(Mob {
                level: 1,
                experience: 0,
                race: "human".to_string(),
                job: "warrior".to_string(),
                primary: PrimaryAttributes { spirit: 20, ..Default::default() },
                caps: ResourceCaps { max_health: 100, max_mana: 100 },
                current: Resources { health: 50, mana: 50, exhaustion: 0 },
                secondary: SecondaryAttributes::default(),
                equipped: HashMap::new(),
                learned_abilities: HashMap::new(),
                flags: BehaviorFlags::empty(),
                character: None,
                threat: None,
                active_effects: Vec::new(),
                combat_target: None,
                gold: 0,
                type_relationships: HashMap::new(),
            }),
        }
    }

    #[test]
    fn out_of_combat_regen_applies_spirit_multiplier() {
        let mut world = World::new(EngineConfig::default());
        let id = world.graph.insert(hurt_mob(1));
        world.regen_set.insert(id);

        world.process_regen_tick();

        let m = world.graph.get(id).unwrap().as_mob().unwrap();
        // 100 * 0.10 * (1 + 20*0.05) = 20
        assert_eq!(m.current.health, 70);
        assert!(world.regen_set.contains(&id));
    }

    #[test]
    fn fully_recovered_mob_leaves_the_set() {
        let mut world = World::new(EngineConfig::default());
        let mut obj = hurt_mob(2);
        if let ObjectKind::Mob(m) = &mut obj.kind {
            m.current = Resources { health: 100, mana: 100, exhaustion: 0 };
        }
        let id = world.graph.insert(obj);
        world.regen_set.insert(id);

        world.process_regen_tick();
        assert!(!world.regen_set.contains(&id));
    }
}
