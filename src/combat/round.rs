//! The combat round loop (spec.md §4.5.6).

use itertools::Itertools;

use crate::ai::AiEvent;
use crate::combat::hit::HitOptions;
use crate::entity::object::{BehaviorFlags, EquipmentSlot};
use crate::ids::ObjectId;
use crate::messaging::MessageGroup;
use crate::world::World;

impl World {
    /// One mob's attack sequence for a round: main hand, off hand if
    /// dual-wielding, then `second_attack`/`third_attack` extra swings for
    /// mobs that know those abilities (spec.md §4.5.6, §9 open question on
    /// ordering resolved as sequential: main, off, second, third).
    pub fn perform_attacks(&mut self, attacker: ObjectId) {
        let Some(target) = self.graph.get(attacker).and_then(|o| o.as_mob()).and_then(|m| m.combat_target) else { return };

        let (main_hand, off_hand, dual_wield, knows_second, knows_third) = {
            let Some(mob) = self.graph.get(attacker).and_then(|o| o.as_mob()) else { return };
            (
                mob.equipped.get(&EquipmentSlot::MainHand).copied(),
                mob.equipped.get(&EquipmentSlot::OffHand).copied(),
                mob.flags.contains(BehaviorFlags::DUAL_WIELD),
                mob.knows("second_attack"),
                mob.knows("third_attack"),
            )
        };

        let mut swings: Vec<Option<ObjectId>> = vec![main_hand];
        if dual_wield {
            swings.push(off_hand);
        }
        if knows_second {
            swings.push(main_hand);
            if dual_wield {
                swings.push(off_hand);
            }
        }
        if knows_third {
            swings.push(main_hand);
            if dual_wield {
                swings.push(off_hand);
            }
        }

        for weapon in swings {
            let target_alive = self.graph.get(target).and_then(|o| o.as_mob()).map(|m| !m.is_dead()).unwrap_or(false);
            let attacker_alive = self.graph.get(attacker).and_then(|o| o.as_mob()).map(|m| !m.is_dead()).unwrap_or(false);
            if !target_alive || !attacker_alive {
                break;
            }
            self.one_hit(attacker, target, HitOptions { weapon, ..Default::default() });
        }
    }

    /// Pushes a minimal status line; real prompt formatting is a presentation
    /// concern outside this engine (spec.md §1 lists rendering as an external
    /// collaborator).
    fn redraw_prompt(&mut self, mob: ObjectId) {
        let Some(m) = self.graph.get(mob).and_then(|o| o.as_mob()) else { return };
        let text = format!("<{}hp {}mp>", m.current.health, m.current.mana);
        self.push_message(mob, MessageGroup::System, text);
    }

    /// `combat_round()` (spec.md §4.5.6): snapshot the combat set, process
    /// in agility-descending order (ties broken by insertion order), and run
    /// each eligible mob's attack sequence.
    pub fn combat_round(&mut self) {
        let order: Vec<ObjectId> = self
            .combat_order()
            .iter()
            .copied()
            .sorted_by_key(|id| std::cmp::Reverse(self.graph.get(*id).and_then(|o| o.as_mob()).map(|m| m.primary.agility).unwrap_or(0)))
            .collect();

        for mob in order {
            if !self.graph.exists(mob) {
                continue;
            }
            let Some(target) = self.graph.get(mob).and_then(|o| o.as_mob()).and_then(|m| m.combat_target) else { continue };

            let mob_room = self.graph.room_ancestor(mob);
            let target_room = self.graph.room_ancestor(target);
            let target_dead = self.graph.get(target).and_then(|o| o.as_mob()).map(|m| m.is_dead()).unwrap_or(true);

            if mob_room.is_none() || target_room != mob_room || target_dead {
                self.set_combat_target(mob, None);
                continue;
            }

            let is_character = self.graph.get(mob).and_then(|o| o.as_mob()).map(|m| m.is_character()).unwrap_or(false);
            if !is_character {
                self.process_threat_switching(mob);
            }

            self.fire_ai_event(mob, AiEvent::CombatRound);
            self.perform_attacks(mob);
            self.fire_ai_event(mob, AiEvent::AfterCombatRound);
        }

        let characters: Vec<ObjectId> = self.combat_order().iter().copied().filter(|id| self.characters.contains_key(id)).collect();
        for mob in characters {
            self.redraw_prompt(mob);
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

    fn mob(id: u64, agility: i64) -> DungeonObject {
        DungeonObject {
            base: ObjectBase::new(crate::ids::ObjectId(id), vec!["mob".to_string()], "a mob"),
            kind: ObjectKind::Mob(Mob {
                level: 1,
                experience: 0,
                race: "human".to_string(),
                job: "warrior".to_string(),
                primary: PrimaryAttributes { agility, ..Default::default() },
                caps: ResourceCaps::default(),
                current: Resources { health: 100, mana: 10, exhaustion: 0 },
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
    fn round_order_is_agility_descending() {
        let mut world = World::new(EngineConfig::default());
        let room = world.graph.insert(DungeonObject {
            base: ObjectBase::new(crate::ids::ObjectId(100), vec!["room".to_string()], "a room"),
            kind: ObjectKind::Room(crate::entity::object::Room { x: 0, y: 0, z: 0, allowed_exits: crate::spatial::direction::ExitFlags::empty() }),
        });
        let slow = world.graph.insert(mob(1, 5));
        let fast = world.graph.insert(mob(2, 50));
        world.graph.add(room, slow).unwrap();
        world.graph.add(room, fast).unwrap();
        world.set_combat_target(slow, Some(fast));
        world.set_combat_target(fast, Some(slow));

        let mut order = world.combat_order().to_vec();
        order.sort_by_key(|id| std::cmp::Reverse(world.graph.get(*id).and_then(|o| o.as_mob()).map(|m| m.primary.agility).unwrap_or(0)));
        assert_eq!(order, vec![fast, slow]);
    }
}
