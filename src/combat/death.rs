//! Damage application and death handling (spec.md §4.5.4).

use log::info;

use crate::ai::AiEvent;
use crate::entity::object::{DamageType, Item, ObjectBase, ObjectKind};
use crate::ids::ObjectId;
use crate::messaging::MessageGroup;
use crate::world::World;

impl World {
    /// `target.damage(attacker, amount, type)` (spec.md §4.5.4).
    pub fn damage(&mut self, target: ObjectId, attacker: ObjectId, amount: i64, damage_type: DamageType) {
        let remaining = self.absorb_shields(target, amount, &damage_type);

        let Some(mob) = self.graph.get_mut(target).and_then(|o| o.as_mob_mut()) else { return };
        mob.current.health = (mob.current.health - remaining).max(0);
        let health = mob.current.health;

        self.regen_set.insert(target);
        self.fire_ai_event(target, AiEvent::GotHit { attacker });

        // Mutual engagement (spec.md §4.5.4: "Ensure attacker and target are
        // both in the combat set"), without granting a fresh free round.
        self.initiate_combat(attacker, target, true);
        if self.graph.get(target).and_then(|o| o.as_mob()).map(|m| m.combat_target.is_none()).unwrap_or(false) {
            self.initiate_combat(target, attacker, true);
        }

        if health <= 0 {
            self.handle_death(target, attacker);
        }
    }

    fn absorb_shields(&mut self, target: ObjectId, amount: i64, damage_type: &DamageType) -> i64 {
        let Some(mob) = self.graph.get_mut(target).and_then(|o| o.as_mob_mut()) else { return amount };
        let mut remaining = amount;
        for effect in mob.active_effects.iter_mut() {
            if effect.template.effect_type != crate::effects::EffectType::Shield {
                continue;
            }
            if let Some(ty) = &effect.template.shield_damage_type {
                if ty != damage_type {
                    continue;
                }
            }
            remaining = effect.absorb(remaining);
            if remaining == 0 {
                break;
            }
        }
        remaining
    }

    /// `handle_death(dead, killer)` (spec.md §4.5.4).
    pub fn handle_death(&mut self, dead: ObjectId, killer: ObjectId) {
        self.fire_ai_event(killer, AiEvent::TargetDeath { target: dead });
        self.fire_ai_event(dead, AiEvent::Death);

        self.set_combat_target(dead, None);
        if let Some(mob) = self.graph.get_mut(dead).and_then(|o| o.as_mob_mut()) {
            mob.threat = mob.threat.take().map(|mut t| {
                t.clear_threat_table();
                t
            });
        }

        let room = self.graph.room_ancestor(dead);
        if let Some(room) = room {
            let occupants = self.graph.get(room).map(|o| o.base.contents.clone()).unwrap_or_default();
            for occupant in occupants {
                if let Some(mob) = self.graph.get_mut(occupant).and_then(|o| o.as_mob_mut()) {
                    if let Some(threat) = &mut mob.threat {
                        threat.remove_threat(dead);
                    }
                    if mob.combat_target == Some(dead) {
                        mob.combat_target = None;
                    }
                }
            }
        }

        let killer_is_character = self.graph.get(killer).and_then(|o| o.as_mob()).map(|m| m.is_character()).unwrap_or(false);
        if killer_is_character {
            let dead_level = self.graph.get(dead).and_then(|o| o.as_mob()).map(|m| m.level).unwrap_or(1);
            if let Some(mob) = self.graph.get_mut(killer).and_then(|o| o.as_mob_mut()) {
                mob.experience += dead_level as u64 * 10;
            }
        }

        let corpse = self.spawn_corpse(dead);
        if let Some(room) = room {
            if let Err(err) = self.graph.add(room, corpse) {
                self.report_engine_error(killer, err);
            }
        }

        if killer_is_character {
            let settings = self.characters.get(&killer).map(|c| c.settings.clone());
            if let Some(settings) = settings {
                if settings.autoloot {
                    let contents = self.graph.get(corpse).map(|o| o.base.contents.clone()).unwrap_or_default();
                    for item in contents {
                        if let Err(err) = self.graph.add(killer, item) {
                            self.report_engine_error(killer, err);
                        }
                    }
                }
                if settings.autosacrifice {
                    if let Err(err) = self.destroy_object(corpse) {
                        self.report_engine_error(killer, err);
                    }
                }
            }
        }

        let dead_is_character = self.graph.get(dead).and_then(|o| o.as_mob()).map(|m| m.is_character()).unwrap_or(false);
        if dead_is_character {
            self.respawn_character(dead);
        } else {
            if let Err(err) = self.destroy_object(dead) {
                self.report_engine_error(killer, err);
            }
        }

        info!("{dead:?} was killed by {killer:?}");
    }

    /// Moves inventory, previously-equipped items, and gold into a new
    /// corpse container (spec.md §4.5.4 step 5).
    fn spawn_corpse(&mut self, dead: ObjectId) -> ObjectId {
        let corpse_id = self.graph.alloc_id();
        let name = self.graph.get(dead).map(|o| o.base.display_name.clone()).unwrap_or_else(|| "a corpse".to_string());
        let mut base = ObjectBase::new(corpse_id, vec!["corpse".to_string()], format!("the corpse of {name}"));
        base.short_description = format!("the corpse of {name} lies here.");
        self.graph.insert(crate::entity::object::DungeonObject {
            base,
            kind: ObjectKind::Item(Item { currency_amount: None, is_container: true }),
        });

        let (contents, equipped, gold) = {
            let Some(mob) = self.graph.get(dead).and_then(|o| o.as_mob()) else { return corpse_id };
            (self.graph.get(dead).map(|o| o.base.contents.clone()).unwrap_or_default(), mob.equipped.values().copied().collect::<Vec<_>>(), mob.gold)
        };

        for item in contents.into_iter().chain(equipped.into_iter()) {
            if let Err(err) = self.graph.add(corpse_id, item) {
                self.report_engine_error(dead, err);
            }
        }
        if let Some(mob) = self.graph.get_mut(dead).and_then(|o| o.as_mob_mut()) {
            mob.equipped.clear();
            mob.gold = 0;
        }

        if gold > 0 {
            let coin_id = self.graph.alloc_id();
            let mut coin_base = ObjectBase::new(coin_id, vec!["gold".to_string(), "coin".to_string()], "a pile of gold coins");
            coin_base.base_weight = 0.0;
            self.graph.insert(crate::entity::object::DungeonObject {
                base: coin_base,
                kind: ObjectKind::Item(Item { currency_amount: Some(gold), is_container: false }),
            });
            if let Err(err) = self.graph.add(corpse_id, coin_id) {
                self.report_engine_error(dead, err);
            }
        }

        corpse_id
    }

    /// Character death (spec.md §3.4, §4.5.4 step 8): teleport to the
    /// graveyard and restore resources to caps, rather than destroying the
    /// mob.
    fn respawn_character(&mut self, dead: ObjectId) {
        let Some(graveyard) = self.graveyard_room else { return };
        if let Some(mob) = self.graph.get_mut(dead).and_then(|o| o.as_mob_mut()) {
            mob.current.health = mob.caps.max_health;
            mob.current.mana = mob.caps.max_mana;
            mob.current.exhaustion = 0;
        }
        if let Err(err) = self.graph.add(graveyard, dead) {
            self.report_engine_error(dead, err);
        }
        self.push_message(dead, MessageGroup::System, "You black out and awaken in the graveyard.");
    }
}
