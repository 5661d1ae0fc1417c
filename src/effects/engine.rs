//! Effect tick processing (spec.md §4.6).

use crate::attributes::archetype::ArchetypeRegistry;
use crate::attributes::recompute::recompute_mob;
use crate::combat::hit::{apply_mitigation_pipeline, passive_incoming_multiplier, passive_outgoing_multiplier};
use crate::effects::{DamageCategory, EffectType};
use crate::ids::ObjectId;
use crate::messaging::MessageGroup;
use crate::world::World;

impl World {
    /// Processes every mob's due effect ticks this game tick. Effects due at
    /// the same instant run in start-time order, oldest first (spec.md §5).
    pub fn process_effect_ticks(&mut self, archetypes: &dyn ArchetypeRegistry) {
        let mobs: Vec<ObjectId> = self.graph.iter().filter(|(_, o)| o.is_mob()).map(|(id, _)| *id).collect();

        for mob in mobs {
            let due: Vec<usize> = {
                let Some(m) = self.graph.get(mob).and_then(|o| o.as_mob()) else { continue };
                let mut idx: Vec<usize> = (0..m.active_effects.len()).filter(|&i| m.active_effects[i].is_due(self.tick)).collect();
                idx.sort_by_key(|&i| m.active_effects[i].start_tick);
                idx
            };
            if due.is_empty() {
                continue;
            }

            let mut expired = Vec::new();
            for i in due {
                self.run_one_tick(mob, i);
                let done = self
                    .graph
                    .get_mut(mob)
                    .and_then(|o| o.as_mob_mut())
                    .and_then(|m| m.active_effects.get_mut(i))
                    .map(|inst| inst.advance())
                    .unwrap_or(false);
                if done {
                    expired.push(i);
                }
            }

            if !expired.is_empty() {
                let mut expire_messages = Vec::new();
                if let Some(m) = self.graph.get_mut(mob).and_then(|o| o.as_mob_mut()) {
                    expired.sort_unstable();
                    for &i in expired.iter().rev() {
                        let inst = m.active_effects.remove(i);
                        if let Some(msg) = inst.template.on_expire_message {
                            expire_messages.push(msg);
                        }
                    }
                }
                for text in expire_messages {
                    self.push_message(mob, MessageGroup::Info, text);
                }
                recompute_mob(self, mob, archetypes);
            }
        }
    }

    fn run_one_tick(&mut self, mob: ObjectId, index: usize) {
        let Some((caster, effect_type, category, hit_type, base_amount, on_tick_message)) = self.graph.get(mob).and_then(|o| o.as_mob()).and_then(|m| {
            m.active_effects.get(index).map(|inst| {
                (
                    inst.caster,
                    inst.template.effect_type,
                    inst.template.category,
                    inst.template.hit_type.clone(),
                    inst.template.base_amount,
                    inst.template.on_tick_message.clone(),
                )
            })
        }) else {
            return;
        };

        match effect_type {
            EffectType::DamageOverTime => {
                let mitigation_source = {
                    let Some(target_mob) = self.graph.get(mob).and_then(|o| o.as_mob()) else { return };
                    match category {
                        DamageCategory::Physical => target_mob.secondary.defense,
                        DamageCategory::Magical => target_mob.secondary.resilience,
                    }
                };
                let type_multiplier = hit_type
                    .as_ref()
                    .map(|ht| self.graph.get(mob).and_then(|o| o.as_mob()).map(|m| m.relationship(&ht.damage_type).multiplier()).unwrap_or(1.0))
                    .unwrap_or(1.0);
                let outgoing = self.graph.get(caster).and_then(|o| o.as_mob()).map(passive_outgoing_multiplier).unwrap_or(1.0);
                let incoming = self.graph.get(mob).and_then(|o| o.as_mob()).map(passive_incoming_multiplier).unwrap_or(1.0);
                let amount =
                    apply_mitigation_pipeline(base_amount as f64, mitigation_source, self.config.mitigation_coefficient, type_multiplier, outgoing, incoming);
                let damage_type = hit_type.map(|ht| ht.damage_type).unwrap_or_else(crate::entity::object::DamageType::physical);
                self.damage(mob, caster, amount, damage_type);
            }
            EffectType::HealOverTime => {
                if let Some(target_mob) = self.graph.get_mut(mob).and_then(|o| o.as_mob_mut()) {
                    target_mob.current.health = (target_mob.current.health + base_amount).min(target_mob.caps.max_health);
                }
            }
            EffectType::Passive | EffectType::Shield => {}
        }

        if let Some(text) = on_tick_message {
            self.push_message(mob, MessageGroup::Info, text);
        }
    }
}
