//! Combat initiation (spec.md §4.5.5).

use crate::ai::AiEvent;
use crate::ids::ObjectId;
use crate::world::World;

impl World {
    /// `initiate_combat(attacker, defender, reaction)` (spec.md §4.5.5).
    pub fn initiate_combat(&mut self, attacker: ObjectId, defender: ObjectId, reaction: bool) {
        if attacker == defender {
            return;
        }

        let attacker_ok = self.graph.get(attacker).and_then(|o| o.as_mob()).map(|m| !m.is_dead() && !m.is_shopkeeper()).unwrap_or(false);
        let defender_ok = self.graph.get(defender).and_then(|o| o.as_mob()).map(|m| !m.is_dead() && !m.is_shopkeeper()).unwrap_or(false);
        if !attacker_ok || !defender_ok {
            return;
        }

        let current_target = self.graph.get(attacker).and_then(|o| o.as_mob()).and_then(|m| m.combat_target);
        if current_target == Some(defender) {
            return;
        }
        let had_prior_target = current_target.is_some();

        self.set_combat_target(attacker, Some(defender));
        self.fire_ai_event(defender, AiEvent::Attacked { attacker });

        if !reaction {
            let initial_aggro = self.config.initial_aggro_threat;
            let defender_is_character = self.graph.get(defender).and_then(|o| o.as_mob()).map(|m| m.is_character()).unwrap_or(false);
            if !defender_is_character {
                if let Some(mob) = self.graph.get_mut(defender).and_then(|o| o.as_mob_mut()) {
                    if mob.threat.is_none() {
                        mob.threat = Some(crate::combat::threat::ThreatTable::new());
                    }
                    if let Some(threat) = &mut mob.threat {
                        threat.add_threat(attacker, initial_aggro);
                    }
                }
            } else {
                let defender_in_combat = self.graph.get(defender).and_then(|o| o.as_mob()).map(|m| m.combat_target.is_some()).unwrap_or(false);
                if !defender_in_combat {
                    self.initiate_combat(defender, attacker, true);
                }
            }
        }

        if !had_prior_target {
            self.perform_attacks(attacker);
        }
    }
}
