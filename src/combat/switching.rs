//! Target switching (spec.md §4.5.3).

use crate::ids::ObjectId;
use crate::world::World;

impl World {
    fn pick_highest_threat(&self, npc: ObjectId, room: ObjectId) -> Option<ObjectId> {
        let mob = self.graph.get(npc)?.as_mob()?;
        let threat = mob.threat.as_ref()?;
        threat.highest_threat_in_room(|candidate| self.graph.room_ancestor(candidate) == Some(room))
    }

    /// `process_threat_switching(npc)` (spec.md §4.5.3).
    pub fn process_threat_switching(&mut self, npc: ObjectId) {
        let room = self.graph.room_ancestor(npc);
        let npc_dead = self.graph.get(npc).and_then(|o| o.as_mob()).map(|m| m.is_dead()).unwrap_or(true);
        if npc_dead || room.is_none() {
            self.set_combat_target(npc, None);
            return;
        }
        let room = room.unwrap();

        let current = self.graph.get(npc).and_then(|o| o.as_mob()).and_then(|m| m.combat_target);

        let Some(target) = current else {
            if let Some(candidate) = self.pick_highest_threat(npc, room) {
                self.initiate_combat(npc, candidate, false);
            }
            return;
        };

        if self.graph.room_ancestor(target) != Some(room) {
            self.set_combat_target(npc, None);
            if let Some(candidate) = self.pick_highest_threat(npc, room) {
                self.initiate_combat(npc, candidate, false);
            }
            return;
        }

        let (current_threat, candidate) = {
            let Some(mob) = self.graph.get(npc).and_then(|o| o.as_mob()) else { return };
            let Some(threat) = &mob.threat else { return };
            (threat.get_threat(target), self.pick_highest_threat(npc, room))
        };

        let Some(candidate) = candidate else { return };
        if candidate == target {
            return;
        }
        let candidate_threat = self
            .graph
            .get(npc)
            .and_then(|o| o.as_mob())
            .and_then(|m| m.threat.as_ref())
            .map(|t| t.get_threat(candidate))
            .unwrap_or(0.0);

        if candidate_threat >= self.config.threat_grace_multiplier * current_threat {
            // A reaction: mid-combat switches never grant a free round, and
            // `initiate_combat` already withholds that grant because the
            // npc had a prior target.
            self.initiate_combat(npc, candidate, true);
        }
    }
}
