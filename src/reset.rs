//! The reset system (spec.md §4.7): declarative repopulation of a room with
//! template-instantiated objects up to configured bounds.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::entity::graph::Graph;
use crate::error::EngineResult;
use crate::ids::ObjectId;
use crate::registry::content::TemplateRegistry;
use crate::spatial::dungeon::{parse_room_ref, Dungeon, DungeonId};
use crate::templates::{apply_template, new_instance};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ResetId(pub u64);

#[derive(Default)]
pub struct ResetIdAllocator(AtomicU64);

impl ResetIdAllocator {
    pub fn new() -> Self {
        ResetIdAllocator(AtomicU64::new(1))
    }

    pub fn next(&self) -> ResetId {
        ResetId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reset {
    pub id: ResetId,
    pub template_id: String,
    /// `@<dungeon-id>{x,y,z}` grammar (spec.md §4.2, §6).
    pub room_ref: String,
    pub min_count: u32,
    pub max_count: u32,
    pub equipped_template_ids: Vec<String>,
    pub inventory_template_ids: Vec<String>,
    /// Weak tracking: ids of objects this reset has spawned. Destroyed
    /// objects simply fail `Graph::exists` and drop out of the living count
    /// (spec.md §4.7: "tracked via a weak collection of spawned objects").
    pub spawned: Vec<ObjectId>,
}

impl Reset {
    /// Living tracked instances: moving an item to a different room severs
    /// its back-reference (handled by `Graph::add`, which clears
    /// `reset_ref` on cross-room item moves), so only objects whose
    /// `reset_ref` still points at this reset count (spec.md §3.3, §4.7).
    fn living_count(&mut self, graph: &Graph) -> u32 {
        self.spawned.retain(|id| {
            graph.get(*id).map(|o| o.base.reset_ref == Some(self.id)).unwrap_or(false)
        });
        self.spawned.len() as u32
    }

    /// One reset execution (spec.md §4.7). Returns the number of newly
    /// spawned top-level instances.
    pub fn execute(
        &mut self,
        graph: &mut Graph,
        dungeons: &std::collections::HashMap<DungeonId, Dungeon>,
        templates: &dyn TemplateRegistry,
    ) -> EngineResult<u32> {
        let Some((dungeon_id, coord)) = parse_room_ref(&self.room_ref) else {
            return Ok(0);
        };
        let Some(dungeon) = dungeons.get(&dungeon_id) else {
            return Ok(0);
        };
        let Some(room) = dungeon.get_room(coord) else {
            return Ok(0);
        };

        let count = self.living_count(graph);
        if count >= self.min_count {
            return Ok(0);
        }
        let target = self.max_count.min(self.min_count);
        let to_spawn = target - count;

        let Some(template) = templates.template(&self.template_id) else {
            return Ok(0);
        };

        for _ in 0..to_spawn {
            let id = graph.alloc_id();
            let mut instance = new_instance(id, &template.kind);
            apply_template(&mut instance, template).map_err(crate::error::EngineError::InvariantViolation)?;
            instance.base.reset_ref = Some(self.id);
            let is_mob = instance.as_mob().is_some();
            graph.insert(instance);
            graph.add(room, id)?;
            self.spawned.push(id);

            if is_mob {
                self.equip_and_stock(graph, id, templates)?;
            }
        }

        Ok(to_spawn)
    }

    fn equip_and_stock(
        &self,
        graph: &mut Graph,
        mob_id: ObjectId,
        templates: &dyn TemplateRegistry,
    ) -> EngineResult<()> {
        for template_id in &self.equipped_template_ids {
            let Some(template) = templates.template(template_id) else { continue };
            let item_id = graph.alloc_id();
            let mut item = new_instance(item_id, &template.kind);
            apply_template(&mut item, template).map_err(crate::error::EngineError::InvariantViolation)?;
            let slot = item.as_equipment().map(|e| e.slot);
            graph.insert(item);
            graph.add(mob_id, item_id)?;
            if let Some(slot) = slot {
                if let Some(mob) = graph.get_mut(mob_id).and_then(|o| o.as_mob_mut()) {
                    mob.equipped.insert(slot, item_id);
                }
            }
        }
        for template_id in &self.inventory_template_ids {
            let Some(template) = templates.template(template_id) else { continue };
            let item_id = graph.alloc_id();
            let mut item = new_instance(item_id, &template.kind);
            apply_template(&mut item, template).map_err(crate::error::EngineError::InvariantViolation)?;
            graph.insert(item);
            graph.add(mob_id, item_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::object::{DungeonObject, ObjectBase, ObjectKind, Room};
    use crate::spatial::direction::ExitFlags;
    use crate::templates::{ObjectTemplate, ObjectTemplateKind, RoomTemplate};
    use std::collections::HashMap as Map;

    fn coin_template() -> ObjectTemplate {
        ObjectTemplate {
            id: "coin-gold".to_string(),
            keywords: Some(vec!["gold".into(), "coin".into()]),
            display_name: Some("a gold coin".into()),
            short_description: None,
            long_description: None,
            base_weight: Some(0.01),
            kind: ObjectTemplateKind::Item(Default::default()),
        }
    }

    fn setup() -> (Graph, Map<DungeonId, Dungeon>, ObjectId) {
        let mut graph = Graph::new();
        let room_id = graph.alloc_id();
        let room = DungeonObject {
            base: ObjectBase::new(room_id, vec!["room".into()], "a room"),
            kind: ObjectKind::Room(Room { x: 0, y: 0, z: 0, allowed_exits: ExitFlags::empty() }),
        };
        graph.insert(room);

        let mut dungeon = Dungeon::new("d1", 5, 5, 1);
        dungeon.place_room((0, 0, 0), room_id);
        let mut dungeons = Map::new();
        dungeons.insert("d1".to_string(), dungeon);

        (graph, dungeons, room_id)
    }

    #[test]
    fn spawns_up_to_min_then_stops() {
        let (mut graph, dungeons, room_id) = setup();
        let _ = room_id;
        let mut registry = crate::registry::content::StaticTemplateRegistry::default();
        registry.templates.insert("coin-gold".to_string(), coin_template());

        let mut reset = Reset {
            id: ResetId(1),
            template_id: "coin-gold".to_string(),
            room_ref: "@d1{0,0,0}".to_string(),
            min_count: 3,
            max_count: 5,
            equipped_template_ids: vec![],
            inventory_template_ids: vec![],
            spawned: vec![],
        };

        let spawned_first = reset.execute(&mut graph, &dungeons, &registry).unwrap();
        assert_eq!(spawned_first, 3);

        let spawned_second = reset.execute(&mut graph, &dungeons, &registry).unwrap();
        assert_eq!(spawned_second, 0);

        let victim = reset.spawned[0];
        graph.destroy(victim).unwrap();
        let spawned_third = reset.execute(&mut graph, &dungeons, &registry).unwrap();
        assert_eq!(spawned_third, 1);
    }
}
