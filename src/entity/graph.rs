//! The entity graph (spec.md §4.1): a single arena of dungeon objects keyed
//! by stable id, with containment, weight propagation, and dungeon
//! membership maintained as atomic side effects of `add`/`remove`/`move`.

use std::collections::HashMap;

use log::error;

use super::object::{DungeonObject, ObjectKind};
use crate::error::{EngineError, EngineResult};
use crate::ids::{IdAllocator, ObjectId};
use crate::spatial::dungeon::DungeonId;

#[derive(Default)]
pub struct Graph {
    objects: HashMap<ObjectId, DungeonObject>,
    ids: IdAllocator,
}

impl Graph {
    pub fn new() -> Self {
        Graph { objects: HashMap::new(), ids: IdAllocator::new() }
    }

    pub fn alloc_id(&self) -> ObjectId {
        self.ids.next()
    }

    pub fn insert(&mut self, object: DungeonObject) -> ObjectId {
        let id = object.base.id;
        self.objects.insert(id, object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&DungeonObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DungeonObject> {
        self.objects.get_mut(&id)
    }

    pub fn exists(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Walks the parent chain of `id`, innermost first, not including `id`.
    pub fn ancestors(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut current = self.objects.get(&id).and_then(|o| o.base.parent);
        while let Some(next) = current {
            out.push(next);
            current = self.objects.get(&next).and_then(|o| o.base.parent);
        }
        out
    }

    /// The nearest `Room` ancestor of `id` (or `id` itself if it is a room).
    pub fn room_ancestor(&self, id: ObjectId) -> Option<ObjectId> {
        let obj = self.objects.get(&id)?;
        if obj.is_room() {
            return Some(id);
        }
        let mut current = obj.base.parent;
        while let Some(next) = current {
            let next_obj = self.objects.get(&next)?;
            if next_obj.is_room() {
                return Some(next);
            }
            current = next_obj.base.parent;
        }
        None
    }

    /// Convenience accessor for `id`'s dungeon membership (spec.md §4.1 ambient
    /// addition). `add`/`move` keep every object's `dungeon` field in sync
    /// with its room ancestor's, but this walks the parent chain directly
    /// rather than trusting that cache, so it stays correct even for an
    /// object whose dungeon tag hasn't propagated yet (e.g. mid-construction,
    /// before it has been added under a room).
    pub fn dungeon_of(&self, id: ObjectId) -> Option<DungeonId> {
        let mut current = Some(id);
        while let Some(next) = current {
            let obj = self.objects.get(&next)?;
            if let Some(dungeon) = &obj.base.dungeon {
                return Some(dungeon.clone());
            }
            current = obj.base.parent;
        }
        None
    }

    /// `contains(obj, target)` (spec.md §4.1): direct reference check over
    /// `obj`'s contents.
    pub fn contains(&self, obj: ObjectId, target: ObjectId) -> bool {
        self.objects.get(&obj).map(|o| o.base.contents.contains(&target)).unwrap_or(false)
    }

    /// `match(obj, keyword_phrase)` (spec.md §4.1).
    pub fn matches(&self, obj: ObjectId, phrase: &str) -> bool {
        self.objects.get(&obj).map(|o| o.base.matches(phrase)).unwrap_or(false)
    }

    fn propagate_weight(&mut self, start: Option<ObjectId>, delta: f64) {
        let mut current = start;
        while let Some(id) = current {
            let Some(obj) = self.objects.get_mut(&id) else { break };
            obj.base.current_weight += delta;
            current = obj.base.parent;
        }
    }

    fn set_dungeon_recursive(&mut self, id: ObjectId, dungeon: Option<DungeonId>) {
        let children = match self.objects.get_mut(&id) {
            Some(obj) => {
                obj.base.dungeon = dungeon.clone();
                obj.base.contents.clone()
            }
            None => return,
        };
        for child in children {
            self.set_dungeon_recursive(child, dungeon.clone());
        }
    }

    /// `add(parent, child)` (spec.md §4.1).
    pub fn add(&mut self, parent: ObjectId, child: ObjectId) -> EngineResult<()> {
        if !self.exists(parent) {
            return Err(EngineError::Gone(parent));
        }
        if !self.exists(child) {
            return Err(EngineError::Gone(child));
        }
        if parent == child || self.ancestors(parent).contains(&child) {
            error!("InvariantViolation: attempted to add {:?} to itself or a descendant", child);
            return Err(EngineError::InvariantViolation(format!(
                "object {child} cannot be added to itself or a descendant"
            )));
        }

        let old_room = self.room_ancestor(child);
        let was_item = matches!(self.objects.get(&child).map(|o| &o.kind), Some(ObjectKind::Item(_)));

        if let Some(existing_parent) = self.objects.get(&child).and_then(|o| o.base.parent) {
            if existing_parent == parent {
                return Ok(()); // move() idempotence: already the parent.
            }
            self.remove(child)?;
        }

        let child_weight = self.objects.get(&child).map(|o| o.base.current_weight).unwrap_or(0.0);

        let new_dungeon = self.objects.get(&parent).and_then(|o| o.base.dungeon.clone());
        {
            let parent_obj = self.objects.get_mut(&parent).expect("checked above");
            parent_obj.base.contents.push(child);
        }
        {
            let child_obj = self.objects.get_mut(&child).expect("checked above");
            child_obj.base.parent = Some(parent);
        }

        self.propagate_weight(Some(parent), child_weight);

        let old_dungeon = self.objects.get(&child).and_then(|o| o.base.dungeon.clone());
        if old_dungeon != new_dungeon {
            self.set_dungeon_recursive(child, new_dungeon);
        }

        if was_item {
            let new_room = self.room_ancestor(child);
            if old_room != new_room {
                if let Some(child_obj) = self.objects.get_mut(&child) {
                    child_obj.base.reset_ref = None;
                }
            }
        }

        Ok(())
    }

    /// `remove(child)` (spec.md §4.1): symmetric to `add`.
    pub fn remove(&mut self, child: ObjectId) -> EngineResult<()> {
        let Some(parent) = self.objects.get(&child).and_then(|o| o.base.parent) else {
            return Ok(());
        };
        let child_weight = self.objects.get(&child).map(|o| o.base.current_weight).unwrap_or(0.0);

        if let Some(parent_obj) = self.objects.get_mut(&parent) {
            parent_obj.base.contents.retain(|c| *c != child);
        }
        if let Some(child_obj) = self.objects.get_mut(&child) {
            child_obj.base.parent = None;
        }

        self.propagate_weight(Some(parent), -child_weight);
        Ok(())
    }

    /// `move(obj, new_parent)` (spec.md §4.1): identical to `add`.
    pub fn move_object(&mut self, obj: ObjectId, new_parent: ObjectId) -> EngineResult<()> {
        self.add(new_parent, obj)
    }

    /// Full destruction (spec.md §3.4): detach from parent, clear equipped
    /// slots referencing it, then drop from the arena. Combat/threat/
    /// regeneration/effect registrations are cleared by the owning `World`
    /// before this is called.
    pub fn destroy(&mut self, id: ObjectId) -> EngineResult<()> {
        self.remove(id)?;

        // Equipping a mob stores the equipped item's id in `Mob.equipped`;
        // if the destroyed object is equipped anywhere, unequip it first.
        let wearer_slots: Vec<(ObjectId, super::object::EquipmentSlot)> = self
            .objects
            .iter()
            .filter_map(|(mob_id, obj)| {
                let mob = obj.as_mob()?;
                mob.equipped.iter().find(|(_, equipped_id)| **equipped_id == id).map(|(slot, _)| (*mob_id, *slot))
            })
            .collect();
        for (mob_id, slot) in wearer_slots {
            if let Some(mob) = self.get_mut(mob_id).and_then(|o| o.as_mob_mut()) {
                mob.equipped.remove(&slot);
            }
        }

        // Recursively destroy contents rather than orphaning them.
        let contents = self.objects.get(&id).map(|o| o.base.contents.clone()).unwrap_or_default();
        for child in contents {
            self.destroy(child)?;
        }

        self.objects.remove(&id);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &DungeonObject)> {
        self.objects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::object::*;

    fn spawn_item(g: &mut Graph, weight: f64) -> ObjectId {
        let id = g.alloc_id();
        let mut base = ObjectBase::new(id, vec!["thing".into()], "a thing");
        base.base_weight = weight;
        base.current_weight = weight;
        g.insert(DungeonObject { base, kind: ObjectKind::Item(Item { currency_amount: None, is_container: true }) })
    }

    #[test]
    fn weight_propagates_to_room_root() {
        let mut g = Graph::new();
        let outer = spawn_item(&mut g, 2.0);
        let middle = spawn_item(&mut g, 1.0);
        let inner = spawn_item(&mut g, 0.5);

        g.add(outer, middle).unwrap();
        g.add(middle, inner).unwrap();

        assert_eq!(g.get(outer).unwrap().base.current_weight, 3.5);

        g.remove(inner).unwrap();
        assert_eq!(g.get(outer).unwrap().base.current_weight, 3.0);
        assert_eq!(g.get(middle).unwrap().base.current_weight, 1.0);
    }

    #[test]
    fn add_self_or_descendant_fails() {
        let mut g = Graph::new();
        let a = spawn_item(&mut g, 0.0);
        let b = spawn_item(&mut g, 0.0);
        g.add(a, b).unwrap();

        assert!(matches!(g.add(a, a), Err(EngineError::InvariantViolation(_))));
        assert!(matches!(g.add(b, a), Err(EngineError::InvariantViolation(_))));
    }

    #[test]
    fn add_to_gone_object_fails() {
        let mut g = Graph::new();
        let a = spawn_item(&mut g, 0.0);
        let ghost = ObjectId(9999);
        assert!(matches!(g.add(ghost, a), Err(EngineError::Gone(_))));
    }

    #[test]
    fn move_is_idempotent() {
        let mut g = Graph::new();
        let a = spawn_item(&mut g, 0.0);
        let b = spawn_item(&mut g, 1.0);
        g.add(a, b).unwrap();
        g.add(a, b).unwrap();
        assert_eq!(g.get(a).unwrap().base.contents.len(), 1);
        assert_eq!(g.get(a).unwrap().base.current_weight, 1.0);
    }

    #[test]
    fn dungeon_of_walks_up_to_the_nearest_tagged_ancestor() {
        let mut g = Graph::new();
        let room = spawn_item(&mut g, 0.0);
        g.get_mut(room).unwrap().base.dungeon = Some("d1".to_string());
        let bag = spawn_item(&mut g, 0.0);
        let coin = spawn_item(&mut g, 0.0);
        g.add(room, bag).unwrap();
        g.add(bag, coin).unwrap();

        assert_eq!(g.dungeon_of(coin), Some("d1".to_string()));
        assert_eq!(g.dungeon_of(room), Some("d1".to_string()));

        let loose = spawn_item(&mut g, 0.0);
        assert_eq!(g.dungeon_of(loose), None);
    }

    #[test]
    fn contains_is_direct_reference_check() {
        let mut g = Graph::new();
        let a = spawn_item(&mut g, 0.0);
        let b = spawn_item(&mut g, 0.0);
        let c = spawn_item(&mut g, 0.0);
        g.add(a, b).unwrap();
        g.add(b, c).unwrap();
        assert!(g.contains(a, b));
        assert!(!g.contains(a, c));
    }

    #[test]
    fn destroy_recursively_removes_contents() {
        let mut g = Graph::new();
        let a = spawn_item(&mut g, 0.0);
        let b = spawn_item(&mut g, 0.0);
        g.add(a, b).unwrap();
        g.destroy(a).unwrap();
        assert!(!g.exists(a));
        assert!(!g.exists(b));
    }
}
