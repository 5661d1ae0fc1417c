//! The top-level glue tying the entity graph, spatial model, characters,
//! combat/regeneration bookkeeping, and AI sinks into one mutable state
//! (spec.md §5: "the combat set, regeneration set, and threat tables are
//! internal to the engine and mutated only through the interfaces above").

use std::collections::{HashMap, HashSet};

use log::{error, warn};

use crate::ai::{AiEvent, AiEventSink};
use crate::command::queue::ActionQueue;
use crate::config::EngineConfig;
use crate::entity::graph::Graph;
use crate::error::ParseError;
use crate::ids::ObjectId;
use crate::messaging::{Character, MessageGroup};
use crate::spatial::dungeon::{Dungeon, DungeonId};

/// Everything the engine mutates at runtime. Content registries
/// (archetypes, abilities, templates, commands) are process-wide and owned
/// by the caller instead (spec.md §5), so they are passed into the methods
/// that need them rather than stored here.
pub struct World {
    pub graph: Graph,
    pub dungeons: HashMap<DungeonId, Dungeon>,
    /// Registered resets, keyed by the dungeon they repopulate (spec.md
    /// §4.7). Runtime state (each reset tracks its own spawned ids), so it
    /// lives on `World` rather than in a process-wide content registry.
    pub resets: HashMap<DungeonId, Vec<crate::reset::Reset>>,
    /// Keyed by mob id, not character id: a character has no identity
    /// separate from the mob it's bound to (spec.md §3.1).
    pub characters: HashMap<ObjectId, Character>,
    pub combat_set: HashSet<ObjectId>,
    /// Insertion-ordered view of `combat_set`, since combat round
    /// processing breaks agility ties by insertion order (spec.md §5) and
    /// a `HashSet` alone can't express that.
    combat_order: Vec<ObjectId>,
    pub regen_set: HashSet<ObjectId>,
    pub ai_sinks: HashMap<ObjectId, Box<dyn AiEventSink>>,
    pub config: EngineConfig,
    /// Monotonic tick counter, advanced by the game clock; used to schedule
    /// effect instance tick times.
    pub tick: u64,
    /// Destination for character death (spec.md §3.4). `None` until the
    /// loader wires a dungeon, in which case a character death is a no-op
    /// teleport rather than a panic.
    pub graveyard_room: Option<ObjectId>,
}

impl World {
    pub fn new(config: EngineConfig) -> Self {
        World {
            graph: Graph::new(),
            dungeons: HashMap::new(),
            resets: HashMap::new(),
            characters: HashMap::new(),
            combat_set: HashSet::new(),
            combat_order: Vec::new(),
            regen_set: HashSet::new(),
            ai_sinks: HashMap::new(),
            config,
            tick: 0,
            graveyard_room: None,
        }
    }

    pub fn fire_ai_event(&mut self, mob: ObjectId, event: AiEvent) {
        if let Some(sink) = self.ai_sinks.get_mut(&mob) {
            sink.on_event(mob, event);
        }
    }

    pub fn push_message(&mut self, mob: ObjectId, group: MessageGroup, text: impl Into<String>) {
        if let Some(character) = self.characters.get_mut(&mob) {
            character.push_message(group, text);
        }
    }

    /// Broadcasts to every character mob physically in `room`, optionally
    /// skipping one mob (the usual case: the actor already got a
    /// first-person variant of the message).
    pub fn broadcast_room(&mut self, room: ObjectId, except: Option<ObjectId>, group: MessageGroup, text: impl Into<String> + Clone) {
        let Some(room_obj) = self.graph.get(room) else { return };
        let occupants: Vec<ObjectId> = room_obj.base.contents.clone();
        for occupant in occupants {
            if Some(occupant) == except {
                continue;
            }
            if self.characters.contains_key(&occupant) {
                self.push_message(occupant, group, text.clone());
            }
        }
    }

    /// Sets `mob`'s combat target, maintaining `combat_set`/`combat_order`
    /// membership as a derived consequence (spec.md §4.5: "A mob is 'in
    /// combat' iff it has a non-null combat_target").
    pub fn set_combat_target(&mut self, mob: ObjectId, target: Option<ObjectId>) {
        if let Some(obj) = self.graph.get_mut(mob).and_then(|o| o.as_mob_mut()) {
            obj.combat_target = target;
        }
        if target.is_some() {
            if !self.combat_set.contains(&mob) {
                self.combat_set.insert(mob);
                self.combat_order.push(mob);
            }
        } else {
            self.combat_set.remove(&mob);
            self.combat_order.retain(|m| *m != mob);
        }
    }

    pub fn combat_order(&self) -> &[ObjectId] {
        &self.combat_order
    }

    pub fn character_queue_mut(&mut self, mob: ObjectId) -> Option<&mut ActionQueue> {
        self.characters.get_mut(&mob).map(|c| &mut c.action_queue)
    }

    pub fn notify_queued(&mut self, mob: ObjectId) {
        self.push_message(mob, MessageGroup::System, "Command queued.");
    }

    pub fn report_parse_error(&mut self, actor: ObjectId, err: ParseError) {
        match &err {
            ParseError::PatternMismatch => {}
            ParseError::MissingRequired { .. } | ParseError::UnparseableArg { .. } => {
                warn!("command parse error for {actor:?}: {err}");
                self.push_message(actor, MessageGroup::CommandResponse, err.to_string());
            }
        }
    }

    /// Programming-error path for world-mutation failures (spec.md §7):
    /// logged, and the actor gets a neutral failure message.
    pub fn report_engine_error(&mut self, actor: ObjectId, err: crate::error::EngineError) {
        error!("engine error triggered by {actor:?}: {err}");
        self.push_message(actor, MessageGroup::System, "Something went wrong.");
    }

    /// `step(movable, dir)` (spec.md §4.2): moves `movable` out of its
    /// current room into the room `dir` adjacent, if one exists and both
    /// sides' exit/enter preconditions hold. Returns `Ok(false)` (not an
    /// error) for "no exit that way" — that's an ordinary player mistake,
    /// not a world-mutation failure.
    pub fn step(&mut self, movable: ObjectId, dir: crate::spatial::direction::Direction) -> crate::error::EngineResult<bool> {
        let Some(source_room) = self.graph.room_ancestor(movable) else { return Ok(false) };
        let Some(allowed_exits) =
            self.graph.get(source_room).and_then(|o| o.as_room()).map(|r| r.allowed_exits)
        else {
            return Ok(false);
        };
        let Some(dungeon_id) = self.graph.dungeon_of(source_room) else { return Ok(false) };
        let Some(dungeon) = self.dungeons.get(&dungeon_id) else { return Ok(false) };
        let Some(target_room) = dungeon.step_room(source_room, dir, allowed_exits) else { return Ok(false) };

        let can_exit =
            self.graph.get(source_room).and_then(|o| o.as_room()).map(|r| r.can_exit(movable, dir)).unwrap_or(false);
        let can_enter =
            self.graph.get(target_room).and_then(|o| o.as_room()).map(|r| r.can_enter(movable, dir)).unwrap_or(false);
        if !can_exit || !can_enter {
            return Ok(false);
        }

        self.graph.move_object(movable, target_room)?;
        Ok(true)
    }

    /// Full destruction (spec.md §3.4): clears combat/threat/regeneration/
    /// effect registrations before delegating to the graph.
    pub fn destroy_object(&mut self, id: ObjectId) -> crate::error::EngineResult<()> {
        self.combat_set.remove(&id);
        self.combat_order.retain(|m| *m != id);
        self.regen_set.remove(&id);
        self.ai_sinks.remove(&id);
        if let Some(character) = self.characters.get_mut(&id) {
            character.action_queue.cancel();
        }
        self.graph.destroy(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::object::{DungeonObject, ObjectBase, ObjectKind, Room};
    use crate::spatial::direction::{Direction, ExitFlags};

    fn room(graph: &mut Graph, dungeon_id: &str, coord: crate::spatial::dungeon::Coord, allowed_exits: ExitFlags) -> ObjectId {
        let id = graph.alloc_id();
        let mut base = ObjectBase::new(id, vec!["room".into()], "a room");
        base.dungeon = Some(dungeon_id.to_string());
        graph.insert(DungeonObject { base, kind: ObjectKind::Room(Room { x: coord.0, y: coord.1, z: coord.2, allowed_exits }) });
        id
    }

    #[test]
    fn step_then_reverse_returns_to_the_original_room() {
        let mut world = World::new(EngineConfig::default());
        let mut dungeon = Dungeon::new("d1", 5, 5, 1);

        let start = room(&mut world.graph, "d1", (1, 1, 0), ExitFlags::NORTH);
        let north = room(&mut world.graph, "d1", (1, 0, 0), ExitFlags::SOUTH);
        dungeon.place_room((1, 1, 0), start);
        dungeon.place_room((1, 0, 0), north);
        world.dungeons.insert("d1".to_string(), dungeon);

        let mover_id = world.graph.alloc_id();
        let mover = DungeonObject { base: ObjectBase::new(mover_id, vec!["thing".into()], "a thing"), kind: ObjectKind::Item(crate::entity::object::Item { currency_amount: None, is_container: false }) };
        world.graph.insert(mover);
        world.graph.add(start, mover_id).unwrap();

        assert!(world.step(mover_id, Direction::North).unwrap());
        assert_eq!(world.graph.room_ancestor(mover_id), Some(north));

        assert!(world.step(mover_id, Direction::South).unwrap());
        assert_eq!(world.graph.room_ancestor(mover_id), Some(start));
    }

    #[test]
    fn step_fails_when_no_exit_is_allowed() {
        let mut world = World::new(EngineConfig::default());
        let mut dungeon = Dungeon::new("d1", 5, 5, 1);

        let start = room(&mut world.graph, "d1", (1, 1, 0), ExitFlags::empty());
        let north = room(&mut world.graph, "d1", (1, 0, 0), ExitFlags::SOUTH);
        dungeon.place_room((1, 1, 0), start);
        dungeon.place_room((1, 0, 0), north);
        world.dungeons.insert("d1".to_string(), dungeon);

        let mover_id = world.graph.alloc_id();
        let mover = DungeonObject { base: ObjectBase::new(mover_id, vec!["thing".into()], "a thing"), kind: ObjectKind::Item(crate::entity::object::Item { currency_amount: None, is_container: false }) };
        world.graph.insert(mover);
        world.graph.add(start, mover_id).unwrap();

        assert!(!world.step(mover_id, Direction::North).unwrap());
        assert_eq!(world.graph.room_ancestor(mover_id), Some(start));
    }
}
