//! The spatial model: a 3-D grid of room cells plus authored link
//! overrides (spec.md §4.2).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;
use crate::spatial::direction::Direction;

pub type Coord = (i32, i32, i32);

/// A dungeon's identity, as embedded in room references (`@<id>{x,y,z}`).
pub type DungeonId = String;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dungeon {
    pub id: DungeonId,
    pub width: i32,
    pub height: i32,
    pub layers: i32,
    /// Populated cells of the grid, keyed by (x, y, z).
    rooms: HashMap<Coord, ObjectId>,
    /// Authored overrides: (room, direction) -> neighbor room. A
    /// bidirectional tunnel is two entries; a one-way tunnel is one.
    links: HashMap<(ObjectId, Direction), ObjectId>,
}

impl Dungeon {
    pub fn new(id: impl Into<String>, width: i32, height: i32, layers: i32) -> Self {
        Dungeon {
            id: id.into(),
            width,
            height,
            layers,
            rooms: HashMap::new(),
            links: HashMap::new(),
        }
    }

    pub fn in_bounds(&self, (x, y, z): Coord) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height && z >= 0 && z < self.layers
    }

    /// Registers `room` as occupying `coord`. Coordinates are unique within
    /// a dungeon (spec.md §3.2); a later registration at the same coord
    /// replaces the former occupant.
    pub fn place_room(&mut self, coord: Coord, room: ObjectId) {
        self.rooms.insert(coord, room);
    }

    pub fn unplace_room(&mut self, coord: Coord) {
        self.rooms.remove(&coord);
    }

    pub fn get_room(&self, coord: Coord) -> Option<ObjectId> {
        if !self.in_bounds(coord) {
            return None;
        }
        self.rooms.get(&coord).copied()
    }

    pub fn coord_of(&self, room: ObjectId) -> Option<Coord> {
        self.rooms.iter().find(|(_, r)| **r == room).map(|(c, _)| *c)
    }

    /// Registers an override on `a`; if `one_way` is false, also registers
    /// the reverse-direction override on `b` (spec.md §4.2).
    pub fn create_tunnel(&mut self, a: ObjectId, dir: Direction, b: ObjectId, one_way: bool) {
        self.links.insert((a, dir), b);
        if !one_way {
            self.links.insert((b, dir.reverse()), a);
        }
    }

    /// Deregisters both directions of a tunnel starting at `a`, if present.
    pub fn remove_tunnel(&mut self, a: ObjectId, dir: Direction) {
        if let Some(b) = self.links.remove(&(a, dir)) {
            self.links.remove(&(b, dir.reverse()));
        }
    }

    /// Removes every registered override that references either endpoint in
    /// either direction — used when a tunnel created via `create_tunnel` is
    /// torn down from either side (spec.md §4.2 "remove() deregisters both").
    pub fn remove_tunnel_between(&mut self, a: ObjectId, dir: Direction, b: ObjectId) {
        self.links.remove(&(a, dir));
        self.links.remove(&(b, dir.reverse()));
    }

    pub fn link_override(&self, room: ObjectId, dir: Direction) -> Option<ObjectId> {
        self.links.get(&(room, dir)).copied()
    }
}

/// Parses `@<dungeon-id>{x,y,z}`. Invalid syntax resolves to `None`
/// (spec.md §4.2); bounds checking happens separately via `get_room`.
pub fn parse_room_ref(text: &str) -> Option<(DungeonId, Coord)> {
    let rest = text.strip_prefix('@')?;
    let brace = rest.find('{')?;
    let (id_part, coord_part) = rest.split_at(brace);
    if id_part.is_empty() || !id_part.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return None;
    }
    let coord_part = coord_part.strip_prefix('{')?.strip_suffix('}')?;
    let mut parts = coord_part.split(',');
    let x: i32 = parts.next()?.trim().parse().ok()?;
    let y: i32 = parts.next()?.trim().parse().ok()?;
    let z: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((id_part.to_string(), (x, y, z)))
}

pub fn format_room_ref(id: &str, coord: Coord) -> String {
    format!("@{}{{{},{},{}}}", id, coord.0, coord.1, coord.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> ObjectId {
        ObjectId(n)
    }

    #[test]
    fn one_way_tunnel_is_not_mutual() {
        let mut d = Dungeon::new("d1", 5, 5, 1);
        d.create_tunnel(id(1), Direction::East, id(2), true);
        assert_eq!(d.link_override(id(1), Direction::East), Some(id(2)));
        assert_eq!(d.link_override(id(2), Direction::West), None);

        d.remove_tunnel_between(id(1), Direction::East, id(2));
        assert_eq!(d.link_override(id(1), Direction::East), None);
    }

    #[test]
    fn bidirectional_tunnel_round_trips() {
        let mut d = Dungeon::new("d1", 5, 5, 1);
        d.create_tunnel(id(1), Direction::East, id(2), false);
        assert_eq!(d.link_override(id(1), Direction::East), Some(id(2)));
        assert_eq!(d.link_override(id(2), Direction::West), Some(id(1)));
    }

    #[test]
    fn room_ref_parses() {
        assert_eq!(parse_room_ref("@dungeon-1{1,2,0}"), Some(("dungeon-1".to_string(), (1, 2, 0))));
        assert_eq!(parse_room_ref("not-a-ref"), None);
        assert_eq!(parse_room_ref("@d{1,2}"), None);
    }
}
