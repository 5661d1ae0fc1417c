pub mod direction;
pub mod dungeon;

pub use direction::{Direction, ExitFlags};
pub use dungeon::{format_room_ref, parse_room_ref, Coord, Dungeon, DungeonId};

use crate::ids::ObjectId;

impl Dungeon {
    /// `step(room, dir)` (spec.md §4.2): a link override always wins over
    /// the grid-implicit neighbor; otherwise the direction must be in
    /// `allowed_exits` and the grid neighbor must be populated.
    pub fn step_room(&self, room: ObjectId, dir: Direction, allowed_exits: ExitFlags) -> Option<ObjectId> {
        if let Some(target) = self.link_override(room, dir) {
            return Some(target);
        }
        if !allowed_exits.allows(dir) {
            return None;
        }
        let coord = self.coord_of(room)?;
        let (dx, dy, dz) = dir.offset();
        let neighbor = (coord.0 + dx, coord.1 + dy, coord.2 + dz);
        self.get_room(neighbor)
    }
}
