//! The ten-direction exit vocabulary (spec.md §6): bit-exact long and short
//! forms, plus the reverse table used by tunnel creation and `step`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 10] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Northeast,
        Direction::Northwest,
        Direction::Southeast,
        Direction::Southwest,
        Direction::Up,
        Direction::Down,
    ];

    /// N↔S, E↔W, UP↔DOWN, NE↔SW, NW↔SE (spec.md §4.2).
    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Northeast => Direction::Southwest,
            Direction::Southwest => Direction::Northeast,
            Direction::Northwest => Direction::Southeast,
            Direction::Southeast => Direction::Northwest,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Unit grid offset (dx, dy, dz) for the grid-implicit neighbor.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::North => (0, -1, 0),
            Direction::South => (0, 1, 0),
            Direction::East => (1, 0, 0),
            Direction::West => (-1, 0, 0),
            Direction::Northeast => (1, -1, 0),
            Direction::Northwest => (-1, -1, 0),
            Direction::Southeast => (1, 1, 0),
            Direction::Southwest => (-1, 1, 0),
            Direction::Up => (0, 0, 1),
            Direction::Down => (0, 0, -1),
        }
    }

    pub fn flag(self) -> ExitFlags {
        match self {
            Direction::North => ExitFlags::NORTH,
            Direction::South => ExitFlags::SOUTH,
            Direction::East => ExitFlags::EAST,
            Direction::West => ExitFlags::WEST,
            Direction::Northeast => ExitFlags::NORTHEAST,
            Direction::Northwest => ExitFlags::NORTHWEST,
            Direction::Southeast => ExitFlags::SOUTHEAST,
            Direction::Southwest => ExitFlags::SOUTHWEST,
            Direction::Up => ExitFlags::UP,
            Direction::Down => ExitFlags::DOWN,
        }
    }

    /// Parses both long (`north`) and short (`n`) bit-exact forms (spec.md §6).
    pub fn parse(token: &str) -> Option<Direction> {
        match token.to_ascii_lowercase().as_str() {
            "north" | "n" => Some(Direction::North),
            "south" | "s" => Some(Direction::South),
            "east" | "e" => Some(Direction::East),
            "west" | "w" => Some(Direction::West),
            "northeast" | "ne" => Some(Direction::Northeast),
            "northwest" | "nw" => Some(Direction::Northwest),
            "southeast" | "se" => Some(Direction::Southeast),
            "southwest" | "sw" => Some(Direction::Southwest),
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            _ => None,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct ExitFlags: u16 {
        const NORTH     = 1 << 0;
        const SOUTH     = 1 << 1;
        const EAST      = 1 << 2;
        const WEST      = 1 << 3;
        const NORTHEAST = 1 << 4;
        const NORTHWEST = 1 << 5;
        const SOUTHEAST = 1 << 6;
        const SOUTHWEST = 1 << 7;
        const UP        = 1 << 8;
        const DOWN      = 1 << 9;
    }
}

impl ExitFlags {
    pub fn allows(self, dir: Direction) -> bool {
        self.contains(dir.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.reverse().reverse(), dir);
        }
    }

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(Direction::parse("northeast"), Some(Direction::Northeast));
        assert_eq!(Direction::parse("NE"), Some(Direction::Northeast));
        assert_eq!(Direction::parse("sideways"), None);
    }
}
