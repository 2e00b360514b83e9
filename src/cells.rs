use serde_derive::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::convert::From;
use std::fmt;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Cartesian2DCoordinate {
    pub x: u32,
    pub y: u32,
}

impl Cartesian2DCoordinate {
    pub fn new(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate { x, y }
    }

    /// Creates a new coordinate offset 1 cell away in the given direction.
    /// Returns None if the coordinate would be negative. The upper bound is the grid's concern.
    pub fn offset(self, dir: CompassPrimary) -> Option<Cartesian2DCoordinate> {
        let (x, y) = (self.x, self.y);
        match dir {
            CompassPrimary::North => y.checked_sub(1).map(|y| Cartesian2DCoordinate { x, y }),
            CompassPrimary::East => x.checked_add(1).map(|x| Cartesian2DCoordinate { x, y }),
            CompassPrimary::South => y.checked_add(1).map(|y| Cartesian2DCoordinate { x, y }),
            CompassPrimary::West => x.checked_sub(1).map(|x| Cartesian2DCoordinate { x, y }),
        }
    }

    /// The direction to travel from `self` to reach the orthogonally adjacent `other`.
    pub fn direction_to(self, other: Cartesian2DCoordinate) -> Option<CompassPrimary> {
        CompassPrimary::ALL
            .iter()
            .cloned()
            .find(|dir| self.offset(*dir) == Some(other))
    }
}

impl From<(u32, u32)> for Cartesian2DCoordinate {
    fn from(x_y_pair: (u32, u32)) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x_y_pair.0, x_y_pair.1)
    }
}

impl fmt::Display for Cartesian2DCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// The four cardinal directions. Row 0 is the northern edge of the grid, so North is towards y - 1.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

impl CompassPrimary {
    /// N, E, S, W. The fixed order that direction shuffling starts from.
    pub const ALL: [CompassPrimary; 4] = [
        CompassPrimary::North,
        CompassPrimary::East,
        CompassPrimary::South,
        CompassPrimary::West,
    ];

    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    #[inline]
    fn wall_index(self) -> usize {
        match self {
            CompassPrimary::North => 0,
            CompassPrimary::East => 1,
            CompassPrimary::South => 2,
            CompassPrimary::West => 3,
        }
    }
}

/// Which of a cell's four walls are still standing.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Walls {
    standing: [bool; 4],
}

impl Default for Walls {
    fn default() -> Walls {
        Walls { standing: [true; 4] }
    }
}

impl Walls {
    #[inline]
    pub fn is_present(&self, dir: CompassPrimary) -> bool {
        self.standing[dir.wall_index()]
    }

    #[inline]
    pub fn is_removed(&self, dir: CompassPrimary) -> bool {
        !self.is_present(dir)
    }

    pub fn remove(&mut self, dir: CompassPrimary) {
        self.standing[dir.wall_index()] = false;
    }

    pub fn removed_count(&self) -> usize {
        self.standing.iter().filter(|standing| !**standing).count()
    }
}

pub type CoordinateSmallVec = SmallVec<[Cartesian2DCoordinate; 4]>;

/// One room of the maze.
///
/// `neighbours` holds the cells this one has a passage to, in the order the generator carved them.
#[derive(Clone, Debug, PartialEq)]
pub struct MazeCell {
    coordinate: Cartesian2DCoordinate,
    visited: bool,
    neighbours: CoordinateSmallVec,
    walls: Walls,
}

impl MazeCell {
    pub fn new(coordinate: Cartesian2DCoordinate) -> MazeCell {
        MazeCell {
            coordinate,
            visited: false,
            neighbours: CoordinateSmallVec::new(),
            walls: Walls::default(),
        }
    }

    #[inline]
    pub fn coordinate(&self) -> Cartesian2DCoordinate {
        self.coordinate
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    #[inline]
    pub fn neighbours(&self) -> &[Cartesian2DCoordinate] {
        &self.neighbours
    }

    #[inline]
    pub fn walls(&self) -> &Walls {
        &self.walls
    }

    #[inline]
    pub fn has_wall(&self, dir: CompassPrimary) -> bool {
        self.walls.is_present(dir)
    }

    pub(crate) fn mark_visited(&mut self) {
        self.visited = true;
    }

    /// Record a passage towards `neighbour`, which lies in direction `dir`.
    /// The reverse half is the grid's job.
    pub(crate) fn open_towards(&mut self, neighbour: Cartesian2DCoordinate, dir: CompassPrimary) {
        self.walls.remove(dir);
        if !self.neighbours.contains(&neighbour) {
            self.neighbours.push(neighbour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_stop_at_zero() {
        let origin = Cartesian2DCoordinate::new(0, 0);
        assert_eq!(origin.offset(CompassPrimary::North), None);
        assert_eq!(origin.offset(CompassPrimary::West), None);
        assert_eq!(origin.offset(CompassPrimary::East),
                   Some(Cartesian2DCoordinate::new(1, 0)));
        assert_eq!(origin.offset(CompassPrimary::South),
                   Some(Cartesian2DCoordinate::new(0, 1)));
    }

    #[test]
    fn direction_between_adjacent_cells() {
        let a = Cartesian2DCoordinate::new(1, 1);
        assert_eq!(a.direction_to(Cartesian2DCoordinate::new(1, 0)), Some(CompassPrimary::North));
        assert_eq!(a.direction_to(Cartesian2DCoordinate::new(2, 1)), Some(CompassPrimary::East));
        assert_eq!(a.direction_to(Cartesian2DCoordinate::new(1, 2)), Some(CompassPrimary::South));
        assert_eq!(a.direction_to(Cartesian2DCoordinate::new(0, 1)), Some(CompassPrimary::West));
        assert_eq!(a.direction_to(Cartesian2DCoordinate::new(2, 2)), None);
        assert_eq!(a.direction_to(a), None);
    }

    #[test]
    fn opposites_pair_up() {
        for dir in CompassPrimary::ALL.iter() {
            assert_ne!(dir.opposite(), *dir);
            assert_eq!(dir.opposite().opposite(), *dir);
        }
    }

    #[test]
    fn new_cell_is_fully_walled() {
        let cell = MazeCell::new(Cartesian2DCoordinate::new(3, 4));
        assert!(!cell.is_visited());
        assert!(cell.neighbours().is_empty());
        for dir in CompassPrimary::ALL.iter() {
            assert!(cell.has_wall(*dir));
        }
        assert_eq!(cell.walls().removed_count(), 0);
    }

    #[test]
    fn opening_is_not_duplicated() {
        let mut cell = MazeCell::new(Cartesian2DCoordinate::new(0, 0));
        let east = Cartesian2DCoordinate::new(1, 0);
        cell.open_towards(east, CompassPrimary::East);
        cell.open_towards(east, CompassPrimary::East);
        assert_eq!(cell.neighbours(), &[east]);
        assert!(cell.walls().is_removed(CompassPrimary::East));
        assert_eq!(cell.walls().removed_count(), 1);
    }
}
