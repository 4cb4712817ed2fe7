use smallvec::SmallVec;
use std::fmt;
use std::ptr;

use crate::grid::{Maze, MazeError};

/// Compass directions away from a cell.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Every direction, in the order adjacency queries report neighbours.
    pub const ALL: [Direction; 4] = [Direction::North,
                                     Direction::South,
                                     Direction::East,
                                     Direction::West];

    #[inline]
    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// The (row, column) step taken when moving one cell in this direction.
    #[inline]
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
        }
    }

    /// The direction leading from `from` to `to`, if they are exactly one step apart.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        // Compared as unsigned values, far apart positions must not wrap round to a neighbour.
        let one_less = |a: usize, b: usize| a.checked_sub(1) == Some(b);
        match (from.row == to.row, from.column == to.column) {
            (false, true) if one_less(from.row, to.row) => Some(Direction::North),
            (false, true) if one_less(to.row, from.row) => Some(Direction::South),
            (true, false) if one_less(to.column, from.column) => Some(Direction::East),
            (true, false) if one_less(from.column, to.column) => Some(Direction::West),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }
}

/// What lies on one side of a cell.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum EdgeState {
    Wall,
    /// The outer boundary of the maze. Never carved.
    PermanentWall,
    Passage,
}

impl EdgeState {
    #[inline]
    pub fn is_blocked(self) -> bool {
        match self {
            EdgeState::Wall | EdgeState::PermanentWall => true,
            EdgeState::Passage => false,
        }
    }
}

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Position {
        Position { row, column }
    }
}

impl From<(usize, usize)> for Position {
    fn from(row_column_pair: (usize, usize)) -> Position {
        Position::new(row_column_pair.0, row_column_pair.1)
    }
}

pub type CellSmallVec<'a> = SmallVec<[Cell<'a>; 4]>;

/// Read only view of one cell of a maze.
///
/// A `Cell` only borrows the `Maze` that owns the cell storage, so it is cheap to copy and
/// can answer adjacency questions that need the maze's bounds.
#[derive(Copy, Clone)]
pub struct Cell<'a> {
    maze: &'a Maze,
    position: Position,
}

impl<'a> Cell<'a> {
    /// The caller guarantees `position` lies inside `maze`.
    #[inline]
    pub(crate) fn new(maze: &'a Maze, position: Position) -> Cell<'a> {
        Cell { maze, position }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.position.row
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.position.column
    }

    /// `row * width + column` of the owning maze.
    #[inline]
    pub fn ordinal(&self) -> usize {
        self.position.row * self.maze.width().0 + self.position.column
    }

    #[inline]
    pub fn edge(&self, direction: Direction) -> EdgeState {
        self.maze.edges_of(self.ordinal())[direction.index()]
    }

    /// Edge states in `Direction::ALL` order.
    pub fn edges(&self) -> [EdgeState; 4] {
        let mut edges = [EdgeState::Wall; 4];
        for (edge, dir) in edges.iter_mut().zip(Direction::ALL.iter()) {
            *edge = self.edge(*dir);
        }
        edges
    }

    /// The cell one step away in `direction`, whatever the wall between them.
    /// None at the edge of the maze.
    #[inline]
    pub fn adjacent(&self, direction: Direction) -> Option<Cell<'a>> {
        self.maze
            .neighbour(self.position, direction)
            .map(|position| Cell::new(self.maze, position))
    }

    /// Cells to the North, South, East or West of this cell, but not necessarily linked by a
    /// passage.
    pub fn adjacent_cells(&self) -> CellSmallVec<'a> {
        Direction::ALL
            .iter()
            .filter_map(|dir| self.adjacent(*dir))
            .collect()
    }

    /// Cells that can be walked to from this cell.
    pub fn reachable_neighbours(&self) -> CellSmallVec<'a> {
        Direction::ALL
            .iter()
            .filter(|dir| !self.edge(**dir).is_blocked())
            .filter_map(|dir| self.adjacent(*dir))
            .collect()
    }

    pub fn open_edges_count(&self) -> usize {
        Direction::ALL
            .iter()
            .filter(|dir| !self.edge(**dir).is_blocked())
            .count()
    }

    /// A passageway has one way in and one way out, so there is no choice to make when
    /// walking through it.
    #[inline]
    pub fn is_passageway(&self) -> bool {
        self.open_edges_count() == 2
    }

    /// The way out of a passageway cell that was entered from `entry`.
    ///
    /// `entry` is not checked to be an open neighbour of this cell; if it is not, the first
    /// open neighbour is returned.
    pub fn exit_given(&self, entry: Position) -> Result<Cell<'a>, MazeError> {
        if !self.is_passageway() {
            return Err(MazeError::NotAPassageway(self.position));
        }

        self.reachable_neighbours()
            .iter()
            .cloned()
            .find(|cell| cell.position != entry)
            .ok_or(MazeError::NotAPassageway(self.position))
    }

    #[inline]
    pub fn maze(&self) -> &'a Maze {
        self.maze
    }
}

impl<'a, 'b> PartialEq<Cell<'b>> for Cell<'a> {
    fn eq(&self, other: &Cell<'b>) -> bool {
        ptr::eq(self.maze, other.maze) && self.position == other.position
    }
}
impl<'a> Eq for Cell<'a> {}

impl<'a> fmt::Debug for Cell<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<Cell at [{}][{}]>", self.position.row, self.position.column)
    }
}

/// Mutable view of one cell of a maze, the only way to carve passages through a cell.
pub struct CellMut<'a> {
    maze: &'a mut Maze,
    position: Position,
}

impl<'a> CellMut<'a> {
    /// The caller guarantees `position` lies inside `maze`.
    #[inline]
    pub(crate) fn new(maze: &'a mut Maze, position: Position) -> CellMut<'a> {
        CellMut { maze, position }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn as_cell(&self) -> Cell<'_> {
        Cell::new(&*self.maze, self.position)
    }

    /// Open the edge in `direction` on this cell and the facing edge on its neighbour.
    pub fn carve_passage(&mut self, direction: Direction) -> Result<(), MazeError> {
        self.maze.carve_passage(self.position, direction)
    }

    /// Open a passage to an adjacent cell.
    pub fn carve_passage_to(&mut self, destination: Position) -> Result<(), MazeError> {
        self.maze.carve_passage_to(self.position, destination)
    }
}

impl<'a> fmt::Debug for CellMut<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<CellMut at [{}][{}]>", self.position.row, self.position.column)
    }
}
