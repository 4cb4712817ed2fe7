use petgraph::graph::{Graph, NodeIndex, UnGraph};
use std::error::Error;
use std::fmt;

use crate::cells::{Cell, CellMut, Direction, EdgeState, Position};
use crate::units::{Height, Width};

/// A rectangular maze of cells.
///
/// Every cell starts walled in. Edges facing outside the maze are `PermanentWall`, all others
/// `Wall` until a passage is carved. Carving always opens both sides of an edge together.
#[derive(Clone)]
pub struct Maze {
    height: usize,
    width: usize,
    // Indexed by cell ordinal, edges in `Direction::index` order.
    edges: Vec<[EdgeState; 4]>,
    start: Position,
    finish: Position,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum MazeError {
    ZeroDimension { height: usize, width: usize },
    InvalidPosition(Position),
    NoAdjacentCell { position: Position, direction: Direction },
    NotAdjacent { from: Position, to: Position },
    PermanentWall { position: Position, direction: Direction },
    NotAPassageway(Position),
    HuntExhausted { unvisited: usize },
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MazeError::ZeroDimension { height, width } => {
                write!(f, "maze dimensions must be at least 1x1, got {}x{}", height, width)
            }
            MazeError::InvalidPosition(p) => {
                write!(f, "position [{}][{}] is outside the maze", p.row, p.column)
            }
            MazeError::NoAdjacentCell { position, direction } => {
                write!(f,
                       "no cell {:?} of [{}][{}]",
                       direction,
                       position.row,
                       position.column)
            }
            MazeError::NotAdjacent { from, to } => {
                write!(f,
                       "[{}][{}] is not adjacent to [{}][{}]",
                       to.row,
                       to.column,
                       from.row,
                       from.column)
            }
            MazeError::PermanentWall { position, direction } => {
                write!(f,
                       "the {:?} wall of [{}][{}] is permanent",
                       direction,
                       position.row,
                       position.column)
            }
            MazeError::NotAPassageway(p) => {
                write!(f, "[{}][{}] is not a passageway", p.row, p.column)
            }
            MazeError::HuntExhausted { unvisited } => {
                write!(f, "hunt found no way into the {} unvisited cells", unvisited)
            }
        }
    }
}

impl Error for MazeError {}

impl fmt::Debug for Maze {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Maze :: height: {}, width: {}, passages: {}",
               self.height,
               self.width,
               self.passages_count())
    }
}

impl Maze {
    pub fn new(height: Height, width: Width) -> Result<Maze, MazeError> {
        let (Height(rows), Width(columns)) = (height, width);
        if rows == 0 || columns == 0 {
            return Err(MazeError::ZeroDimension {
                height: rows,
                width: columns,
            });
        }

        let mut edges = vec![[EdgeState::Wall; 4]; rows * columns];
        for (ordinal, cell_edges) in edges.iter_mut().enumerate() {
            let (row, column) = (ordinal / columns, ordinal % columns);
            if row == 0 {
                cell_edges[Direction::North.index()] = EdgeState::PermanentWall;
            }
            if row == rows - 1 {
                cell_edges[Direction::South.index()] = EdgeState::PermanentWall;
            }
            if column == 0 {
                cell_edges[Direction::West.index()] = EdgeState::PermanentWall;
            }
            if column == columns - 1 {
                cell_edges[Direction::East.index()] = EdgeState::PermanentWall;
            }
        }

        Ok(Maze {
            height: rows,
            width: columns,
            edges,
            start: Position::new(0, 0),
            finish: Position::new(rows - 1, columns - 1),
        })
    }

    #[inline]
    pub fn height(&self) -> Height {
        Height(self.height)
    }

    #[inline]
    pub fn width(&self) -> Width {
        Width(self.width)
    }

    /// Number of cells in the maze.
    #[inline]
    pub fn size(&self) -> usize {
        self.height * self.width
    }

    #[inline]
    pub fn start(&self) -> Cell<'_> {
        Cell::new(self, self.start)
    }

    #[inline]
    pub fn finish(&self) -> Cell<'_> {
        Cell::new(self, self.finish)
    }

    #[inline]
    pub fn start_position(&self) -> Position {
        self.start
    }

    #[inline]
    pub fn finish_position(&self) -> Position {
        self.finish
    }

    pub fn cell(&self, position: Position) -> Option<Cell<'_>> {
        if self.contains(position) {
            Some(Cell::new(self, position))
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, position: Position) -> Option<CellMut<'_>> {
        if self.contains(position) {
            Some(CellMut::new(self, position))
        } else {
            None
        }
    }

    pub fn cell_at_ordinal(&self, ordinal: usize) -> Option<Cell<'_>> {
        self.ordinal_to_position(ordinal).map(|position| Cell::new(self, position))
    }

    /// Convert a position to a one dimensional index in the range 0..maze.size().
    /// Returns None if the position is outside the maze.
    #[inline]
    pub fn position_to_ordinal(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.row * self.width + position.column)
        } else {
            None
        }
    }

    #[inline]
    pub fn ordinal_to_position(&self, ordinal: usize) -> Option<Position> {
        if ordinal < self.size() {
            Some(Position::new(ordinal / self.width, ordinal % self.width))
        } else {
            None
        }
    }

    /// Signed so that positions stepped off the north or west side can be asked about.
    #[inline]
    pub fn is_in_bounds(&self, row: isize, column: isize) -> bool {
        row >= 0 && column >= 0 && (row as usize) < self.height && (column as usize) < self.width
    }

    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        position.row < self.height && position.column < self.width
    }

    /// The position one step away in `direction`, if it lies inside the maze.
    pub fn neighbour(&self, position: Position, direction: Direction) -> Option<Position> {
        if !self.contains(position) {
            return None;
        }
        let (row_change, column_change) = direction.offset();
        let neighbour = Position::new(position.row.checked_add_signed(row_change)?,
                                      position.column.checked_add_signed(column_change)?);
        if self.contains(neighbour) {
            Some(neighbour)
        } else {
            None
        }
    }

    pub fn edge(&self, position: Position, direction: Direction) -> Option<EdgeState> {
        self.position_to_ordinal(position)
            .map(|ordinal| self.edges[ordinal][direction.index()])
    }

    #[inline]
    pub(crate) fn edges_of(&self, ordinal: usize) -> &[EdgeState; 4] {
        &self.edges[ordinal]
    }

    /// Open a passage from `position` towards `direction`, on both sides of the edge.
    pub fn carve_passage(&mut self,
                         position: Position,
                         direction: Direction)
                         -> Result<(), MazeError> {
        let ordinal = self.position_to_ordinal(position)
            .ok_or(MazeError::InvalidPosition(position))?;

        if self.edges[ordinal][direction.index()] == EdgeState::PermanentWall {
            return Err(MazeError::PermanentWall {
                position,
                direction,
            });
        }

        let neighbour_ordinal = self.neighbour(position, direction)
            .and_then(|neighbour| self.position_to_ordinal(neighbour))
            .ok_or(MazeError::NoAdjacentCell {
                position,
                direction,
            })?;

        self.edges[ordinal][direction.index()] = EdgeState::Passage;
        self.edges[neighbour_ordinal][direction.reverse().index()] = EdgeState::Passage;
        Ok(())
    }

    /// Open a passage between two adjacent cells.
    pub fn carve_passage_to(&mut self, from: Position, to: Position) -> Result<(), MazeError> {
        if !self.contains(from) {
            return Err(MazeError::InvalidPosition(from));
        }
        // A target just off the edge still reports the permanent wall between them.
        let direction = Direction::between(from, to)
            .ok_or(MazeError::NotAdjacent { from, to })?;
        self.carve_passage(from, direction)
    }

    /// Cells in row major order.
    #[inline]
    pub fn iter(&self) -> CellIter<'_> {
        CellIter {
            maze: self,
            current_ordinal: 0,
        }
    }

    #[inline]
    pub fn iter_rows(&self) -> RowIter<'_> {
        RowIter {
            maze: self,
            current_row: 0,
        }
    }

    /// Every carved passage once, as the pair of positions it joins. The first position is
    /// always north or west of the second.
    pub fn iter_passages(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        static FORWARD_DIRECTIONS: [Direction; 2] = [Direction::South, Direction::East];

        self.iter().flat_map(move |cell| {
            FORWARD_DIRECTIONS
                .iter()
                .filter(move |dir| cell.edge(**dir) == EdgeState::Passage)
                .filter_map(move |dir| cell.adjacent(*dir))
                .map(move |neighbour| (cell.position(), neighbour.position()))
        })
    }

    pub fn passages_count(&self) -> usize {
        self.iter_passages().count()
    }

    /// An undirected graph with one node per cell, indexed by ordinal, and one edge per
    /// carved passage.
    pub fn passage_graph(&self) -> UnGraph<Position, ()> {
        let cells_count = self.size();
        let mut graph: UnGraph<Position, ()> =
            Graph::with_capacity(cells_count, cells_count.saturating_sub(1));
        for cell in self.iter() {
            let _ = graph.add_node(cell.position());
        }
        for (a, b) in self.iter_passages() {
            if let (Some(a_index), Some(b_index)) = (self.position_to_ordinal(a),
                                                     self.position_to_ordinal(b)) {
                let _ = graph.add_edge(NodeIndex::new(a_index), NodeIndex::new(b_index), ());
            }
        }
        graph
    }
}

#[derive(Debug, Copy, Clone)]
pub struct CellIter<'a> {
    maze: &'a Maze,
    current_ordinal: usize,
}

impl<'a> Iterator for CellIter<'a> {
    type Item = Cell<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.maze.cell_at_ordinal(self.current_ordinal);
        if cell.is_some() {
            self.current_ordinal += 1;
        }
        cell
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.maze.size() - self.current_ordinal;
        (remaining, Some(remaining))
    }
}
impl<'a> ExactSizeIterator for CellIter<'a> {} // default impl using size_hint()

impl<'a> IntoIterator for &'a Maze {
    type Item = Cell<'a>;
    type IntoIter = CellIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct RowIter<'a> {
    maze: &'a Maze,
    current_row: usize,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = Vec<Cell<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row < self.maze.height {
            let row = self.current_row;
            let cells = (0..self.maze.width)
                .map(|column| Cell::new(self.maze, Position::new(row, column)))
                .collect();
            self.current_row += 1;
            Some(cells)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.maze.height - self.current_row;
        (remaining, Some(remaining))
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use petgraph::algo::{connected_components, is_cyclic_undirected};
    use quickcheck::{quickcheck, TestResult};

    fn maze(h: usize, w: usize) -> Maze {
        Maze::new(Height(h), Width(w)).expect("valid maze dimensions")
    }

    fn pc(row: usize, column: usize) -> Position {
        Position::new(row, column)
    }

    #[test]
    fn create_small_maze() {
        let m = maze(2, 3);
        assert_eq!(m.height(), Height(2));
        assert_eq!(m.width(), Width(3));
        assert_eq!(m.size(), 6);
        assert_eq!(m.iter_rows().count(), 2);
        assert!(m.iter_rows().all(|row| row.len() == 3));
    }

    #[test]
    fn zero_sized_maze_is_rejected() {
        assert_eq!(Maze::new(Height(0), Width(3)).err(),
                   Some(MazeError::ZeroDimension { height: 0, width: 3 }));
        assert_eq!(Maze::new(Height(3), Width(0)).err(),
                   Some(MazeError::ZeroDimension { height: 3, width: 0 }));
    }

    #[test]
    fn cells_at_edge_have_permanent_walls() {
        let m = maze(2, 2);
        let edge = |r, c, dir| m.cell(pc(r, c)).unwrap().edge(dir);
        assert_eq!(edge(0, 0, Direction::North), EdgeState::PermanentWall);
        assert_eq!(edge(0, 0, Direction::West), EdgeState::PermanentWall);
        assert_eq!(edge(1, 0, Direction::West), EdgeState::PermanentWall);
        assert_eq!(edge(1, 0, Direction::South), EdgeState::PermanentWall);
        assert_eq!(edge(1, 1, Direction::East), EdgeState::PermanentWall);
        assert_eq!(edge(1, 1, Direction::South), EdgeState::PermanentWall);
        assert_eq!(edge(0, 1, Direction::North), EdgeState::PermanentWall);
        assert_eq!(edge(0, 1, Direction::East), EdgeState::PermanentWall);
    }

    #[test]
    fn whole_boundary_is_permanent_and_interior_is_carvable() {
        fn p(h: u8, w: u8) -> TestResult {
            let (h, w) = (h as usize % 12, w as usize % 12);
            if h == 0 || w == 0 {
                return TestResult::discard();
            }
            let m = Maze::new(Height(h), Width(w)).unwrap();
            let all_correct = m.iter().all(|cell| {
                Direction::ALL.iter().all(|dir| {
                    let expected = if cell.adjacent(*dir).is_some() {
                        EdgeState::Wall
                    } else {
                        EdgeState::PermanentWall
                    };
                    cell.edge(*dir) == expected
                })
            });
            TestResult::from_bool(all_correct)
        }
        quickcheck(p as fn(u8, u8) -> TestResult);
    }

    #[test]
    fn start_and_finish_cells() {
        let m = maze(3, 4);
        assert_eq!(m.start().position(), pc(0, 0));
        assert_eq!(m.finish().position(), pc(2, 3));
        assert_eq!(m.start(), m.cell(pc(0, 0)).unwrap());
        assert_eq!(m.finish(), m.cell(pc(2, 3)).unwrap());

        let single = maze(1, 1);
        assert_eq!(single.start(), single.finish());
    }

    #[test]
    fn position_to_ordinal() {
        let m = maze(3, 4);
        assert_eq!(m.position_to_ordinal(pc(0, 0)), Some(0));
        assert_eq!(m.position_to_ordinal(pc(1, 1)), Some(5));
        assert_eq!(m.position_to_ordinal(pc(2, 3)), Some(11));
        assert_eq!(m.position_to_ordinal(pc(3, 0)), None);
        assert_eq!(m.position_to_ordinal(pc(0, 4)), None);
    }

    #[test]
    fn ordinal_to_position() {
        let m = maze(3, 4);
        assert_eq!(m.ordinal_to_position(0), Some(pc(0, 0)));
        assert_eq!(m.ordinal_to_position(5), Some(pc(1, 1)));
        assert_eq!(m.ordinal_to_position(11), Some(pc(2, 3)));
        assert_eq!(m.ordinal_to_position(12), None);
    }

    #[test]
    fn ordinals_and_positions_are_inverses() {
        fn p(h: u8, w: u8) -> TestResult {
            let (h, w) = (h as usize % 20, w as usize % 20);
            if h == 0 || w == 0 {
                return TestResult::discard();
            }
            let m = Maze::new(Height(h), Width(w)).unwrap();
            let positions_round_trip = m.iter().all(|cell| {
                let p = cell.position();
                m.position_to_ordinal(p).and_then(|o| m.ordinal_to_position(o)) == Some(p)
            });
            let ordinals_round_trip = (0..m.size()).all(|o| {
                m.ordinal_to_position(o).and_then(|p| m.position_to_ordinal(p)) == Some(o)
            });
            TestResult::from_bool(positions_round_trip && ordinals_round_trip)
        }
        quickcheck(p as fn(u8, u8) -> TestResult);
    }

    #[test]
    fn ordinal_to_cell() {
        let m = maze(3, 4);
        assert_eq!(m.cell_at_ordinal(0), m.cell(pc(0, 0)));
        assert_eq!(m.cell_at_ordinal(11), m.cell(pc(2, 3)));
        assert!(m.cell_at_ordinal(12).is_none());
    }

    #[test]
    fn is_in_bounds() {
        let m = maze(3, 3);
        assert!(m.is_in_bounds(0, 0));
        assert!(m.is_in_bounds(2, 2));
        assert!(!m.is_in_bounds(-1, 0));
        assert!(!m.is_in_bounds(0, -1));
        assert!(!m.is_in_bounds(0, 3));
        assert!(!m.is_in_bounds(3, 0));
    }

    #[test]
    fn cell_lookup_outside_maze() {
        let mut m = maze(2, 2);
        assert!(m.cell(pc(2, 0)).is_none());
        assert!(m.cell_mut(pc(0, 2)).is_none());
        assert_eq!(m.edge(pc(5, 5), Direction::North), None);
    }

    #[test]
    fn neighbours() {
        let m = maze(2, 2);
        let check_neighbour = |p, dir, expected| {
            assert_eq!(m.neighbour(p, dir), expected);
        };
        check_neighbour(pc(0, 0), Direction::North, None);
        check_neighbour(pc(0, 0), Direction::South, Some(pc(1, 0)));
        check_neighbour(pc(0, 0), Direction::East, Some(pc(0, 1)));
        check_neighbour(pc(0, 0), Direction::West, None);

        check_neighbour(pc(1, 1), Direction::North, Some(pc(0, 1)));
        check_neighbour(pc(1, 1), Direction::South, None);
        check_neighbour(pc(1, 1), Direction::East, None);
        check_neighbour(pc(1, 1), Direction::West, Some(pc(1, 0)));

        check_neighbour(pc(7, 7), Direction::North, None);
    }

    #[test]
    fn carving_outside_maze_fails() {
        let mut m = maze(2, 2);
        assert_eq!(m.carve_passage(pc(2, 2), Direction::North),
                   Err(MazeError::InvalidPosition(pc(2, 2))));
        assert_eq!(m.carve_passage_to(pc(2, 2), pc(1, 2)),
                   Err(MazeError::InvalidPosition(pc(2, 2))));
    }

    #[test]
    fn far_out_positions_have_no_neighbours() {
        let m = maze(2, 2);
        for dir in Direction::ALL.iter() {
            assert_eq!(m.neighbour(pc(isize::MAX as usize, 0), *dir), None);
            assert_eq!(m.neighbour(pc(usize::MAX, usize::MAX), *dir), None);
            assert_eq!(m.neighbour(pc(0, usize::MAX), *dir), None);
        }
        assert!(m.cell(pc(usize::MAX, 0)).is_none());
        assert_eq!(m.edge(pc(usize::MAX, 0), Direction::South), None);
    }

    #[test]
    fn carving_to_far_out_position_fails() {
        let mut m = maze(2, 2);
        let far = pc(1 << 63, 0);
        assert_eq!(m.carve_passage_to(pc(1, 0), far),
                   Err(MazeError::NotAdjacent {
                       from: pc(1, 0),
                       to: far,
                   }));
        assert_eq!(m.carve_passage_to(pc(0, 0), pc(usize::MAX, 0)),
                   Err(MazeError::NotAdjacent {
                       from: pc(0, 0),
                       to: pc(usize::MAX, 0),
                   }));
        assert_eq!(m.cell_mut(pc(1, 1)).unwrap().carve_passage_to(pc(1, usize::MAX)),
                   Err(MazeError::NotAdjacent {
                       from: pc(1, 1),
                       to: pc(1, usize::MAX),
                   }));
        assert_eq!(m.passages_count(), 0);
    }

    #[test]
    fn carving_towards_outside_maze_fails() {
        let mut m = maze(2, 2);
        assert_eq!(m.carve_passage_to(pc(0, 1), pc(0, 2)),
                   Err(MazeError::PermanentWall {
                       position: pc(0, 1),
                       direction: Direction::East,
                   }));
        assert_eq!(m.passages_count(), 0);
    }

    #[test]
    fn carving_twice_is_one_passage() {
        let mut m = maze(2, 2);
        m.carve_passage(pc(0, 0), Direction::East).unwrap();
        m.carve_passage(pc(0, 1), Direction::West).unwrap();
        m.carve_passage_to(pc(0, 0), pc(0, 1)).unwrap();
        assert_eq!(m.passages_count(), 1);
    }

    #[test]
    fn cell_iter() {
        let m = maze(2, 2);
        assert_eq!(m.iter().map(|c| c.position()).collect::<Vec<_>>(),
                   &[pc(0, 0), pc(0, 1), pc(1, 0), pc(1, 1)]);
        assert_eq!(m.iter().len(), 4);
        assert_eq!((&m).into_iter().count(), 4);
    }

    #[test]
    fn row_iter() {
        let m = maze(2, 3);
        let rows = m.iter_rows()
            .map(|row| row.iter().map(|c| c.position()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(rows,
                   vec![vec![pc(0, 0), pc(0, 1), pc(0, 2)], vec![pc(1, 0), pc(1, 1), pc(1, 2)]]);
    }

    #[test]
    fn passages_iter() {
        let mut m = maze(3, 3);
        assert_eq!(m.iter_passages().count(), 0);

        m.carve_passage(pc(1, 1), Direction::North).unwrap();
        m.carve_passage(pc(1, 1), Direction::West).unwrap();
        m.carve_passage(pc(2, 2), Direction::North).unwrap();

        let passages = m.iter_passages().collect::<Vec<_>>();
        assert_eq!(passages,
                   vec![(pc(0, 1), pc(1, 1)), (pc(1, 0), pc(1, 1)), (pc(1, 2), pc(2, 2))]);
        assert_eq!(m.passages_count(), 3);
    }

    #[test]
    fn passage_graph_of_walled_maze() {
        let m = maze(3, 3);
        let g = m.passage_graph();
        assert_eq!(g.node_count(), 9);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(connected_components(&g), 9);
    }

    #[test]
    fn passage_graph_detects_loops() {
        let mut m = maze(2, 2);
        m.carve_passage_to(pc(0, 0), pc(0, 1)).unwrap();
        m.carve_passage_to(pc(0, 1), pc(1, 1)).unwrap();
        m.carve_passage_to(pc(1, 1), pc(1, 0)).unwrap();
        assert!(!is_cyclic_undirected(&m.passage_graph()));
        assert_eq!(connected_components(&m.passage_graph()), 1);

        m.carve_passage_to(pc(1, 0), pc(0, 0)).unwrap();
        let g = m.passage_graph();
        assert_eq!(g.edge_count(), 4);
        assert!(is_cyclic_undirected(&g));
        assert_eq!(g[NodeIndex::new(3)], pc(1, 1));
    }

    #[test]
    fn error_messages() {
        assert_eq!(MazeError::ZeroDimension { height: 0, width: 2 }.to_string(),
                   "maze dimensions must be at least 1x1, got 0x2");
        assert_eq!(MazeError::NotAPassageway(pc(1, 2)).to_string(),
                   "[1][2] is not a passageway");
        assert_eq!(MazeError::PermanentWall {
                           position: pc(0, 0),
                           direction: Direction::North,
                       }
                       .to_string(),
                   "the North wall of [0][0] is permanent");
        assert_eq!(MazeError::HuntExhausted { unvisited: 3 }.to_string(),
                   "hunt found no way into the 3 unvisited cells");
    }
}
