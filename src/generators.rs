use bit_set::BitSet;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use smallvec::SmallVec;

use crate::cells::Position;
use crate::grid::{Maze, MazeError};

/// Source of the generator's choices: which cell to start from, which unvisited neighbour to
/// walk into and which visited cell to hunt from.
pub trait IndexChooser {
    /// Pick an index in `0..len`. `len` is never zero.
    fn choose_index(&mut self, len: usize) -> usize;
}

/// Uniformly random choices from any `rand` RNG.
#[derive(Debug, Clone)]
pub struct RandomChooser<R: Rng>(pub R);

impl<R: Rng> IndexChooser for RandomChooser<R> {
    #[inline]
    fn choose_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

pub type DefaultChooser = RandomChooser<XorShiftRng>;

impl RandomChooser<XorShiftRng> {
    /// Same seed, same maze.
    pub fn from_seed_u64(seed: u64) -> DefaultChooser {
        RandomChooser(XorShiftRng::seed_from_u64(seed))
    }

    pub fn from_thread_rng() -> DefaultChooser {
        RandomChooser(XorShiftRng::seed_from_u64(rand::thread_rng().gen()))
    }
}

/// What the generator just did, reported to a `generate_with` observer.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GenerationStep {
    Started { cell: Position },
    Carved { from: Position, to: Position },
    Hunted { cell: Position },
    Finished { passages: usize },
}

type PositionSmallVec = SmallVec<[Position; 4]>;

/// Hunt-and-kill maze generation over a freshly walled maze.
///
/// Starting from a random cell it walks to random unvisited neighbours, carving a passage at
/// each step (the kill phase). When the walk is stuck it relocates to a random visited cell
/// that still has an unvisited neighbour (the hunt phase) and walks again. Every carve leads
/// into a cell that was unvisited, so the passages form a spanning tree: a perfect maze.
pub struct HuntAndKill<'a, C: IndexChooser = DefaultChooser> {
    maze: &'a mut Maze,
    chooser: C,
    unvisited: BitSet,
    // In visiting order.
    visited: Vec<usize>,
    // Visited cells that may still have an unvisited neighbour.
    hunting_ground: Vec<usize>,
    current: Option<Position>,
    passages_carved: usize,
}

impl<'a> HuntAndKill<'a, DefaultChooser> {
    pub fn new(maze: &'a mut Maze) -> HuntAndKill<'a, DefaultChooser> {
        HuntAndKill::with_chooser(maze, RandomChooser::from_thread_rng())
    }
}

impl<'a, C: IndexChooser> HuntAndKill<'a, C> {
    pub fn with_chooser(maze: &'a mut Maze, chooser: C) -> HuntAndKill<'a, C> {
        let cells_count = maze.size();
        HuntAndKill {
            maze,
            chooser,
            unvisited: (0..cells_count).collect(),
            visited: Vec::with_capacity(cells_count),
            hunting_ground: Vec::with_capacity(cells_count),
            current: None,
            passages_carved: 0,
        }
    }

    #[inline]
    pub fn unvisited(&self) -> &BitSet {
        &self.unvisited
    }

    /// Visited cell ordinals, in the order they were visited.
    #[inline]
    pub fn visited(&self) -> &[usize] {
        &self.visited
    }

    #[inline]
    pub fn current(&self) -> Option<Position> {
        self.current
    }

    #[inline]
    pub fn passages_carved(&self) -> usize {
        self.passages_carved
    }

    #[inline]
    pub fn maze(&self) -> &Maze {
        self.maze
    }

    pub fn generate(&mut self) -> Result<(), MazeError> {
        self.generate_with(|_, _| {})
    }

    /// Generate the maze, calling `observer` after every step with a read only view of the
    /// maze as it stands.
    pub fn generate_with<F>(&mut self, mut observer: F) -> Result<(), MazeError>
        where F: FnMut(&GenerationStep, &Maze)
    {
        let mut current = match self.current {
            Some(position) => position,
            None => {
                let start = self.choose_start()?;
                observer(&GenerationStep::Started { cell: start }, self.maze);
                start
            }
        };

        while !self.unvisited.is_empty() {
            debug!("Processing cell [{}][{}], {} cells left unvisited.",
                   current.row,
                   current.column,
                   self.unvisited.len());

            let candidates = self.unvisited_neighbours(current);
            if candidates.is_empty() {
                match self.hunt() {
                    Some(cell) => {
                        debug!("No unvisited neighbours, hunting from [{}][{}].",
                               cell.row,
                               cell.column);
                        current = cell;
                        self.current = Some(cell);
                        observer(&GenerationStep::Hunted { cell }, self.maze);
                        continue;
                    }
                    None => {
                        let unvisited = self.unvisited.len();
                        warn!("Hunt found no visited cell next to the {} unvisited cells.",
                              unvisited);
                        return Err(MazeError::HuntExhausted { unvisited });
                    }
                }
            }

            let next = candidates[self.chooser.choose_index(candidates.len())];
            self.maze
                .cell_mut(current)
                .ok_or(MazeError::InvalidPosition(current))?
                .carve_passage_to(next)?;
            self.passages_carved += 1;
            self.mark_visited(next)?;
            self.current = Some(next);
            observer(&GenerationStep::Carved {
                         from: current,
                         to: next,
                     },
                     self.maze);
            current = next;
        }

        info!("Finished a {}x{} maze with {} passages.",
              self.maze.height().0,
              self.maze.width().0,
              self.passages_carved);
        observer(&GenerationStep::Finished { passages: self.passages_carved },
                 self.maze);
        Ok(())
    }

    /// Positions next to `position` that have not been visited yet.
    pub fn unvisited_neighbours(&self, position: Position) -> PositionSmallVec {
        match self.maze.cell(position) {
            Some(cell) => {
                cell.adjacent_cells()
                    .iter()
                    .filter(|neighbour| self.unvisited.contains(neighbour.ordinal()))
                    .map(|neighbour| neighbour.position())
                    .collect()
            }
            None => PositionSmallVec::new(),
        }
    }

    fn choose_start(&mut self) -> Result<Position, MazeError> {
        let index = self.chooser.choose_index(self.unvisited.len());
        let ordinal = self.unvisited.iter().nth(index).unwrap_or(0);
        let position = self.maze
            .ordinal_to_position(ordinal)
            .ok_or(MazeError::InvalidPosition(Position::new(0, 0)))?;
        self.mark_visited(position)?;
        self.current = Some(position);
        Ok(position)
    }

    /// Pick visited cells at random until one has an unvisited neighbour. Cells found with
    /// none are dropped for good, the unvisited set only ever shrinks.
    fn hunt(&mut self) -> Option<Position> {
        while !self.hunting_ground.is_empty() {
            let index = self.chooser.choose_index(self.hunting_ground.len());
            let position = self.maze.ordinal_to_position(self.hunting_ground[index])?;
            if self.unvisited_neighbours(position).is_empty() {
                let _ = self.hunting_ground.swap_remove(index);
            } else {
                return Some(position);
            }
        }
        None
    }

    fn mark_visited(&mut self, position: Position) -> Result<(), MazeError> {
        let ordinal = self.maze
            .position_to_ordinal(position)
            .ok_or(MazeError::InvalidPosition(position))?;
        if self.unvisited.remove(ordinal) {
            self.visited.push(ordinal);
            self.hunting_ground.push(ordinal);
        }
        Ok(())
    }
}

/// Apply the hunt-and-kill maze generation algorithm to a freshly walled maze.
pub fn hunt_and_kill(maze: &mut Maze) -> Result<(), MazeError> {
    HuntAndKill::new(maze).generate()
}

/// Hunt-and-kill with a seeded RNG, reproducing the same maze for the same seed.
pub fn hunt_and_kill_seeded(maze: &mut Maze, seed: u64) -> Result<(), MazeError> {
    HuntAndKill::with_chooser(maze, RandomChooser::from_seed_u64(seed)).generate()
}
