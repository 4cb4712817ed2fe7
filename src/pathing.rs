use fnv::FnvHashMap;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::cells::{Direction, EdgeState, Position};
use crate::grid::{Maze, MazeError};

/// Steps from a start position to every position reachable from it.
#[derive(Debug, Clone)]
pub struct Distances {
    start: Position,
    distances: FnvHashMap<Position, u32>,
    max_distance: u32,
}

impl Distances {
    /// Flood fill outwards from `start` through the carved passages. None if `start` is not
    /// in the maze.
    pub fn new(maze: &Maze, start: Position) -> Option<Distances> {
        let start_cell = maze.cell(start)?;

        let mut max = 0;
        let mut distances: FnvHashMap<Position, u32> =
            FnvHashMap::with_capacity_and_hasher(maze.size(), Default::default());
        distances.insert(start, 0);

        // Every step costs the same, so the first time a cell is reached is along a shortest
        // route and its distance never needs revisiting. The distances map doubles as the
        // visited set.
        let mut frontier = vec![(start_cell, 0u32)];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for (cell, distance_to_cell) in frontier {
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                for neighbour in cell.reachable_neighbours() {
                    let position = neighbour.position();
                    if !distances.contains_key(&position) {
                        distances.insert(position, distance_to_cell + 1);
                        new_frontier.push((neighbour, distance_to_cell + 1));
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Position {
        self.start
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, position: Position) -> Option<u32> {
        self.distances.get(&position).cloned()
    }

    /// Positions that are `max()` steps from the start, in row major order.
    pub fn furthest_points_on_grid(&self) -> SmallVec<[Position; 8]> {
        let furthest_distance = self.max();
        self.distances
            .iter()
            .filter(|&(_, distance)| *distance == furthest_distance)
            .map(|(position, _)| *position)
            .sorted()
            .collect()
    }
}

/// Walk back from `end_point` to the start of `distances_from_start`, always to a neighbour one
/// step closer. The returned path runs from the start to `end_point`.
pub fn shortest_path(maze: &Maze,
                     distances_from_start: &Distances,
                     end_point: Position)
                     -> Option<Vec<Position>> {

    if distances_from_start.distance_from_start_to(end_point).is_none() {
        // The end point is not reachable from start.
        return None;
    }

    let mut path = vec![end_point];
    let start = distances_from_start.start();
    let mut current = end_point;

    while current != start {
        let current_distance = distances_from_start.distance_from_start_to(current)?;

        let closest_to_start = maze.cell(current)?
            .reachable_neighbours()
            .iter()
            .filter_map(|neighbour| {
                distances_from_start.distance_from_start_to(neighbour.position())
                    .map(|distance| (neighbour.position(), distance))
            })
            .min_by_key(|&(_, distance)| distance);

        match closest_to_start {
            Some((closer, closer_distance)) if closer_distance < current_distance => {
                current = closer;
                path.push(current);
            }
            // Not getting any closer, the distances were computed for some other maze.
            _ => return None,
        }
    }

    path.reverse();
    Some(path)
}

/// The longest path in a perfect maze: the furthest point from any cell is one end of it, and
/// the furthest point from there is the other end.
pub fn longest_path(maze: &Maze) -> Option<Vec<Position>> {
    let first_distances = Distances::new(maze, maze.start_position())?;
    let long_path_start = *first_distances.furthest_points_on_grid().first()?;

    let distances_from_start = Distances::new(maze, long_path_start)?;
    let end_point = *distances_from_start.furthest_points_on_grid().first()?;

    shortest_path(maze, &distances_from_start, end_point)
}

/// Move one cell in `direction` from `position`, only if a passage has been carved that way.
pub fn step(maze: &Maze, position: Position, direction: Direction) -> Option<Position> {
    match maze.edge(position, direction)? {
        EdgeState::Passage => maze.neighbour(position, direction),
        EdgeState::Wall | EdgeState::PermanentWall => None,
    }
}

/// Keep walking while there is only one way onwards.
///
/// Having moved from `previous` into `current`, follow the passageway cells until reaching a
/// junction, a dead end or the maze's finish. Returns the positions moved into, in order; empty
/// when `current` is not a passageway.
pub fn follow_passageway(maze: &Maze,
                         previous: Position,
                         current: Position)
                         -> Result<Vec<Position>, MazeError> {
    let finish = maze.finish_position();
    let mut cell = maze.cell(current).ok_or(MazeError::InvalidPosition(current))?;
    let mut last = previous;
    let mut walked = vec![];

    // A perfect maze has no loops, but a hand carved one might.
    while walked.len() < maze.size() && cell.position() != finish && cell.is_passageway() {
        let next = cell.exit_given(last)?;
        last = cell.position();
        walked.push(next.position());
        cell = next;
    }

    Ok(walked)
}
