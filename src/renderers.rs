use std::fmt;

use fnv::FnvHashSet;
use smallvec::SmallVec;

use crate::cells::{Cell, Direction, EdgeState, Position};
use crate::grid::Maze;
use crate::pathing::Distances;

/// Two characters: the south wall, `_` or a space, then the east wall, `|` or `_` when open.
impl<'a> fmt::Display for Cell<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let south = if self.edge(Direction::South).is_blocked() { "_" } else { " " };
        let east = if self.edge(Direction::East).is_blocked() { "|" } else { "_" };
        write!(f, "{}{}", south, east)
    }
}

/// ASCII rendering: an underscore header, then one line per row of `|` followed by each
/// cell's two characters.
impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let header_length = self.width().0 * 2 - 1;
        writeln!(f, " {} ", "_".repeat(header_length))?;
        for row in self.iter_rows() {
            f.write_str("|")?;
            for cell in row {
                write!(f, "{}", cell)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

pub fn render_text(maze: &Maze) -> String {
    maze.to_string()
}

/// Content drawn inside each cell by `render_unicode`, three characters wide.
pub trait CellDisplay {
    fn render_cell_body(&self, _: Position) -> String {
        String::from("   ")
    }
}

impl CellDisplay for Distances {
    fn render_cell_body(&self, position: Position) -> String {
        if let Some(d) = self.distance_from_start_to(position) {
            // centre align, padding 3, lowercase hexadecimal
            format!("{:^3x}", d)
        } else {
            String::from("   ")
        }
    }
}

type PositionSmallVec = SmallVec<[Position; 4]>;

#[derive(Debug)]
pub struct StartEndPointsDisplay {
    starts: PositionSmallVec,
    ends: PositionSmallVec,
}
impl StartEndPointsDisplay {
    pub fn new(starts: PositionSmallVec, ends: PositionSmallVec) -> StartEndPointsDisplay {
        StartEndPointsDisplay { starts, ends }
    }
}
impl CellDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, position: Position) -> String {
        if self.starts.contains(&position) {
            String::from(" S ")
        } else if self.ends.contains(&position) {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path: FnvHashSet<Position>,
}
impl PathDisplay {
    pub fn new(path: &[Position]) -> Self {
        let mut on_path = FnvHashSet::with_capacity_and_hasher(path.len(), Default::default());
        on_path.extend(path.iter().cloned());
        PathDisplay { on_path }
    }
}
impl CellDisplay for PathDisplay {
    fn render_cell_body(&self, position: Position) -> String {
        if self.on_path.contains(&position) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

/// Box drawing rendering of the maze with an optional cell body display. Never changes the
/// maze.
pub fn render_unicode(maze: &Maze, display: Option<&dyn CellDisplay>) -> String {
    const WALL_L: &str = "╴";
    const WALL_R: &str = "╶";
    const WALL_U: &str = "╵";
    const WALL_D: &str = "╷";
    const WALL_LR_3: &str = "───";
    const WALL_LR: &str = "─";
    const WALL_UD: &str = "│";
    const WALL_LD: &str = "┐";
    const WALL_RU: &str = "└";
    const WALL_LU: &str = "┘";
    const WALL_RD: &str = "┌";
    const WALL_LRU: &str = "┴";
    const WALL_LRD: &str = "┬";
    const WALL_LRUD: &str = "┼";
    const WALL_RUD: &str = "├";
    const WALL_LUD: &str = "┤";

    let columns_count = maze.width().0;
    let rows_count = maze.height().0;
    let is_open = |cell: &Cell<'_>, direction| cell.edge(direction) == EdgeState::Passage;

    // The north most boundary is special cased, every other row draws its own south side.
    let mut output = String::from(WALL_RD);
    for (index, cell) in maze.iter().take(columns_count).enumerate() {
        output.push_str(WALL_LR_3);
        if is_open(&cell, Direction::East) {
            output.push_str(WALL_LR);
        } else if index == columns_count - 1 {
            output.push_str(WALL_LD);
        } else {
            output.push_str(WALL_LRD);
        }
    }
    output.push('\n');

    for (index_row, row) in maze.iter_rows().enumerate() {
        let is_last_row = index_row == rows_count - 1;

        // The west most boundary of the row
        let mut middle_section = String::from(WALL_UD);
        let mut bottom_section = String::new();

        for (index_column, cell) in row.into_iter().enumerate() {
            let is_last_column = index_column == columns_count - 1;
            let east_open = is_open(&cell, Direction::East);
            let south_open = is_open(&cell, Direction::South);

            match display {
                Some(displayer) => middle_section.push_str(&displayer.render_cell_body(cell.position())),
                None => middle_section.push_str("   "),
            }
            middle_section.push_str(if east_open { " " } else { WALL_UD });

            if index_column == 0 {
                bottom_section.push_str(if is_last_row {
                    WALL_RU
                } else if south_open {
                    WALL_UD
                } else {
                    WALL_RUD
                });
            }
            bottom_section.push_str(if south_open { "   " } else { WALL_LR_3 });

            // The south east corner joins up to four wall sections.
            let corner = match (is_last_row, is_last_column) {
                (true, true) => WALL_LU,
                (true, false) => if east_open { WALL_LR } else { WALL_LRU },
                (false, true) => if south_open { WALL_UD } else { WALL_LUD },
                (false, false) => {
                    let access_se_from_east = cell.adjacent(Direction::East)
                        .map_or(false, |c| is_open(&c, Direction::South));
                    let access_se_from_south = cell.adjacent(Direction::South)
                        .map_or(false, |c| is_open(&c, Direction::East));
                    let show_right_section = !access_se_from_east;
                    let show_down_section = !access_se_from_south;
                    let show_up_section = !east_open;
                    let show_left_section = !south_open;

                    match (show_left_section,
                           show_right_section,
                           show_up_section,
                           show_down_section) {
                        (true, true, true, true) => WALL_LRUD,
                        (true, true, true, false) => WALL_LRU,
                        (true, true, false, true) => WALL_LRD,
                        (true, false, true, true) => WALL_LUD,
                        (false, true, true, true) => WALL_RUD,
                        (true, true, false, false) => WALL_LR,
                        (false, false, true, true) => WALL_UD,
                        (false, true, true, false) => WALL_RU,
                        (true, false, false, true) => WALL_LD,
                        (true, false, true, false) => WALL_LU,
                        (false, true, false, true) => WALL_RD,
                        (true, false, false, false) => WALL_L,
                        (false, true, false, false) => WALL_R,
                        (false, false, true, false) => WALL_U,
                        (false, false, false, true) => WALL_D,
                        _ => " ",
                    }
                }
            };
            bottom_section.push_str(corner);
        }

        output.push_str(&middle_section);
        output.push('\n');
        output.push_str(&bottom_section);
        output.push('\n');
    }

    output
}
