use docopt::Docopt;
use hunt_kill_mazes::{
    cells::Position,
    generators::{GenerationStep, HuntAndKill, RandomChooser},
    grid::Maze,
    pathing,
    renderers::{self, CellDisplay, PathDisplay, StartEndPointsDisplay},
    units::{Height, Width},
};
use log::info;
use serde_derive::Deserialize;
use smallvec::smallvec;
use std::{
    fs::File,
    io,
    io::prelude::*,
};

const USAGE: &str = "Hunt and kill mazes

Usage:
    maze_driver -h | --help
    maze_driver [--height=<h> --width=<w>] [--seed=<s>] [--step] [--unicode [--show-path | --show-distances]] [--text-out=<path>] [--save-edges=<path>]

Options:
    -h --help              Show this screen.
    --height=<h>           The number of rows in the maze [default: 10].
    --width=<w>            The number of columns in the maze [default: 10].
    --seed=<s>             Seed the random number generator, the same seed always gives the same maze.
    --step                 Print the maze after every generation step and wait for return to be pressed.
    --unicode              Render the maze with box drawing characters instead of plain ASCII.
    --show-path            Show the shortest path from the start (top left) to the finish (bottom right).
    --show-distances       Show the distance from the start to all other cells, in hexadecimal.
    --text-out=<path>      Output file path for the textual rendering of the maze.
    --save-edges=<path>    Serialize the maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_height: usize,
    flag_width: usize,
    flag_seed: Option<u64>,
    flag_step: bool,
    flag_unicode: bool,
    flag_show_path: bool,
    flag_show_distances: bool,
    flag_text_out: String,
    flag_save_edges: String,
}

// Error, ErrorKind, ResultExt (`chain_err`) and Result for the driver.
mod errors {
    use error_chain::*;
    error_chain! {

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
            Maze(::hunt_kill_mazes::grid::MazeError);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let mut maze = Maze::new(Height(args.flag_height), Width(args.flag_width))?;
    generate_maze(&mut maze, &args).chain_err(|| "Failed to generate the maze")?;

    if !args.flag_save_edges.is_empty() {
        save_maze_graph(&maze, &args.flag_save_edges)?;
    }

    let text = if args.flag_unicode {
        render_unicode_from_args(&maze, &args)?
    } else {
        renderers::render_text(&maze)
    };

    if args.flag_text_out.is_empty() {
        println!("{}", text);
    } else {
        write_text_to_file(&text, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
        info!("Wrote maze to {}", args.flag_text_out);
    }

    Ok(())
}

fn generate_maze(maze: &mut Maze, maze_args: &MazeArgs) -> Result<()> {
    let chooser = match maze_args.flag_seed {
        Some(seed) => RandomChooser::from_seed_u64(seed),
        None => RandomChooser::from_thread_rng(),
    };
    let mut generator = HuntAndKill::with_chooser(maze, chooser);

    if maze_args.flag_step {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        let mut pausing = true;
        let mut stdin_error = None;
        generator.generate_with(|step, maze| {
                println!("{}", describe_step(step));
                print!("{}", maze);
                if !pausing {
                    return;
                }
                if let GenerationStep::Finished { .. } = *step {
                    return;
                }
                match wait_for_return(&mut lines) {
                    Ok(more_input) => pausing = more_input,
                    Err(e) => {
                        pausing = false;
                        stdin_error = Some(e);
                    }
                }
            })?;
        if let Some(e) = stdin_error {
            return Err(e).chain_err(|| "Failed to read from stdin while stepping");
        }
    } else {
        generator.generate()?;
    }

    Ok(())
}

/// Block until a line is read. False once the input has run out.
fn wait_for_return<R: BufRead>(lines: &mut io::Lines<R>) -> io::Result<bool> {
    match lines.next() {
        Some(line) => line.map(|_| true),
        None => Ok(false),
    }
}

fn describe_step(step: &GenerationStep) -> String {
    match *step {
        GenerationStep::Started { cell } => format!("Starting at [{}][{}]", cell.row, cell.column),
        GenerationStep::Carved { from, to } => {
            format!("Carved [{}][{}] -> [{}][{}]", from.row, from.column, to.row, to.column)
        }
        GenerationStep::Hunted { cell } => {
            format!("Hunted down [{}][{}]", cell.row, cell.column)
        }
        GenerationStep::Finished { passages } => format!("Finished with {} passages", passages),
    }
}

/// Box drawing output, with the cells showing the solution path, the distances from the start
/// or just the start and finish.
fn render_unicode_from_args(maze: &Maze, maze_args: &MazeArgs) -> Result<String> {
    let start = maze.start_position();
    let finish = maze.finish_position();

    let distances = pathing::Distances::new(maze, start)
        .ok_or("The maze start is not a valid position.")?;

    let display: Box<dyn CellDisplay> = if maze_args.flag_show_distances {
        Box::new(distances)
    } else if maze_args.flag_show_path {
        match pathing::shortest_path(maze, &distances, finish) {
            Some(path) => Box::new(PathDisplay::new(&path)),
            // Not a perfect maze after all
            None => Box::new(start_end_points(start, finish)),
        }
    } else {
        Box::new(start_end_points(start, finish))
    };

    Ok(renderers::render_unicode(maze, Some(display.as_ref())))
}

fn start_end_points(start: Position, finish: Position) -> StartEndPointsDisplay {
    StartEndPointsDisplay::new(smallvec![start], smallvec![finish])
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(maze: &Maze, file_path: &str) -> Result<()> {
    let mut graph_data = String::new();
    let vertices_count = maze.size();
    let edges_count = maze.passages_count();
    graph_data.push_str(vertices_count.to_string().as_ref());
    graph_data.push(' ');
    graph_data.push_str(edges_count.to_string().as_ref());
    graph_data.push('\n');

    for (src, dst) in maze.iter_passages() {
        let index_a = maze.position_to_ordinal(src)
            .ok_or("Passages iter should give valid positions")?;
        let index_b = maze.position_to_ordinal(dst)
            .ok_or("Passages iter should give valid positions")?;
        let src_as_1_based_index = index_a + 1;
        let dst_as_1_based_index = index_b + 1;

        graph_data.push_str(src_as_1_based_index.to_string().as_ref());
        graph_data.push(' ');
        graph_data.push_str(dst_as_1_based_index.to_string().as_ref());
        graph_data.push('\n');
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::io::Cursor;

    #[test]
    fn waiting_takes_one_line_at_a_time() {
        let mut lines = Cursor::new("\nnext\n").lines();
        assert!(wait_for_return(&mut lines).unwrap());
        assert!(wait_for_return(&mut lines).unwrap());
        assert!(!wait_for_return(&mut lines).unwrap());
        assert!(!wait_for_return(&mut lines).unwrap());
    }

    #[test]
    fn waiting_reports_unreadable_input() {
        let mut lines = Cursor::new(vec![0xffu8, 0xfe, b'\n']).lines();
        let error = wait_for_return(&mut lines).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn step_descriptions() {
        assert_eq!(describe_step(&GenerationStep::Started { cell: Position::new(1, 2) }),
                   "Starting at [1][2]");
        assert_eq!(describe_step(&GenerationStep::Carved {
                       from: Position::new(0, 0),
                       to: Position::new(0, 1),
                   }),
                   "Carved [0][0] -> [0][1]");
        assert_eq!(describe_step(&GenerationStep::Finished { passages: 3 }),
                   "Finished with 3 passages");
    }
}
