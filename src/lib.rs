//! **hunt_kill_mazes** generates perfect mazes on a rectangular grid with the hunt-and-kill
//! algorithm, and renders and walks them.
//!
//! A perfect maze has exactly one route between any two cells: its passages form a spanning tree
//! of the grid.

pub mod cells;
pub mod generators;
pub mod grid;
pub mod pathing;
pub mod renderers;
pub mod units;
