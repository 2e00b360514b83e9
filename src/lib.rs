//! **minotaur** carves perfect mazes over a rectangular grid with recursive backtracking and finds
//! routes between two chosen cells.
//!
//! ```
//! use minotaur::{cells::Cartesian2DCoordinate, config::MazeConfig, generators::MazeGenerator,
//!                pathing::PathFinder};
//!
//! let config = MazeConfig { seed: Some(42), ..MazeConfig::new(8, 6, 0.0) };
//! let mut generator = MazeGenerator::new(config).unwrap();
//! let grid = generator.generate(|_| {}).unwrap();
//!
//! let mut finder = PathFinder::new();
//! let start = Cartesian2DCoordinate::new(0, 0);
//! let end = Cartesian2DCoordinate::new(7, 5);
//! let path = finder.find_path(grid, Some(start), Some(end)).unwrap();
//! assert_eq!(path.first(), Some(&start));
//! assert_eq!(path.last(), Some(&end));
//! ```

pub mod cells;
pub mod config;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod pathing;
pub mod units;
mod utils;
