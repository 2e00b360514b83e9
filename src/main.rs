use docopt::Docopt;
use serde_derive::Deserialize;
use std::{
    fs::File,
    io::prelude::*,
    rc::Rc,
    time::Duration
};
use tracing_subscriber::EnvFilter;

use minotaur::{
    cells::Cartesian2DCoordinate,
    config::{MazeConfig, MazeLimits},
    generators::{GenerationStep, MazeGenerator},
    grid::Grid,
    grid_displays::{GridDisplay, PathDisplay, StartEndPointsDisplay},
    pathing::PathFinder,
};

use crate::errors::*;

mod errors {
    // Maze errors from the library are linked; io and argument failures only happen here.
    use error_chain::*;
    error_chain! {
        links {
            Maze(::minotaur::errors::Error, ::minotaur::errors::ErrorKind);
        }

        foreign_links {
            Io(::std::io::Error);
            DocOptFailure(::docopt::Error);
        }
    }
}

const USAGE: &str = "Minotaur

Usage:
    minotaur_driver -h | --help
    minotaur_driver [--width=<w>] [--height=<h>] [--margin=<m>] [--seed=<s>] [--min-size=<n>] [--start-x=<x> --start-y=<y>] [--end-x=<e1> --end-y=<e2>] [--delay-ms=<d>] [--trace-steps] [--text-out=<path>]

Options:
    -h --help            Show this screen.
    --width=<w>          The maze width in cells [default: 10].
    --height=<h>         The maze height in cells [default: 10].
    --margin=<m>         Spacing between cells when laid out in the world [default: 0].
    --seed=<s>           Seed for the random direction choices. Random if not given.
    --min-size=<n>       Raise width and height to at least n [default: 1].
    --start-x=<x>        x coordinate of the path start
    --start-y=<y>        y coordinate of the path start
    --end-x=<e1>         x coordinate of the path end
    --end-y=<e2>         y coordinate of the path end
    --delay-ms=<d>       Pause between generation steps in milliseconds [default: 0].
    --trace-steps        Print every carve and backtrack while generating.
    --text-out=<path>    Write the rendered maze to a file instead of stdout.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_width: usize,
    flag_height: usize,
    flag_margin: f32,
    flag_seed: Option<u64>,
    flag_min_size: usize,
    flag_start_x: Option<i64>,
    flag_start_y: Option<i64>,
    flag_end_x: Option<i64>,
    flag_end_y: Option<i64>,
    flag_delay_ms: u64,
    flag_trace_steps: bool,
    flag_text_out: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(ref e) = run() {
        eprintln!("error: {}", e);
        for cause in e.iter().skip(1) {
            eprintln!("caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let limits = MazeLimits {
        min_width: args.flag_min_size,
        min_height: args.flag_min_size,
        min_margin: 0.0,
    };
    let config = MazeConfig {
        step_delay: Duration::from_millis(args.flag_delay_ms),
        seed: args.flag_seed,
        ..MazeConfig::new(args.flag_width, args.flag_height, args.flag_margin)
    }.clamped(&limits);

    let mut generator = MazeGenerator::new(config)?;
    let trace_steps = args.flag_trace_steps;
    generator.generate_with(|step, _| {
                                if trace_steps {
                                    print_step(step);
                                }
                            },
                            |grid| eprintln!("Generated {}x{} maze", grid.width(), grid.height()))?;

    let mut finder = PathFinder::new();
    let maze_grid = generator.grid();
    if let Some((x, y)) = point_arg(args.flag_start_x, args.flag_start_y) {
        finder.select_start(maze_grid, cell_coordinate(maze_grid, x, y)?)?;
    }
    if let Some((x, y)) = point_arg(args.flag_end_x, args.flag_end_y) {
        finder.select_end(maze_grid, cell_coordinate(maze_grid, x, y)?)?;
    }

    let display: Rc<dyn GridDisplay> = if finder.start().is_some() && finder.end().is_some() {
        let path = finder.find_selected_path(maze_grid)?;
        Rc::new(PathDisplay::new(path))
    } else {
        Rc::new(StartEndPointsDisplay::new(finder.start(), finder.end()))
    };

    let mut maze_grid = generator.into_grid();
    maze_grid.set_grid_display(Some(display));

    if args.flag_text_out.is_empty() {
        println!("{}", maze_grid);
    } else {
        write_text_to_file(&format!("{}", maze_grid), &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }
    if !finder.path().is_empty() {
        println!("Path length: {} cells", finder.path().len());
    }

    Ok(())
}

fn point_arg(x: Option<i64>, y: Option<i64>) -> Option<(i64, i64)> {
    match (x, y) {
        (Some(x), Some(y)) => Some((x, y)),
        _ => None,
    }
}

fn cell_coordinate(grid: &Grid, x: i64, y: i64) -> Result<Cartesian2DCoordinate> {
    Ok(grid.cell_at(x, y)?.coordinate())
}

fn print_step(step: &GenerationStep) {
    match *step {
        GenerationStep::Carved { from, to, direction } => {
            println!("carve {} -> {} ({:?})", from, to, direction)
        }
        GenerationStep::Backtracked { cell } => println!("back  {}", cell),
        GenerationStep::Finished => println!("done"),
    }
}

fn write_text_to_file(data: &str, file_name: &str) -> std::io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
