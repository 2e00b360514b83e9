use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::thread;
use tracing::{debug, info, trace};

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::config::MazeConfig;
use crate::errors::*;
use crate::grid::Grid;

/// The outcome of a single move of the backtracking walk.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GenerationStep {
    /// A wall came down and the walk moved into a fresh cell.
    Carved {
        from: Cartesian2DCoordinate,
        to: Cartesian2DCoordinate,
        direction: CompassPrimary,
    },
    /// `cell` had no unvisited neighbours and was popped off the walk.
    Backtracked { cell: Cartesian2DCoordinate },
    /// The walk popped its last cell. Every cell is visited.
    Finished,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
enum GenerationState {
    Idle,
    Running,
    Finished,
}

/// Carves a perfect maze with randomised recursive backtracking from cell (0, 0).
///
/// The walk is an explicit stack, advanced one move at a time by `step`, so a caller can pace or
/// abandon it. `generate` and `generate_with` run it to completion and report the finish through
/// the callback they are given.
pub struct MazeGenerator<R: Rng = XorShiftRng> {
    config: MazeConfig,
    grid: Grid,
    rng: R,
    visited_path_stack: Vec<Cartesian2DCoordinate>,
    state: GenerationState,
}

impl MazeGenerator<XorShiftRng> {
    /// A generator seeded from `config.seed`, or from the OS when there is none.
    pub fn new(config: MazeConfig) -> Result<MazeGenerator<XorShiftRng>> {
        let rng = match config.seed {
            Some(seed) => XorShiftRng::seed_from_u64(seed),
            None => XorShiftRng::from_entropy(),
        };
        MazeGenerator::with_rng(config, rng)
    }
}

impl<R: Rng> MazeGenerator<R> {
    pub fn with_rng(config: MazeConfig, rng: R) -> Result<MazeGenerator<R>> {
        config.validate()?;
        Ok(MazeGenerator {
            config,
            grid: Grid::new(),
            rng,
            visited_path_stack: Vec::new(),
            state: GenerationState::Idle,
        })
    }

    #[inline]
    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Change the maze settings. The current maze, finished or not, is thrown away.
    pub fn set_config(&mut self, config: MazeConfig) -> Result<()> {
        config.validate()?;
        self.cancel();
        self.config = config;
        Ok(())
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == GenerationState::Finished
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == GenerationState::Running
    }

    /// The cells of the current depth first walk, oldest first.
    #[inline]
    pub fn visited_path(&self) -> &[Cartesian2DCoordinate] {
        &self.visited_path_stack
    }

    /// Drop the walk and every cell. Nothing of a partial maze is kept.
    pub fn cancel(&mut self) {
        if self.state == GenerationState::Running {
            debug!(remaining = self.visited_path_stack.len(), "abandoning maze generation");
        }
        self.visited_path_stack.clear();
        let _ = self.grid.clear();
        self.state = GenerationState::Idle;
    }

    /// Build a fresh grid and start the walk at (0, 0).
    pub fn begin(&mut self) -> Result<()> {
        self.cancel();
        self.grid.initialize(self.config.width, self.config.height, self.config.margin())?;
        self.grid.set_cell_width(self.config.cell_width);

        let start = Cartesian2DCoordinate::new(0, 0);
        self.grid.mark_visited(start)?;
        self.visited_path_stack.push(start);
        self.state = GenerationState::Running;
        Ok(())
    }

    /// Advance the walk by one move.
    ///
    /// Returns `None` once the maze has already finished, so `Finished` is reported exactly once.
    pub fn step(&mut self) -> Result<Option<GenerationStep>> {
        match self.state {
            GenerationState::Idle => return Err(ErrorKind::NotInitialized.into()),
            GenerationState::Finished => return Ok(None),
            GenerationState::Running => {}
        }

        let current = match self.visited_path_stack.last() {
            Some(coord) => *coord,
            None => {
                self.state = GenerationState::Finished;
                return Ok(Some(GenerationStep::Finished));
            }
        };

        for direction in shuffled_directions(&mut self.rng).iter().cloned() {
            let neighbour = match self.grid.neighbour_at_direction(current, direction) {
                Some(coord) => coord,
                None => continue,
            };
            if self.grid.is_visited(neighbour) {
                continue;
            }

            let to = self.grid.carve(current, direction)?;
            self.grid.mark_visited(to)?;
            self.visited_path_stack.push(to);
            trace!(from = %current, to = %to, ?direction, "carved passage");
            return Ok(Some(GenerationStep::Carved { from: current, to, direction }));
        }

        // Revisiting via backtracking leaves the visited flag alone.
        let _ = self.visited_path_stack.pop();
        if self.visited_path_stack.is_empty() {
            self.state = GenerationState::Finished;
            Ok(Some(GenerationStep::Finished))
        } else {
            trace!(cell = %current, "backtracked");
            Ok(Some(GenerationStep::Backtracked { cell: current }))
        }
    }

    /// Generate a whole maze, then call `on_finished` once with the result.
    pub fn generate<F>(&mut self, on_finished: F) -> Result<&Grid>
        where F: FnOnce(&Grid)
    {
        self.generate_with(|_, _| {}, on_finished)
    }

    /// Generate a whole maze, reporting every step to `on_step` and the end to `on_finished`.
    ///
    /// A non zero `step_delay` in the config sleeps between steps.
    pub fn generate_with<S, F>(&mut self, mut on_step: S, on_finished: F) -> Result<&Grid>
        where S: FnMut(&GenerationStep, &Grid),
              F: FnOnce(&Grid)
    {
        debug!(width = self.config.width, height = self.config.height, "generating maze");
        self.begin()?;

        let delay = self.config.step_delay;
        while let Some(step) = self.step()? {
            on_step(&step, &self.grid);
            if step == GenerationStep::Finished {
                break;
            }
            if delay.as_nanos() > 0 {
                thread::sleep(delay);
            }
        }

        info!(cells = self.grid.size(), passages = self.grid.links_count(), "generation finished");
        on_finished(&self.grid);
        Ok(&self.grid)
    }
}

/// A uniformly random ordering of the four directions, Fisher-Yates from N, E, S, W.
pub fn shuffled_directions<R: Rng>(rng: &mut R) -> [CompassPrimary; 4] {
    let mut directions = CompassPrimary::ALL;
    for i in (1..directions.len()).rev() {
        let j = rng.gen_range(0..=i);
        directions.swap(i, j);
    }
    directions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use quickcheck::{quickcheck, TestResult};
    use rand::rngs::mock::StepRng;
    use std::cell::Cell;
    use std::time::Duration;

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    fn seeded(width: usize, height: usize, seed: u64) -> MazeGenerator {
        let config = MazeConfig { seed: Some(seed), ..MazeConfig::new(width, height, 0.0) };
        MazeGenerator::new(config).expect("valid config")
    }

    fn zero_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn zero_rng_keeps_a_fixed_direction_order() {
        let mut rng = zero_rng();
        let order = shuffled_directions(&mut rng);
        assert_eq!(order,
                   [CompassPrimary::East, CompassPrimary::South, CompassPrimary::West,
                    CompassPrimary::North]);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = XorShiftRng::seed_from_u64(99);
        for _ in 0..100 {
            let order = shuffled_directions(&mut rng);
            for dir in CompassPrimary::ALL.iter() {
                assert_eq!(order.iter().filter(|d| *d == dir).count(), 1);
            }
        }
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(MazeGenerator::new(MazeConfig::new(0, 3, 0.0)).is_err());
        let mut generator = seeded(2, 2, 1);
        assert!(generator.set_config(MazeConfig::new(2, 0, 0.0)).is_err());
    }

    #[test]
    fn stepping_before_begin_fails() {
        let mut generator = seeded(2, 2, 1);
        match generator.step() {
            Err(Error(ErrorKind::NotInitialized, _)) => {}
            other => panic!("expected NotInitialized, got {:?}", other),
        }
    }

    #[test]
    fn single_cell_finishes_immediately() {
        let mut generator = seeded(1, 1, 3);
        let finished = Cell::new(0);
        let mut steps = vec![];
        {
            let grid = generator
                .generate_with(|step, _| steps.push(*step), |_| finished.set(finished.get() + 1))
                .unwrap();
            assert_eq!(grid.links_count(), 0);
            assert!(grid.is_visited(gc(0, 0)));
            assert!(grid.is_perfect_maze());
        }
        assert_eq!(steps, vec![GenerationStep::Finished]);
        assert_eq!(finished.get(), 1);
        assert!(generator.is_finished());
    }

    #[test]
    fn three_by_three_fixed_source_tree() {
        let config = MazeConfig::new(3, 3, 0.0);
        let mut generator = MazeGenerator::with_rng(config, zero_rng()).unwrap();
        let mut carved = vec![];
        let mut backtracked = 0;
        generator
            .generate_with(|step, _| match *step {
                               GenerationStep::Carved { from, to, .. } => carved.push((from, to)),
                               GenerationStep::Backtracked { .. } => backtracked += 1,
                               GenerationStep::Finished => {}
                           },
                           |_| {})
            .unwrap();

        assert_eq!(carved,
                   vec![(gc(0, 0), gc(1, 0)),
                        (gc(1, 0), gc(2, 0)),
                        (gc(2, 0), gc(2, 1)),
                        (gc(2, 1), gc(2, 2)),
                        (gc(2, 2), gc(1, 2)),
                        (gc(1, 2), gc(0, 2)),
                        (gc(0, 2), gc(0, 1)),
                        (gc(0, 1), gc(1, 1))]);
        assert_eq!(backtracked, 8);

        let grid = generator.grid();
        assert_eq!(grid.links(gc(1, 0)).unwrap(), &[gc(0, 0), gc(2, 0)]);
        assert_eq!(grid.links(gc(1, 1)).unwrap(), &[gc(0, 1)]);
        assert!(grid.cell(gc(1, 1)).unwrap().has_wall(CompassPrimary::North));
        assert!(!grid.cell(gc(2, 0)).unwrap().has_wall(CompassPrimary::South));
        assert!(grid.is_perfect_maze());
    }

    #[test]
    fn walk_stack_drains_to_empty() {
        let mut generator = seeded(4, 3, 11);
        generator.begin().unwrap();
        assert_eq!(generator.visited_path(), &[gc(0, 0)]);
        let mut finishes = 0;
        while let Some(step) = generator.step().unwrap() {
            if step == GenerationStep::Finished {
                finishes += 1;
            }
        }
        assert_eq!(finishes, 1);
        assert!(generator.visited_path().is_empty());
        assert_eq!(generator.step().unwrap(), None);
    }

    #[test]
    fn cancel_discards_partial_maze() {
        let mut generator = seeded(5, 5, 2);
        generator.begin().unwrap();
        for _ in 0..6 {
            generator.step().unwrap();
        }
        generator.cancel();
        assert!(!generator.grid().is_initialized());
        assert!(!generator.is_running());
        assert!(generator.step().is_err());
    }

    #[test]
    fn regeneration_starts_from_scratch() {
        let mut generator = seeded(4, 4, 5);
        generator.generate(|_| {}).unwrap();
        generator.set_config(MazeConfig { seed: Some(5), ..MazeConfig::new(2, 3, 0.0) }).unwrap();
        assert!(!generator.grid().is_initialized());
        let grid = generator.generate(|_| {}).unwrap();
        assert_eq!(grid.size(), 6);
        assert_eq!(grid.links_count(), 5);
    }

    #[test]
    fn same_seed_same_maze() {
        let mut a = seeded(9, 7, 1234);
        let mut b = seeded(9, 7, 1234);
        let links_a: Vec<_> = a.generate(|_| {}).unwrap().iter_links().collect();
        let links_b: Vec<_> = b.generate(|_| {}).unwrap().iter_links().collect();
        assert_eq!(links_a, links_b);
        let cells_a: Vec<_> = a.grid().iter_cells().cloned().collect();
        let cells_b: Vec<_> = b.grid().iter_cells().cloned().collect();
        assert_eq!(cells_a, cells_b);
    }

    fn generated(w: u8, h: u8, seed: u64) -> Option<MazeGenerator> {
        let (w, h) = (w as usize % 12 + 1, h as usize % 12 + 1);
        let mut generator = seeded(w, h, seed);
        generator.generate(|_| {}).ok()?;
        Some(generator)
    }

    #[test]
    fn quickcheck_full_coverage_and_spanning_tree() {
        fn p(w: u8, h: u8, seed: u64) -> TestResult {
            let generator = match generated(w, h, seed) {
                Some(g) => g,
                None => return TestResult::failed(),
            };
            let grid = generator.grid();
            let all_visited = grid.iter_cells().all(|cell| cell.is_visited());
            TestResult::from_bool(all_visited && grid.links_count() == grid.size() - 1 &&
                                  grid.is_perfect_maze())
        }
        quickcheck(p as fn(u8, u8, u64) -> TestResult);
    }

    #[test]
    fn quickcheck_adjacency_and_walls_symmetric() {
        fn p(w: u8, h: u8, seed: u64) -> bool {
            let generator = match generated(w, h, seed) {
                Some(g) => g,
                None => return false,
            };
            let grid = generator.grid();
            grid.iter_cells().all(|cell| {
                let here = cell.coordinate();
                let links_symmetric = cell.neighbours().iter().all(|n| grid.is_linked(*n, here));
                let unique = {
                    let mut seen = utils::fnv_hashset(4);
                    cell.neighbours().iter().all(|n| seen.insert(*n))
                };
                let walls_symmetric = CompassPrimary::ALL.iter().all(|dir| {
                    match grid.neighbour_at_direction(here, *dir) {
                        Some(adjacent) => {
                            let removed = cell.walls().is_removed(*dir);
                            removed == grid.is_neighbour_linked(adjacent, dir.opposite()) &&
                            removed == grid.is_linked(here, adjacent)
                        }
                        // Boundary walls never come down.
                        None => cell.has_wall(*dir),
                    }
                });
                links_symmetric && unique && walls_symmetric
            })
        }
        quickcheck(p as fn(u8, u8, u64) -> bool);
    }

    #[test]
    fn quickcheck_finish_reported_once() {
        fn p(w: u8, h: u8, seed: u64) -> bool {
            let (w, h) = (w as usize % 8 + 1, h as usize % 8 + 1);
            let mut generator = seeded(w, h, seed);
            let finished = Cell::new(0);
            let mut finished_steps = 0;
            let mut carved = 0;
            let generated = generator.generate_with(|step, _| match *step {
                GenerationStep::Finished => finished_steps += 1,
                GenerationStep::Carved { .. } => carved += 1,
                GenerationStep::Backtracked { .. } => {}
            }, |_| finished.set(finished.get() + 1));
            generated.is_ok() && finished.get() == 1 && finished_steps == 1 && carved == w * h - 1
        }
        quickcheck(p as fn(u8, u8, u64) -> bool);
    }

    #[test]
    fn step_delay_paces_generation_to_completion() {
        let config = MazeConfig {
            step_delay: Duration::from_millis(1),
            seed: Some(1),
            ..MazeConfig::new(2, 1, 0.0)
        };
        let mut generator = MazeGenerator::new(config).expect("valid config");
        let finished = Cell::new(0);
        let mut steps = 0;
        let grid = generator.generate_with(|_, _| steps += 1, |_| finished.set(finished.get() + 1))
            .expect("generation runs");
        assert_eq!(grid.links_count(), 1);
        assert_eq!(finished.get(), 1);
        // carve east, back out of (1,0), finish on (0,0)
        assert_eq!(steps, 3);
        assert!(generator.is_finished());
    }
}
