use std::iter;
use tracing::{debug, trace, warn};

use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::grid::Grid;
use crate::utils;

/// What a selection request did to the remembered endpoints.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum SelectionChange {
    Selected(Cartesian2DCoordinate),
    /// The cell was already the endpoint, so it was released.
    Deselected(Cartesian2DCoordinate),
    /// The cell is the other endpoint and cannot be both.
    Ignored,
}

/// Remembers a start cell, an end cell and the last path found between them.
#[derive(Debug, Default, Clone)]
pub struct PathFinder {
    start: Option<Cartesian2DCoordinate>,
    end: Option<Cartesian2DCoordinate>,
    path: Vec<Cartesian2DCoordinate>,
}

impl PathFinder {
    pub fn new() -> PathFinder {
        PathFinder::default()
    }

    #[inline]
    pub fn start(&self) -> Option<Cartesian2DCoordinate> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Option<Cartesian2DCoordinate> {
        self.end
    }

    #[inline]
    pub fn path(&self) -> &[Cartesian2DCoordinate] {
        &self.path
    }

    pub fn reset_path(&mut self) {
        self.path.clear();
    }

    /// Forget both endpoints and the path, e.g. after the maze is regenerated.
    pub fn clear_selection(&mut self) {
        self.start = None;
        self.end = None;
        self.reset_path();
    }

    pub fn select_start(&mut self,
                        grid: &Grid,
                        coord: Cartesian2DCoordinate)
                        -> Result<SelectionChange> {
        ensure_selectable(grid, coord)?;
        let change = toggle_endpoint(&mut self.start, self.end, coord);
        if change != SelectionChange::Ignored {
            self.reset_path();
        }
        debug!(?change, "start selection");
        Ok(change)
    }

    pub fn select_end(&mut self,
                      grid: &Grid,
                      coord: Cartesian2DCoordinate)
                      -> Result<SelectionChange> {
        ensure_selectable(grid, coord)?;
        let change = toggle_endpoint(&mut self.end, self.start, coord);
        if change != SelectionChange::Ignored {
            self.reset_path();
        }
        debug!(?change, "end selection");
        Ok(change)
    }

    /// Find the path between the selected start and end cells.
    pub fn find_selected_path(&mut self, grid: &Grid) -> Result<&[Cartesian2DCoordinate]> {
        let (start, end) = (self.start, self.end);
        self.find_path(grid, start, end)
    }

    /// Find a path from `start` to `end` through the maze's passages and remember both endpoints.
    ///
    /// An endpoint outside the grid gives an empty path. A rejected request leaves the
    /// remembered endpoints as they were.
    pub fn find_path(&mut self,
                     grid: &Grid,
                     start: Option<Cartesian2DCoordinate>,
                     end: Option<Cartesian2DCoordinate>)
                     -> Result<&[Cartesian2DCoordinate]> {
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                warn!("path requested without both endpoints");
                return Err(ErrorKind::MissingEndpoint.into());
            }
        };
        if !grid.is_initialized() {
            return Err(ErrorKind::NotInitialized.into());
        }

        if !grid.is_valid_coordinate(start) || !grid.is_valid_coordinate(end) {
            debug!(%start, %end, "endpoint outside the grid");
            self.reset_path();
            return Ok(&self.path);
        }
        for coord in &[start, end] {
            if !grid.is_visited(*coord) {
                warn!(%coord, "path endpoint the maze has not reached");
                return Err(ErrorKind::CellNotVisited(coord.x, coord.y).into());
            }
        }

        // Endpoints are only remembered once both are usable.
        self.start = Some(start);
        self.end = Some(end);
        self.path = depth_first_path(grid, start, end);
        debug!(%start, %end, length = self.path.len(), "path found");
        Ok(&self.path)
    }
}

fn ensure_selectable(grid: &Grid, coord: Cartesian2DCoordinate) -> Result<()> {
    let cell = grid.cell(coord)?;
    if cell.is_visited() {
        Ok(())
    } else {
        warn!(%coord, "selection of a cell the maze has not reached");
        Err(ErrorKind::CellNotVisited(coord.x, coord.y).into())
    }
}

fn toggle_endpoint(endpoint: &mut Option<Cartesian2DCoordinate>,
                   other: Option<Cartesian2DCoordinate>,
                   coord: Cartesian2DCoordinate)
                   -> SelectionChange {
    if other == Some(coord) {
        SelectionChange::Ignored
    } else if *endpoint == Some(coord) {
        *endpoint = None;
        SelectionChange::Deselected(coord)
    } else {
        *endpoint = Some(coord);
        SelectionChange::Selected(coord)
    }
}

struct Frame {
    cell: Cartesian2DCoordinate,
    next_link: usize,
}

/// Depth first enumeration of simple paths from `start`, following links in carving order.
///
/// Reaching `end` from a frame stops that frame's remaining links when the route is strictly
/// shorter than the best so far. The best route is the first shortest one met, which on a
/// perfect maze is the only one. The frames on the stack are the candidate path.
pub fn depth_first_path(grid: &Grid,
                        start: Cartesian2DCoordinate,
                        end: Cartesian2DCoordinate)
                        -> Vec<Cartesian2DCoordinate> {
    if !grid.is_valid_coordinate(start) || !grid.is_valid_coordinate(end) {
        return Vec::new();
    }
    if start == end {
        return vec![start];
    }

    let mut best: Vec<Cartesian2DCoordinate> = Vec::new();
    let mut on_path = utils::fnv_hashset(grid.size());
    let _ = on_path.insert(start);
    let mut stack = vec![Frame { cell: start, next_link: 0 }];

    while let Some(frame) = stack.last_mut() {
        let links = grid.links(frame.cell).unwrap_or(&[]);
        if frame.next_link >= links.len() {
            let _ = on_path.remove(&frame.cell);
            let _ = stack.pop();
            continue;
        }
        let next = links[frame.next_link];
        frame.next_link += 1;

        if on_path.contains(&next) {
            continue;
        }

        if next == end {
            let candidate_length = stack.len() + 1;
            if best.is_empty() || candidate_length < best.len() {
                best = stack.iter().map(|f| f.cell).chain(iter::once(end)).collect();
                trace!(length = candidate_length, "new best path");
                if let Some(done) = stack.pop() {
                    let _ = on_path.remove(&done.cell);
                }
            }
            continue;
        }

        let _ = on_path.insert(next);
        stack.push(Frame { cell: next, next_link: 0 });
    }

    best
}
