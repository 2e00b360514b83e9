use petgraph::algo::{connected_components, is_cyclic_undirected};
use petgraph::graph::NodeIndex;
use petgraph::{Graph, Undirected};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary, CoordinateSmallVec, MazeCell};
use crate::errors::*;
use crate::grid_displays::GridDisplay;
use crate::units::{EdgesCount, Height, Margin, NodesCount, Width};

pub type PassageGraph = Graph<Cartesian2DCoordinate, (), Undirected, u32>;

pub const DEFAULT_CELL_WIDTH: f32 = 1.0;

/// Rectangular array of maze cells, row major.
///
/// A new grid has no cells; `initialize` allocates them and `clear` hands them back.
pub struct Grid {
    cells: Vec<MazeCell>,
    dimensions: Option<(Width, Height)>,
    margin: Margin,
    cell_width: f32,
    grid_display: Option<Rc<dyn GridDisplay>>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid :: dimensions: {:?}, margin: {:?}, passages: {:?}",
               self.dimensions, self.margin, self.links_count())
    }
}

impl Default for Grid {
    fn default() -> Grid {
        Grid::new()
    }
}

impl Grid {
    pub fn new() -> Grid {
        Grid {
            cells: Vec::new(),
            dimensions: None,
            margin: Margin(0.0),
            cell_width: DEFAULT_CELL_WIDTH,
            grid_display: None,
        }
    }

    /// Allocate `width * height` fresh unvisited cells, dropping any previous ones.
    pub fn initialize(&mut self, width: usize, height: usize, margin: Margin) -> Result<()> {
        let max_side = u32::MAX as usize;
        if width == 0 || height == 0 || width > max_side || height > max_side {
            return Err(ErrorKind::InvalidDimension(width, height).into());
        }
        let cells_count = width.checked_mul(height)
            .ok_or_else(|| Error::from(ErrorKind::InvalidDimension(width, height)))?;

        debug!(width, height, margin = margin.0, "initializing grid");

        let mut cells = Vec::with_capacity(cells_count);
        for y in 0..height {
            for x in 0..width {
                cells.push(MazeCell::new(Cartesian2DCoordinate::new(x as u32, y as u32)));
            }
        }

        self.cells = cells;
        self.dimensions = Some((Width(width), Height(height)));
        self.margin = margin;
        Ok(())
    }

    /// Discard every cell. Ownership of the old cells passes to the caller.
    pub fn clear(&mut self) -> Vec<MazeCell> {
        self.dimensions = None;
        std::mem::replace(&mut self.cells, Vec::new())
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.dimensions.is_some()
    }

    pub fn dimensions(&self) -> Result<(Width, Height)> {
        self.dimensions.ok_or_else(|| ErrorKind::NotInitialized.into())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dimensions.map_or(0, |(Width(w), _)| w)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dimensions.map_or(0, |(_, Height(h))| h)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Node and edge counts of a finished perfect maze over this grid.
    pub fn spanning_tree_size(&self) -> (NodesCount, EdgesCount) {
        let nodes = self.size();
        (NodesCount(nodes), EdgesCount(nodes.saturating_sub(1)))
    }

    #[inline]
    pub fn margin(&self) -> Margin {
        self.margin
    }

    #[inline]
    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    pub fn set_cell_width(&mut self, cell_width: f32) {
        self.cell_width = cell_width;
    }

    #[inline]
    pub fn set_grid_display(&mut self, grid_display: Option<Rc<dyn GridDisplay>>) {
        self.grid_display = grid_display;
    }

    #[inline]
    pub fn grid_display(&self) -> &Option<Rc<dyn GridDisplay>> {
        &self.grid_display
    }

    /// Look up a cell from signed grid indices, as a caller resolving a pick might produce.
    pub fn cell_at(&self, x: i64, y: i64) -> Result<&MazeCell> {
        if !self.is_initialized() {
            return Err(ErrorKind::NotInitialized.into());
        }
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return Err(ErrorKind::OutOfBounds(x, y).into());
        }
        Ok(&self.cells[y as usize * self.width() + x as usize])
    }

    pub fn cell(&self, coord: Cartesian2DCoordinate) -> Result<&MazeCell> {
        self.cell_at(i64::from(coord.x), i64::from(coord.y))
    }

    /// Is the grid coordinate within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Cartesian2DCoordinate) -> bool {
        (coord.x as usize) < self.width() && (coord.y as usize) < self.height()
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width() + coord.x as usize)
        } else {
            None
        }
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Cartesian2DCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<Cartesian2DCoordinate> {
        coord.offset(direction).filter(|c| self.is_valid_coordinate(*c))
    }

    /// Cells to the North, East, South or West of `coord`, whether or not a passage joins them.
    pub fn neighbours(&self, coord: Cartesian2DCoordinate) -> CoordinateSmallVec {
        CompassPrimary::ALL
            .iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    pub fn is_visited(&self, coord: Cartesian2DCoordinate) -> bool {
        self.cell_ref(coord).map_or(false, MazeCell::is_visited)
    }

    /// Cells joined to `coord` by a passage, in carving order.
    pub fn links(&self, coord: Cartesian2DCoordinate) -> Option<&[Cartesian2DCoordinate]> {
        self.cell_ref(coord).map(MazeCell::neighbours)
    }

    /// Are two cells in the grid linked?
    pub fn is_linked(&self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        self.links(a).map_or(false, |links| links.contains(&b))
    }

    pub fn is_neighbour_linked(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.cell_ref(coord).map_or(false, |cell| cell.walls().is_removed(direction))
    }

    /// Number of passages. Each passage is stored on both of its cells.
    pub fn links_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.neighbours().len()).sum::<usize>() / 2
    }

    pub fn iter(&self) -> CellIter {
        CellIter {
            current_cell_number: 0,
            row_length: self.width(),
            cells_count: self.size(),
        }
    }

    pub fn iter_row(&self) -> impl Iterator<Item = Vec<Cartesian2DCoordinate>> {
        let width = self.width() as u32;
        (0..self.height() as u32)
            .map(move |y| (0..width).map(|x| Cartesian2DCoordinate::new(x, y)).collect())
    }

    pub fn iter_cells(&self) -> std::slice::Iter<MazeCell> {
        self.cells.iter()
    }

    /// Every passage once, as (earlier cell, later cell) in row major order.
    pub fn iter_links<'a>(&'a self)
                          -> impl Iterator<Item = (Cartesian2DCoordinate, Cartesian2DCoordinate)> + 'a {
        self.cells.iter().flat_map(move |cell| {
            let src = cell.coordinate();
            cell.neighbours()
                .iter()
                .cloned()
                .filter(move |dst| (dst.y, dst.x) > (src.y, src.x))
                .map(move |dst| (src, dst))
        })
    }

    /// Knock down the wall between `from` and its neighbour in `direction`, on both sides.
    /// Returns the neighbour's coordinate.
    pub(crate) fn carve(&mut self,
                        from: Cartesian2DCoordinate,
                        direction: CompassPrimary)
                        -> Result<Cartesian2DCoordinate> {
        let from_index = self.checked_index(from)?;
        let to = self.neighbour_at_direction(from, direction).ok_or_else(|| {
            let (dx, dy) = match direction {
                CompassPrimary::North => (0, -1),
                CompassPrimary::East => (1, 0),
                CompassPrimary::South => (0, 1),
                CompassPrimary::West => (-1, 0),
            };
            Error::from(ErrorKind::OutOfBounds(i64::from(from.x) + dx, i64::from(from.y) + dy))
        })?;
        let to_index = self.checked_index(to)?;

        self.cells[from_index].open_towards(to, direction);
        self.cells[to_index].open_towards(from, direction.opposite());
        Ok(to)
    }

    pub(crate) fn mark_visited(&mut self, coord: Cartesian2DCoordinate) -> Result<()> {
        let index = self.checked_index(coord)?;
        self.cells[index].mark_visited();
        Ok(())
    }

    /// World position of a cell's origin on the ground plane, spacing cells by width plus margin.
    pub fn cell_position(&self, coord: Cartesian2DCoordinate) -> Option<(f32, f32)> {
        if self.is_valid_coordinate(coord) {
            let pitch = self.cell_width + self.margin.0;
            Some((pitch * coord.x as f32, pitch * coord.y as f32))
        } else {
            None
        }
    }

    /// Translation that puts the centre of the maze at the world origin.
    pub fn centre_offset(&self) -> (f32, f32) {
        let pitch = self.cell_width + self.margin.0;
        (-(pitch * self.width() as f32) / 2.0, -(pitch * self.height() as f32) / 2.0)
    }

    /// The passages as an undirected graph, node weights being the cell coordinates.
    /// Node indices follow row major cell order.
    pub fn passage_graph(&self) -> PassageGraph {
        let mut graph = PassageGraph::with_capacity(self.size(), self.links_count());
        for cell in &self.cells {
            let _ = graph.add_node(cell.coordinate());
        }
        for (src, dst) in self.iter_links() {
            if let (Some(a), Some(b)) = (self.grid_coordinate_to_index(src),
                                         self.grid_coordinate_to_index(dst)) {
                let _ = graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
            }
        }
        graph
    }

    /// Connected, acyclic and spanning: exactly one route between any two cells.
    pub fn is_perfect_maze(&self) -> bool {
        if !self.is_initialized() {
            return false;
        }
        let graph = self.passage_graph();
        let (_, EdgesCount(tree_edges)) = self.spanning_tree_size();
        graph.edge_count() == tree_edges && connected_components(&graph) == 1 &&
        !is_cyclic_undirected(&graph)
    }

    #[inline]
    fn cell_ref(&self, coord: Cartesian2DCoordinate) -> Option<&MazeCell> {
        self.grid_coordinate_to_index(coord).map(|index| &self.cells[index])
    }

    fn checked_index(&self, coord: Cartesian2DCoordinate) -> Result<usize> {
        if !self.is_initialized() {
            return Err(ErrorKind::NotInitialized.into());
        }
        self.grid_coordinate_to_index(coord)
            .ok_or_else(|| ErrorKind::OutOfBounds(i64::from(coord.x), i64::from(coord.y)).into())
    }
}

#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    row_length: usize,
    cells_count: usize,
}

impl Iterator for CellIter {
    type Item = Cartesian2DCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let index = self.current_cell_number;
            self.current_cell_number += 1;
            Some(Cartesian2DCoordinate::new((index % self.row_length) as u32,
                                            (index / self.row_length) as u32))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells_count - self.current_cell_number;
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for CellIter {} // default impl using size_hint()

impl<'a> IntoIterator for &'a Grid {
    type Item = Cartesian2DCoordinate;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
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

        if !self.is_initialized() {
            return Ok(());
        }
        let columns_count = self.width();
        let rows_count = self.height();
        let open = |coord, dir| self.is_neighbour_linked(coord, dir);

        // The north boundary. Every other row draws only its own southern walls.
        let mut output = String::from(WALL_RD);
        for x in 0..columns_count {
            output.push_str(WALL_LR_3);
            let coord = Cartesian2DCoordinate::new(x as u32, 0);
            if open(coord, CompassPrimary::East) {
                output.push_str(WALL_LR);
            } else if x == columns_count - 1 {
                output.push_str(WALL_LD);
            } else {
                output.push_str(WALL_LRD);
            }
        }
        output.push('\n');

        for (index_row, row) in self.iter_row().enumerate() {
            let is_last_row = index_row == rows_count - 1;
            let mut middle = String::from(WALL_UD);
            let mut bottom = String::new();

            for (index_column, coord) in row.into_iter().enumerate() {
                let is_last_column = index_column == columns_count - 1;
                let east_open = open(coord, CompassPrimary::East);
                let south_open = open(coord, CompassPrimary::South);

                match *self.grid_display() {
                    Some(ref displayer) => middle.push_str(&displayer.render_cell_body(coord)),
                    None => middle.push_str("   "),
                }
                middle.push_str(if east_open { " " } else { WALL_UD });

                if index_column == 0 {
                    bottom.push_str(if is_last_row {
                        WALL_RU
                    } else if south_open {
                        WALL_UD
                    } else {
                        WALL_RUD
                    });
                }
                bottom.push_str(if south_open { "   " } else { WALL_LR_3 });

                let corner = match (is_last_row, is_last_column) {
                    (true, true) => WALL_LU,
                    (true, false) => if east_open { WALL_LR } else { WALL_LRU },
                    (false, true) => if south_open { WALL_UD } else { WALL_LUD },
                    (false, false) => {
                        let se_from_east = self.neighbour_at_direction(coord, CompassPrimary::East)
                            .map_or(false, |c| open(c, CompassPrimary::South));
                        let se_from_south = self.neighbour_at_direction(coord, CompassPrimary::South)
                            .map_or(false, |c| open(c, CompassPrimary::East));

                        match (!south_open, !se_from_east, !east_open, !se_from_south) {
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
                bottom.push_str(corner);
            }

            output.push_str(&middle);
            output.push('\n');
            output.push_str(&bottom);
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}
