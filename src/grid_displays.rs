use crate::cells::Cartesian2DCoordinate;
use crate::utils::{self, FnvHashSet};

pub trait GridDisplay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required.
    fn render_cell_body(&self, _: Cartesian2DCoordinate) -> String {
        String::from("   ")
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<Cartesian2DCoordinate>,
    start: Option<Cartesian2DCoordinate>,
    end: Option<Cartesian2DCoordinate>,
}

impl PathDisplay {
    pub fn new(path: &[Cartesian2DCoordinate]) -> Self {
        let mut on_path_coordinates = utils::fnv_hashset(path.len());
        on_path_coordinates.extend(path.iter().cloned());
        PathDisplay {
            on_path_coordinates,
            start: path.first().cloned(),
            end: path.last().cloned(),
        }
    }
}

impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if Some(coord) == self.start {
            String::from(" S ")
        } else if Some(coord) == self.end {
            String::from(" E ")
        } else if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

/// Marks the chosen endpoints before any path has been found.
#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start: Option<Cartesian2DCoordinate>,
    end: Option<Cartesian2DCoordinate>,
}

impl StartEndPointsDisplay {
    pub fn new(start: Option<Cartesian2DCoordinate>,
               end: Option<Cartesian2DCoordinate>)
               -> StartEndPointsDisplay {
        StartEndPointsDisplay { start, end }
    }
}

impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if Some(coord) == self.start {
            String::from(" S ")
        } else if Some(coord) == self.end {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}
