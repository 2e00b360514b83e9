use serde_derive::Deserialize;
use std::time::Duration;

use crate::errors::*;
use crate::units::Margin;

/// Everything a generation request needs. Dimensions and margin are fixed for the life of one maze.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub width: usize,
    pub height: usize,
    pub margin: f32,
    pub cell_width: f32,
    /// Pause between generation steps, for watching the maze being carved.
    pub step_delay: Duration,
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> MazeConfig {
        MazeConfig {
            width: 10,
            height: 10,
            margin: 0.0,
            cell_width: 1.0,
            step_delay: Duration::from_millis(0),
            seed: None,
        }
    }
}

/// Lower bounds applied to user supplied sizes.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct MazeLimits {
    pub min_width: usize,
    pub min_height: usize,
    pub min_margin: f32,
}

impl Default for MazeLimits {
    fn default() -> MazeLimits {
        MazeLimits {
            min_width: 10,
            min_height: 10,
            min_margin: 0.0,
        }
    }
}

impl MazeConfig {
    pub fn new(width: usize, height: usize, margin: f32) -> MazeConfig {
        MazeConfig {
            width,
            height,
            margin,
            ..MazeConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            Err(ErrorKind::InvalidDimension(self.width, self.height).into())
        } else {
            Ok(())
        }
    }

    #[inline]
    pub fn margin(&self) -> Margin {
        Margin(self.margin)
    }

    /// Raise any size below its limit up to that limit. A NaN margin becomes the minimum.
    pub fn clamped(&self, limits: &MazeLimits) -> MazeConfig {
        let margin = if self.margin.is_nan() || self.margin < limits.min_margin {
            limits.min_margin
        } else {
            self.margin
        };
        MazeConfig {
            width: self.width.max(limits.min_width),
            height: self.height.max(limits.min_height),
            margin,
            ..self.clone()
        }
    }

    /// Same maze shape settings, different dimensions.
    pub fn with_dimensions(&self, width: usize, height: usize, margin: f32) -> MazeConfig {
        MazeConfig {
            width,
            height,
            margin,
            ..self.clone()
        }
    }
}
