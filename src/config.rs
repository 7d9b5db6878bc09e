//! Terrain generation parameters.

use crate::error::{Result, TerrainError};
use crate::noise_engine::FractalParams;

#[derive(Debug, Clone)]
pub struct TerrainConfig {
    /// Height map resolution (samples per side)
    pub grid_size: usize,

    /// Divisor applied to grid indices before sampling; smaller values
    /// stretch the noise further across the map
    pub scale: f32,

    /// Heights below this are clamped to it
    pub height_floor: f32,

    /// Texture blocks per side of the mesh
    pub sections: usize,

    pub fractal: FractalParams,

    /// Fixed table seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid_size: 50,
            scale: 0.40,
            height_floor: -1.0,
            sections: 4,
            fractal: FractalParams::default(),
            seed: None,
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 || self.grid_size > u32::MAX as usize {
            return Err(TerrainError::InvalidArgument(format!(
                "grid size must be at least 2, got {}",
                self.grid_size
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(TerrainError::InvalidArgument(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        if !self.height_floor.is_finite() {
            return Err(TerrainError::InvalidArgument(
                "height floor must be finite".to_string(),
            ));
        }
        if self.sections == 0 {
            return Err(TerrainError::InvalidArgument(
                "at least one texture section is required".to_string(),
            ));
        }
        if self.fractal.octaves == 0 {
            return Err(TerrainError::InvalidArgument(
                "at least one octave is required".to_string(),
            ));
        }
        Ok(())
    }
}
