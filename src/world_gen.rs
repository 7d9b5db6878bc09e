use log::info;
use noise::NoiseFn;

use crate::config::TerrainConfig;
use crate::error::Result;
use crate::noise_engine::NoiseEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainLayer {
    Water,
    Sand,
    Soil,
    Grass,
    Rock,
    Snow,
}

impl TerrainLayer {
    /// Upper height bound of each layer, lowest first. Anything above the
    /// last bound is snow.
    const BANDS: [(f32, TerrainLayer); 5] = [
        (-0.75, TerrainLayer::Water),
        (-0.25, TerrainLayer::Sand),
        (0.75, TerrainLayer::Soil),
        (2.5, TerrainLayer::Grass),
        (4.5, TerrainLayer::Rock),
    ];

    pub fn classify(height: f32) -> Self {
        Self::BANDS
            .iter()
            .find(|(bound, _)| height <= *bound)
            .map(|&(_, layer)| layer)
            .unwrap_or(TerrainLayer::Snow)
    }

    pub fn color(self) -> [u8; 3] {
        match self {
            TerrainLayer::Water => [38, 92, 168],
            TerrainLayer::Sand => [214, 196, 140],
            TerrainLayer::Soil => [122, 92, 60],
            TerrainLayer::Grass => [76, 140, 58],
            TerrainLayer::Rock => [112, 108, 104],
            TerrainLayer::Snow => [236, 240, 244],
        }
    }
}

/// Square grid of clamped terrain heights, stored row-major.
#[derive(Debug, Clone)]
pub struct HeightMap {
    size: usize,
    samples: Vec<f32>,
}

impl HeightMap {
    /// Samples the engine once per cell at `(row / scale, col / scale)` and
    /// clamps each value at the configured floor.
    pub fn generate(engine: &NoiseEngine, config: &TerrainConfig) -> Result<Self> {
        config.validate()?;

        let size = config.grid_size;
        let field = engine.height_field_with(size as u32, config.fractal)?;
        let scale = config.scale as f64;

        let mut samples = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                let height = field.get([row as f64 / scale, col as f64 / scale]) as f32;
                samples.push(height.max(config.height_floor));
            }
        }

        let map = Self { size, samples };
        info!(
            "Generated {}x{} height map (min {:.3}, max {:.3})",
            size,
            size,
            map.min(),
            map.max()
        );
        Ok(map)
    }

    pub fn from_samples(size: usize, samples: Vec<f32>) -> Option<Self> {
        (samples.len() == size * size).then_some(Self { size, samples })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.samples[row * self.size + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.samples.chunks(self.size)
    }

    pub fn min(&self) -> f32 {
        self.samples.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.samples.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}
