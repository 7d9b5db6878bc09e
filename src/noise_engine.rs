//! Fractal terrain noise over an owned permutation table.
//!
//! [`NoiseEngine`] sums eight octaves of [`PermutationTable::noise3d`] into an
//! unbounded height value. The table is only replaced through `&mut self`, so
//! any number of threads may sample a shared engine.

use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use noise::NoiseFn;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, TerrainError};
use crate::perlin::PermutationTable;

/// Z coordinate used when only (x, y) is sampled; keeps the sample off the
/// integer lattice plane where every gradient dot product is zero.
pub const BASE_Z: f64 = 0.001;

/// Octave schedule for [`NoiseEngine::fractal_height`].
///
/// Frequency and amplitude both grow per octave, so later octaves dominate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    pub octaves: u32,
    /// Applied to the sampling frequency after each octave.
    pub frequency_multiplier: f64,
    /// Applied to the octave weight after each octave.
    pub amplitude_multiplier: f64,
    pub base_z: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 8,
            frequency_multiplier: 1.2,
            amplitude_multiplier: 1.4,
            base_z: BASE_Z,
        }
    }
}

pub struct NoiseEngine {
    table: PermutationTable,
}

impl NoiseEngine {
    /// Engine with a table shuffled from a clock-derived seed.
    pub fn new() -> Self {
        Self::with_seed(clock_seed())
    }

    pub fn with_seed(seed: u64) -> Self {
        debug!("Seeding permutation table with {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            table: PermutationTable::shuffled(&mut rng),
        }
    }

    pub fn from_table(table: PermutationTable) -> Self {
        Self { table }
    }

    /// Replaces the whole table with a fresh shuffle of the identity.
    pub fn reseed(&mut self, seed: u64) {
        debug!("Reseeding permutation table with {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        self.table = PermutationTable::shuffled(&mut rng);
    }

    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    pub fn base_noise(&self, x: f64, y: f64, z: f64) -> f64 {
        self.table.noise3d(x, y, z)
    }

    /// Terrain height at grid coordinate `(x, y)` with the default octave
    /// schedule. `grid_size` only rescales the inputs and must be non-zero.
    pub fn height(&self, x: f64, y: f64, grid_size: u32) -> Result<f64> {
        self.fractal_height(x, y, grid_size, &FractalParams::default())
    }

    pub fn fractal_height(
        &self,
        x: f64,
        y: f64,
        grid_size: u32,
        params: &FractalParams,
    ) -> Result<f64> {
        let grid = checked_grid(grid_size)?;
        Ok(self.sum_octaves(x / grid, y / grid, params))
    }

    /// Borrows the engine as a 2D [`NoiseFn`] at a fixed grid size.
    pub fn height_field(&self, grid_size: u32) -> Result<HeightField<'_>> {
        self.height_field_with(grid_size, FractalParams::default())
    }

    pub fn height_field_with(
        &self,
        grid_size: u32,
        params: FractalParams,
    ) -> Result<HeightField<'_>> {
        let grid = checked_grid(grid_size)?;
        Ok(HeightField {
            engine: self,
            grid,
            params,
        })
    }

    fn sum_octaves(&self, x: f64, y: f64, params: &FractalParams) -> f64 {
        let mut value = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;

        for _ in 0..params.octaves {
            value += self.base_noise(x * frequency, y * frequency, params.base_z) * amplitude;
            frequency *= params.frequency_multiplier;
            amplitude *= params.amplitude_multiplier;
        }

        value
    }
}

impl Default for NoiseEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseFn<f64, 3> for NoiseEngine {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.base_noise(point[0], point[1], point[2])
    }
}

/// Fractal height with a grid size that has already been validated.
#[derive(Clone, Copy)]
pub struct HeightField<'a> {
    engine: &'a NoiseEngine,
    grid: f64,
    params: FractalParams,
}

impl HeightField<'_> {
    pub fn grid_size(&self) -> u32 {
        self.grid as u32
    }
}

impl NoiseFn<f64, 2> for HeightField<'_> {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.engine
            .sum_octaves(point[0] / self.grid, point[1] / self.grid, &self.params)
    }
}

fn checked_grid(grid_size: u32) -> Result<f64> {
    if grid_size == 0 {
        return Err(TerrainError::InvalidArgument(
            "grid size must be greater than zero".to_string(),
        ));
    }
    Ok(grid_size as f64)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_engine() -> NoiseEngine {
        NoiseEngine::from_table(PermutationTable::identity())
    }

    #[test]
    fn zero_grid_size_is_rejected() {
        let engine = NoiseEngine::with_seed(1);
        assert!(matches!(
            engine.height(1.0, 1.0, 0),
            Err(TerrainError::InvalidArgument(_))
        ));
        assert!(engine.height_field(0).is_err());
    }

    #[test]
    fn height_is_deterministic() {
        let engine = NoiseEngine::with_seed(42);
        for i in 0..100 {
            let x = i as f64 * 0.37;
            let y = i as f64 * 0.53;
            assert_eq!(engine.height(x, y, 50).unwrap(), engine.height(x, y, 50).unwrap());
            assert_eq!(engine.base_noise(x, y, 0.3), engine.base_noise(x, y, 0.3));
        }
    }

    #[test]
    fn same_seed_same_table() {
        assert_eq!(NoiseEngine::with_seed(9).table(), NoiseEngine::with_seed(9).table());
        assert_ne!(NoiseEngine::with_seed(9).table(), NoiseEngine::with_seed(10).table());
    }

    #[test]
    fn default_engine_is_shuffled() {
        let engine = NoiseEngine::default();
        assert_ne!(engine.table(), &PermutationTable::reference());
        assert_ne!(engine.table(), &PermutationTable::identity());
    }

    #[test]
    fn reseed_replaces_table() {
        let mut engine = NoiseEngine::with_seed(1);
        let before = engine.height(12.5, 7.5, 50).unwrap();
        let old_table = engine.table().clone();

        engine.reseed(2);
        assert_ne!(engine.table(), &old_table);
        assert_eq!(engine.table(), NoiseEngine::with_seed(2).table());

        engine.reseed(1);
        assert_eq!(engine.height(12.5, 7.5, 50).unwrap(), before);
    }

    #[test]
    fn single_octave_is_base_noise() {
        let engine = NoiseEngine::with_seed(5);
        let params = FractalParams {
            octaves: 1,
            ..FractalParams::default()
        };
        for i in 0..50 {
            let x = i as f64 * 1.3;
            let y = i as f64 * 0.7;
            let expected = engine.base_noise(x / 50.0, y / 50.0, BASE_Z);
            let got = engine.fractal_height(x, y, 50, &params).unwrap();
            assert!((got - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn octaves_compound_frequency_and_amplitude() {
        let engine = NoiseEngine::with_seed(11);
        let (x, y, g) = (17.0, 33.0, 50u32);

        let mut expected = 0.0;
        for i in 0..8 {
            let f = 1.2f64.powi(i);
            let a = 1.4f64.powi(i);
            expected += engine.base_noise(x * f / g as f64, y * f / g as f64, BASE_Z) * a;
        }

        let got = engine.height(x, y, g).unwrap();
        assert!((got - expected).abs() < 1e-9, "{got} vs {expected}");
    }

    #[test]
    fn identity_table_end_to_end() {
        let engine = identity_engine();

        // Every octave samples (0, 0, 0.001), whose only non-zero corners
        // are weighted by fade(0) = 0.
        assert_eq!(engine.height(0.0, 0.0, 50).unwrap(), 0.0);

        let h = engine.height(5.0, 5.0, 50).unwrap();
        assert!(h.is_finite());
        assert_eq!(h, identity_engine().height(5.0, 5.0, 50).unwrap());

        let mut expected = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        for _ in 0..8 {
            let c = 5.0 * frequency / 50.0;
            expected += PermutationTable::identity().noise3d(c, c, BASE_Z) * amplitude;
            frequency *= 1.2;
            amplitude *= 1.4;
        }
        assert!((h - expected).abs() < 1e-12);
        assert!((h - 12.923_084_032_742_636).abs() < 1e-9, "got {h}");
    }

    #[test]
    fn periodic_every_256_units() {
        let engine = NoiseEngine::with_seed(77);
        for i in 0..40 {
            let x = i as f64 * 0.61 + 0.25;
            let y = i as f64 * 0.29 + 0.5;
            let a = engine.base_noise(x, y, BASE_Z);
            let b = engine.base_noise(x + 256.0, y, BASE_Z);
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn continuous_across_cell_edges() {
        let engine = NoiseEngine::with_seed(123);
        let eps = 1e-7;
        for n in -5..5 {
            let n = n as f64;
            let left = engine.base_noise(n - eps, 0.37, BASE_Z);
            let right = engine.base_noise(n + eps, 0.37, BASE_Z);
            assert!((left - right).abs() < 1e-5, "jump at x = {n}");
        }
    }

    #[test]
    fn noise_fn_adapters_agree() {
        let engine = NoiseEngine::with_seed(8);
        assert_eq!(engine.get([1.5, 2.5, 0.5]), engine.base_noise(1.5, 2.5, 0.5));

        let field = engine.height_field(50).unwrap();
        assert_eq!(field.grid_size(), 50);
        assert_eq!(field.get([10.0, 20.0]), engine.height(10.0, 20.0, 50).unwrap());
    }

    #[test]
    fn shared_across_threads() {
        let engine = NoiseEngine::with_seed(99);
        let expected: Vec<f64> = (0..8)
            .map(|i| engine.height(i as f64, 3.0, 50).unwrap())
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let engine = &engine;
                    scope.spawn(move || engine.height(i as f64, 3.0, 50).unwrap())
                })
                .collect();
            for (handle, want) in handles.into_iter().zip(expected) {
                assert_eq!(handle.join().unwrap(), want);
            }
        });
    }
}
