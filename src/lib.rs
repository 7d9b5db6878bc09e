//! terraintty - procedural Perlin terrain with a terminal renderer

pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod noise_engine;
pub mod perlin;
pub mod renderer;
pub mod terminal;
pub mod world_gen;

pub use error::{Result, TerrainError};
pub use noise_engine::{FractalParams, HeightField, NoiseEngine};
pub use perlin::PermutationTable;
