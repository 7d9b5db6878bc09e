//! Command-line argument parsing.

use clap::{Parser, ValueEnum};

use crate::config::TerrainConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Plan view coloured by terrain layer
    Top,
    /// Rendered mesh seen from above the map corner
    Perspective,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "terraintty")]
#[command(about = "Procedural Perlin terrain rendered in the terminal", long_about = None)]
pub struct Args {
    /// Height map resolution (samples per side)
    #[arg(long, value_name = "CELLS", default_value_t = 50)]
    pub grid_size: usize,

    /// Grid index divisor applied before sampling noise
    #[arg(long, default_value_t = 0.40)]
    pub scale: f32,

    /// Lowest terrain height; lower samples are clamped to it
    #[arg(long, value_name = "HEIGHT", default_value_t = -1.0, allow_negative_numbers = true)]
    pub floor: f32,

    /// Texture sections per side of the mesh
    #[arg(long, default_value_t = 4)]
    pub sections: usize,

    /// Number of noise octaves
    #[arg(long, default_value_t = 8)]
    pub octaves: u32,

    /// Permutation seed (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = View::Perspective)]
    pub view: View,

    /// Output width in terminal columns (defaults to the terminal width)
    #[arg(long, value_name = "COLS")]
    pub width: Option<u32>,

    /// Output height in terminal rows (defaults to the terminal height)
    #[arg(long, value_name = "ROWS")]
    pub height: Option<u32>,

    /// Print a single frame and exit instead of running the viewer
    #[arg(long)]
    pub once: bool,
}

impl Args {
    pub fn terrain_config(&self) -> TerrainConfig {
        let mut config = TerrainConfig {
            grid_size: self.grid_size,
            scale: self.scale,
            height_floor: self.floor,
            sections: self.sections,
            seed: self.seed,
            ..TerrainConfig::default()
        };
        config.fractal.octaves = self.octaves;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_terrain_config() {
        let args = Args::parse_from(["terraintty"]);
        let config = args.terrain_config();
        let defaults = TerrainConfig::default();

        assert_eq!(config.grid_size, defaults.grid_size);
        assert_eq!(config.scale, defaults.scale);
        assert_eq!(config.height_floor, defaults.height_floor);
        assert_eq!(config.sections, defaults.sections);
        assert_eq!(config.fractal, defaults.fractal);
        assert_eq!(config.seed, None);
        assert_eq!(args.view, View::Perspective);
        assert!(!args.once);
    }

    #[test]
    fn overrides_apply() {
        let args = Args::parse_from([
            "terraintty",
            "--grid-size",
            "64",
            "--floor=-2.5",
            "--seed",
            "7",
            "--octaves",
            "3",
            "--view",
            "top",
            "--once",
        ]);
        let config = args.terrain_config();

        assert_eq!(config.grid_size, 64);
        assert_eq!(config.height_floor, -2.5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.fractal.octaves, 3);
        assert_eq!(args.view, View::Top);
        assert!(args.once);
    }
}
