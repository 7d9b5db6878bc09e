// Perlin noise implementation
// Based on Ken Perlin's improved noise (2002), evaluated against an owned,
// shuffleable permutation table instead of a global one.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, TerrainError};

pub const TABLE_SIZE: usize = 256;

/// Ken Perlin's reference permutation.
const REFERENCE_PERMUTATION: [u8; TABLE_SIZE] = [
    151, 160, 137, 91,  90,  15,  131, 13,  201, 95,  96,  53,  194, 233, 7,   225,
    140, 36,  103, 30,  69,  142, 8,   99,  37,  240, 21,  10,  23,  190, 6,   148,
    247, 120, 234, 75,  0,   26,  197, 62,  94,  252, 219, 203, 117, 35,  11,  32,
    57,  177, 33,  88,  237, 149, 56,  87,  174, 20,  125, 136, 171, 168, 68,  175,
    74,  165, 71,  134, 139, 48,  27,  166, 77,  146, 158, 231, 83,  111, 229, 122,
    60,  211, 133, 230, 220, 105, 92,  41,  55,  46,  245, 40,  244, 102, 143, 54,
    65,  25,  63,  161, 1,   216, 80,  73,  209, 76,  132, 187, 208, 89,  18,  169,
    200, 196, 135, 130, 116, 188, 159, 86,  164, 100, 109, 198, 173, 186, 3,   64,
    52,  217, 226, 250, 124, 123, 5,   202, 38,  147, 118, 126, 255, 82,  85,  212,
    207, 206, 59,  227, 47,  16,  58,  17,  182, 189, 28,  42,  223, 183, 170, 213,
    119, 248, 152, 2,   44,  154, 163, 70,  221, 153, 101, 155, 167, 43,  172, 9,
    129, 22,  39,  253, 19,  98,  108, 110, 79,  113, 224, 232, 178, 185, 112, 104,
    218, 246, 97,  228, 251, 34,  242, 193, 238, 210, 144, 12,  191, 179, 162, 241,
    81,  51,  145, 235, 249, 14,  239, 107, 49,  192, 214, 31,  181, 199, 106, 157,
    184, 84,  204, 176, 115, 121, 50,  45,  127, 4,   150, 254, 138, 236, 205, 93,
    222, 114, 67,  29,  24,  72,  243, 141, 128, 195, 78,  66,  215, 61,  156, 180,
];

/// Gradient directions indexed by `hash & 15`: the 12 cube edge midpoints,
/// with four of them repeated to fill 16 slots.
const GRADIENTS: [[f64; 3]; 16] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
    [1.0, 1.0, 0.0],
    [0.0, -1.0, 1.0],
    [-1.0, 1.0, 0.0],
    [0.0, -1.0, -1.0],
];

/// A permutation of `0..=255` used to hash lattice coordinates.
///
/// Every constructor guarantees the bijection, so lookups never need to
/// validate anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    values: [u8; TABLE_SIZE],
}

impl PermutationTable {
    /// `[0, 1, ..., 255]`, unshuffled.
    pub fn identity() -> Self {
        let mut values = [0u8; TABLE_SIZE];
        for (i, value) in values.iter_mut().enumerate() {
            *value = i as u8;
        }
        Self { values }
    }

    /// Unshuffled reference table for reproducible computations. Engines
    /// built for terrain shuffle their own table instead.
    pub fn reference() -> Self {
        Self {
            values: REFERENCE_PERMUTATION,
        }
    }

    /// Identity table shuffled with the given random source.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table = Self::identity();
        table.values.shuffle(rng);
        table
    }

    /// Builds a table from explicit values, rejecting anything that is not a
    /// permutation of `0..=255`.
    pub fn from_values(values: &[u8]) -> Result<Self> {
        if values.len() != TABLE_SIZE {
            return Err(TerrainError::InvalidArgument(format!(
                "permutation table needs {} entries, got {}",
                TABLE_SIZE,
                values.len()
            )));
        }

        let mut seen = [false; TABLE_SIZE];
        for &v in values {
            if seen[v as usize] {
                return Err(TerrainError::InvalidArgument(format!(
                    "permutation table repeats value {}",
                    v
                )));
            }
            seen[v as usize] = true;
        }

        let mut table = [0u8; TABLE_SIZE];
        table.copy_from_slice(values);
        Ok(Self { values: table })
    }

    pub fn values(&self) -> &[u8; TABLE_SIZE] {
        &self.values
    }

    #[inline]
    fn at(&self, index: u8) -> u8 {
        self.values[index as usize]
    }

    /// 3D gradient noise at `(x, y, z)`, nominally within [-1, 1].
    ///
    /// Repeats every 256 units on each axis.
    pub fn noise3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let x_floor = x.floor();
        let y_floor = y.floor();
        let z_floor = z.floor();

        let x_int = (x_floor as i64 & 255) as u8;
        let y_int = (y_floor as i64 & 255) as u8;
        let z_int = (z_floor as i64 & 255) as u8;

        let x_frac = x - x_floor;
        let y_frac = y - y_floor;
        let z_frac = z - z_floor;

        let u = fade(x_frac);
        let v = fade(y_frac);
        let w = fade(z_frac);

        // Hash coordinates of the 8 cube corners
        let a = self.at(x_int).wrapping_add(y_int);
        let b = self.at(x_int.wrapping_add(1)).wrapping_add(y_int);
        let aa = self.at(a).wrapping_add(z_int);
        let ab = self.at(a.wrapping_add(1)).wrapping_add(z_int);
        let ba = self.at(b).wrapping_add(z_int);
        let bb = self.at(b.wrapping_add(1)).wrapping_add(z_int);

        let p0 = grad(self.at(aa), x_frac, y_frac, z_frac);
        let p1 = grad(self.at(ba), x_frac - 1.0, y_frac, z_frac);
        let p2 = grad(self.at(ab), x_frac, y_frac - 1.0, z_frac);
        let p3 = grad(self.at(bb), x_frac - 1.0, y_frac - 1.0, z_frac);
        let p4 = grad(self.at(aa.wrapping_add(1)), x_frac, y_frac, z_frac - 1.0);
        let p5 = grad(self.at(ba.wrapping_add(1)), x_frac - 1.0, y_frac, z_frac - 1.0);
        let p6 = grad(self.at(ab.wrapping_add(1)), x_frac, y_frac - 1.0, z_frac - 1.0);
        let p7 = grad(self.at(bb.wrapping_add(1)), x_frac - 1.0, y_frac - 1.0, z_frac - 1.0);

        // Blend along x, then y, then z
        let q0 = lerp(u, p0, p1);
        let q1 = lerp(u, p2, p3);
        let q2 = lerp(u, p4, p5);
        let q3 = lerp(u, p6, p7);

        let r0 = lerp(v, q0, q1);
        let r1 = lerp(v, q2, q3);

        lerp(w, r0, r1)
    }
}

pub(crate) fn fade(t: f64) -> f64 {
    t * t * t * (t * (6.0 * t - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

pub(crate) fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let [gx, gy, gz] = GRADIENTS[(hash & 15) as usize];
    gx * x + gy * y + gz * z
}
