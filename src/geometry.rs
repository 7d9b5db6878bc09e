use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::error::{Result, TerrainError};
use crate::world_gen::HeightMap;

/// Interleaved terrain vertex: position followed by texture coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, tex_coord: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            tex_coord,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Non-indexed triangle list covering a height map.
pub struct TerrainMesh {
    pub vertices: Vec<Vertex>,
    pub origin: Vec3,
}

impl TerrainMesh {
    /// Triangulates the map in `sections x sections` blocks so that textures
    /// restart at every block boundary.
    ///
    /// Each block covers `(size - 1) / sections` cells per side, which keeps
    /// the `+1` neighbour lookups inside the map. Leftover cells past the last
    /// block are not emitted.
    pub fn build(map: &HeightMap, sections: usize, origin: Vec3) -> Result<Self> {
        if sections == 0 {
            return Err(TerrainError::InvalidArgument(
                "at least one texture section is required".to_string(),
            ));
        }
        let section_size = map.size().saturating_sub(1) / sections;
        if section_size < 2 {
            return Err(TerrainError::InvalidArgument(format!(
                "{} sections leave fewer than 2 cells per section on a {}x{} map",
                sections,
                map.size(),
                map.size()
            )));
        }

        let span = (section_size - 1) as f32;
        let mut vertices = Vec::with_capacity(sections * sections * section_size * section_size * 6);

        for s in 0..sections {
            for t in 0..sections {
                let start_x = s * section_size;
                let start_z = t * section_size;

                for i in start_x..start_x + section_size {
                    for j in start_z..start_z + section_size {
                        let x1 = (i - start_x) as f32 / span;
                        let x2 = (i - start_x + 1) as f32 / span;
                        let y1 = (j - start_z) as f32 / span;
                        let y2 = (j - start_z + 1) as f32 / span;

                        let corner = |di: usize, dj: usize| {
                            origin
                                + Vec3::new(
                                    (i + di) as f32,
                                    map.get(i + di, j + dj),
                                    (j + dj) as f32,
                                )
                        };

                        let top_left = Vertex::new(corner(0, 0), [x1, y1]);
                        let bottom_right = Vertex::new(corner(1, 1), [x2, y2]);
                        let bottom_left = Vertex::new(corner(0, 1), [x1, y2]);
                        let top_right = Vertex::new(corner(1, 0), [x2, y1]);

                        vertices.extend_from_slice(&[
                            top_left,
                            bottom_right,
                            bottom_left,
                            bottom_right,
                            top_left,
                            top_right,
                        ]);
                    }
                }
            }
        }

        Ok(Self { vertices, origin })
    }

    pub fn triangles(&self) -> impl Iterator<Item = [&Vertex; 3]> {
        self.vertices
            .chunks_exact(3)
            .map(|tri| [&tri[0], &tri[1], &tri[2]])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Raw vertex bytes, ready for a vertex buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
