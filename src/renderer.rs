//! CPU rasterizer that draws terrain into an RGB buffer with a depth test.

use glam::{Mat4, Vec2, Vec3};

use crate::error::{Result, TerrainError};
use crate::geometry::{TerrainMesh, Vertex};
use crate::world_gen::{HeightMap, TerrainLayer};

pub const CLEAR_COLOR: [u8; 3] = [13, 13, 13];

const LIGHT_DIR: Vec3 = Vec3::new(0.4, 0.8, 0.3);

const SKY_HORIZON: Vec3 = Vec3::new(0.75, 0.85, 0.95);
const SKY_ZENITH: Vec3 = Vec3::new(0.25, 0.45, 0.8);

/// Largest colour buffer a renderer will allocate.
pub const MAX_PIXELS: usize = 1 << 24;

pub struct Renderer {
    pub width: u32,
    pub height: u32,
    color: Vec<[u8; 3]>,
    depth: Vec<f32>,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TerrainError::InvalidArgument(format!(
                "render target must be non-empty, got {}x{}",
                width, height
            )));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .filter(|&len| len <= MAX_PIXELS)
            .ok_or_else(|| {
                TerrainError::InvalidArgument(format!(
                    "render target {}x{} exceeds {} pixels",
                    width, height, MAX_PIXELS
                ))
            })?;
        Ok(Self {
            width,
            height,
            color: vec![CLEAR_COLOR; len],
            depth: vec![f32::INFINITY; len],
        })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn clear(&mut self, color: [u8; 3]) {
        self.color.fill(color);
        self.depth.fill(f32::INFINITY);
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.color
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.color[self.index(x, y)]
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Fills every pixel with a sky gradient. `inv_view_proj` is the inverse
    /// of projection times a translation-free view, so the sky follows the
    /// camera's rotation but never its position.
    pub fn draw_sky(&mut self, inv_view_proj: Mat4) {
        for y in 0..self.height {
            let ndc_y = 1.0 - 2.0 * (y as f32 + 0.5) / self.height as f32;
            for x in 0..self.width {
                let ndc_x = 2.0 * (x as f32 + 0.5) / self.width as f32 - 1.0;
                let dir = inv_view_proj
                    .project_point3(Vec3::new(ndc_x, ndc_y, 1.0))
                    .normalize_or_zero();

                let t = dir.y.clamp(0.0, 1.0).sqrt();
                let sky = SKY_HORIZON.lerp(SKY_ZENITH, t) * 255.0;

                let index = self.index(x, y);
                self.color[index] = [sky.x as u8, sky.y as u8, sky.z as u8];
                self.depth[index] = f32::INFINITY;
            }
        }
    }

    /// Rasterizes every triangle of the mesh, flat-shaded with a fixed
    /// directional light. Triangles reaching behind the near plane are
    /// skipped whole. Returns how many triangles produced fragments.
    pub fn draw_mesh<F>(&mut self, mesh: &TerrainMesh, view_proj: Mat4, shade: F) -> usize
    where
        F: Fn(&Vertex) -> [u8; 3],
    {
        let light = LIGHT_DIR.normalize();
        let mut drawn = 0;

        for tri in mesh.triangles() {
            let Some(screen) = self.project_triangle(&tri, view_proj) else {
                continue;
            };

            let [a, b, c] = tri.map(Vertex::position);
            let mut normal = (b - a).cross(c - a).normalize_or_zero();
            if normal.y < 0.0 {
                normal = -normal;
            }
            let brightness = 0.35 + 0.65 * normal.dot(light).max(0.0);

            let base = average_color(tri.map(|v| shade(v)));
            let color = base.map(|channel| (channel as f32 * brightness).min(255.0) as u8);

            if self.fill_triangle(screen, color) {
                drawn += 1;
            }
        }

        drawn
    }

    /// Plan view of the map, one layer colour per cell, brightened with
    /// height inside each layer.
    pub fn draw_top_down(&mut self, map: &HeightMap) {
        let size = map.size();
        let (min, max) = (map.min(), map.max());
        let range = (max - min).max(f32::EPSILON);

        for y in 0..self.height {
            let row = (y as usize * size) / self.height as usize;
            for x in 0..self.width {
                let col = (x as usize * size) / self.width as usize;
                let height = map.get(row, col);
                let tint = 0.75 + 0.25 * (height - min) / range;
                let color = TerrainLayer::classify(height)
                    .color()
                    .map(|channel| (channel as f32 * tint).min(255.0) as u8);

                let index = self.index(x, y);
                self.color[index] = color;
                self.depth[index] = 0.0;
            }
        }
    }

    /// Screen positions with depth in z, or `None` when any corner is behind
    /// the near plane.
    fn project_triangle(&self, tri: &[&Vertex; 3], view_proj: Mat4) -> Option<[Vec3; 3]> {
        let mut out = [Vec3::ZERO; 3];
        for (slot, vertex) in out.iter_mut().zip(tri) {
            let clip = view_proj * vertex.position().extend(1.0);
            if clip.w <= f32::EPSILON || clip.z < 0.0 {
                return None;
            }
            let ndc = clip.truncate() / clip.w;
            *slot = Vec3::new(
                (ndc.x * 0.5 + 0.5) * self.width as f32,
                (0.5 - ndc.y * 0.5) * self.height as f32,
                ndc.z,
            );
        }
        Some(out)
    }

    fn fill_triangle(&mut self, [a, b, c]: [Vec3; 3], color: [u8; 3]) -> bool {
        let area = edge(a.truncate(), b.truncate(), c.truncate());
        if area.abs() <= f32::EPSILON {
            return false;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
        let max_x = a.x.max(b.x).max(c.x).ceil().min(self.width as f32) as u32;
        let max_y = a.y.max(b.y).max(c.y).ceil().min(self.height as f32) as u32;

        let mut wrote = false;
        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b.truncate(), c.truncate(), p) / area;
                let w1 = edge(c.truncate(), a.truncate(), p) / area;
                let w2 = edge(a.truncate(), b.truncate(), p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let z = w0 * a.z + w1 * b.z + w2 * c.z;
                let index = self.index(x, y);
                if z < self.depth[index] {
                    self.depth[index] = z;
                    self.color[index] = color;
                    wrote = true;
                }
            }
        }
        wrote
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

fn average_color(colors: [[u8; 3]; 3]) -> [u8; 3] {
    let mut sum = [0u32; 3];
    for color in colors {
        for (total, channel) in sum.iter_mut().zip(color) {
            *total += channel as u32;
        }
    }
    sum.map(|total| (total / 3) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    fn flat_mesh(height: f32) -> TerrainMesh {
        let map = HeightMap::from_samples(5, vec![height; 25]).unwrap();
        TerrainMesh::build(&map, 1, Vec3::new(-2.0, 0.0, -2.0)).unwrap()
    }

    #[test]
    fn rejects_empty_target() {
        assert!(Renderer::new(0, 10).is_err());
    }

    #[test]
    fn rejects_oversized_target() {
        for (width, height) in [(70_000, 70_000), (u32::MAX, u32::MAX), (u32::MAX, 2)] {
            assert!(matches!(
                Renderer::new(width, height),
                Err(TerrainError::InvalidArgument(_))
            ));
        }
        assert!(Renderer::new(4096, 4096).is_ok());
    }

    #[test]
    fn sky_brightens_towards_horizon() {
        let mut renderer = Renderer::new(8, 16).unwrap();
        let mut camera = Camera::new(Vec3::new(3.0, 40.0, -7.0));
        camera.process_mouse_movement(0.0, 300.0, true);

        renderer.draw_sky(camera.skybox_view_proj_matrix(renderer.aspect()).inverse());

        let top = renderer.pixel(4, 0);
        let bottom = renderer.pixel(4, 15);
        assert!(top[2] > top[0]);
        assert!(bottom[0] > top[0], "{bottom:?} vs {top:?}");
    }

    #[test]
    fn starts_cleared() {
        let renderer = Renderer::new(4, 3).unwrap();
        assert_eq!(renderer.pixels().len(), 12);
        assert!(renderer.pixels().iter().all(|&p| p == CLEAR_COLOR));
    }

    #[test]
    fn draws_mesh_in_front_of_camera() {
        let mut renderer = Renderer::new(32, 32).unwrap();
        let mut camera = Camera::new(Vec3::new(0.0, 5.0, 0.0));
        camera.look_at(Vec3::new(0.0, 0.0, 0.01));

        let mesh = flat_mesh(0.0);
        let drawn = renderer.draw_mesh(&mesh, camera.view_proj_matrix(renderer.aspect()), |_| {
            [200, 200, 200]
        });

        assert!(drawn > 0);
        assert_ne!(renderer.pixel(16, 16), CLEAR_COLOR);
    }

    #[test]
    fn skips_geometry_behind_camera() {
        let mut renderer = Renderer::new(16, 16).unwrap();
        let camera = Camera::new(Vec3::new(0.0, 0.0, -20.0));
        let mesh = flat_mesh(0.0);
        let drawn = renderer.draw_mesh(&mesh, camera.view_proj_matrix(1.0), |_| [255, 0, 0]);
        assert_eq!(drawn, 0);
        assert!(renderer.pixels().iter().all(|&p| p == CLEAR_COLOR));
    }

    #[test]
    fn nearer_surface_wins() {
        let mut renderer = Renderer::new(16, 16).unwrap();
        let mut camera = Camera::new(Vec3::new(0.0, 10.0, 0.0));
        camera.look_at(Vec3::new(0.0, 0.0, 0.01));
        let view_proj = camera.view_proj_matrix(1.0);

        renderer.draw_mesh(&flat_mesh(3.0), view_proj, |_| [0, 200, 0]);
        renderer.draw_mesh(&flat_mesh(0.0), view_proj, |_| [200, 0, 0]);

        let [r, g, _] = renderer.pixel(8, 8);
        assert!(g > 0 && r == 0);
    }

    #[test]
    fn top_down_uses_layer_colours() {
        let map = HeightMap::from_samples(2, vec![-1.0, -1.0, 10.0, 10.0]).unwrap();
        let mut renderer = Renderer::new(4, 4).unwrap();
        renderer.draw_top_down(&map);

        let water = renderer.pixel(0, 0);
        let snow = renderer.pixel(0, 3);
        assert!(water[2] > water[0]);
        assert_eq!(snow, TerrainLayer::Snow.color());
    }
}
