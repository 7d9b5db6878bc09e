use glam::{Mat3, Mat4, Vec3};

use crate::world_gen::HeightMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub world_up: Vec3,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
    yaw: f32,
    pitch: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
            near: 0.1,
            far: 100.0,
            yaw: -90.0, // Looking down -Z
            pitch: 0.0,
        };
        camera.update_vectors();
        camera
    }

    /// Places the camera beyond the map's near corner, above its highest
    /// point, looking across the terrain towards its centre.
    pub fn overlooking(map: &HeightMap, origin: Vec3) -> Self {
        let size = map.size() as f32;
        let center = origin + Vec3::new(size / 2.0, 0.0, size / 2.0);
        let position = origin + Vec3::new(-size * 0.15, map.max() + size * 0.35, -size * 0.15);

        let mut camera = Self::new(position);
        camera.look_at(center);
        camera.far = camera.far.max(size * 4.0);
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = dir.z.atan2(dir.x).to_degrees();
        self.pitch = dir.y.asin().to_degrees().clamp(-89.0, 89.0);
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_proj_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// View matrix with the translation removed, for drawing a skybox that
    /// stays centred on the viewer.
    pub fn skybox_view_matrix(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.view_matrix()))
    }

    /// Projection times [`Camera::skybox_view_matrix`].
    pub fn skybox_view_proj_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.skybox_view_matrix()
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.forward * velocity,
            CameraMovement::Backward => self.position -= self.forward * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
            CameraMovement::Up => self.position += self.world_up * velocity,
            CameraMovement::Down => self.position -= self.world_up * velocity,
        }
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-89.0, 89.0);
        }
        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(1.0, 45.0);
    }

    fn update_vectors(&mut self) {
        let pitch_rad = self.pitch.to_radians();
        let yaw_rad = self.yaw.to_radians();

        self.forward = Vec3::new(
            yaw_rad.cos() * pitch_rad.cos(),
            pitch_rad.sin(),
            yaw_rad.sin() * pitch_rad.cos(),
        )
        .normalize();

        self.right = self.forward.cross(self.world_up).normalize();
        self.up = self.right.cross(self.forward).normalize();
    }
}

/// Turns absolute cursor positions into per-event offsets.
///
/// The first position only primes the tracker. Y is flipped because screen
/// coordinates grow downwards.
#[derive(Debug, Default)]
pub struct MouseLook {
    last: Option<(f32, f32)>,
}

impl MouseLook {
    pub fn offset(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        let offset = self.last.map(|(last_x, last_y)| (x - last_x, last_y - y));
        self.last = Some((x, y));
        offset
    }
}
