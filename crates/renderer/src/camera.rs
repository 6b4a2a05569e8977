//! Chase camera that trails a moving anchor (the plane).

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

/// Fixed X tilt applied to the skybox so the cubemap horizon lines up with the ground.
pub const SKYBOX_TILT_DEGREES: f32 = -6.5;

/// Where the camera sits relative to the anchor, in the anchor's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseRig {
    pub eye_offset: Vec3,
    pub target_offset: Vec3,
}

impl Default for ChaseRig {
    fn default() -> Self {
        Self {
            eye_offset: Vec3::new(-3.0, 0.5, 0.0),
            target_offset: Vec3::new(2.0, 0.0, 0.0),
        }
    }
}

/// Perspective look-at camera.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, -3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Place the camera behind `anchor` (a world transform) using the rig offsets.
    pub fn follow(&mut self, anchor: Mat4, rig: &ChaseRig) {
        self.eye = anchor.transform_point3(rig.eye_offset);
        self.target = anchor.transform_point3(rig.target_offset);
        self.up = Vec3::Y;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// View rotation with translation removed and the skybox tilt applied.
    pub fn sky_view_matrix(&self) -> Mat4 {
        let rotation = Mat4::from_mat3(Mat3::from_mat4(self.view_matrix()));
        Mat4::from_rotation_x(SKYBOX_TILT_DEGREES.to_radians()) * rotation
    }
}

/// Per-frame shader constants (must match `FrameUniform` in the WGSL sources).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniform {
    pub view: [[f32; 4]; 4],
    pub inv_view: [[f32; 4]; 4],
    /// Maps clip-space points on the far plane to skybox directions.
    pub sky_inv_view_proj: [[f32; 4]; 4],
    /// x = width, y = height, z = horizon height in pixels from the bottom.
    pub viewport: [f32; 4],
    pub ground_color: [f32; 4],
    pub sky_color: [f32; 4],
}

impl FrameUniform {
    pub fn new() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            inv_view: Mat4::IDENTITY.to_cols_array_2d(),
            sky_inv_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            viewport: [1.0, 1.0, 0.0, 0.0],
            ground_color: [0.0, 0.0, 0.0, 1.0],
            sky_color: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn update(&mut self, camera: &Camera, width: u32, height: u32) {
        let view = camera.view_matrix();
        self.view = view.to_cols_array_2d();
        self.inv_view = view.inverse().to_cols_array_2d();
        self.sky_inv_view_proj = (camera.projection_matrix() * camera.sky_view_matrix())
            .inverse()
            .to_cols_array_2d();
        self.viewport[0] = width as f32;
        self.viewport[1] = height as f32;
    }
}

impl Default for FrameUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn plane_anchor(position: Vec3, angle: f32) -> Mat4 {
        Mat4::from_translation(position) * Mat4::from_rotation_y(-FRAC_PI_2 + angle)
    }

    #[test]
    fn chase_camera_sits_behind_and_above() {
        let mut camera = Camera::default();
        let pos = Vec3::new(0.0, -0.5, 0.0);
        camera.follow(plane_anchor(pos, 0.0), &ChaseRig::default());
        // Heading 0 flies along +Z.
        assert!((camera.eye - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-5, "{:?}", camera.eye);
        assert!(camera.eye.y > pos.y);
        assert!((camera.target - Vec3::new(0.0, -0.5, 2.0)).length() < 1e-5);
    }

    #[test]
    fn chase_camera_turns_with_heading() {
        let mut camera = Camera::default();
        camera.follow(plane_anchor(Vec3::ZERO, FRAC_PI_2), &ChaseRig::default());
        // Heading pi/2 flies along +X, so the camera trails on -X.
        assert!((camera.eye - Vec3::new(-3.0, 0.5, 0.0)).length() < 1e-5, "{:?}", camera.eye);
        assert!(camera.target.x > 0.0);
    }

    #[test]
    fn sky_view_ignores_translation() {
        let mut a = Camera::default();
        a.follow(plane_anchor(Vec3::ZERO, 0.3), &ChaseRig::default());
        let mut b = a.clone();
        b.follow(plane_anchor(Vec3::new(50.0, 2.0, -20.0), 0.3), &ChaseRig::default());
        let diff = a.sky_view_matrix() - b.sky_view_matrix();
        assert!(diff.to_cols_array().iter().all(|v| v.abs() < 1e-4));
        assert_eq!(a.sky_view_matrix().w_axis.truncate(), Vec3::ZERO);
    }

    #[test]
    fn uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
    }
}
