//! Viewer camera used to turn screen points into world rays

use crate::core::types::{Mat4, Quat, Vec2, Vec3};
use crate::math::Ray;

/// Camera with position, rotation, and projection parameters
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near: 0.01,
            far: 100.0,
        }
    }

    /// Create camera looking at a target
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        let rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));

        Self {
            rotation,
            ..Self::new(position, 60.0, 9.0 / 19.5)
        }
    }

    /// World to camera space
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position);
        rotation_matrix * translation_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection_inverse(&self) -> Mat4 {
        (self.projection_matrix() * self.view_matrix()).inverse()
    }

    /// Forward direction (negative Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// World ray through a normalized screen point (`[0, 1]²`, origin
    /// top-left).
    pub fn screen_ray(&self, screen: Vec2) -> Ray {
        let ndc_x = screen.x * 2.0 - 1.0;
        let ndc_y = 1.0 - screen.y * 2.0;
        let inv = self.view_projection_inverse();
        // glam's perspective_rh maps depth to [0, 1]
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        Ray::new(near, (far - near).normalize())
    }
}

impl Default for Camera {
    /// Eye height looking slightly down, like a handheld device.
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 1.5, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
    }
}
