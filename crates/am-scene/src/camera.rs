use glam::{Mat4, Vec3};

/// Perspective camera fixed on the quad: 45° vertical field of view,
/// near 1, far 1000, positioned at z = 30 looking at the origin.
///
/// Only the aspect ratio changes over the instance lifetime (on resize).
///
/// # Example
/// ```
/// use am_scene::camera::PerspectiveCamera;
/// let mut cam = PerspectiveCamera::new(16.0 / 9.0);
/// cam.set_aspect(1.0);
/// let vp = cam.view_projection();
/// // The origin projects to the center of the screen.
/// let clip = vp * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
/// assert!((clip.x / clip.w).abs() < 1e-6);
/// assert!((clip.y / clip.w).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PerspectiveCamera {
    fov_y_radians: f32,
    aspect: f32,
    near: f32,
    far: f32,
    position: Vec3,
}

impl PerspectiveCamera {
    /// Camera with the effect's fixed parameters and the given aspect.
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y_radians: 45.0_f32.to_radians(),
            aspect: aspect.max(f32::EPSILON),
            near: 1.0,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 30.0),
        }
    }

    /// Update the aspect ratio (the cheap resize path).
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect.max(f32::EPSILON);
    }

    /// Current aspect ratio.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y_radians, self.aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn points_in_front_project_with_positive_w() {
        let cam = PerspectiveCamera::new(1.5);
        let clip = cam.view_projection() * Vec4::new(2.0, 1.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
    }

    #[test]
    fn aspect_scales_horizontal_extent() {
        let narrow = PerspectiveCamera::new(1.0);
        let wide = PerspectiveCamera::new(2.0);
        let p = Vec4::new(5.0, 0.0, 0.0, 1.0);
        let a = narrow.view_projection() * p;
        let b = wide.view_projection() * p;
        assert!((a.x / a.w).abs() > (b.x / b.w).abs());
    }

    #[test]
    fn zero_aspect_is_guarded() {
        let mut cam = PerspectiveCamera::new(0.0);
        cam.set_aspect(0.0);
        assert!(cam.aspect() > 0.0);
    }
}
