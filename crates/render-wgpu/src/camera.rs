use glam::{Mat4, Vec3};

/// Camera locked to the player's eye. Pose is copied from the session each
/// frame; the camera never moves itself.
#[derive(Debug, Clone, Copy)]
pub struct FirstPersonCamera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.1, 0.0),
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.05,
            far: 500.0,
        }
    }
}

impl FirstPersonCamera {
    pub fn set_pose(&mut self, eye: Vec3, yaw: f32, pitch: f32) {
        self.eye = eye;
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let cam = FirstPersonCamera::default();
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert!(!cam.view_projection().col(0).x.is_nan());
    }

    #[test]
    fn point_ahead_projects_to_screen_centre() {
        let mut cam = FirstPersonCamera::default();
        cam.set_pose(Vec3::new(1.0, 2.0, 3.0), 0.0, 0.0);
        let ahead = cam.eye + cam.forward() * 10.0;
        let clip = cam.view_projection() * ahead.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut cam = FirstPersonCamera::default();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(0, 0);
        assert_eq!(cam.aspect, 1.0);
    }
}
