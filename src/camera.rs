//! # Camera
//!
//! Produces the cube's [`TransformMatrix`] for a point in time.
//!
//! The projection is fixed when the camera is created: a right-handed perspective with a `[0, 1]`
//! depth range, built from [`CameraConfig`] and the output aspect ratio. The view is recomputed
//! per frame: translate by [`CameraConfig::eye_offset`], then rotate by
//! [`CameraConfig::rotation_angle`] radians about the axis `(sin t, cos t, 0)`, where `t` is the
//! wall-clock time in seconds.
//!
//! ```rust
//! use samples_core::{Camera, CUBE_CAMERA};
//!
//! let camera = Camera::new(CUBE_CAMERA, 640.0 / 480.0);
//! let axis = camera.rotation_axis(0.0);
//! assert_eq!((axis.x, axis.y, axis.z), (0.0, 1.0, 0.0));
//! ```

use nalgebra_glm as glm;

use crate::uniform_buffer::TransformMatrix;

/// Compile-time camera parameters of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view, in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Translation applied before the rotation.
    pub eye_offset: [f32; 3],
    /// Rotation about the time-dependent axis, in radians.
    pub rotation_angle: f32,
}

/// The rotating cube's camera: 72° vertical FOV, depth 1..100, four units back, one radian spin.
pub const CUBE_CAMERA: CameraConfig = CameraConfig {
    fov_y: 2.0 * std::f32::consts::PI / 5.0,
    near: 1.0,
    far: 100.0,
    eye_offset: [0.0, 0.0, -4.0],
    rotation_angle: 1.0,
};

/// A camera with its projection already computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    projection: glm::Mat4,
}

impl Camera {
    pub fn new(config: CameraConfig, aspect: f32) -> Self {
        let projection = glm::perspective_rh_zo(aspect, config.fov_y, config.near, config.far);
        Self { config, projection }
    }

    /// Creates a camera for a `width × height` output. Zero sides are treated as one.
    pub fn for_size(config: CameraConfig, width: u32, height: u32) -> Self {
        Self::new(config, width.max(1) as f32 / height.max(1) as f32)
    }

    pub fn projection(&self) -> &glm::Mat4 {
        &self.projection
    }

    /// The rotation axis at `seconds`. The trigonometry runs in `f64` so large timestamps keep
    /// their fractional part.
    pub fn rotation_axis(&self, seconds: f64) -> glm::Vec3 {
        glm::vec3(seconds.sin() as f32, seconds.cos() as f32, 0.0)
    }

    pub fn view(&self, seconds: f64) -> glm::Mat4 {
        let offset = glm::make_vec3(&self.config.eye_offset);
        let translated = glm::translate(&glm::Mat4::identity(), &offset);
        glm::rotate(
            &translated,
            self.config.rotation_angle,
            &self.rotation_axis(seconds),
        )
    }

    /// `projection × view` at `seconds`.
    pub fn transform(&self, seconds: f64) -> TransformMatrix {
        TransformMatrix::new(self.projection * self.view(seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, TAU};

    const EPSILON: f32 = 1e-5;

    fn camera() -> Camera {
        Camera::for_size(CUBE_CAMERA, 640, 480)
    }

    #[test]
    fn axis_follows_the_clock() {
        let camera = camera();

        let start = camera.rotation_axis(0.0);
        assert!((start - glm::vec3(0.0, 1.0, 0.0)).norm() < EPSILON);

        let quarter = camera.rotation_axis(FRAC_PI_2);
        assert!((quarter - glm::vec3(1.0, 0.0, 0.0)).norm() < EPSILON);
    }

    #[test]
    fn axis_is_periodic() {
        let camera = camera();
        for t in [0.25, 1.0, 3.5, 1_700_000_000.0] {
            let a = camera.rotation_axis(t);
            let b = camera.rotation_axis(t + TAU);
            assert!((a - b).norm() < 1e-4, "axis at {t} differs after one period");
        }
    }

    #[test]
    fn transform_is_projection_times_view() {
        let camera = camera();
        let t: f64 = 12.75;
        let expected = glm::perspective_rh_zo(640.0 / 480.0, CUBE_CAMERA.fov_y, 1.0, 100.0)
            * glm::rotate(
                &glm::translate(&glm::Mat4::identity(), &glm::vec3(0.0, 0.0, -4.0)),
                1.0,
                &glm::vec3(t.sin() as f32, t.cos() as f32, 0.0),
            );

        let actual = camera.transform(t).matrix;
        assert!((actual - expected).abs().max() < EPSILON);
    }

    #[test]
    fn view_rotation_is_orthonormal_without_skew() {
        let camera = camera();
        for t in [0.0, 0.4, FRAC_PI_2, 42.0] {
            let view = camera.view(t);
            let rotation: glm::Mat3 = view.fixed_view::<3, 3>(0, 0).into_owned();

            let gram = rotation.transpose() * rotation;
            assert!((gram - glm::Mat3::identity()).abs().max() < EPSILON);
            assert!((rotation.determinant() - 1.0).abs() < EPSILON);

            let translation = view.fixed_view::<3, 1>(0, 3).into_owned();
            assert!((translation - glm::vec3(0.0, 0.0, -4.0)).norm() < EPSILON);
        }
    }

    #[test]
    fn quarter_period_changes_view_but_not_projection() {
        let camera = camera();

        let views = [camera.view(0.0), camera.view(FRAC_PI_2)];
        assert!((views[0] - views[1]).abs().max() > 0.1);
        assert_ne!(camera.transform(0.0), camera.transform(FRAC_PI_2));

        for (t, view) in [0.0, FRAC_PI_2].into_iter().zip(views) {
            let inverse = view.try_inverse().unwrap();
            let recovered = camera.transform(t).matrix * inverse;
            assert!(
                (recovered - camera.projection()).abs().max() < 1e-4,
                "projection recovered at {t} differs"
            );
        }
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let camera = Camera::for_size(CUBE_CAMERA, 640, 0);
        assert!(camera.projection().iter().all(|value| value.is_finite()));
    }

    #[test]
    fn zero_width_gives_a_finite_projection() {
        let camera = Camera::for_size(CUBE_CAMERA, 0, 480);
        assert!(camera.projection().iter().all(|value| value.is_finite()));
        assert_eq!(camera, Camera::for_size(CUBE_CAMERA, 1, 480));
    }
}
