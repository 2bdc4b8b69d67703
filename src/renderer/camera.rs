use glam::{Mat4, Vec2, Vec3, Vec4};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

/// Rejected camera configurations. Checked before any frustum matrix is
/// built: each of these would divide by zero or invert the viewing volume.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum CameraError {
    #[error("convergence distance must be positive, got {0}")]
    Convergence(f32),
    #[error("near plane must be positive, got {0}")]
    NearPlane(f32),
    #[error("far plane {far} must lie beyond near plane {near}")]
    FarPlane { near: f32, far: f32 },
}

/// Horizontal/vertical extents of one eye's viewing volume at the near
/// plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrustumBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

/// Off-axis stereo camera. One configuration yields two asymmetric frusta
/// whose images align at the convergence depth; with a zero eye separation
/// both eyes collapse to the same matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereoCamera {
    pub eye_separation: f32,
    pub convergence: f32,
    pub aspect: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for StereoCamera {
    fn default() -> Self {
        Self {
            eye_separation: 0.06,
            convergence: 10.0,
            aspect: 1.0,
            fov: std::f32::consts::FRAC_PI_8,
            near: 8.0,
            far: 12.0,
        }
    }
}

impl StereoCamera {
    fn validate(&self) -> Result<(), CameraError> {
        if self.convergence <= 0.0 {
            return Err(CameraError::Convergence(self.convergence));
        }
        if self.near <= 0.0 {
            return Err(CameraError::NearPlane(self.near));
        }
        if self.far <= self.near {
            return Err(CameraError::FarPlane {
                near: self.near,
                far: self.far,
            });
        }
        Ok(())
    }

    /// Near-plane extents of the asymmetric frustum for one eye.
    pub fn frustum_bounds(&self, eye: Eye) -> Result<FrustumBounds, CameraError> {
        self.validate()?;

        let half = (self.fov * 0.5).tan();
        let top = self.near * half;
        let a = self.aspect * half * self.convergence;
        let b = a - self.eye_separation * 0.5;
        let c = a + self.eye_separation * 0.5;
        let n = self.near / self.convergence;

        let (left, right) = match eye {
            Eye::Left => (-b * n, c * n),
            Eye::Right => (-c * n, b * n),
        };

        Ok(FrustumBounds {
            left,
            right,
            bottom: -top,
            top,
        })
    }

    /// Off-axis projection matrix for one eye.
    pub fn frustum(&self, eye: Eye) -> Result<Mat4, CameraError> {
        let b = self.frustum_bounds(eye)?;
        Ok(frustum_rh(
            b.left, b.right, b.bottom, b.top, self.near, self.far,
        ))
    }

    /// Symmetric on-axis projection for the non-stereo display mode.
    pub fn perspective(&self) -> Result<Mat4, CameraError> {
        self.validate()?;
        Ok(Mat4::perspective_rh(
            self.fov, self.aspect, self.near, self.far,
        ))
    }
}

// Right-handed frustum with [0, 1] clip-space depth, column-major, matching
// glam's perspective_rh for symmetric extents.
fn frustum_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rl = 1.0 / (right - left);
    let tb = 1.0 / (top - bottom);
    let nf = 1.0 / (near - far);
    Mat4::from_cols(
        Vec4::new(2.0 * near * rl, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * tb, 0.0, 0.0),
        Vec4::new((right + left) * rl, (top + bottom) * tb, far * nf, -1.0),
        Vec4::new(0.0, 0.0, near * far * nf, 0.0),
    )
}

// Fixed scene reorientation and depth offset applied between the
// interactive rotation and the projection.
const REORIENT_AXIS: Vec3 = Vec3::new(0.707, 0.707, 0.0);
const REORIENT_ANGLE: f32 = 0.7;
const VIEW_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -10.0);

fn accumulated(rotation: Mat4) -> Mat4 {
    Mat4::from_translation(VIEW_OFFSET)
        * Mat4::from_axis_angle(REORIENT_AXIS.normalize(), REORIENT_ANGLE)
        * rotation
}

/// Model-view-projection for the main scene:
/// `projection × translate × reorient × rotation`. Recomputed every frame.
pub fn compose(rotation: Mat4, projection: Mat4) -> Mat4 {
    projection * accumulated(rotation)
}

/// MVP for a secondary object carrying its own rotation, chained between
/// the accumulated view transform and the projection.
pub fn compose_object(rotation: Mat4, object_rotation: Mat4, projection: Mat4) -> Mat4 {
    projection * object_rotation * accumulated(rotation)
}

/// Three axis angles (radians) combined into one rotation matrix, the
/// desktop stand-in for a device-orientation reading.
pub fn orientation_matrix(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_rotation_x(x) * Mat4::from_rotation_y(y) * Mat4::from_rotation_z(z)
}

/// Pointer-drag orbit rotation feeding the composer.
pub struct Trackball {
    yaw: f32,
    pitch: f32,
    pub sensitivity: f32,
}

impl Default for Trackball {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: 0.008,
        }
    }
}

impl Trackball {
    pub fn drag(&mut self, delta: Vec2) {
        let max_pitch = std::f32::consts::FRAC_PI_2;
        self.yaw += delta.x * self.sensitivity;
        self.pitch = (self.pitch + delta.y * self.sensitivity).clamp(-max_pitch, max_pitch);
    }

    pub fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.pitch) * Mat4::from_rotation_y(self.yaw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> StereoCamera {
        StereoCamera {
            eye_separation: 0.05,
            convergence: 1.0,
            aspect: 1.0,
            fov: 100f32.to_radians(),
            near: 4.0,
            far: 20.0,
        }
    }

    #[test]
    fn test_default_configuration_is_valid() {
        let camera = StereoCamera::default();
        assert!(camera.frustum(Eye::Left).is_ok());
        assert!(camera.frustum(Eye::Right).is_ok());
        assert!(camera.perspective().is_ok());
    }

    #[test]
    fn test_zero_separation_collapses_eyes() {
        let camera = StereoCamera {
            eye_separation: 0.0,
            ..test_camera()
        };
        let left = camera.frustum(Eye::Left).unwrap();
        let right = camera.frustum(Eye::Right).unwrap();
        assert_eq!(left.to_cols_array(), right.to_cols_array());
    }

    #[test]
    fn test_eye_bounds_are_antisymmetric() {
        let camera = test_camera();
        let left = camera.frustum_bounds(Eye::Left).unwrap();
        let right = camera.frustum_bounds(Eye::Right).unwrap();
        assert_eq!(right.left, -left.right);
        assert_eq!(right.right, -left.left);
        assert_eq!(left.top, right.top);
        assert_eq!(left.bottom, -left.top);
    }

    #[test]
    fn test_negated_separation_mirrors_eyes() {
        let camera = test_camera();
        let mirrored = StereoCamera {
            eye_separation: -camera.eye_separation,
            ..camera
        };
        assert_eq!(
            camera.frustum_bounds(Eye::Left).unwrap(),
            mirrored.frustum_bounds(Eye::Right).unwrap()
        );
    }

    #[test]
    fn test_invalid_configurations_rejected() {
        let base = test_camera();

        let bad = StereoCamera {
            convergence: 0.0,
            ..base
        };
        assert_eq!(bad.frustum(Eye::Left), Err(CameraError::Convergence(0.0)));

        let bad = StereoCamera { near: 0.0, ..base };
        assert_eq!(bad.frustum(Eye::Right), Err(CameraError::NearPlane(0.0)));

        let bad = StereoCamera {
            near: 4.0,
            far: 4.0,
            ..base
        };
        assert_eq!(
            bad.perspective(),
            Err(CameraError::FarPlane {
                near: 4.0,
                far: 4.0
            })
        );
    }

    #[test]
    fn test_symmetric_frustum_matches_perspective() {
        let camera = StereoCamera {
            eye_separation: 0.0,
            ..test_camera()
        };
        let frustum = camera.frustum(Eye::Left).unwrap();
        let perspective = camera.perspective().unwrap();
        for (a, b) in frustum
            .to_cols_array()
            .iter()
            .zip(perspective.to_cols_array())
        {
            assert!((a - b).abs() < 1e-6, "{frustum:?} vs {perspective:?}");
        }
    }

    #[test]
    fn test_compose_places_scene_at_depth() {
        // With identity rotation and projection the origin lands at the
        // fixed view offset.
        let m = compose(Mat4::IDENTITY, Mat4::IDENTITY);
        let p = m.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-6);
    }

    #[test]
    fn test_compose_object_with_identity_matches_compose() {
        let rotation = Mat4::from_rotation_y(0.4);
        let projection = test_camera().perspective().unwrap();
        let plain = compose(rotation, projection);
        let chained = compose_object(rotation, Mat4::IDENTITY, projection);
        assert_eq!(plain.to_cols_array(), chained.to_cols_array());
    }

    #[test]
    fn test_trackball_starts_at_identity() {
        let ball = Trackball::default();
        assert_eq!(ball.matrix(), Mat4::IDENTITY);
    }
}
