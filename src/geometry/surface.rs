use glam::DVec3;

/// Shape constants of the surface family plus the uniform scale applied to
/// all three axes. The two original rendering variants hardcoded different
/// scales (0.05 plain, 0.2 anaglyph); here it is a single field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub scale: f64,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            a: 1.5,
            b: 3.0,
            c: 2.0,
            d: 4.0,
            scale: 0.05,
        }
    }
}

impl SurfaceParams {
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}

// a,b > 0 keeps the root away from zero analytically; the max() guards
// rounding at the domain boundary.
fn profile(a: f64, b: f64, j: f64) -> f64 {
    let root = (a * a * j.sin().powi(2) + b * b * j.cos().powi(2)).sqrt();
    (a * b) / root.max(f64::EPSILON)
}

/// Evaluates the surface at parameter `(i, j)`. Pure function; the domain
/// convention ([0, 2π] here, [-π, π] elsewhere) is the caller's choice.
pub fn surface_point(params: &SurfaceParams, i: f64, j: f64) -> DVec3 {
    let SurfaceParams { a, b, c, d, scale } = *params;
    let f = profile(a, b, j);
    let dc = d * d - c * c;
    let radial = f * (1.0 + i.cos() + dc * (1.0 - i.cos()) / f);

    DVec3::new(
        scale * radial * j.cos(),
        scale * radial * j.sin(),
        scale * (f - dc / f) * i.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_point_at_origin() {
        // f(1.5, 3, 0) = 4.5/3 = 1.5, so x = 0.05 * 1.5 * (1 + 1 + 0) = 0.15
        let p = surface_point(&SurfaceParams::default(), 0.0, 0.0);
        assert!((p.x - 0.15).abs() < 1e-12, "expected x ~ 0.15, got {}", p.x);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_scale_is_uniform() {
        let base = surface_point(&SurfaceParams::default(), 1.3, 2.1);
        let scaled = surface_point(&SurfaceParams::with_scale(0.2), 1.3, 2.1);
        assert!((scaled - base * 4.0).length() < 1e-12);
    }

    #[test]
    fn test_planar_at_zero_i() {
        // sin(i) = 0 at i = 0, so the whole j ring lies in the z = 0 plane.
        let params = SurfaceParams::default();
        let mut j = 0.0;
        while j <= TAU {
            assert!(surface_point(&params, 0.0, j).z.abs() < 1e-12);
            j += 0.25;
        }
    }

    #[test]
    fn test_continuity() {
        // Small parameter steps must produce small position changes across
        // the whole domain (no singularities inside [0, 2π]²).
        let params = SurfaceParams::default();
        let eps = 1e-5;
        let mut i = 0.0;
        while i <= TAU {
            let mut j = 0.0;
            while j <= TAU {
                let p = surface_point(&params, i, j);
                let di = surface_point(&params, i + eps, j);
                let dj = surface_point(&params, i, j + eps);
                assert!((di - p).length() < 1e-3, "jump in i at ({i}, {j})");
                assert!((dj - p).length() < 1e-3, "jump in j at ({i}, {j})");
                j += PI / 16.0;
            }
            i += PI / 16.0;
        }
    }
}
