use std::f64::consts::{PI, TAU};

use glam::DVec3;

/// Latitude/longitude sphere emitted as pairs of points on adjacent
/// parallels, one pair per slice boundary, meant for line/strip drawing.
/// Every coordinate is translated by `offset`; the marker passes a zero
/// offset and is placed through a per-frame uniform instead.
pub fn generate_sphere(radius: f64, slices: u32, stacks: u32, offset: DVec3) -> Vec<f32> {
    let mut vertices = Vec::with_capacity((stacks * (slices + 1) * 2 * 3) as usize);

    for stack in 0..stacks {
        let theta0 = PI * stack as f64 / stacks as f64;
        let theta1 = PI * (stack + 1) as f64 / stacks as f64;

        for slice in 0..=slices {
            let phi = TAU * slice as f64 / slices as f64;
            for theta in [theta0, theta1] {
                let p = offset
                    + DVec3::new(
                        radius * theta.sin() * phi.cos(),
                        radius * theta.cos(),
                        radius * theta.sin() * phi.sin(),
                    );
                vertices.extend([p.x as f32, p.y as f32, p.z as f32]);
            }
        }
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_per_slice_boundary() {
        let verts = generate_sphere(1.0, 24, 12, DVec3::ZERO);
        assert_eq!(verts.len(), 12 * 25 * 2 * 3);
    }

    #[test]
    fn test_points_lie_on_sphere() {
        let offset = DVec3::new(0.5, -1.0, 2.0);
        let radius = 0.05;
        let verts = generate_sphere(radius, 16, 8, offset);
        for v in verts.chunks_exact(3) {
            let p = DVec3::new(v[0] as f64, v[1] as f64, v[2] as f64);
            assert!(
                ((p - offset).length() - radius).abs() < 1e-6,
                "vertex {p} off the sphere"
            );
        }
    }
}
