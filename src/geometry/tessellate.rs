use std::f64::consts::TAU;

use crate::geometry::surface::{SurfaceParams, surface_point};

/// Default parameter-domain step of the tessellation walk.
pub const DEFAULT_STEP: f64 = 0.1;

/// Triangle-list surface geometry with an index-aligned UV set: vertex k of
/// `positions` (xyz triples) maps to pair k of `uvs`.
pub struct SurfaceMesh {
    pub positions: Vec<f32>,
    pub uvs: Vec<f32>,
}

impl SurfaceMesh {
    pub fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }
}

/// Linearly rescales `val` from `[from_lo, from_hi]` to `[to_lo, to_hi]`
/// and clamps the result into the target range.
pub fn map_linear(val: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    let m = (val - from_lo) * (to_hi - to_lo) / (from_hi - from_lo) + to_lo;
    m.clamp(to_lo, to_hi)
}

// Cell corner order shared by the position and UV walks: two triangles,
// (00, 10, 01) and (10, 11, 01).
fn cell_corners(i: f64, j: f64, step: f64) -> [(f64, f64); 6] {
    [
        (i, j),
        (i + step, j),
        (i, j + step),
        (i + step, j),
        (i + step, j + step),
        (i, j + step),
    ]
}

/// Walks `[0, 2π]²` by repeated addition of `step` (the inclusive
/// accumulated bound is intentional: the drift of the final row/column is
/// part of the rendered shape) and emits six independent vertices per cell.
/// No index buffer, no vertex sharing between neighbouring cells.
pub fn tessellate_positions(params: &SurfaceParams, step: f64) -> Vec<f32> {
    let mut positions = Vec::new();
    let mut i = 0.0;
    while i <= TAU {
        let mut j = 0.0;
        while j <= TAU {
            for (ci, cj) in cell_corners(i, j, step) {
                let p = surface_point(params, ci, cj);
                positions.extend([p.x as f32, p.y as f32, p.z as f32]);
            }
            j += step;
        }
        i += step;
    }
    positions
}

/// UV walk in exact lockstep with [`tessellate_positions`]: same loop
/// bounds, same corners, same emission order. Coordinates are the cell
/// corner parameters rescaled into [0, 1] and clamped.
pub fn tessellate_uvs(step: f64) -> Vec<f32> {
    let mut uvs = Vec::new();
    let mut i = 0.0;
    while i <= TAU {
        let mut j = 0.0;
        while j <= TAU {
            for (ci, cj) in cell_corners(i, j, step) {
                uvs.push(map_linear(ci, 0.0, TAU, 0.0, 1.0) as f32);
                uvs.push(map_linear(cj, 0.0, TAU, 0.0, 1.0) as f32);
            }
            j += step;
        }
        i += step;
    }
    uvs
}

pub fn tessellate(params: &SurfaceParams, step: f64) -> SurfaceMesh {
    SurfaceMesh {
        positions: tessellate_positions(params, step),
        uvs: tessellate_uvs(step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reproduces the accumulation loop so the tests agree with the walk
    // even where floating-point drift trims the last row.
    fn visited_cells(step: f64) -> usize {
        let mut count = 0;
        let mut i = 0.0;
        while i <= TAU {
            let mut j = 0.0;
            while j <= TAU {
                count += 1;
                j += step;
            }
            i += step;
        }
        count
    }

    #[test]
    fn test_six_vertices_per_cell() {
        for step in [0.1, 0.25, 1.0] {
            let positions = tessellate_positions(&SurfaceParams::default(), step);
            assert_eq!(positions.len(), visited_cells(step) * 6 * 3);
            assert_eq!(positions.len() % 9, 0, "not a whole number of triangles");
        }
    }

    #[test]
    fn test_uvs_align_with_vertices() {
        let mesh = tessellate(&SurfaceParams::default(), 0.1);
        assert_eq!(mesh.uvs.len() / 2, mesh.positions.len() / 3);
    }

    #[test]
    fn test_uvs_stay_normalized() {
        let uvs = tessellate_uvs(0.1);
        assert!(uvs.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_first_vertex_matches_surface_point() {
        let params = SurfaceParams::default();
        let positions = tessellate_positions(&params, 0.1);
        let p = surface_point(&params, 0.0, 0.0);
        assert!((positions[0] - p.x as f32).abs() < 1e-7);
        assert!((positions[0] - 0.15).abs() < 1e-6);
        assert!(positions[1].abs() < 1e-6);
        assert!(positions[2].abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let params = SurfaceParams::default();
        assert_eq!(
            tessellate_positions(&params, 0.1),
            tessellate_positions(&params, 0.1)
        );
        assert_eq!(tessellate_uvs(0.1), tessellate_uvs(0.1));
    }

    #[test]
    fn test_map_linear_clamps() {
        assert_eq!(map_linear(TAU + 1.0, 0.0, TAU, 0.0, 1.0), 1.0);
        assert_eq!(map_linear(-1.0, 0.0, TAU, 0.0, 1.0), 0.0);
        assert!((map_linear(TAU / 2.0, 0.0, TAU, 0.0, 1.0) - 0.5).abs() < 1e-12);
    }
}
