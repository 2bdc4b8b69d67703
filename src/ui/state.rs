use crate::geometry::tessellate::DEFAULT_STEP;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Plain,
    Anaglyph,
}

/// Slider- and toggle-backed configuration. Every field is overwritten
/// whole by its control, so the render loop reads a consistent snapshot.
pub struct UiState {
    pub display_mode: DisplayMode,

    pub eye_separation: f32,
    pub convergence: f32,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,

    pub scale: f32,
    pub step: f32,
    pub mesh_needs_rebuild: bool,

    pub show_marker: bool,
    pub orientation_enabled: bool,
    /// Simulated device-orientation axis angles, degrees.
    pub orientation_deg: [f32; 3],

    pub vsync_enabled: bool,
    pub show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Plain,

            eye_separation: 0.06,
            convergence: 10.0,
            fov_deg: 22.5,
            near: 8.0,
            far: 12.0,

            scale: 0.05,
            step: DEFAULT_STEP as f32,
            mesh_needs_rebuild: true,

            show_marker: true,
            orientation_enabled: false,
            orientation_deg: [0.0; 3],

            vsync_enabled: true,
            show_help: true,
        }
    }
}

/// Pointer/keyboard-driven state, mutated only by event handlers and read
/// once per composed frame.
pub struct Interaction {
    /// Marker position in the texture/parameter domain, each component
    /// wrapped into [0, 1).
    pub marker_coord: (f64, f64),
    /// Texture rotation angle in radians, driven by the horizontal pointer
    /// position.
    pub texture_angle: f32,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            marker_coord: (0.1, 0.1),
            texture_angle: 0.0,
        }
    }
}

impl Interaction {
    pub fn nudge_marker(&mut self, dx: f64, dy: f64) {
        self.marker_coord.0 = wrap_unit(self.marker_coord.0 + dx);
        self.marker_coord.1 = wrap_unit(self.marker_coord.1 + dy);
    }
}

fn wrap_unit(v: f64) -> f64 {
    (v % 1.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_key_steps() {
        // Five -0.01 steps from 0.1 land on 0.05 without wrapping.
        let mut interaction = Interaction::default();
        for _ in 0..5 {
            interaction.nudge_marker(-0.01, 0.0);
        }
        assert!((interaction.marker_coord.0 - 0.05).abs() < 1e-9);
        assert!((interaction.marker_coord.1 - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_marker_wraps_into_unit_interval() {
        let mut interaction = Interaction::default();
        interaction.marker_coord = (0.005, 0.995);
        interaction.nudge_marker(-0.01, 0.01);
        assert!((interaction.marker_coord.0 - 0.005).abs() < 1e-9);
        assert!((interaction.marker_coord.1 - 0.005).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_unit() {
        assert!((wrap_unit(1.25) - 0.25).abs() < 1e-12);
        assert!((wrap_unit(-0.25) - 0.25).abs() < 1e-12);
        assert_eq!(wrap_unit(0.0), 0.0);
    }
}
