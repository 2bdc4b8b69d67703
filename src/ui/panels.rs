use egui::{Color32, Context, RichText, ScrollArea, Ui};

use crate::ui::state::{DisplayMode, Interaction, UiState};
use crate::ui::theme::*;

#[derive(Default)]
pub struct UiActions {
    pub rebuild_mesh: bool,
    pub reset_view: bool,
    pub open_texture: bool,
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    texture_error: &Option<String>,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(300.0)
        .max_width(380.0)
        .default_width(320.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("surf3d").strong());
                ui.add_space(4.0);
                ui.label(
                    RichText::new("Parametric surface viewer")
                        .color(TEXT_MUTED)
                        .size(11.0),
                );
                ui.add_space(16.0);

                section_header(ui, "DISPLAY");
                ui.horizontal(|ui| {
                    mode_button(ui, state, DisplayMode::Plain, "Plain");
                    mode_button(ui, state, DisplayMode::Anaglyph, "Anaglyph");
                });
                ui.add_space(16.0);
                ui.separator();
                ui.add_space(12.0);

                section_header(ui, "CAMERA");
                ui.horizontal(|ui| {
                    ui.label("FOV:");
                    ui.add(egui::Slider::new(&mut state.fov_deg, 5.0..=120.0).suffix("\u{b0}"));
                });
                ui.horizontal(|ui| {
                    ui.label("Near:");
                    ui.add(egui::Slider::new(&mut state.near, 1.0..=10.0));
                });
                ui.horizontal(|ui| {
                    ui.label("Far:");
                    ui.add(egui::Slider::new(&mut state.far, 10.5..=40.0));
                });

                if state.display_mode == DisplayMode::Anaglyph {
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        ui.label("Eye sep:");
                        ui.add(egui::Slider::new(&mut state.eye_separation, 0.0..=0.5));
                    });
                    ui.horizontal(|ui| {
                        ui.label("Convergence:");
                        ui.add(egui::Slider::new(&mut state.convergence, 0.5..=30.0));
                    });
                }

                if ui.button("Reset view").clicked() {
                    actions.reset_view = true;
                }
                ui.add_space(16.0);

                section_header(ui, "SURFACE");
                let mut changed = false;
                ui.horizontal(|ui| {
                    ui.label("Scale:");
                    changed |= ui
                        .add(egui::Slider::new(&mut state.scale, 0.01..=0.3))
                        .changed();
                });
                ui.horizontal(|ui| {
                    ui.label("Step:");
                    changed |= ui
                        .add(egui::Slider::new(&mut state.step, 0.04..=0.5))
                        .changed();
                });
                if changed {
                    state.mesh_needs_rebuild = true;
                }

                let (btn_text, btn_fill, btn_color) = if state.mesh_needs_rebuild {
                    ("Rebuild mesh", ACCENT, BG_DEEP)
                } else {
                    ("Mesh up to date", BG_WIDGET, TEXT_MUTED)
                };
                if ui
                    .add(
                        egui::Button::new(RichText::new(btn_text).color(btn_color))
                            .fill(btn_fill)
                            .min_size(egui::vec2(ui.available_width(), 28.0)),
                    )
                    .clicked()
                    && state.mesh_needs_rebuild
                {
                    actions.rebuild_mesh = true;
                }
                ui.add_space(16.0);

                section_header(ui, "TEXTURE");
                if ui.button("Open image\u{2026}").clicked() {
                    actions.open_texture = true;
                }
                if let Some(err) = texture_error {
                    ui.add_space(6.0);
                    egui::Frame::default()
                        .fill(Color32::from_rgb(40, 15, 15))
                        .stroke(egui::Stroke::new(1.0, ACCENT_ERR))
                        .rounding(4.0)
                        .inner_margin(8.0)
                        .show(ui, |ui| {
                            ui.label(RichText::new(err).color(ACCENT_ERR).size(11.0));
                        });
                }
                ui.add_space(16.0);

                section_header(ui, "MARKER");
                ui.checkbox(&mut state.show_marker, "Show marker");
                ui.label(
                    RichText::new("W/S and A/D move the marker across the surface")
                        .color(TEXT_MUTED)
                        .size(11.0),
                );
                ui.add_space(16.0);

                section_header(ui, "ORIENTATION");
                ui.checkbox(&mut state.orientation_enabled, "Apply to marker");
                if state.orientation_enabled {
                    for (i, label) in ["X", "Y", "Z"].iter().enumerate() {
                        ui.horizontal(|ui| {
                            ui.label(*label);
                            ui.add(
                                egui::Slider::new(&mut state.orientation_deg[i], -180.0..=180.0)
                                    .suffix("\u{b0}"),
                            );
                        });
                    }
                }
                ui.add_space(16.0);

                section_header(ui, "PERFORMANCE");
                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.vsync_enabled, "VSync");
                    ui.checkbox(&mut state.show_help, "Overlay");
                });
            });
        });

    actions
}

fn mode_button(ui: &mut Ui, state: &mut UiState, mode: DisplayMode, label: &str) {
    let selected = state.display_mode == mode;
    let button = egui::Button::new(RichText::new(label).color(if selected {
        BG_DEEP
    } else {
        TEXT_PRIMARY
    }))
    .fill(if selected { ACCENT } else { BG_WIDGET })
    .min_size(egui::vec2(90.0, 30.0));

    if ui.add(button).clicked() {
        state.display_mode = mode;
    }
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

pub fn draw_help_overlay(ctx: &Context, interaction: &Interaction, fps: f32) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id =
                        Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(
                        RichText::new("LMB+Drag - Orbit | WASD - Marker | Scroll - FOV")
                            .color(TEXT_MUTED),
                    );
                    ui.label(
                        RichText::new(format!(
                            "Marker: ({:.2}, {:.2}) | Angle: {:.2} rad | FPS: {:.0}",
                            interaction.marker_coord.0,
                            interaction.marker_coord.1,
                            interaction.texture_angle,
                            fps
                        ))
                        .color(TEXT_MUTED),
                    );
                });
        });
}
