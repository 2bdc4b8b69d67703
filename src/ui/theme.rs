use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

pub const BG_PANEL: Color32 = Color32::from_rgb(10, 11, 14);
pub const BG_WIDGET: Color32 = Color32::from_rgb(22, 24, 30);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(34, 37, 46);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(45, 49, 62);
pub const BG_DEEP: Color32 = Color32::from_rgb(4, 4, 6);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(178, 181, 188);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(110, 114, 122);
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(226, 228, 233);

pub const ACCENT: Color32 = Color32::from_rgb(64, 156, 170);
pub const ACCENT_WARM: Color32 = Color32::from_rgb(196, 146, 51);
pub const ACCENT_ERR: Color32 = Color32::from_rgb(186, 55, 55);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(44, 48, 60);

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = Style::default();
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.faint_bg_color = BG_PANEL;
    visuals.extreme_bg_color = BG_DEEP;
    visuals.code_bg_color = BG_DEEP;
    visuals.warn_fg_color = ACCENT_WARM;
    visuals.error_fg_color = ACCENT_ERR;
    visuals.hyperlink_color = ACCENT;
    visuals.slider_trailing_fill = true;

    visuals.selection = egui::style::Selection {
        bg_fill: ACCENT.gamma_multiply(0.4),
        stroke: Stroke::new(1.0, ACCENT),
    };

    let widget = |fill: Color32, border: Color32, text: Color32| egui::style::WidgetVisuals {
        bg_fill: fill,
        weak_bg_fill: fill,
        bg_stroke: Stroke::new(1.0, border),
        rounding: Rounding::same(4.0),
        fg_stroke: Stroke::new(1.0, text),
        expansion: 0.0,
    };

    visuals.widgets.noninteractive = widget(BG_WIDGET, BORDER_SUBTLE, TEXT_MUTED);
    visuals.widgets.inactive = widget(BG_WIDGET, BORDER_SUBTLE, TEXT_PRIMARY);
    visuals.widgets.hovered = widget(BG_WIDGET_HOVER, ACCENT, TEXT_BRIGHT);
    visuals.widgets.active = widget(BG_WIDGET_ACTIVE, ACCENT, TEXT_BRIGHT);
    visuals.widgets.open = widget(BG_WIDGET_ACTIVE, BORDER_SUBTLE, TEXT_BRIGHT);

    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.slider_width = 180.0;

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (
            TextStyle::Button,
            FontId::new(14.0, FontFamily::Proportional),
        ),
        (
            TextStyle::Heading,
            FontId::new(18.0, FontFamily::Proportional),
        ),
        (
            TextStyle::Monospace,
            FontId::new(13.0, FontFamily::Monospace),
        ),
    ]
    .into();

    ctx.set_style(style);
}
