use egui::Color32;

// Deep ocean palette

// Background hierarchy
pub const BG_MAIN: Color32 = Color32::from_rgb(0, 7, 45); // #00072D
pub const BG_PANEL: Color32 = Color32::from_rgb(10, 27, 61); // #0A1B3D
pub const BG_SECONDARY: Color32 = Color32::from_rgb(26, 47, 82); // #1A2F52
pub const BG_ELEVATED: Color32 = Color32::from_rgb(36, 55, 95); // #24375F
pub const BG_HOVER: Color32 = Color32::from_rgb(26, 67, 191); // #1A43BF
pub const BG_CONSOLE: Color32 = Color32::from_rgb(0, 5, 16); // #000510

// Text
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(137, 207, 240); // #89CFF0
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(48, 213, 200); // #30D5C8
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(48, 213, 200);

// Status
pub const STATUS_READY: Color32 = Color32::from_rgb(80, 250, 123); // #50FA7B
pub const STATUS_NOT_READY: Color32 = Color32::from_rgb(255, 85, 85); // #FF5555
pub const STATUS_WARNING: Color32 = Color32::from_rgb(241, 250, 140); // #F1FA8C
pub const STATUS_UNKNOWN: Color32 = Color32::from_rgb(98, 114, 164); // #6272A4

// Actions
pub const ACTION_PRIMARY: Color32 = Color32::from_rgb(48, 213, 200);
pub const ACTION_DANGER: Color32 = Color32::from_rgb(255, 85, 85);

pub const BORDER_DEFAULT: Color32 = Color32::from_rgb(36, 55, 95);
pub const BORDER_FOCUS: Color32 = Color32::from_rgb(48, 213, 200);
pub const SELECTION_BG: Color32 = Color32::from_rgb(26, 67, 191);

pub fn configure_ocean_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = egui::Visuals::dark();

    visuals.window_fill = BG_MAIN;
    visuals.panel_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_CONSOLE;
    visuals.faint_bg_color = BG_SECONDARY;

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.hyperlink_color = ACTION_PRIMARY;

    visuals.widgets.noninteractive.bg_fill = BG_SECONDARY;
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER_DEFAULT);
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);

    visuals.widgets.inactive.bg_fill = BG_ELEVATED;
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER_DEFAULT);
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);

    visuals.widgets.hovered.bg_fill = BG_HOVER;
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.5, ACTION_PRIMARY);
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT_BRIGHT);

    visuals.widgets.active.bg_fill = SELECTION_BG;
    visuals.widgets.active.bg_stroke = egui::Stroke::new(2.0, BORDER_FOCUS);
    visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, TEXT_BRIGHT);

    visuals.selection.bg_fill = SELECTION_BG;
    visuals.selection.stroke = egui::Stroke::new(1.0, ACTION_PRIMARY);

    visuals.window_shadow = egui::epaint::Shadow {
        extrusion: 12.0,
        color: Color32::from_black_alpha(140),
    };

    ctx.set_visuals(visuals);

    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);
    style.spacing.indent = 20.0;

    ctx.set_style(style);
}

/// Color for a VM status column. The list endpoint reports "Ready" /
/// "Not Ready", the detail endpoint a phase such as "Running".
pub fn status_color(status: Option<&str>) -> Color32 {
    match status {
        Some("Ready") | Some("Running") => STATUS_READY,
        Some("Not Ready") | Some("Stopped") | Some("Failed") => STATUS_NOT_READY,
        Some(_) => STATUS_WARNING,
        None => STATUS_UNKNOWN,
    }
}

pub fn status_icon(status: Option<&str>) -> &'static str {
    match status {
        Some("Ready") | Some("Running") => "●",
        Some("Not Ready") | Some("Stopped") => "○",
        Some("Failed") => "✕",
        Some(_) => "◐",
        None => "?",
    }
}
