//! Help overlay drawn with egui on top of the scene.

use renderer::overlay::OverlayFrame;
use scene::{HELP_COLLAPSED, HELP_LINES};
use winit::window::Window;

const MARGIN: f32 = 10.0;

fn help_panel(ctx: &egui::Context, help_visible: bool) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_TOP, [MARGIN, MARGIN])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_black_alpha(160))
                .inner_margin(egui::Margin::same(8))
                .corner_radius(egui::CornerRadius::same(4))
                .show(ui, |ui| {
                    let text = |s: &str| {
                        egui::RichText::new(s)
                            .monospace()
                            .color(egui::Color32::WHITE)
                    };
                    if help_visible {
                        for line in HELP_LINES {
                            ui.label(text(line));
                        }
                    } else {
                        ui.label(text(HELP_COLLAPSED));
                    }
                });
        });
}

/// Run the UI for one frame and tessellate it.
pub fn build_overlay(
    ctx: &egui::Context,
    raw_input: egui::RawInput,
    help_visible: bool,
) -> (OverlayFrame, egui::PlatformOutput) {
    let full_output = ctx.run(raw_input, |ctx| help_panel(ctx, help_visible));
    let primitives = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
    let frame = OverlayFrame {
        primitives,
        textures_delta: full_output.textures_delta,
        pixels_per_point: full_output.pixels_per_point,
    };
    (frame, full_output.platform_output)
}

pub fn window_overlay(
    ctx: &egui::Context,
    state: &mut egui_winit::State,
    window: &Window,
    help_visible: bool,
) -> OverlayFrame {
    let raw_input = state.take_egui_input(window);
    let (frame, platform_output) = build_overlay(ctx, raw_input, help_visible);
    state.handle_platform_output(window, platform_output);
    frame
}
