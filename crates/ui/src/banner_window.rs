//! Map description banner painter.
//!
//! Draws the current scene's banner one line below the top of the screen,
//! across the full width. The window frame itself is never drawn; only the
//! contents (background fill and description text) are painted, both scaled
//! by the banner's contents opacity.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use game::banner::BannerController;
use game::config::{FONT_SIZE, LINE_HEIGHT, STANDARD_PADDING, TEXT_PADDING};
use game::style::{DescriptionStyle, FillSegment, Rgba};

// =============================================================================
// Geometry
// =============================================================================

/// Window rectangle for a screen of the given size.
pub fn window_rect(screen: egui::Rect, style: &DescriptionStyle) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(screen.min.x, screen.min.y + LINE_HEIGHT),
        egui::vec2(screen.width(), style.window_height()),
    )
}

/// Area inside the window padding where contents are painted.
pub fn contents_rect(window: egui::Rect) -> egui::Rect {
    window.shrink(STANDARD_PADDING)
}

// =============================================================================
// Color
// =============================================================================

/// `color` with its alpha scaled by the contents opacity.
pub fn faded(color: Rgba, opacity: u8) -> egui::Color32 {
    let alpha = (color.a * opacity as f32).round().clamp(0.0, 255.0) as u8;
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}

/// One quad per segment with per-vertex colors, so egui interpolates the
/// left-to-right ramp.
pub fn background_mesh(segments: &[FillSegment], opacity: u8) -> egui::Mesh {
    let mut mesh = egui::Mesh::default();
    for s in segments {
        let base = mesh.vertices.len() as u32;
        let left = faded(s.left, opacity);
        let right = faded(s.right, opacity);
        mesh.colored_vertex(egui::pos2(s.x, s.y), left);
        mesh.colored_vertex(egui::pos2(s.x + s.width, s.y), right);
        mesh.colored_vertex(egui::pos2(s.x + s.width, s.y + s.height), right);
        mesh.colored_vertex(egui::pos2(s.x, s.y + s.height), left);
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }
    mesh
}

// =============================================================================
// System
// =============================================================================

/// Paints the banner when it has text and any opacity.
pub fn map_description_banner_ui(
    mut contexts: EguiContexts,
    banner: Option<Res<BannerController>>,
    style: Res<DescriptionStyle>,
) {
    let Some(banner) = banner else {
        return;
    };
    let state = banner.state();
    if !state.visible || state.opacity == 0 {
        return;
    }
    // No description: the timer still runs but nothing is drawn.
    let Some(text) = banner.content().text.as_deref() else {
        return;
    };

    let ctx = contexts.ctx_mut();
    let contents = contents_rect(window_rect(ctx.screen_rect(), &style));
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Middle,
        egui::Id::new("map_description_banner"),
    ));

    let segments = style.fill.segments(
        contents.min.x,
        contents.min.y,
        contents.width(),
        contents.height(),
    );
    painter.add(egui::Shape::mesh(background_mesh(&segments, state.opacity)));

    let wrap_width = (contents.width() - TEXT_PADDING * 2.0).max(0.0);
    let text_color = egui::Color32::from_white_alpha(state.opacity);
    let galley = painter.layout(
        text.to_string(),
        egui::FontId::proportional(FONT_SIZE),
        text_color,
        wrap_width,
    );
    painter.galley(
        contents.min + egui::vec2(TEXT_PADDING, TEXT_PADDING),
        galley,
        text_color,
    );
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use game::style::Fill;

    fn screen() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(816.0, 624.0))
    }

    #[test]
    fn test_window_sits_one_line_down_full_width() {
        let style = DescriptionStyle::default();
        let rect = window_rect(screen(), &style);
        assert_eq!(rect.min, egui::pos2(0.0, LINE_HEIGHT));
        assert_eq!(rect.width(), 816.0);
        assert_eq!(rect.height(), style.window_height());
    }

    #[test]
    fn test_contents_inset_by_padding() {
        let window = egui::Rect::from_min_size(egui::pos2(0.0, 36.0), egui::vec2(816.0, 156.0));
        let contents = contents_rect(window);
        assert_eq!(contents.min, egui::pos2(STANDARD_PADDING, 36.0 + STANDARD_PADDING));
        assert_eq!(contents.width(), 816.0 - 2.0 * STANDARD_PADDING);
    }

    #[test]
    fn test_faded_scales_alpha() {
        let color = Rgba::new(0, 0, 0, 0.6);
        assert_eq!(faded(color, 255).a(), 153);
        assert_eq!(faded(color, 0).a(), 0);
        assert_eq!(faded(Rgba::new(255, 255, 255, 1.0), 128).a(), 128);
    }

    #[test]
    fn test_solid_mesh_is_one_quad() {
        let segments = Fill::Solid(Rgba::new(10, 20, 30, 1.0)).segments(0.0, 0.0, 100.0, 50.0);
        let mesh = background_mesh(&segments, 255);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.vertices.iter().all(|v| v.color == mesh.vertices[0].color));
    }

    #[test]
    fn test_gradient_mesh_ramps_per_segment() {
        let c1 = Rgba::new(255, 255, 255, 1.0);
        let c2 = Rgba::new(255, 255, 255, 0.0);
        let fill = Fill::Gradient {
            color1: c1,
            color2: c2,
            midpoint: 0.5,
        };
        let mesh = background_mesh(&fill.segments(0.0, 0.0, 200.0, 40.0), 255);
        assert_eq!(mesh.vertices.len(), 8);

        // Left half: transparent at its left edge, opaque at the midpoint.
        assert_eq!(mesh.vertices[0].color.a(), 0);
        assert_eq!(mesh.vertices[1].color.a(), 255);
        assert_eq!(mesh.vertices[1].pos.x, 100.0);
        // Right half: opaque at the midpoint, transparent at the right edge.
        assert_eq!(mesh.vertices[4].color.a(), 255);
        assert_eq!(mesh.vertices[5].color.a(), 0);
        assert_eq!(mesh.vertices[5].pos.x, 200.0);
    }
}
