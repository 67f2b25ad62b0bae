//! Banner style: typed view of the static configuration.
//!
//! `StyleResolver::resolve` reads a `DescriptionConfig` once at startup and
//! produces an immutable `DescriptionStyle` resource. Malformed values fall
//! back to their defaults with a warning; nothing here fails.

use bevy::prelude::*;

use crate::config::{self, DescriptionConfig};

// =============================================================================
// Colors
// =============================================================================

/// Straight-alpha color parsed from a CSS-like string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in `[0.0, 1.0]`.
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `rgba(r, g, b, a)`, `rgb(r, g, b)` or a `#` hex color (`#rgb`,
    /// `#rgba`, `#rrggbb`, `#rrggbbaa`). Channels outside their range are
    /// clamped.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let (body, with_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return None;
        };
        let body = body.strip_suffix(')')?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if with_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }
        let channel = |p: &str| -> Option<u8> {
            let v: f32 = p.parse().ok()?;
            v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
        };
        let a = if with_alpha {
            let v: f32 = parts[3].parse().ok()?;
            if !v.is_finite() {
                return None;
            }
            v.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some(Self::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            a,
        ))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        Srgba::hex(hex).ok().map(Self::from)
    }

    /// Alpha as a byte.
    pub fn alpha_u8(&self) -> u8 {
        (self.a * 255.0).round().clamp(0.0, 255.0) as u8
    }
}

impl From<Srgba> for Rgba {
    fn from(color: Srgba) -> Self {
        let byte = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(
            byte(color.red),
            byte(color.green),
            byte(color.blue),
            color.alpha.clamp(0.0, 1.0),
        )
    }
}

// =============================================================================
// Fill
// =============================================================================

/// Background fill mode. Anything unrecognized resolves to `Solid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Solid,
    Gradient,
}

impl FillMode {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "gradient" => FillMode::Gradient,
            _ => FillMode::Solid,
        }
    }
}

/// Resolved background fill with only the colors the mode uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Rgba),
    Gradient {
        color1: Rgba,
        color2: Rgba,
        /// Where `color1` sits across the banner, as a fraction in `[0, 1]`.
        midpoint: f32,
    },
}

impl Fill {
    pub fn mode(&self) -> FillMode {
        match self {
            Fill::Solid(_) => FillMode::Solid,
            Fill::Gradient { .. } => FillMode::Gradient,
        }
    }

    /// Split a `width` x `height` background at origin `(x, y)` into the
    /// rectangles to paint, each with a left-to-right color ramp.
    ///
    /// Gradient fills produce two segments meeting at the midpoint: the left
    /// one ramps `color2 -> color1`, the right one `color1 -> color2`.
    /// Zero-width segments are dropped.
    pub fn segments(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<FillSegment> {
        match *self {
            Fill::Solid(color) => vec![FillSegment {
                x,
                y,
                width,
                height,
                left: color,
                right: color,
            }],
            Fill::Gradient {
                color1,
                color2,
                midpoint,
            } => {
                let split = width * midpoint;
                [
                    FillSegment {
                        x,
                        y,
                        width: split,
                        height,
                        left: color2,
                        right: color1,
                    },
                    FillSegment {
                        x: x + split,
                        y,
                        width: width - split,
                        height,
                        left: color1,
                        right: color2,
                    },
                ]
                .into_iter()
                .filter(|s| s.width > 0.0)
                .collect()
            }
        }
    }
}

/// One painted rectangle of the banner background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillSegment {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub left: Rgba,
    pub right: Rgba,
}

// =============================================================================
// DescriptionStyle
// =============================================================================

/// Immutable banner settings, inserted once as a resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DescriptionStyle {
    pub fill: Fill,
    /// Banner body height in text lines.
    pub height_lines: u32,
    /// Frames the banner holds before fading out.
    pub display_frames: u32,
    /// Skip the banner on maps already in the seen registry.
    pub hide_if_seen: bool,
}

impl Default for DescriptionStyle {
    fn default() -> Self {
        StyleResolver::resolve(&DescriptionConfig::default())
    }
}

impl DescriptionStyle {
    /// Window height in pixels for the configured number of lines.
    pub fn window_height(&self) -> f32 {
        self.height_lines as f32 * config::LINE_HEIGHT
            + config::STANDARD_PADDING * 2.0
            + config::TEXT_PADDING * 2.0
    }
}

// =============================================================================
// StyleResolver
// =============================================================================

pub struct StyleResolver;

impl StyleResolver {
    pub fn resolve(cfg: &DescriptionConfig) -> DescriptionStyle {
        let fill = match FillMode::parse(cfg.get(config::KEY_FILL_TYPE)) {
            FillMode::Solid => Fill::Solid(color(cfg, config::KEY_SOLID_COLOR)),
            FillMode::Gradient => Fill::Gradient {
                color1: color(cfg, config::KEY_GRADIENT_COLOR_1),
                color2: color(cfg, config::KEY_GRADIENT_COLOR_2),
                midpoint: midpoint(cfg),
            },
        };

        DescriptionStyle {
            fill,
            height_lines: integer(cfg, config::KEY_BANNER_HEIGHT_LINES),
            display_frames: integer(cfg, config::KEY_DISPLAY_DURATION_FRAMES),
            hide_if_seen: flag(cfg, config::KEY_HIDE_IF_SEEN),
        }
    }
}

fn color(cfg: &DescriptionConfig, key: &str) -> Rgba {
    let raw = cfg.get(key);
    Rgba::parse(raw).unwrap_or_else(|| {
        warn!("Map descriptions: {key}={raw:?} is not a color, using default");
        Rgba::parse(config::default_for(key)).unwrap_or(Rgba::TRANSPARENT)
    })
}

fn number(cfg: &DescriptionConfig, key: &str) -> f64 {
    let raw = cfg.get(key);
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            warn!("Map descriptions: {key}={raw:?} is not a number, using default");
            config::default_for(key).parse().unwrap_or(0.0)
        }
    }
}

/// Percentage 0-100 to a unit fraction, clamped.
fn midpoint(cfg: &DescriptionConfig) -> f32 {
    (number(cfg, config::KEY_GRADIENT_MIDPOINT) / 100.0).clamp(0.0, 1.0) as f32
}

/// Non-negative integer; fractions truncate, negatives clamp to zero.
fn integer(cfg: &DescriptionConfig, key: &str) -> u32 {
    number(cfg, key).trunc().clamp(0.0, u32::MAX as f64) as u32
}

fn flag(cfg: &DescriptionConfig, key: &str) -> bool {
    match cfg.get(key).trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => true,
        "off" | "false" | "no" | "0" | "" => false,
        other => {
            warn!("Map descriptions: {key}={other:?} is not on/off, using off");
            false
        }
    }
}

// =============================================================================
// Unit tests
// =============================================================================
