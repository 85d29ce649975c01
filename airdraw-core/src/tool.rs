//! Drawing tools, colors and the palette state read by the stroke renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Narrowest selectable stroke width in pixels.
pub const MIN_STROKE_WIDTH: f32 = 2.0;
/// Widest selectable stroke width in pixels.
pub const MAX_STROKE_WIDTH: f32 = 40.0;
/// Stroke width at startup.
pub const DEFAULT_STROKE_WIDTH: f32 = 8.0;

/// The swatches offered by the default toolbar.
pub const DEFAULT_SWATCHES: [Rgba; 6] = [
    Rgba::rgb(0x00, 0xff, 0xcc),
    Rgba::rgb(0xff, 0x33, 0x66),
    Rgba::rgb(0xff, 0xff, 0x00),
    Rgba::rgb(0x00, 0xcc, 0xff),
    Rgba::rgb(0xff, 0xff, 0xff),
    Rgba::rgb(0xff, 0xaa, 0x00),
];

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with its alpha scaled by `factor` (clamped to `[0, 1]`).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn with_opacity(self, factor: f32) -> Self {
        let alpha = (f32::from(self.a) * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl FromStr for Rgba {
    type Err = CoreError;

    /// Parse `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How a tool's pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Paint over existing pixels.
    SourceOver,
    /// Remove existing pixels where the stroke covers them.
    DestinationOut,
}

/// Soft halo drawn beneath a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowProfile {
    /// Smallest halo radius regardless of stroke width.
    pub min_radius: f32,
    /// Halo radius per pixel of stroke width.
    pub per_width: f32,
}

impl GlowProfile {
    /// Halo radius for a given base width.
    #[must_use]
    pub fn radius(&self, width: f32) -> f32 {
        (width * self.per_width).max(self.min_radius)
    }
}

/// Declarative rendering parameters of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolProfile {
    /// Alpha multiplier applied to the stroke color.
    pub opacity: f32,
    /// Multiplier applied to the palette width.
    pub width_multiplier: f32,
    /// Compositing mode.
    pub blend: BlendMode,
    /// Optional glow beneath the stroke.
    pub glow: Option<GlowProfile>,
}

impl ToolProfile {
    /// Effective stroke width for the given palette width.
    #[must_use]
    pub fn stroke_width(&self, base: f32) -> f32 {
        base * self.width_multiplier
    }
}

/// The closed set of drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Neon pen with glow.
    #[default]
    Pen,
    /// Solid pencil.
    Pencil,
    /// Translucent wide highlighter.
    Marker,
    /// Removes ink.
    Eraser,
}

static TOOL_PROFILES: [ToolProfile; 4] = [
    ToolProfile {
        opacity: 1.0,
        width_multiplier: 1.0,
        blend: BlendMode::SourceOver,
        glow: Some(GlowProfile {
            min_radius: 10.0,
            per_width: 1.0,
        }),
    },
    ToolProfile {
        opacity: 0.8,
        width_multiplier: 1.0,
        blend: BlendMode::SourceOver,
        glow: None,
    },
    ToolProfile {
        opacity: 0.3,
        width_multiplier: 2.0,
        blend: BlendMode::SourceOver,
        glow: None,
    },
    ToolProfile {
        opacity: 1.0,
        width_multiplier: 5.0,
        blend: BlendMode::DestinationOut,
        glow: None,
    },
];

impl Tool {
    /// Every tool in toolbar order.
    pub const ALL: [Tool; 4] = [Tool::Pen, Tool::Pencil, Tool::Marker, Tool::Eraser];

    /// The rendering profile of this tool.
    #[must_use]
    pub fn profile(self) -> &'static ToolProfile {
        &TOOL_PROFILES[self as usize]
    }

    /// Human-readable name used for toolbar tooltips.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pen => "Neon Pen",
            Self::Pencil => "Solid Pencil",
            Self::Marker => "Highlighter Marker",
            Self::Eraser => "Eraser",
        }
    }
}

/// User-facing control commands. All take effect immediately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Switch tool.
    SelectTool(Tool),
    /// Switch ink color.
    SelectColor(Rgba),
    /// Change the base stroke width.
    SetWidth(f32),
    /// Wipe the drawing surface.
    Clear,
}

/// Current tool, color and width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    tool: Tool,
    color: Rgba,
    width: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            color: DEFAULT_SWATCHES[0],
            width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl Palette {
    /// Active tool.
    #[must_use]
    pub const fn tool(&self) -> Tool {
        self.tool
    }

    /// Active ink color.
    #[must_use]
    pub const fn color(&self) -> Rgba {
        self.color
    }

    /// Base stroke width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Switch tool.
    pub fn select_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Switch color. Picking a color while erasing returns to the pen.
    pub fn select_color(&mut self, color: Rgba) {
        self.color = color;
        if self.tool == Tool::Eraser {
            self.tool = Tool::Pen;
        }
    }

    /// Set the base width, clamped to the selectable range.
    pub fn set_width(&mut self, width: f32) {
        if width.is_finite() {
            self.width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
        }
    }

    /// Apply a palette command. Returns `false` for commands that target the
    /// drawing surface rather than the palette.
    pub fn apply(&mut self, command: ControlCommand) -> bool {
        match command {
            ControlCommand::SelectTool(tool) => self.select_tool(tool),
            ControlCommand::SelectColor(color) => self.select_color(color),
            ControlCommand::SetWidth(width) => self.set_width(width),
            ControlCommand::Clear => return false,
        }
        true
    }
}
