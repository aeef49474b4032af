//! Style attached to stored shapes.

use crate::storage::{Storage, StorageResult};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Pack as 0xRRGGBBAA for field storage.
    pub fn to_rgba_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpack from 0xRRGGBBAA.
    pub fn from_rgba_u32(value: u32) -> Self {
        let [r, g, b, a] = value.to_be_bytes();
        Self::new(r, g, b, a)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Drawing context carried by each stored shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width in model units.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    pub opacity: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

impl ShapeStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(|c| c.into())
    }

    /// Set the stroke color from a peniko Color.
    pub fn set_stroke(&mut self, color: Color) {
        self.stroke_color = color.into();
    }

    /// Set the fill color from a peniko Color.
    pub fn set_fill(&mut self, color: Option<Color>) {
        self.fill_color = color.map(|c| c.into());
    }

    pub fn save(&self, s: &mut dyn Storage) -> StorageResult<()> {
        s.write_u32("stroke", self.stroke_color.to_rgba_u32())?;
        s.write_f64("width", self.stroke_width)?;
        // Transparent doubles as "no fill"; a transparent fill is not drawable anyway.
        let fill = self.fill_color.unwrap_or_else(SerializableColor::transparent);
        s.write_u32("fill", fill.to_rgba_u32())?;
        s.write_f64("opacity", self.opacity)
    }

    pub fn load(s: &mut dyn Storage) -> StorageResult<Self> {
        let stroke_color = SerializableColor::from_rgba_u32(s.read_u32("stroke")?);
        let stroke_width = s.read_f64("width")?;
        let fill = SerializableColor::from_rgba_u32(s.read_u32("fill")?);
        let fill_color = (fill.a != 0).then_some(fill);
        let opacity = s.read_f64("opacity")?;
        Ok(Self {
            stroke_color,
            stroke_width,
            fill_color,
            opacity,
        })
    }
}
