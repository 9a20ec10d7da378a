//! Named visual styles: background treatment, rotation range, border, shadow.

use std::collections::BTreeMap;
use std::fmt;

use image::Rgba;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub fn rgba(self) -> Rgba<u8> {
        Rgba(self.0)
    }

    /// CSS color literal for the markup twin.
    pub fn css(self) -> String {
        let [r, g, b, a] = self.0;
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("rgba({r}, {g}, {b}, {:.3})", a as f32 / 255.0)
        }
    }

    /// `#rrggbb`, or `#rrggbbaa` when translucent; the form [`parse`](Self::parse) reads.
    pub fn hex(self) -> String {
        let [r, g, b, a] = self.0;
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    /// Parse `#RRGGBB`, `#RRGGBBAA`, `white` or `black`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            _ => {}
        }
        let hex = raw
            .strip_prefix('#')
            .ok_or_else(|| format!("unrecognised color '{raw}'"))?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(format!("color '{raw}' must be #RRGGBB or #RRGGBBAA"));
        }
        let mut out = [255u8; 4];
        for (i, slot) in out.iter_mut().enumerate().take(hex.len() / 2) {
            *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| format!("color '{raw}' has invalid hex digits"))?;
        }
        Ok(Self(out))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.hex()
    }
}

/// Written and read as `transparent` or a color literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Solid(Color),
    Transparent,
}

impl Serialize for Background {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Transparent => serializer.serialize_str("transparent"),
            Self::Solid(color) => serializer.serialize_str(&color.hex()),
        }
    }
}

impl<'de> Deserialize<'de> for Background {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().eq_ignore_ascii_case("transparent") {
            return Ok(Self::Transparent);
        }
        Color::parse(&raw).map(Self::Solid).map_err(de::Error::custom)
    }
}

/// Inclusive rotation range in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct RotationRange {
    pub min_deg: f32,
    pub max_deg: f32,
}

impl RotationRange {
    pub const NONE: Self = Self::symmetric(0.0);

    pub const fn symmetric(deg: f32) -> Self {
        Self {
            min_deg: -deg,
            max_deg: deg,
        }
    }
}

impl From<[f32; 2]> for RotationRange {
    fn from([min_deg, max_deg]: [f32; 2]) -> Self {
        Self { min_deg, max_deg }
    }
}

impl From<RotationRange> for [f32; 2] {
    fn from(r: RotationRange) -> Self {
        [r.min_deg, r.max_deg]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StyleConfig {
    pub background: Background,
    /// Subtle top-to-bottom white wash over solid backgrounds.
    #[serde(default)]
    pub gradient: bool,
    #[serde(default = "StyleConfig::default_rotation")]
    pub rotation_range: RotationRange,
    #[serde(default)]
    pub border_width_px: u32,
    #[serde(default = "StyleConfig::default_border_color")]
    pub border_color: Color,
    #[serde(default)]
    pub shadow: bool,
}

impl StyleConfig {
    const fn default_rotation() -> RotationRange {
        RotationRange::NONE
    }

    const fn default_border_color() -> Color {
        Color::WHITE
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self.background, Background::Transparent)
    }

    fn validate(&self, name: &str) -> Result<()> {
        let r = self.rotation_range;
        if !(r.min_deg.is_finite() && r.max_deg.is_finite()) || r.min_deg > r.max_deg {
            return Err(Error::InvalidStyle {
                name: name.to_string(),
                reason: format!("rotation range [{}, {}] is not ordered", r.min_deg, r.max_deg),
            });
        }
        Ok(())
    }

    fn solid(
        bg: Color,
        rotation: f32,
        border_width_px: u32,
        border_color: Color,
        shadow: bool,
    ) -> Self {
        Self {
            background: Background::Solid(bg),
            gradient: true,
            rotation_range: RotationRange::symmetric(rotation),
            border_width_px,
            border_color,
            shadow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StylePreset {
    Modern,
    Vintage,
    Minimal,
    Polaroid,
    Neon,
    Retro,
    Elegant,
    Scrapbook,
}

impl StylePreset {
    pub const ALL: &'static [Self] = &[
        Self::Modern,
        Self::Vintage,
        Self::Minimal,
        Self::Polaroid,
        Self::Neon,
        Self::Retro,
        Self::Elegant,
        Self::Scrapbook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Vintage => "vintage",
            Self::Minimal => "minimal",
            Self::Polaroid => "polaroid",
            Self::Neon => "neon",
            Self::Retro => "retro",
            Self::Elegant => "elegant",
            Self::Scrapbook => "scrapbook",
        }
    }

    pub fn config(&self) -> StyleConfig {
        match self {
            Self::Modern => StyleConfig::solid(Color::WHITE, 3.0, 4, Color::WHITE, true),
            Self::Vintage => {
                StyleConfig::solid(Color::rgb(0xF5, 0xE6, 0xD3), 8.0, 6, Color::WHITE, true)
            }
            Self::Minimal => StyleConfig::solid(Color::BLACK, 0.0, 2, Color::BLACK, false),
            Self::Polaroid => {
                StyleConfig::solid(Color::rgb(0xEF, 0xEF, 0xEF), 5.0, 12, Color::WHITE, true)
            }
            Self::Neon => StyleConfig::solid(Color::rgb(0x12, 0x12, 0x12), 0.0, 5, Color::WHITE, true),
            Self::Retro => StyleConfig::solid(Color::rgb(0xD4, 0xB4, 0x83), 4.0, 7, Color::WHITE, true),
            Self::Elegant => {
                StyleConfig::solid(Color::rgb(0x2C, 0x36, 0x39), 0.0, 4, Color::WHITE, true)
            }
            Self::Scrapbook => {
                StyleConfig::solid(Color::rgb(0xF3, 0xEF, 0xE0), 10.0, 0, Color::WHITE, true)
            }
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable style table looked up by name.
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    styles: BTreeMap<String, StyleConfig>,
}

impl StyleCatalog {
    pub fn builtin() -> Self {
        let styles = StylePreset::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), p.config()))
            .collect();
        Self { styles }
    }

    /// Add or replace entries, validating each one.
    pub fn with_overrides(mut self, overrides: BTreeMap<String, StyleConfig>) -> Result<Self> {
        for (name, style) in overrides {
            style.validate(&name)?;
            self.styles.insert(name, style);
        }
        Ok(self)
    }

    pub fn resolve(&self, name: &str) -> Result<&StyleConfig> {
        self.styles
            .get(name)
            .ok_or_else(|| Error::UnknownStyle(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
