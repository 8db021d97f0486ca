use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::errors::DocumentError;

// @module: ASS style records

/// Field order of the `Format:` line written for `[V4+ Styles]`
pub const STYLE_FORMAT: [&str; 23] = [
    "Name", "Fontname", "Fontsize", "PrimaryColour", "SecondaryColour",
    "OutlineColour", "BackColour", "Bold", "Italic", "Underline", "StrikeOut",
    "ScaleX", "ScaleY", "Spacing", "Angle", "BorderStyle", "Outline", "Shadow",
    "Alignment", "MarginL", "MarginR", "MarginV", "Encoding",
];

/// RGBA colour as stored in ASS (`&HAABBGGRR`, alpha 0 = opaque)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "&H{:02X}{:02X}{:02X}{:02X}", self.a, self.b, self.g, self.r)
    }
}

impl FromStr for Color {
    type Err = DocumentError;

    /// Accepts `&HAABBGGRR`, `&HBBGGRR` and the trailing-`&` variant some
    /// tools emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DocumentError::Parse {
            line: 0,
            message: format!("Invalid colour: {}", s),
        };
        let hex = s.trim()
            .trim_start_matches("&H")
            .trim_start_matches("&h")
            .trim_end_matches('&');
        if hex.is_empty() || hex.len() > 8 {
            return Err(invalid());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        Ok(Color {
            a: (value >> 24) as u8,
            b: (value >> 16) as u8,
            g: (value >> 8) as u8,
            r: value as u8,
        })
    }
}

/// A named bundle of font, colour and position attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub name: String,
    pub fontname: String,
    pub fontsize: f64,
    pub primary_color: Color,
    pub secondary_color: Color,
    pub outline_color: Color,
    pub back_color: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike_out: bool,
    pub scale_x: f64,
    pub scale_y: f64,
    pub spacing: f64,
    pub angle: f64,
    pub border_style: i32,
    pub outline: f64,
    pub shadow: f64,
    /// Numpad position, 1..=9
    pub alignment: u8,
    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
    pub encoding: i32,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            name: "Default".to_string(),
            fontname: "Arial".to_string(),
            fontsize: 48.0,
            primary_color: Color::new(0xFF, 0xFF, 0xFF, 0x00),
            secondary_color: Color::new(0xFF, 0x00, 0x00, 0x00),
            outline_color: Color::new(0x00, 0x00, 0x00, 0x00),
            back_color: Color::new(0x00, 0x00, 0x00, 0xA0),
            bold: false,
            italic: false,
            underline: false,
            strike_out: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 2.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 1,
        }
    }
}

impl Style {
    /// Copy of this style under a different name
    pub fn renamed(&self, name: &str) -> Self {
        Style {
            name: name.to_string(),
            ..self.clone()
        }
    }

    /// Build a style from the values of a `Style:` line, keyed by the
    /// section's `Format:` field names. Unknown fields are ignored and
    /// missing ones keep their defaults.
    pub fn from_fields(format: &[String], values: &[&str], line: usize) -> Result<Self, DocumentError> {
        let mut style = Style::default();
        for (key, raw) in format.iter().zip(values.iter()) {
            let raw = raw.trim();
            let err = |what: &str| DocumentError::Parse {
                line,
                message: format!("Invalid {} value: {}", what, raw),
            };
            match key.to_lowercase().as_str() {
                "name" => style.name = raw.to_string(),
                "fontname" => style.fontname = raw.to_string(),
                "fontsize" => style.fontsize = raw.parse().map_err(|_| err("Fontsize"))?,
                "primarycolour" => style.primary_color = raw.parse().map_err(|_| err("PrimaryColour"))?,
                "secondarycolour" => style.secondary_color = raw.parse().map_err(|_| err("SecondaryColour"))?,
                "outlinecolour" | "tertiarycolour" => style.outline_color = raw.parse().map_err(|_| err("OutlineColour"))?,
                "backcolour" => style.back_color = raw.parse().map_err(|_| err("BackColour"))?,
                "bold" => style.bold = parse_flag(raw).ok_or_else(|| err("Bold"))?,
                "italic" => style.italic = parse_flag(raw).ok_or_else(|| err("Italic"))?,
                "underline" => style.underline = parse_flag(raw).ok_or_else(|| err("Underline"))?,
                "strikeout" => style.strike_out = parse_flag(raw).ok_or_else(|| err("StrikeOut"))?,
                "scalex" => style.scale_x = raw.parse().map_err(|_| err("ScaleX"))?,
                "scaley" => style.scale_y = raw.parse().map_err(|_| err("ScaleY"))?,
                "spacing" => style.spacing = raw.parse().map_err(|_| err("Spacing"))?,
                "angle" => style.angle = raw.parse().map_err(|_| err("Angle"))?,
                "borderstyle" => style.border_style = raw.parse().map_err(|_| err("BorderStyle"))?,
                "outline" => style.outline = raw.parse().map_err(|_| err("Outline"))?,
                "shadow" => style.shadow = raw.parse().map_err(|_| err("Shadow"))?,
                "alignment" => style.alignment = raw.parse().map_err(|_| err("Alignment"))?,
                "marginl" => style.margin_l = raw.parse().map_err(|_| err("MarginL"))?,
                "marginr" => style.margin_r = raw.parse().map_err(|_| err("MarginR"))?,
                "marginv" => style.margin_v = raw.parse().map_err(|_| err("MarginV"))?,
                "encoding" => style.encoding = raw.parse().map_err(|_| err("Encoding"))?,
                _ => {}
            }
        }
        Ok(style)
    }
}

// ASS writes booleans as -1/0, but 1 shows up in the wild too
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.parse::<i32>().ok()? {
        0 => Some(false),
        _ => Some(true),
    }
}

fn flag(value: bool) -> i32 {
    if value { -1 } else { 0 }
}

impl fmt::Display for Style {
    /// Renders the `Style:` line in `STYLE_FORMAT` order
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.name, self.fontname, self.fontsize,
            self.primary_color, self.secondary_color, self.outline_color, self.back_color,
            flag(self.bold), flag(self.italic), flag(self.underline), flag(self.strike_out),
            self.scale_x, self.scale_y, self.spacing, self.angle,
            self.border_style, self.outline, self.shadow, self.alignment,
            self.margin_l, self.margin_r, self.margin_v, self.encoding,
        )
    }
}
