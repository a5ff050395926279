// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color math for WCAG 1.4.3 / 1.4.6 contrast checks.
//!
//! Relative luminance and contrast ratio follow the WCAG 2.x definitions:
//! <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An sRGB color with 8-bit channels and an optional alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    #[serde(deserialize_with = "channel")]
    pub r: u8,
    #[serde(deserialize_with = "channel")]
    pub g: u8,
    #[serde(deserialize_with = "channel")]
    pub b: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Opaque color from channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }

    /// Parse `#rgb` or `#rrggbb`
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }

    /// `#rrggbb`, lowercase
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn relative_luminance(&self) -> f64 {
        relative_luminance(*self)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hosts hand out channels as floats; round and clamp into a byte.
fn channel<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("color channel must be finite"));
    }
    Ok(value.round().clamp(0.0, 255.0) as u8)
}

/// Relative luminance in `[0, 1]`
pub fn relative_luminance(color: Color) -> f64 {
    let [r, g, b] = [color.r, color.g, color.b].map(|c| {
        let v = c as f64 / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    });
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Contrast ratio between two colors, in `[1, 21]`. Symmetric.
pub fn contrast_ratio(c1: Color, c2: Color) -> f64 {
    let l1 = relative_luminance(c1);
    let l2 = relative_luminance(c2);
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_luminance_extremes() {
        assert_eq!(relative_luminance(Color::WHITE), 1.0);
        assert_eq!(relative_luminance(Color::BLACK), 0.0);
    }

    #[test]
    fn test_contrast_ratio_black_white() {
        assert_eq!(contrast_ratio(Color::BLACK, Color::WHITE), 21.0);
    }

    #[test]
    fn test_contrast_ratio_same_color() {
        for c in [Color::rgb(128, 128, 128), Color::rgb(12, 200, 77), Color::WHITE] {
            assert_eq!(contrast_ratio(c, c), 1.0);
        }
    }

    #[test]
    fn test_contrast_ratio_symmetric() {
        let pairs = [
            (Color::rgb(200, 200, 200), Color::WHITE),
            (Color::rgb(0, 0, 255), Color::rgb(255, 255, 0)),
            (Color::rgb(50, 50, 50), Color::rgb(90, 10, 240)),
        ];
        for (a, b) in pairs {
            assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
        }
    }

    #[test]
    fn test_light_gray_on_white() {
        let ratio = contrast_ratio(Color::rgb(200, 200, 200), Color::WHITE);
        assert!((ratio - 1.67).abs() < 0.01, "got {:.3}", ratio);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::rgb(0, 0, 255).to_hex(), "#0000ff");
        assert_eq!(Color::rgb(10, 200, 7).to_hex(), "#0ac807");
        assert_eq!(Color::WHITE.to_string(), "#ffffff");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse_hex("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse_hex("00ff00"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(Color::parse_hex("#12345"), None);
        assert_eq!(Color::parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_deserialize_rounds_and_clamps() {
        let c: Color = serde_json::from_str(r#"{"r": 49.6, "g": 300, "b": -4, "a": 1}"#).unwrap();
        assert_eq!((c.r, c.g, c.b), (50, 255, 0));
        assert_eq!(c.a, Some(1.0));
    }
}
