use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color literal {0:?} (expected #RRGGBB)")]
pub struct ColorParseError(pub String);

/// 8-bit RGB color. The wire/display form is a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(input: &str) -> Result<Self, ColorParseError> {
        let digits = input
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError(input.to_string()))?;
        if digits.len() != 6 {
            return Err(ColorParseError(input.to_string()));
        }
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| ColorParseError(input.to_string()))?;
        Ok(Self::new(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Builds a color from normalized components, clamping to [0, 1] and
    /// flooring into the 0-255 range.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let quantize = |v: f64| (v.clamp(0.0, 1.0) * 255.0).floor() as u8;
        Self::new(quantize(r), quantize(g), quantize(b))
    }

    pub fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let channel = |x: u8, y: u8| {
            let x = x as f64 / 255.0;
            let y = y as f64 / 255.0;
            x + (y - x) * t
        };
        Rgb::from_unit(
            channel(a.r, b.r),
            channel(a.g, b.g),
            channel(a.b, b.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        Rgb::parse_hex(&literal).map_err(D::Error::custom)
    }
}

/// A single animatable sample: plain number (radians, intensity, linear
/// coordinate) or RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Color(Rgb),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Number,
    Color,
}

impl Value {
    pub fn kind(self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Color(_) => ValueKind::Color,
        }
    }

    pub fn as_number(self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(v),
            Value::Color(_) => None,
        }
    }

    pub fn as_color(self) -> Option<Rgb> {
        match self {
            Value::Color(c) => Some(c),
            Value::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Color(c) => write!(f, "{c}"),
        }
    }
}

/// Linear interpolation between two samples. Numbers and colors blend
/// component-wise; tracks never hold both kinds, but legacy data that slips
/// a mixed pair through resolves to the left sample.
pub fn lerp_value(a: Value, b: Value, t: f64) -> Value {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Value::Number(x + (y - x) * t),
        (Value::Color(x), Value::Color(y)) => Value::Color(Rgb::lerp(x, y, t)),
        (left, _) => left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_hex() {
        let color = Rgb::parse_hex("#0080ff").unwrap();
        assert_eq!(color, Rgb::new(0x00, 0x80, 0xff));
        assert_eq!(color.to_hex(), "#0080ff");
    }

    #[test]
    fn rejects_malformed_color_literals() {
        assert!(Rgb::parse_hex("0080ff").is_err());
        assert!(Rgb::parse_hex("#08f").is_err());
        assert!(Rgb::parse_hex("#00zzff").is_err());
        assert!(Rgb::parse_hex("#0080ff00").is_err());
    }

    #[test]
    fn color_midpoint_floors_channels() {
        let mid = Rgb::lerp(Rgb::new(0, 0, 0), Rgb::new(255, 255, 255), 0.5);
        assert_eq!(mid.to_hex(), "#7f7f7f");
    }

    #[test]
    fn numeric_lerp_is_linear() {
        let v = lerp_value(Value::Number(2.0), Value::Number(6.0), 0.25);
        assert_eq!(v, Value::Number(3.0));
    }

    #[test]
    fn mixed_pair_holds_left_sample() {
        let left = Value::Number(1.0);
        let right = Value::Color(Rgb::WHITE);
        assert_eq!(lerp_value(left, right, 0.9), left);
    }

    #[test]
    fn value_deserializes_numbers_and_hex_strings() {
        let number: Value = serde_json::from_str("1.57").unwrap();
        assert_eq!(number, Value::Number(1.57));
        let color: Value = serde_json::from_str("\"#ff4040\"").unwrap();
        assert_eq!(color, Value::Color(Rgb::new(0xff, 0x40, 0x40)));
    }
}
