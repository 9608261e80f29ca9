use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA colour, components in 0..=1.
///
/// Colour-space conversion is the host's business; the renderer uploads these
/// values as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const WHITE: Colour = Colour::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let channel = |index: usize| -> Option<f32> {
            let pair = digits.get(index * 2..index * 2 + 2)?;
            u8::from_str_radix(pair, 16)
                .ok()
                .map(|value| value as f32 / 255.0)
        };
        match digits.len() {
            6 => Some(Self::rgba(channel(0)?, channel(1)?, channel(2)?, 1.0)),
            8 => Some(Self::rgba(channel(0)?, channel(1)?, channel(2)?, channel(3)?)),
            _ => None,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb_hex() {
        let colour = Colour::from_hex("#ff8000").unwrap();
        assert_eq!(colour.r, 1.0);
        assert!((colour.g - 128.0 / 255.0).abs() < f32::EPSILON);
        assert_eq!(colour.b, 0.0);
        assert_eq!(colour.a, 1.0);
    }

    #[test]
    fn test_parse_rgba_hex_without_hash() {
        let colour = Colour::from_hex("00000080").unwrap();
        assert!((colour.a - 128.0 / 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reject_bad_hex() {
        assert!(Colour::from_hex("#fff").is_none());
        assert!(Colour::from_hex("#gg0000").is_none());
        assert!(Colour::from_hex("").is_none());
    }
}
