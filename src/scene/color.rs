use egui::Color32;

use crate::error::SceneError;

pub const WHITE: Color32 = Color32::WHITE;

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex(text: &str) -> Result<Color32, SceneError> {
    let invalid = || SceneError::InvalidColor(text.to_owned());
    let digits = text.strip_prefix('#').ok_or_else(invalid)?;
    if !digits.is_ascii() {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match digits.len() {
        3 => {
            let expand = |i: usize| channel(&digits[i..=i].repeat(2));
            Ok(Color32::from_rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Ok(Color32::from_rgb(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        8 => Ok(Color32::from_rgba_unmultiplied(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
            channel(&digits[6..8])?,
        )),
        _ => Err(invalid()),
    }
}

pub fn to_hex(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

/// Serde adapter storing colors as hex strings.
pub mod hex {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color32, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_hex(&text).map_err(D::Error::custom)
    }
}
