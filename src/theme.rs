use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerStyle {
    Rounded,
    Square,
}

/// Cosmetic preset for company boxes and connector captions.
///
/// Only the document emitter and the SVG preview read these values; the
/// layout is identical for every preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub font_family: String,
    pub font_size: f32,
    pub label_font_size: f32,
    pub fill_color: String,
    pub border_color: String,
    pub border_width: f32,
    pub text_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub label_color: String,
    pub background: String,
    pub shadow: bool,
    pub corner: CornerStyle,
}

impl Theme {
    pub fn flat() -> Self {
        Self {
            name: "flat".to_string(),
            font_family: "Aptos Display".to_string(),
            font_size: 18.0,
            label_font_size: 10.0,
            fill_color: "#FABE50".to_string(),
            border_color: "#FABE50".to_string(),
            border_width: 1.5,
            text_color: "#000000".to_string(),
            line_color: "#000000".to_string(),
            line_width: 1.5,
            label_color: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            shadow: false,
            corner: CornerStyle::Rounded,
        }
    }

    pub fn neumorphic() -> Self {
        Self {
            name: "neumorphic".to_string(),
            font_family: "Segoe UI".to_string(),
            font_size: 16.0,
            label_font_size: 10.0,
            fill_color: "#E0E5EC".to_string(),
            border_color: "#E0E5EC".to_string(),
            border_width: 0.75,
            text_color: "#2D3748".to_string(),
            line_color: "#718096".to_string(),
            line_width: 1.25,
            label_color: "#2D3748".to_string(),
            background: "#E0E5EC".to_string(),
            shadow: true,
            corner: CornerStyle::Rounded,
        }
    }

    pub fn bordered() -> Self {
        Self {
            name: "bordered".to_string(),
            font_family: "Calibri".to_string(),
            font_size: 16.0,
            label_font_size: 10.0,
            fill_color: "#FFFFFF".to_string(),
            border_color: "#1F3864".to_string(),
            border_width: 2.0,
            text_color: "#1F3864".to_string(),
            line_color: "#1F3864".to_string(),
            line_width: 1.5,
            label_color: "#1F3864".to_string(),
            background: "#FFFFFF".to_string(),
            shadow: false,
            corner: CornerStyle::Square,
        }
    }

    pub fn minimalist() -> Self {
        Self {
            name: "minimalist".to_string(),
            font_family: "Helvetica".to_string(),
            font_size: 14.0,
            label_font_size: 9.0,
            fill_color: "#F5F5F5".to_string(),
            border_color: "#F5F5F5".to_string(),
            border_width: 0.0,
            text_color: "#212121".to_string(),
            line_color: "#9E9E9E".to_string(),
            line_width: 1.0,
            label_color: "#616161".to_string(),
            background: "#FFFFFF".to_string(),
            shadow: false,
            corner: CornerStyle::Square,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "flat" | "default" => Some(Self::flat()),
            "neumorphic" => Some(Self::neumorphic()),
            "bordered" => Some(Self::bordered()),
            "minimalist" | "minimal" => Some(Self::minimalist()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::flat()
    }
}

/// Parses `#RGB` / `#RRGGBB` into its channels.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (idx, ch) in hex.chars().enumerate() {
                let v = ch.to_digit(16)? as u8;
                channels[idx] = v * 17;
            }
            Some((channels[0], channels[1], channels[2]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// Upper-case `RRGGBB` as DrawingML `srgbClr` expects; black on bad input.
pub fn to_srgb_hex(value: &str) -> String {
    let (r, g, b) = parse_hex_color(value).unwrap_or((0, 0, 0));
    format!("{r:02X}{g:02X}{b:02X}")
}

/// WCAG relative luminance contrast ratio between two colors.
pub fn contrast_ratio(a: &str, b: &str) -> f32 {
    fn luminance(color: &str) -> f32 {
        let (r, g, b) = parse_hex_color(color).unwrap_or((0, 0, 0));
        let channel = |c: u8| {
            let c = c as f32 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
    }
    let la = luminance(a);
    let lb = luminance(b);
    let (hi, lo) = if la > lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("#FABE50"), Some((250, 190, 80)));
        assert_eq!(parse_hex_color("FABE50"), None);
        assert_eq!(parse_hex_color("#12"), None);
    }

    #[test]
    fn srgb_hex_is_uppercase() {
        assert_eq!(to_srgb_hex("#fabe50"), "FABE50");
        assert_eq!(to_srgb_hex("not a color"), "000000");
    }

    #[test]
    fn presets_keep_labels_legible() {
        for theme in [
            Theme::flat(),
            Theme::neumorphic(),
            Theme::bordered(),
            Theme::minimalist(),
        ] {
            let ratio = contrast_ratio(&theme.text_color, &theme.fill_color);
            assert!(ratio >= 4.5, "{} text contrast {ratio}", theme.name);
        }
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(Theme::from_name("Neumorphic").map(|t| t.name), Some("neumorphic".to_string()));
        assert!(Theme::from_name("sparkly").is_none());
    }
}
