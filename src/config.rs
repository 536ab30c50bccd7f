use crate::theme::{CornerStyle, Theme};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry of the forest, in points (1/72 inch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub box_width: f32,
    pub box_height: f32,
    pub sibling_spacing: f32,
    pub level_spacing: f32,
    pub root_spacing: f32,
    pub left_margin: f32,
    pub top_margin: f32,
    pub target_width: f32,
    pub min_height: f32,
    pub center: bool,
    pub label_line_height: f32,
    pub label_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            box_width: 180.0,
            box_height: 86.4,
            sibling_spacing: 36.0,
            level_spacing: 108.0,
            root_spacing: 72.0,
            left_margin: 36.0,
            top_margin: 36.0,
            target_width: 720.0,
            min_height: 540.0,
            center: true,
            label_line_height: 1.2,
            label_padding: 7.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub title: String,
    pub label_width: f32,
    pub label_height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "organogram".to_string(),
            label_width: 43.2,
            label_height: 18.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    style: Option<String>,
    title: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    label_font_size: Option<NumberOrString>,
    fill_color: Option<String>,
    border_color: Option<String>,
    border_width: Option<NumberOrString>,
    text_color: Option<String>,
    line_color: Option<String>,
    line_width: Option<NumberOrString>,
    label_color: Option<String>,
    background: Option<String>,
    shadow_enabled: Option<bool>,
    corner_style: Option<CornerStyle>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    box_width: Option<f32>,
    box_height: Option<f32>,
    sibling_spacing: Option<f32>,
    level_spacing: Option<f32>,
    root_spacing: Option<f32>,
    left_margin: Option<f32>,
    top_margin: Option<f32>,
    target_width: Option<f32>,
    min_height: Option<f32>,
    center: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    title: Option<String>,
    label_width: Option<f32>,
    label_height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val
                .trim()
                .trim_end_matches("pt")
                .trim()
                .parse::<f32>()
                .ok(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Overlays a JSON (or JSON5) config document on the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };

    if let Some(style) = parsed.style.as_deref() {
        config.theme =
            Theme::from_name(style).ok_or_else(|| anyhow!("Unknown style preset: {style}"))?;
    }
    if let Some(title) = parsed.title {
        config.render.title = title;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.and_then(|v| v.as_f32()) {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.label_font_size.and_then(|v| v.as_f32()) {
            config.theme.label_font_size = v;
        }
        if let Some(v) = vars.fill_color {
            config.theme.fill_color = v;
        }
        if let Some(v) = vars.border_color {
            config.theme.border_color = v;
        }
        if let Some(v) = vars.border_width.and_then(|v| v.as_f32()) {
            config.theme.border_width = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.line_width.and_then(|v| v.as_f32()) {
            config.theme.line_width = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.shadow_enabled {
            config.theme.shadow = v;
        }
        if let Some(v) = vars.corner_style {
            config.theme.corner = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.box_width {
            config.layout.box_width = v;
        }
        if let Some(v) = layout.box_height {
            config.layout.box_height = v;
        }
        if let Some(v) = layout.sibling_spacing {
            config.layout.sibling_spacing = v;
        }
        if let Some(v) = layout.level_spacing {
            config.layout.level_spacing = v;
        }
        if let Some(v) = layout.root_spacing {
            config.layout.root_spacing = v;
        }
        if let Some(v) = layout.left_margin {
            config.layout.left_margin = v;
        }
        if let Some(v) = layout.top_margin {
            config.layout.top_margin = v;
        }
        if let Some(v) = layout.target_width {
            config.layout.target_width = v;
        }
        if let Some(v) = layout.min_height {
            config.layout.min_height = v;
        }
        if let Some(v) = layout.center {
            config.layout.center = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.title {
            config.render.title = v;
        }
        if let Some(v) = render.label_width {
            config.render.label_width = v;
        }
        if let Some(v) = render.label_height {
            config.render.label_height = v;
        }
    }

    if config.layout.box_width <= 0.0 || config.layout.box_height <= 0.0 {
        return Err(anyhow!("Box dimensions must be positive"));
    }
    let spacing = [
        ("siblingSpacing", config.layout.sibling_spacing),
        ("levelSpacing", config.layout.level_spacing),
        ("rootSpacing", config.layout.root_spacing),
    ];
    for (name, value) in spacing {
        if !(value >= 0.0) {
            return Err(anyhow!("{name} must not be negative, got {value}"));
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ten_inch_slide() {
        let config = Config::default();
        assert_eq!(config.layout.target_width, 720.0);
        assert_eq!(config.theme.name, "flat");
    }

    #[test]
    fn style_and_variables_overlay() {
        let config = parse_config(
            r##"{"style":"bordered","themeVariables":{"fillColor":"#EEEEEE","fontSize":"12pt"},"layout":{"boxWidth":144}}"##,
        )
        .unwrap();
        assert_eq!(config.theme.name, "bordered");
        assert_eq!(config.theme.fill_color, "#EEEEEE");
        assert_eq!(config.theme.font_size, 12.0);
        assert_eq!(config.layout.box_width, 144.0);
        assert_eq!(config.theme.corner, CornerStyle::Square);
    }

    #[test]
    fn accepts_json5() {
        let config = parse_config("{ style: 'minimalist', title: 'Group', }").unwrap();
        assert_eq!(config.theme.name, "minimalist");
        assert_eq!(config.render.title, "Group");
    }

    #[test]
    fn rejects_negative_spacing() {
        for key in ["siblingSpacing", "levelSpacing", "rootSpacing"] {
            let doc = format!(r#"{{"layout":{{"{key}":-10}}}}"#);
            let err = parse_config(&doc).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
        let config = parse_config(r#"{"layout":{"siblingSpacing":0,"levelSpacing":0}}"#).unwrap();
        assert_eq!(config.layout.level_spacing, 0.0);
    }

    #[test]
    fn render_section_sets_caption_size() {
        let config =
            parse_config(r#"{"render":{"title":"Cap Table","labelWidth":50,"labelHeight":20}}"#)
                .unwrap();
        assert_eq!(config.render.title, "Cap Table");
        assert_eq!(config.render.label_width, 50.0);
        assert_eq!(config.render.label_height, 20.0);
    }

    #[test]
    fn rejects_unknown_style() {
        assert!(parse_config(r#"{"style":"glitter"}"#).is_err());
    }

    #[test]
    fn rejects_degenerate_boxes() {
        assert!(parse_config(r#"{"layout":{"boxHeight":0}}"#).is_err());
    }
}
