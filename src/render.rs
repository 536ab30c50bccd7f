use crate::document::{Geometry, Presentation, escape_xml};
use crate::layout::{Layout, TextBlock};
use crate::theme::Theme;
use anyhow::{Result, anyhow};
use std::path::Path;

/// Vector preview of the first slide.
///
/// Mirrors what the consuming editor shows: same boxes, elbow connectors and
/// captions. Box labels use the wrapped lines computed during layout.
pub fn render_svg(presentation: &Presentation, layout: &Layout, theme: &Theme) -> Result<String> {
    let slide = presentation
        .slides
        .first()
        .ok_or_else(|| anyhow!("Presentation has no slides"))?;
    let width = presentation.slide_width;
    let height = presentation.slide_height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        presentation.background
    ));
    if theme.shadow {
        svg.push_str("<defs><filter id=\"shadow\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\"><feDropShadow dx=\"2\" dy=\"2\" stdDeviation=\"3\" flood-opacity=\"0.35\"/></filter></defs>");
    }

    for shape in slide.auto_shapes() {
        let radius = match shape.geometry {
            Geometry::RoundRect => shape.rect.width.min(shape.rect.height) * 0.1667,
            Geometry::Rect => 0.0,
        };
        let fill = shape.fill.as_deref().unwrap_or("none");
        let (stroke, stroke_width) = match &shape.line {
            Some(line) => (line.color.as_str(), line.width),
            None => ("none", 0.0),
        };
        let filter = if shape.shadow { " filter=\"url(#shadow)\"" } else { "" };
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"{filter}/>",
            shape.rect.x, shape.rect.y, shape.rect.width, shape.rect.height,
        ));
        let fallback;
        let label = match layout.nodes.get(&shape.text) {
            Some(node) => &node.label,
            None => {
                fallback = TextBlock {
                    lines: vec![shape.text.clone()],
                    width: 0.0,
                    height: shape.text_style.size,
                };
                &fallback
            }
        };
        svg.push_str(&text_block_svg(
            shape.rect.x + shape.rect.width / 2.0,
            shape.rect.y + shape.rect.height / 2.0,
            &label.lines,
            shape.text_style.size,
            &shape.text_style.font_family,
            &shape.text_style.color,
            shape.text_style.bold,
        ));
    }

    for conn in slide.connectors() {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            points_to_path(&conn.elbow_points()),
            conn.line.color,
            conn.line.width
        ));
    }

    for label in slide.text_boxes() {
        svg.push_str(&text_block_svg(
            label.rect.x + label.rect.width / 2.0,
            label.rect.y + label.rect.height / 2.0,
            std::slice::from_ref(&label.text),
            label.text_style.size,
            &label.text_style.font_family,
            &label.text_style.color,
            label.text_style.bold,
        ));
    }

    svg.push_str("</svg>");
    Ok(svg)
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

fn text_block_svg(
    x: f32,
    y: f32,
    lines: &[String],
    font_size: f32,
    font_family: &str,
    color: &str,
    bold: bool,
) -> String {
    let line_height = font_size * 1.2;
    let total_height = lines.len() as f32 * line_height;
    let start_y = y - total_height / 2.0 + font_size;
    let weight = if bold { "bold" } else { "normal" };
    let mut text = format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{font_size}\" font-weight=\"{weight}\" fill=\"{color}\">",
        escape_xml(font_family),
    );
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        None => {
            print!("{}", text);
        }
    }
    Ok(())
}

pub fn write_output_pptx(presentation: &Presentation, output: &Path) -> Result<()> {
    let bytes = presentation.to_bytes()?;
    std::fs::write(output, &bytes)?;
    tracing::info!(path = %output.display(), bytes = bytes.len(), "wrote presentation");
    Ok(())
}
