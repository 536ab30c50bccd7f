use crate::config::LayoutConfig;
use crate::theme::Theme;

use super::TextBlock;

/// Wraps a company name to the inner width of its box.
///
/// PowerPoint wraps text itself; this estimate only feeds the SVG preview and
/// the layout dump, so an approximate advance table is enough.
pub(super) fn measure_label(text: &str, theme: &Theme, config: &LayoutConfig) -> TextBlock {
    let max_width = (config.box_width - config.label_padding * 2.0).max(theme.font_size);
    measure_wrapped(text, theme.font_size, max_width, config.label_line_height)
}

pub(super) fn measure_wrapped(
    text: &str,
    font_size: f32,
    max_width: f32,
    line_height: f32,
) -> TextBlock {
    let mut lines = Vec::new();
    for raw in text.lines() {
        lines.extend(wrap_line(raw.trim(), max_width, font_size));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    let width = lines
        .iter()
        .map(|line| text_width(line, font_size))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * line_height;
    TextBlock {
        lines,
        width,
        height,
    }
}

pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.35,
        ' ' => 0.30,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        '@' | '%' | '&' | '#' => 0.90,
        '0'..='9' => 0.60,
        'A'..='Z' => 0.68,
        'a'..='z' => 0.56,
        c if c.is_ascii() => 0.56,
        // CJK and other wide scripts
        c if c as u32 >= 0x2E80 => 1.0,
        _ => 0.62,
    }
}

pub(super) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

pub(super) fn wrap_line(line: &str, max_width: f32, font_size: f32) -> Vec<String> {
    if text_width(line, font_size) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font_size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, font_size) <= max_width {
            current.push_str(word);
        } else {
            // Break a single overlong word at the character that overflows.
            for ch in word.chars() {
                current.push(ch);
                if text_width(&current, font_size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
