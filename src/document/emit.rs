use std::collections::HashMap;

use crate::config::RenderConfig;
use crate::ir::Relation;
use crate::layout::Layout;
use crate::theme::{CornerStyle, Theme};

use super::{
    Geometry, LineStyle, Presentation, Rect, SITE_BOTTOM, SITE_TOP, ShapeRef, Slide, TextStyle,
};

/// Builds a one-slide presentation sized to the layout canvas.
pub fn build_presentation(
    layout: &Layout,
    relations: &[Relation],
    theme: &Theme,
    render: &RenderConfig,
) -> Presentation {
    let mut presentation = Presentation::new(&render.title, layout.width, layout.height);
    presentation.background = theme.background.clone();
    let slide = presentation.add_slide();
    emit_organogram(slide, relations, layout, theme, render);
    presentation
}

/// Draws one box per positioned company, then one glued elbow connector and
/// one percentage caption per relation.
pub fn emit_organogram(
    slide: &mut Slide,
    relations: &[Relation],
    layout: &Layout,
    theme: &Theme,
    render: &RenderConfig,
) {
    let geometry = match theme.corner {
        CornerStyle::Rounded => Geometry::RoundRect,
        CornerStyle::Square => Geometry::Rect,
    };
    let box_text = TextStyle {
        font_family: theme.font_family.clone(),
        size: theme.font_size,
        bold: true,
        color: theme.text_color.clone(),
    };
    let caption = TextStyle {
        font_family: theme.font_family.clone(),
        size: theme.label_font_size,
        bold: false,
        color: theme.label_color.clone(),
    };
    let line = LineStyle {
        color: theme.line_color.clone(),
        width: theme.line_width,
    };

    let mut shape_ids: HashMap<&str, u32> = HashMap::with_capacity(layout.nodes.len());
    for (name, node) in &layout.nodes {
        let rect = Rect::new(node.x, node.y, node.width, node.height);
        let shape = slide.add_auto_shape(geometry, rect, name, box_text.clone());
        shape.fill = Some(theme.fill_color.clone());
        if theme.border_width > 0.0 {
            shape.line = Some(LineStyle {
                color: theme.border_color.clone(),
                width: theme.border_width,
            });
        }
        shape.shadow = theme.shadow;
        shape_ids.insert(name.as_str(), shape.id);
    }

    let mut skipped = 0usize;
    for rel in relations {
        let (Some(&from), Some(&to)) = (
            shape_ids.get(rel.parent.as_str()),
            shape_ids.get(rel.child.as_str()),
        ) else {
            tracing::warn!(parent = %rel.parent, child = %rel.child, "relation endpoint has no shape, skipping");
            skipped += 1;
            continue;
        };
        let Some(conn_id) = slide.add_connector(
            ShapeRef {
                id: from,
                site: SITE_BOTTOM,
            },
            ShapeRef {
                id: to,
                site: SITE_TOP,
            },
            line.clone(),
        ) else {
            skipped += 1;
            continue;
        };
        let (mid_x, mid_y) = match slide.shape(conn_id) {
            Some(super::SlideShape::Connector(conn)) => conn.midpoint(),
            _ => continue,
        };
        slide.add_text_box(
            Rect::centered_at(mid_x, mid_y, render.label_width, render.label_height),
            &rel.percent_label(),
            caption.clone(),
        );
    }

    tracing::debug!(
        boxes = shape_ids.len(),
        connectors = relations.len() - skipped,
        skipped,
        "emitted organogram slide"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::document::SlideShape;
    use crate::forest::build_forest;
    use crate::layout::compute_layout;

    fn rel(parent: &str, child: &str, percent: f32) -> Relation {
        Relation::new(parent, child, percent).unwrap()
    }

    fn presentation_for(relations: &[Relation], theme: &Theme) -> Presentation {
        let forest = build_forest(relations);
        let layout = compute_layout(&forest, relations, theme, &LayoutConfig::default());
        build_presentation(&layout, relations, theme, &RenderConfig::default())
    }

    #[test]
    fn boxes_come_before_connectors() {
        let relations = [rel("Holding", "Sub1", 60.0), rel("Holding", "Sub2", 40.0)];
        let pres = presentation_for(&relations, &Theme::flat());
        let slide = &pres.slides[0];
        let first_connector = slide
            .shapes
            .iter()
            .position(|s| matches!(s, SlideShape::Connector(_)))
            .unwrap();
        let last_box = slide
            .shapes
            .iter()
            .rposition(|s| matches!(s, SlideShape::Auto(_)))
            .unwrap();
        assert!(last_box < first_connector);
        assert_eq!(slide.auto_shapes().count(), 3);
        assert_eq!(slide.connectors().count(), 2);
    }

    #[test]
    fn captions_sit_on_connector_midpoints() {
        let relations = [rel("A", "B", 100.0)];
        let pres = presentation_for(&relations, &Theme::flat());
        let slide = &pres.slides[0];
        let conn = slide.connectors().next().unwrap();
        let label = slide.text_boxes().next().unwrap();
        let (mx, my) = conn.midpoint();
        assert!((label.rect.x + label.rect.width / 2.0 - mx).abs() < 0.01);
        assert!((label.rect.y + label.rect.height / 2.0 - my).abs() < 0.01);
        assert_eq!(label.text, "100.0%");
    }

    #[test]
    fn connectors_reference_parent_bottom_and_child_top() {
        let relations = [rel("A", "B", 25.0)];
        let pres = presentation_for(&relations, &Theme::flat());
        let slide = &pres.slides[0];
        let conn = slide.connectors().next().unwrap();
        let a = slide.auto_shapes().find(|s| s.text == "A").unwrap();
        let b = slide.auto_shapes().find(|s| s.text == "B").unwrap();
        assert_eq!(conn.begin, ShapeRef { id: a.id, site: SITE_BOTTOM });
        assert_eq!(conn.end, ShapeRef { id: b.id, site: SITE_TOP });
    }

    #[test]
    fn style_preset_changes_only_cosmetics() {
        let relations = [rel("A", "B", 25.0), rel("A", "C", 75.0)];
        let flat = presentation_for(&relations, &Theme::flat());
        let minimal = presentation_for(&relations, &Theme::minimalist());
        let flat_rects: Vec<Rect> = flat.slides[0].auto_shapes().map(|s| s.rect).collect();
        let minimal_rects: Vec<Rect> = minimal.slides[0].auto_shapes().map(|s| s.rect).collect();
        assert_eq!(flat_rects, minimal_rects);
        let shape = minimal.slides[0].auto_shapes().next().unwrap();
        assert_eq!(shape.geometry, Geometry::Rect);
        assert!(shape.line.is_none());
    }

    #[test]
    fn dangling_relation_is_skipped() {
        let relations = [rel("A", "B", 25.0)];
        let forest = build_forest(&relations);
        let theme = Theme::flat();
        let layout = compute_layout(&forest, &relations, &theme, &LayoutConfig::default());
        let with_ghost = [rel("A", "B", 25.0), rel("A", "Ghost", 10.0)];
        let pres = build_presentation(&layout, &with_ghost, &theme, &RenderConfig::default());
        assert_eq!(pres.slides[0].connectors().count(), 1);
        assert_eq!(pres.slides[0].text_boxes().count(), 1);
    }
}
