//! In-memory presentation model.
//!
//! Shapes are positioned in points and converted to EMU only when the package
//! is written. Connectors refer to the shapes they join by id, so the
//! consuming editor keeps them attached when boxes are moved.

mod emit;
mod package;
mod templates;

pub use emit::{build_presentation, emit_organogram};
pub use package::write_package;

pub const EMU_PER_POINT: f32 = 12_700.0;
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Connection site indices of rectangle-like preset geometries.
pub const SITE_TOP: u32 = 0;
pub const SITE_LEFT: u32 = 1;
pub const SITE_BOTTOM: u32 = 2;
pub const SITE_RIGHT: u32 = 3;

pub fn pt_to_emu(pt: f32) -> i64 {
    (pt * EMU_PER_POINT).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn centered_at(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    /// Point of a rectangle connection site.
    pub fn site(&self, site: u32) -> (f32, f32) {
        match site {
            SITE_TOP => (self.x + self.width / 2.0, self.y),
            SITE_LEFT => (self.x, self.y + self.height / 2.0),
            SITE_BOTTOM => (self.x + self.width / 2.0, self.y + self.height),
            _ => (self.x + self.width, self.y + self.height / 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Rect,
    RoundRect,
}

impl Geometry {
    pub fn preset(self) -> &'static str {
        match self {
            Geometry::Rect => "rect",
            Geometry::RoundRect => "roundRect",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub size: f32,
    pub bold: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoShape {
    pub id: u32,
    pub name: String,
    pub geometry: Geometry,
    pub rect: Rect,
    pub text: String,
    pub text_style: TextStyle,
    pub fill: Option<String>,
    pub line: Option<LineStyle>,
    pub shadow: bool,
}

/// Free-floating caption with no fill and no outline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub id: u32,
    pub name: String,
    pub rect: Rect,
    pub text: String,
    pub text_style: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeRef {
    pub id: u32,
    pub site: u32,
}

/// Elbow connector glued to two shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub id: u32,
    pub name: String,
    pub begin: ShapeRef,
    pub end: ShapeRef,
    pub start: (f32, f32),
    pub finish: (f32, f32),
    pub line: LineStyle,
}

impl Connector {
    pub fn midpoint(&self) -> (f32, f32) {
        (
            (self.start.0 + self.finish.0) / 2.0,
            (self.start.1 + self.finish.1) / 2.0,
        )
    }

    /// Orthogonal route with one horizontal run halfway down.
    pub fn elbow_points(&self) -> [(f32, f32); 4] {
        let bend_y = (self.start.1 + self.finish.1) / 2.0;
        [
            self.start,
            (self.start.0, bend_y),
            (self.finish.0, bend_y),
            self.finish,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlideShape {
    Auto(AutoShape),
    Text(TextBox),
    Connector(Connector),
}

impl SlideShape {
    pub fn id(&self) -> u32 {
        match self {
            SlideShape::Auto(shape) => shape.id,
            SlideShape::Text(shape) => shape.id,
            SlideShape::Connector(shape) => shape.id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Slide {
    pub shapes: Vec<SlideShape>,
    next_id: u32,
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

impl Slide {
    pub fn new() -> Self {
        // id 1 is the slide's own shape tree
        Self {
            shapes: Vec::new(),
            next_id: 2,
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_auto_shape(
        &mut self,
        geometry: Geometry,
        rect: Rect,
        text: &str,
        text_style: TextStyle,
    ) -> &mut AutoShape {
        let id = self.alloc_id();
        self.shapes.push(SlideShape::Auto(AutoShape {
            id,
            name: format!("Company {}", id - 1),
            geometry,
            rect,
            text: text.to_string(),
            text_style,
            fill: None,
            line: None,
            shadow: false,
        }));
        match self.shapes.last_mut() {
            Some(SlideShape::Auto(shape)) => shape,
            _ => unreachable!("auto shape was just pushed"),
        }
    }

    pub fn add_text_box(&mut self, rect: Rect, text: &str, text_style: TextStyle) -> u32 {
        let id = self.alloc_id();
        self.shapes.push(SlideShape::Text(TextBox {
            id,
            name: format!("TextBox {}", id - 1),
            rect,
            text: text.to_string(),
            text_style,
        }));
        id
    }

    /// Adds an elbow connector between two existing shapes.
    ///
    /// Returns `None` when either end is not a box on this slide.
    pub fn add_connector(&mut self, begin: ShapeRef, end: ShapeRef, line: LineStyle) -> Option<u32> {
        let start = self.auto_shape(begin.id)?.rect.site(begin.site);
        let finish = self.auto_shape(end.id)?.rect.site(end.site);
        let id = self.alloc_id();
        self.shapes.push(SlideShape::Connector(Connector {
            id,
            name: format!("Elbow Connector {}", id - 1),
            begin,
            end,
            start,
            finish,
            line,
        }));
        Some(id)
    }

    /// Ids are handed out in push order, so the id is the index plus two.
    pub fn shape(&self, id: u32) -> Option<&SlideShape> {
        let index = id.checked_sub(2)? as usize;
        self.shapes.get(index).filter(|shape| shape.id() == id)
    }

    pub fn auto_shape(&self, id: u32) -> Option<&AutoShape> {
        match self.shape(id)? {
            SlideShape::Auto(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn auto_shapes(&self) -> impl Iterator<Item = &AutoShape> {
        self.shapes.iter().filter_map(|shape| match shape {
            SlideShape::Auto(shape) => Some(shape),
            _ => None,
        })
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBox> {
        self.shapes.iter().filter_map(|shape| match shape {
            SlideShape::Text(shape) => Some(shape),
            _ => None,
        })
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.shapes.iter().filter_map(|shape| match shape {
            SlideShape::Connector(shape) => Some(shape),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Presentation {
    pub title: String,
    pub slide_width: f32,
    pub slide_height: f32,
    pub background: String,
    pub slides: Vec<Slide>,
}

impl Presentation {
    pub fn new(title: &str, slide_width: f32, slide_height: f32) -> Self {
        Self {
            title: title.to_string(),
            slide_width,
            slide_height,
            background: "#FFFFFF".to_string(),
            slides: Vec::new(),
        }
    }

    pub fn add_slide(&mut self) -> &mut Slide {
        self.slides.push(Slide::new());
        let idx = self.slides.len() - 1;
        &mut self.slides[idx]
    }

    /// `<slug>.pptx`, slug derived from the title.
    pub fn file_name(&self) -> String {
        format!("{}.pptx", slugify(&self.title))
    }

    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        write_package(self)
    }
}

pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "organogram".to_string()
    } else {
        slug
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            font_family: "Aptos".to_string(),
            size: 12.0,
            bold: false,
            color: "#000000".to_string(),
        }
    }

    fn line() -> LineStyle {
        LineStyle {
            color: "#000000".to_string(),
            width: 1.0,
        }
    }

    #[test]
    fn ids_are_sequential_from_two() {
        let mut slide = Slide::new();
        let a = slide
            .add_auto_shape(Geometry::Rect, Rect::new(0.0, 0.0, 10.0, 10.0), "A", style())
            .id;
        let t = slide.add_text_box(Rect::new(0.0, 0.0, 5.0, 5.0), "x", style());
        assert_eq!((a, t), (2, 3));
    }

    #[test]
    fn connector_snaps_to_sites() {
        let mut slide = Slide::new();
        let a = slide
            .add_auto_shape(Geometry::Rect, Rect::new(0.0, 0.0, 100.0, 50.0), "A", style())
            .id;
        let b = slide
            .add_auto_shape(Geometry::Rect, Rect::new(200.0, 150.0, 100.0, 50.0), "B", style())
            .id;
        let id = slide
            .add_connector(
                ShapeRef { id: a, site: SITE_BOTTOM },
                ShapeRef { id: b, site: SITE_TOP },
                line(),
            )
            .unwrap();
        let Some(SlideShape::Connector(conn)) = slide.shape(id) else {
            panic!("connector missing");
        };
        assert_eq!(conn.start, (50.0, 50.0));
        assert_eq!(conn.finish, (250.0, 150.0));
        assert_eq!(conn.midpoint(), (150.0, 100.0));
        assert_eq!(conn.elbow_points()[1], (50.0, 100.0));
    }

    #[test]
    fn connector_to_missing_shape_is_refused() {
        let mut slide = Slide::new();
        let a = slide
            .add_auto_shape(Geometry::Rect, Rect::new(0.0, 0.0, 10.0, 10.0), "A", style())
            .id;
        let got = slide.add_connector(
            ShapeRef { id: a, site: SITE_BOTTOM },
            ShapeRef { id: 99, site: SITE_TOP },
            line(),
        );
        assert!(got.is_none());
        assert_eq!(slide.connectors().count(), 0);
    }

    #[test]
    fn shape_lookup_by_id() {
        let mut slide = Slide::new();
        for i in 0..50 {
            slide.add_text_box(Rect::new(i as f32, 0.0, 5.0, 5.0), &i.to_string(), style());
        }
        assert!(slide.shape(0).is_none());
        assert!(slide.shape(1).is_none());
        assert!(slide.shape(52).is_none());
        for id in 2..52 {
            assert_eq!(slide.shape(id).map(SlideShape::id), Some(id));
        }
        let Some(SlideShape::Text(last)) = slide.shape(51) else {
            panic!("text box missing");
        };
        assert_eq!(last.text, "49");
    }

    #[test]
    fn rect_sites() {
        let rect = Rect::new(10.0, 20.0, 40.0, 20.0);
        assert_eq!(rect.site(SITE_LEFT), (10.0, 30.0));
        assert_eq!(rect.site(SITE_RIGHT), (50.0, 30.0));
    }

    #[test]
    fn slug_and_file_name() {
        assert_eq!(slugify("Grupo Geaco & Cia."), "grupo-geaco-cia");
        assert_eq!(slugify("***"), "organogram");
        let pres = Presentation::new("Organograma Editável", 720.0, 540.0);
        assert_eq!(pres.file_name(), "organograma-edit-vel.pptx");
    }

    #[test]
    fn emu_conversion() {
        assert_eq!(pt_to_emu(72.0), 914_400);
        assert_eq!(pt_to_emu(0.5), 6_350);
    }
}
