use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub depth: usize,
    pub label: TextBlock,
}

impl NodeLayout {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Connection point at the middle of the bottom edge.
    pub fn bottom_anchor(&self) -> (f32, f32) {
        (self.center_x(), self.bottom())
    }

    /// Connection point at the middle of the top edge.
    pub fn top_anchor(&self) -> (f32, f32) {
        (self.center_x(), self.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    pub percent: f32,
    pub label: String,
    /// Orthogonal route: parent bottom, two bends, child top.
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub roots: Vec<String>,
    pub bounds: Bounds,
    pub width: f32,
    pub height: f32,
}
