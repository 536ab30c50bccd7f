use crate::layout::Layout;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub roots: Vec<String>,
    pub bounds: [f32; 4],
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub percent: f32,
    pub label: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                depth: node.depth,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                label_lines: node.label.lines.clone(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                percent: edge.percent,
                label: edge.label.clone(),
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        let b = layout.bounds;
        LayoutDump {
            width: layout.width,
            height: layout.height,
            roots: layout.roots.clone(),
            bounds: [b.min_x, b.min_y, b.max_x, b.max_y],
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump<W: Write>(writer: W, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
