mod text;
pub(crate) mod types;
pub use types::*;
use text::*;

use crate::config::LayoutConfig;
use crate::forest::Forest;
use crate::ir::Relation;
use crate::theme::Theme;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
struct Placement {
    name: String,
    x: f32,
    depth: usize,
}

/// Per-root state threaded through the recursive walk.
///
/// `level_right` holds the running right edge per depth, `sibling_count` the
/// number of boxes already placed per depth. Both start empty for every root;
/// each root is laid out in its own band beginning at `band_start`.
/// `laid_out` is shared by all roots: a name enters it on first visit and is
/// never descended into again.
struct TraversalContext<'a> {
    forest: &'a Forest,
    config: &'a LayoutConfig,
    band_start: f32,
    level_right: Vec<Option<f32>>,
    sibling_count: Vec<usize>,
    laid_out: HashSet<&'a str>,
    placed: Vec<Placement>,
}

impl<'a> TraversalContext<'a> {
    fn new(
        forest: &'a Forest,
        config: &'a LayoutConfig,
        band_start: f32,
        laid_out: HashSet<&'a str>,
    ) -> Self {
        Self {
            forest,
            config,
            band_start,
            level_right: Vec::new(),
            sibling_count: Vec::new(),
            laid_out,
            placed: Vec::new(),
        }
    }

    fn next_free_x(&self, depth: usize) -> f32 {
        match self.level_right.get(depth).copied().flatten() {
            Some(right) => right + self.config.sibling_spacing,
            None => self.band_start,
        }
    }

    fn mark(&mut self, depth: usize, right: f32) {
        if self.level_right.len() <= depth {
            self.level_right.resize(depth + 1, None);
        }
        let slot = &mut self.level_right[depth];
        *slot = Some(slot.map_or(right, |current| current.max(right)));
    }

    /// Places `name` and its subtree, returning the x of `name`.
    ///
    /// Children go first; the parent then sits centered over its first and
    /// last newly placed child. When that spot is already taken at the
    /// parent's depth the whole subtree placed since entry moves right.
    /// Children laid out earlier (ancestors on a cycle, or a company already
    /// placed under another parent) keep their box and only get a connector.
    fn place(&mut self, name: &'a str, depth: usize) -> f32 {
        let forest = self.forest;
        let start = self.placed.len();
        self.laid_out.insert(name);
        let mut span: Option<(f32, f32)> = None;
        for child in forest.children_of(name) {
            if self.laid_out.contains(child.name.as_str()) {
                continue;
            }
            let child_x = self.place(child.name.as_str(), depth + 1);
            span = Some(match span {
                Some((first, _)) => (first, child_x),
                None => (child_x, child_x),
            });
        }

        let min_x = self.next_free_x(depth);
        let x = match span {
            Some((first, last)) => {
                let centered = (first + last) / 2.0;
                if centered < min_x {
                    self.shift_since(start, min_x - centered);
                    min_x
                } else {
                    centered
                }
            }
            None => min_x,
        };

        self.placed.push(Placement {
            name: name.to_string(),
            x,
            depth,
        });
        self.mark(depth, x + self.config.box_width);
        if self.sibling_count.len() <= depth {
            self.sibling_count.resize(depth + 1, 0);
        }
        self.sibling_count[depth] += 1;
        x
    }

    fn shift_since(&mut self, start: usize, dx: f32) {
        let width = self.config.box_width;
        let mut touched: Vec<(usize, f32)> = Vec::new();
        for placement in &mut self.placed[start..] {
            placement.x += dx;
            touched.push((placement.depth, placement.x + width));
        }
        for (depth, right) in touched {
            self.mark(depth, right);
        }
    }
}

pub fn compute_layout(
    forest: &Forest,
    relations: &[Relation],
    theme: &Theme,
    config: &LayoutConfig,
) -> Layout {
    let level_step = config.box_height + config.level_spacing;
    let mut placements: Vec<Placement> = Vec::new();
    let mut x_offset = config.left_margin;
    let mut laid_out: HashSet<&str> = HashSet::with_capacity(forest.nodes.len());

    for root in &forest.roots {
        if laid_out.contains(root.as_str()) {
            continue;
        }
        let mut ctx = TraversalContext::new(forest, config, x_offset, laid_out);
        ctx.place(root.as_str(), 0);
        tracing::debug!(
            root = %root,
            boxes = ctx.placed.len(),
            levels = ctx.level_right.len(),
            widest = ctx.sibling_count.iter().copied().max().unwrap_or(0),
            "laid out tree"
        );
        let max_right = ctx
            .placed
            .iter()
            .map(|p| p.x + config.box_width)
            .fold(x_offset, f32::max);
        x_offset = max_right + config.root_spacing;
        laid_out = ctx.laid_out;
        placements.extend(ctx.placed);
    }

    let mut nodes: BTreeMap<String, NodeLayout> = BTreeMap::new();
    for placement in placements {
        let label = measure_label(&placement.name, theme, config);
        nodes.insert(
            placement.name.clone(),
            NodeLayout {
                id: placement.name,
                x: placement.x,
                y: config.top_margin + placement.depth as f32 * level_step,
                width: config.box_width,
                height: config.box_height,
                depth: placement.depth,
                label,
            },
        );
    }

    let mut bounds = compute_bounds(&nodes);
    if config.center && !nodes.is_empty() && bounds.width() < config.target_width {
        let shift = (config.target_width - bounds.width()) / 2.0 - bounds.min_x;
        for node in nodes.values_mut() {
            node.x += shift;
        }
        bounds.min_x += shift;
        bounds.max_x += shift;
    }

    let edges = route_edges(relations, &nodes);

    let width = config.target_width.max(bounds.max_x + config.left_margin);
    let height = config.min_height.max(bounds.max_y + config.top_margin);

    Layout {
        nodes,
        edges,
        roots: forest.roots.clone(),
        bounds,
        width,
        height,
    }
}

fn compute_bounds(nodes: &BTreeMap<String, NodeLayout>) -> Bounds {
    if nodes.is_empty() {
        return Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        };
    }
    let mut bounds = Bounds {
        min_x: f32::MAX,
        min_y: f32::MAX,
        max_x: f32::MIN,
        max_y: f32::MIN,
    };
    for node in nodes.values() {
        bounds.min_x = bounds.min_x.min(node.x);
        bounds.min_y = bounds.min_y.min(node.y);
        bounds.max_x = bounds.max_x.max(node.right());
        bounds.max_y = bounds.max_y.max(node.bottom());
    }
    bounds
}

fn route_edges(relations: &[Relation], nodes: &BTreeMap<String, NodeLayout>) -> Vec<EdgeLayout> {
    let mut edges = Vec::with_capacity(relations.len());
    for rel in relations {
        let (Some(from), Some(to)) = (nodes.get(&rel.parent), nodes.get(&rel.child)) else {
            tracing::warn!(parent = %rel.parent, child = %rel.child, "skipping relation with unplaced endpoint");
            continue;
        };
        let start = from.bottom_anchor();
        let end = to.top_anchor();
        let bend_y = (start.1 + end.1) / 2.0;
        edges.push(EdgeLayout {
            from: rel.parent.clone(),
            to: rel.child.clone(),
            percent: rel.percent,
            label: rel.percent_label(),
            points: vec![start, (start.0, bend_y), (end.0, bend_y), end],
        });
    }
    edges
}
