#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod document;
pub mod forest;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use document::{PPTX_CONTENT_TYPE, Presentation, build_presentation};
pub use forest::{Forest, build_forest};
pub use ir::{Relation, RelationError, RelationStore};
pub use layout::{Layout, compute_layout};
pub use parser::parse_relations;
pub use render::render_svg;
pub use theme::Theme;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GenerateError {
    #[error("no relations to draw; add at least one relation")]
    NoRelations,
}

/// Everything one generation request produces.
#[derive(Debug, Clone)]
pub struct Generated {
    pub forest: Forest,
    pub layout: Layout,
    pub presentation: Presentation,
}

/// Runs forest building, layout and emission over a relation snapshot.
pub fn generate(relations: &[Relation], config: &Config) -> Result<Generated, GenerateError> {
    if relations.is_empty() {
        return Err(GenerateError::NoRelations);
    }
    let forest = build_forest(relations);
    let layout = compute_layout(&forest, relations, &config.theme, &config.layout);
    let presentation = build_presentation(&layout, relations, &config.theme, &config.render);
    tracing::debug!(
        relations = relations.len(),
        nodes = layout.nodes.len(),
        roots = forest.roots.len(),
        width = layout.width,
        height = layout.height,
        "generated organogram"
    );
    Ok(Generated {
        forest,
        layout,
        presentation,
    })
}

/// Generates the organogram and serializes it as `.pptx` bytes.
pub fn render_pptx(relations: &[Relation], config: &Config) -> anyhow::Result<Vec<u8>> {
    let generated = generate(relations, config)?;
    generated.presentation.to_bytes()
}
