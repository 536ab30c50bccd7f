use crate::ir::{Relation, RelationError, RelationStore};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static RELATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<parent>.+?)\s*-{2,}>\s*(?P<child>.+?)\s*(?::\s*(?P<percent>[0-9]+(?:[.,][0-9]+)?)\s*%?)?\s*$")
        .unwrap()
});

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: expected `Parent --> Child : percent`, got `{text}`")]
    Syntax { line: usize, text: String },
    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: RelationError,
    },
    #[error("relation {index}: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: RelationError,
    },
    #[error("invalid relation list: {0}")]
    Json(String),
}

#[derive(Debug, Deserialize)]
struct RelationEntry {
    #[serde(alias = "controladora", alias = "Controladora", alias = "holding")]
    parent: String,
    #[serde(alias = "subsidiaria", alias = "Subsidiária", alias = "subsidiary")]
    child: String,
    #[serde(default = "full_ownership", alias = "percentual", alias = "Percentual")]
    percent: f32,
}

fn full_ownership() -> f32 {
    100.0
}

/// Parses a relation list in either the line format or as a JSON/JSON5 array.
///
/// Every relation is validated exactly as [`RelationStore::add`] would.
pub fn parse_relations(input: &str) -> Result<RelationStore, ParseError> {
    if input.trim_start().starts_with('[') {
        parse_json_relations(input)
    } else {
        parse_line_relations(input)
    }
}

fn parse_json_relations(input: &str) -> Result<RelationStore, ParseError> {
    let entries: Vec<RelationEntry> = match serde_json::from_str(input) {
        Ok(entries) => entries,
        Err(_) => json5::from_str(input).map_err(|err| ParseError::Json(err.to_string()))?,
    };
    let mut store = RelationStore::new();
    for (idx, entry) in entries.into_iter().enumerate() {
        store
            .add(&entry.parent, &entry.child, entry.percent)
            .map_err(|source| ParseError::InvalidEntry {
                index: idx + 1,
                source,
            })?;
    }
    Ok(store)
}

fn parse_line_relations(input: &str) -> Result<RelationStore, ParseError> {
    let mut store = RelationStore::new();
    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("%%") || line.starts_with('#') {
            continue;
        }
        let Some(caps) = RELATION_RE.captures(line) else {
            return Err(ParseError::Syntax {
                line: line_no,
                text: line.to_string(),
            });
        };
        let percent = match caps.name("percent") {
            Some(m) => m.as_str().replace(',', ".").parse::<f32>().map_err(|_| ParseError::Syntax {
                line: line_no,
                text: line.to_string(),
            })?,
            None => 100.0,
        };
        store
            .add(&caps["parent"], &caps["child"], percent)
            .map_err(|source| ParseError::Invalid {
                line: line_no,
                source,
            })?;
    }
    Ok(store)
}

/// Renders relations back into the line format, percentages at full precision.
pub fn format_relations(relations: &[Relation]) -> String {
    let mut out = String::new();
    for rel in relations {
        out.push_str(&format!("{} --> {} : {}\n", rel.parent, rel.child, rel.percent));
    }
    out
}
