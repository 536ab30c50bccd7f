use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A directed ownership edge: `parent` holds `percent` of `child`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub parent: String,
    pub child: String,
    pub percent: f32,
}

impl Relation {
    pub fn new(parent: &str, child: &str, percent: f32) -> Result<Self, RelationError> {
        let parent = parent.trim();
        let child = child.trim();
        if parent.is_empty() {
            return Err(RelationError::EmptyParent);
        }
        if child.is_empty() {
            return Err(RelationError::EmptyChild);
        }
        if !(0.0..=100.0).contains(&percent) {
            return Err(RelationError::PercentOutOfRange(percent));
        }
        Ok(Self {
            parent: parent.to_string(),
            child: child.to_string(),
            percent,
        })
    }

    /// Connector caption, e.g. `60.0%`.
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelationError {
    #[error("parent company name is empty")]
    EmptyParent,
    #[error("subsidiary company name is empty")]
    EmptyChild,
    #[error("ownership percentage {0} is outside 0..=100")]
    PercentOutOfRange(f32),
}

/// Ordered list of relations as entered by the user.
///
/// Insertion order is the display order of siblings, so the store never
/// reorders or deduplicates. The layout pipeline only ever sees a
/// [`snapshot`](RelationStore::snapshot).
#[derive(Debug, Clone, Default)]
pub struct RelationStore {
    relations: Vec<Relation>,
}

impl RelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, parent: &str, child: &str, percent: f32) -> Result<(), RelationError> {
        let relation = Relation::new(parent, child, percent)?;
        self.relations.push(relation);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<Relation> {
        if index < self.relations.len() {
            Some(self.relations.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.relations.clear();
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Relation> {
        self.relations.clone()
    }
}

impl FromIterator<Relation> for RelationStore {
    fn from_iter<I: IntoIterator<Item = Relation>>(iter: I) -> Self {
        Self {
            relations: iter.into_iter().collect(),
        }
    }
}
