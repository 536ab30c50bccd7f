use crate::ir::Relation;
use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, PartialEq)]
pub struct ChildRef {
    pub name: String,
    pub percent: f32,
}

/// Ownership forest derived from a relation list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    /// Children per parent, in relation order. Only parents have entries.
    pub children: IndexMap<String, Vec<ChildRef>>,
    pub roots: Vec<String>,
    /// Every distinct name, in order of first appearance.
    pub nodes: IndexSet<String>,
}

impl Forest {
    pub fn children_of(&self, name: &str) -> &[ChildRef] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub fn build_forest(relations: &[Relation]) -> Forest {
    let mut children: IndexMap<String, Vec<ChildRef>> = IndexMap::new();
    let mut nodes: IndexSet<String> = IndexSet::new();
    let mut child_nodes: IndexSet<&str> = IndexSet::new();

    for rel in relations {
        children
            .entry(rel.parent.clone())
            .or_default()
            .push(ChildRef {
                name: rel.child.clone(),
                percent: rel.percent,
            });
        nodes.insert(rel.parent.clone());
        nodes.insert(rel.child.clone());
        child_nodes.insert(rel.child.as_str());
    }

    let mut roots: Vec<String> = nodes
        .iter()
        .filter(|name| !child_nodes.contains(name.as_str()))
        .cloned()
        .collect();

    // Cycle components have no natural root; promote their first-seen node
    // until every node hangs off some root.
    let mut reached = reachable_from(&roots, &children);
    while reached.len() < nodes.len() {
        let Some(forced) = nodes.iter().find(|name| !reached.contains(*name)) else {
            break;
        };
        tracing::debug!(root = %forced, "forcing root for unreachable component");
        roots.push(forced.clone());
        reached = reachable_from(&roots, &children);
    }

    Forest {
        children,
        roots,
        nodes,
    }
}

fn reachable_from(roots: &[String], children: &IndexMap<String, Vec<ChildRef>>) -> IndexSet<String> {
    let mut seen: IndexSet<String> = IndexSet::new();
    let mut stack: Vec<&str> = roots.iter().map(String::as_str).collect();
    while let Some(name) = stack.pop() {
        if !seen.insert(name.to_string()) {
            continue;
        }
        if let Some(kids) = children.get(name) {
            for kid in kids {
                if !seen.contains(kid.name.as_str()) {
                    stack.push(kid.name.as_str());
                }
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(parent: &str, child: &str, percent: f32) -> Relation {
        Relation::new(parent, child, percent).unwrap()
    }

    #[test]
    fn single_holding_with_two_subsidiaries() {
        let forest = build_forest(&[rel("Holding", "Sub1", 60.0), rel("Holding", "Sub2", 40.0)]);
        assert_eq!(forest.roots, vec!["Holding"]);
        let kids = forest.children_of("Holding");
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[0].name, "Sub1");
        assert_eq!(kids[1].percent, 40.0);
        assert!(forest.children_of("Sub1").is_empty());
    }

    #[test]
    fn roots_follow_first_appearance() {
        let forest = build_forest(&[
            rel("Zeta", "Z1", 10.0),
            rel("Alpha", "A1", 10.0),
            rel("Mid", "M1", 10.0),
        ]);
        assert_eq!(forest.roots, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn pure_cycle_forces_first_node() {
        let forest = build_forest(&[rel("X", "Y", 10.0), rel("Y", "X", 10.0)]);
        assert_eq!(forest.roots, vec!["X"]);
    }

    #[test]
    fn detached_cycle_gets_its_own_root() {
        let forest = build_forest(&[
            rel("A", "B", 50.0),
            rel("X", "Y", 10.0),
            rel("Y", "X", 10.0),
        ]);
        assert_eq!(forest.roots, vec!["A", "X"]);
    }

    #[test]
    fn rebuild_is_stable() {
        let relations = [rel("P", "Q", 1.0), rel("Q", "P", 2.0), rel("R", "S", 3.0)];
        assert_eq!(build_forest(&relations), build_forest(&relations));
    }

    #[test]
    fn duplicate_relations_are_both_kept() {
        let forest = build_forest(&[rel("A", "B", 30.0), rel("A", "B", 70.0)]);
        assert_eq!(forest.children_of("A").len(), 2);
        assert_eq!(forest.nodes.len(), 2);
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        let forest = build_forest(&[]);
        assert!(forest.is_empty());
        assert!(forest.roots.is_empty());
    }
}
