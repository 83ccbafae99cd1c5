//! Group-by-sum summaries over a filtered view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filter::FilteredView;
use crate::record::{Dimension, Measure};

/// A mapping from group key to summed value, keys in ascending order.
///
/// Groups with no rows in the view are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub dimension: Option<Dimension>,
    pub measure: Option<Measure>,
    entries: BTreeMap<String, f64>,
}

impl Aggregate {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn to_vec(&self) -> Vec<(String, f64)> {
        self.entries.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

impl FromIterator<(String, f64)> for Aggregate {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut entries = BTreeMap::new();
        for (key, value) in iter {
            *entries.entry(key).or_insert(0.0) += value;
        }
        Self {
            dimension: None,
            measure: None,
            entries,
        }
    }
}

/// Sum `measure` per distinct value of `dimension`.
pub fn aggregate_by(view: &FilteredView<'_>, dimension: Dimension, measure: Measure) -> Aggregate {
    let mut aggregate: Aggregate = view
        .iter()
        .map(|r| (r.dimension(dimension).into_owned(), r.measure(measure)))
        .collect();
    aggregate.dimension = Some(dimension);
    aggregate.measure = Some(measure);
    aggregate
}

/// Total sales per category.
pub fn sales_by_category(view: &FilteredView<'_>) -> Aggregate {
    aggregate_by(view, Dimension::Category, Measure::Sales)
}

/// Total sales per calendar month (`YYYY-MM`), chronologically ordered.
pub fn sales_by_month(view: &FilteredView<'_>) -> Aggregate {
    aggregate_by(view, Dimension::Month, Measure::Sales)
}

/// A node of a multi-level aggregation (treemap input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub label: String,
    pub value: f64,
    /// Keys from the root down to this node.
    pub path: Vec<String>,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaves below this node, depth-first.
    pub fn leaves(&self) -> Vec<&HierarchyNode> {
        if self.is_leaf() {
            return vec![self];
        }
        self.children.iter().flat_map(|c| c.leaves()).collect()
    }
}

#[derive(Default)]
struct Level {
    value: f64,
    children: BTreeMap<String, Level>,
}

impl Level {
    fn into_nodes(self, path: &[String]) -> Vec<HierarchyNode> {
        self.children
            .into_iter()
            .map(|(label, level)| {
                let mut node_path = path.to_vec();
                node_path.push(label.clone());
                HierarchyNode {
                    label,
                    value: level.value,
                    children: level.into_nodes(&node_path),
                    path: node_path,
                }
            })
            .collect()
    }
}

/// Sum `measure` along a path of dimensions, e.g. Region → Category → Sub-Category.
pub fn hierarchy(view: &FilteredView<'_>, path: &[Dimension], measure: Measure) -> Vec<HierarchyNode> {
    let mut root = Level::default();
    for record in view.iter() {
        let value = record.measure(measure);
        let mut level = &mut root;
        level.value += value;
        for dimension in path {
            level = level
                .children
                .entry(record.dimension(*dimension).into_owned())
                .or_default();
            level.value += value;
        }
    }
    root.into_nodes(&[])
}
