use serde::{Deserialize, Serialize};

/// One article in the exploration graph. `id` is the stable article
/// identifier; at most one node per id may exist in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Display weight computed upstream by the graph service, carried as-is.
    #[serde(
        default,
        rename = "degree_centrality",
        skip_serializing_if = "Option::is_none"
    )]
    pub centrality: Option<f64>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            summary: None,
            centrality: None,
        }
    }
}

/// Directed link between two articles. Identity key is the ordered
/// `(from, to)` pair. Endpoints are not validated against the node set;
/// dangling references reflect upstream data and are tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.from, &self.to)
    }
}

/// Immutable node/edge set representing the exploration graph at one
/// instant. Every mutation builds a new snapshot; consumers never observe
/// an in-place edit mid-transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }
}

/// One hit from an encyclopedia search. `snippet` is HTML-bearing and
/// carried opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
}

/// A saved exploration record as the graph service stores it: a named,
/// server-identified snapshot with the graph fields flattened alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exploration {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub graph: GraphSnapshot,
}

/// One step in the user's search/explore trail. The wire discriminants
/// (`search`/`graph`) match the view modes the steps lead to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Breadcrumb {
    #[serde(rename = "search")]
    Search { term: String },
    #[serde(rename = "graph")]
    Explore { title: String },
}

impl Breadcrumb {
    pub fn search(term: impl Into<String>) -> Self {
        Self::Search { term: term.into() }
    }

    pub fn explore(title: impl Into<String>) -> Self {
        Self::Explore {
            title: title.into(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Search { term } => format!("Search: \"{term}\""),
            Self::Explore { title } => title.clone(),
        }
    }
}
