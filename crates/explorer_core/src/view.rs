//! View state: display mode, search results, collapse flag, selection.
//!
//! These fields were free-floating UI state in earlier iterations; they are
//! consolidated into one value object owned by the controller so the action
//! surface can be tested without a rendering harness.

use shared::domain::{GraphSnapshot, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    SearchResults,
    Graph,
}

/// Which workspace the UI shows: the search/explore flow or the list of
/// saved explorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Search,
    Explorations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub mode: ViewMode,
    pub tab: Tab,
    pub search_results: Vec<SearchResult>,
    pub results_collapsed: bool,
    pub selected_node: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: ViewMode::SearchResults,
            tab: Tab::Search,
            search_results: Vec::new(),
            results_collapsed: false,
            selected_node: None,
        }
    }
}

impl ViewState {
    /// A new search lands in the expanded results list with nothing selected.
    pub fn on_search(&mut self, results: Vec<SearchResult>) {
        self.search_results = results;
        self.mode = ViewMode::SearchResults;
        self.tab = Tab::Search;
        self.results_collapsed = false;
        self.selected_node = None;
    }

    /// Any explore (merging or not) switches to the graph with the results
    /// list collapsed out of the way.
    pub fn on_explore(&mut self) {
        self.mode = ViewMode::Graph;
        self.results_collapsed = true;
    }

    /// The collapse toggle only has meaning while the results list is the
    /// active view; it never touches graph contents.
    pub fn toggle_results_collapsed(&mut self) {
        if self.mode == ViewMode::SearchResults {
            self.results_collapsed = !self.results_collapsed;
        }
    }

    /// Graph mode is only reachable while a snapshot exists; there is
    /// nothing a renderer could show otherwise, so the request is a no-op.
    pub fn request_mode(&mut self, mode: ViewMode, has_graph: bool) {
        if mode == ViewMode::Graph && !has_graph {
            return;
        }
        self.mode = mode;
    }

    /// Drop the selection unless the current snapshot still contains the
    /// selected id. Presence is checked, never assumed: a replacement or
    /// load may have removed the node the pointer referred to.
    pub fn reconcile_selection(&mut self, snapshot: Option<&GraphSnapshot>) {
        let still_present = match (&self.selected_node, snapshot) {
            (Some(id), Some(snapshot)) => snapshot.contains_node(id),
            _ => false,
        };
        if !still_present {
            self.selected_node = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::Node;

    use super::*;

    fn graph_with(ids: &[&str]) -> GraphSnapshot {
        GraphSnapshot {
            nodes: ids.iter().map(|id| Node::new(*id, *id)).collect(),
            edges: Vec::new(),
        }
    }

    #[test]
    fn search_expands_results_and_clears_selection() {
        let mut view = ViewState::default();
        view.selected_node = Some("Cat".into());
        view.results_collapsed = true;
        view.mode = ViewMode::Graph;

        view.on_search(Vec::new());
        assert_eq!(view.mode, ViewMode::SearchResults);
        assert!(!view.results_collapsed);
        assert!(view.selected_node.is_none());
    }

    #[test]
    fn explore_collapses_results_into_graph_mode() {
        let mut view = ViewState::default();
        view.on_explore();
        assert_eq!(view.mode, ViewMode::Graph);
        assert!(view.results_collapsed);
    }

    #[test]
    fn collapse_toggle_is_inert_in_graph_mode() {
        let mut view = ViewState::default();
        view.on_explore();
        let collapsed = view.results_collapsed;
        view.toggle_results_collapsed();
        assert_eq!(view.results_collapsed, collapsed);

        view.request_mode(ViewMode::SearchResults, true);
        view.toggle_results_collapsed();
        assert_ne!(view.results_collapsed, collapsed);
    }

    #[test]
    fn graph_mode_requires_a_snapshot() {
        let mut view = ViewState::default();
        view.request_mode(ViewMode::Graph, false);
        assert_eq!(view.mode, ViewMode::SearchResults);

        view.request_mode(ViewMode::Graph, true);
        assert_eq!(view.mode, ViewMode::Graph);
    }

    #[test]
    fn selection_survives_only_while_present() {
        let mut view = ViewState::default();
        view.selected_node = Some("B".into());

        view.reconcile_selection(Some(&graph_with(&["A", "B"])));
        assert_eq!(view.selected_node.as_deref(), Some("B"));

        view.reconcile_selection(Some(&graph_with(&["A", "C"])));
        assert!(view.selected_node.is_none());

        view.selected_node = Some("A".into());
        view.reconcile_selection(None);
        assert!(view.selected_node.is_none());
    }
}
