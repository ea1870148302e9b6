//! Navigation history: the ordered search/explore breadcrumb trail.
//!
//! The trail always reflects, left to right, the causal order of
//! user-initiated searches and explorations. It is append-only except for
//! explicit truncation when the user rewinds to an earlier crumb.

use shared::domain::Breadcrumb;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationHistory {
    crumbs: Vec<Breadcrumb>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh search replaces the whole trail with a single search step.
    pub fn reset_to_search(&mut self, term: &str) {
        self.crumbs = vec![Breadcrumb::search(term)];
    }

    /// A non-merge explore establishes a seed graph; the trail becomes the
    /// two steps that would have produced it, even when the user explored
    /// straight from a result without a recorded search term.
    pub fn reset_to_explore_from_search(&mut self, title: &str) {
        self.crumbs = vec![Breadcrumb::search(title), Breadcrumb::explore(title)];
    }

    /// A merging explore accumulates; the trail grows by one step.
    pub fn append_explore(&mut self, title: &str) {
        self.crumbs.push(Breadcrumb::explore(title));
    }

    /// Drop everything after `index`. The entry at `index` is retained and
    /// becomes the new tail. Out-of-range indices leave the trail alone.
    pub fn truncate_at(&mut self, index: usize) {
        self.crumbs.truncate(index.saturating_add(1));
    }

    pub fn clear(&mut self) {
        self.crumbs.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Breadcrumb> {
        self.crumbs.get(index)
    }

    pub fn crumbs(&self) -> &[Breadcrumb] {
        &self.crumbs
    }

    pub fn len(&self) -> usize {
        self.crumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }
}
