//! The exploration controller: single owner of graph, history, view, and
//! loading/error flags, exposing the action surface the renderer consumes.
//!
//! Every action computes its next state from the snapshot it read at
//! dispatch and commits it in one write-lock critical section, so a reader
//! never observes a half-applied transition. Each dispatched retrieval
//! carries a monotonically increasing sequence number; a result arriving
//! after a newer action has committed on the same logical stream is
//! discarded (explicit last-writer-wins).

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{Breadcrumb, Exploration, GraphSnapshot},
    error::ExplorerError,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    gateway::RetrievalGateway,
    graph,
    history::NavigationHistory,
    view::{Tab, ViewMode, ViewState},
};

/// Read-only projection handed to the renderer after every action.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub graph: Option<GraphSnapshot>,
    pub title: Option<String>,
    pub suggested_name: Option<String>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub view: ViewState,
    pub saved: Vec<Exploration>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct ControllerState {
    graph: Option<GraphSnapshot>,
    title: Option<String>,
    suggested_name: Option<String>,
    history: NavigationHistory,
    view: ViewState,
    saved: Vec<Exploration>,
    in_flight: u32,
    error: Option<String>,
    committed_graph_seq: u64,
    committed_saved_seq: u64,
}

/// Logical action streams sequenced independently, so a saved-list refresh
/// can never supersede an in-flight explore and vice versa.
#[derive(Debug, Clone, Copy)]
enum Stream {
    Graph,
    Saved,
}

pub struct ExplorationController {
    gateway: Arc<dyn RetrievalGateway>,
    state: RwLock<ControllerState>,
    next_seq: AtomicU64,
}

impl ExplorationController {
    pub fn new(gateway: Arc<dyn RetrievalGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(ControllerState::default()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub async fn projection(&self) -> Projection {
        Self::project(&*self.state.read().await)
    }

    /// Search the encyclopedia. On success the results replace the current
    /// list, the trail resets to a single search step, the previous graph is
    /// dropped (a fresh search starts an empty exploration), and the view
    /// returns to the expanded results list. On failure nothing changes
    /// beyond the transient error message.
    pub async fn search(&self, term: &str) -> Result<Projection, ExplorerError> {
        let seq = self.begin().await;
        info!(term, seq, "search dispatched");

        match self.gateway.search(term).await {
            Ok(results) => Ok(self
                .commit(seq, Stream::Graph, |state| {
                    state.graph = None;
                    state.title = None;
                    state.suggested_name = None;
                    state.history.reset_to_search(term);
                    state.view.on_search(results);
                })
                .await),
            Err(err) => Err(self.fail(seq, ExplorerError::retrieval(err.to_string())).await),
        }
    }

    /// Expand `title` one hop. The first exploration of a session has no
    /// prior graph to merge into, so the non-merge path establishes the seed
    /// graph and a fresh two-step trail; a merging explore accumulates onto
    /// the snapshot captured at dispatch and appends to the trail.
    pub async fn explore(&self, title: &str, merge: bool) -> Result<Projection, ExplorerError> {
        let seq = self.begin().await;
        let base = if merge {
            self.state.read().await.graph.clone()
        } else {
            None
        };
        info!(title, merge = base.is_some(), seq, "explore dispatched");

        match self.gateway.explore(title).await {
            Ok(incoming) => {
                let merged = base.is_some();
                let snapshot = match base {
                    Some(base) => graph::merge(&base, incoming),
                    None => graph::replace(incoming),
                };
                Ok(self
                    .commit(seq, Stream::Graph, |state| {
                        if merged {
                            state.history.append_explore(title);
                        } else {
                            state.history.reset_to_explore_from_search(title);
                        }
                        state.graph = Some(snapshot);
                        state.title = Some(title.to_string());
                        state.suggested_name = Some(title.to_string());
                        state.view.on_explore();
                    })
                    .await)
            }
            Err(err) => Err(self.fail(seq, ExplorerError::retrieval(err.to_string())).await),
        }
    }

    /// Persist the current graph under `name`. Both constraints are checked
    /// locally before anything is dispatched: an empty name or an absent
    /// graph is a validation failure that never reaches the network. A
    /// successful save also refreshes the saved list and switches to the
    /// explorations tab; if the refresh fails the action reports failure and
    /// commits nothing.
    pub async fn save(&self, name: &str) -> Result<Projection, ExplorerError> {
        let snapshot = self.state.read().await.graph.clone();
        if name.trim().is_empty() {
            return Err(self.validation_failure("save name must not be empty").await);
        }
        let Some(snapshot) = snapshot else {
            return Err(self.validation_failure("no graph to save").await);
        };

        let seq = self.begin().await;
        info!(name, seq, "save dispatched");

        if let Err(err) = self.gateway.save(name, &snapshot).await {
            return Err(self.fail(seq, ExplorerError::retrieval(err.to_string())).await);
        }
        match self.gateway.list_saved().await {
            Ok(saved) => Ok(self
                .commit(seq, Stream::Saved, |state| {
                    state.saved = saved;
                    state.view.tab = Tab::Explorations;
                })
                .await),
            Err(err) => Err(self.fail(seq, ExplorerError::retrieval(err.to_string())).await),
        }
    }

    /// Load a saved exploration: the record's snapshot replaces the graph
    /// wholesale, search results clear, and the trail resets (a loaded graph
    /// has no live search/explore causality). The view lands directly in
    /// graph mode so the loaded graph is visible without another click.
    pub async fn load_saved(&self, record: &Exploration) -> Projection {
        info!(name = %record.name, "loading saved exploration");
        self.commit_local(|state| {
            state.graph = Some(graph::replace(record.graph.clone()));
            state.title = Some(record.name.clone());
            state.suggested_name = Some(record.name.clone());
            state.history.clear();
            state.view.search_results.clear();
            state.view.mode = ViewMode::Graph;
            state.view.results_collapsed = true;
            state.view.tab = Tab::Search;
            state.error = None;
        })
        .await
    }

    /// Rewind to breadcrumb `index` and replay it. A search crumb re-issues
    /// the search (which itself resets the trail); an explore crumb first
    /// truncates the trail so the clicked entry is the tail, then re-fetches
    /// that title and replaces the graph. The replay is a live re-fetch, not
    /// a cache lookup: the graph shown afterwards is whatever the service
    /// returns now.
    pub async fn navigate_breadcrumb(&self, index: usize) -> Result<Projection, ExplorerError> {
        let crumb = self.state.read().await.history.get(index).cloned();
        let Some(crumb) = crumb else {
            return Err(self.validation_failure("no breadcrumb at that index").await);
        };

        match crumb {
            Breadcrumb::Search { term } => self.search(&term).await,
            Breadcrumb::Explore { title } => {
                // Truncation must be observable before the replay runs.
                self.commit_local(|state| state.history.truncate_at(index))
                    .await;

                let seq = self.begin().await;
                info!(title, seq, "breadcrumb replay dispatched");
                match self.gateway.explore(&title).await {
                    Ok(incoming) => Ok(self
                        .commit(seq, Stream::Graph, |state| {
                            state.graph = Some(graph::replace(incoming));
                            state.title = Some(title.clone());
                            state.suggested_name = Some(title.clone());
                            state.view.on_explore();
                        })
                        .await),
                    Err(err) => {
                        Err(self.fail(seq, ExplorerError::retrieval(err.to_string())).await)
                    }
                }
            }
        }
    }

    /// Re-fetch the saved-explorations list.
    pub async fn refresh_saved(&self) -> Result<Projection, ExplorerError> {
        let seq = self.begin().await;
        match self.gateway.list_saved().await {
            Ok(saved) => Ok(self
                .commit(seq, Stream::Saved, |state| state.saved = saved)
                .await),
            Err(err) => Err(self.fail(seq, ExplorerError::retrieval(err.to_string())).await),
        }
    }

    /// Delete a saved exploration and refresh the list, all-or-nothing like
    /// save.
    pub async fn delete_saved(&self, id: &str) -> Result<Projection, ExplorerError> {
        let seq = self.begin().await;
        info!(id, seq, "delete dispatched");

        if let Err(err) = self.gateway.delete(id).await {
            return Err(self.fail(seq, ExplorerError::retrieval(err.to_string())).await);
        }
        match self.gateway.list_saved().await {
            Ok(saved) => Ok(self
                .commit(seq, Stream::Saved, |state| state.saved = saved)
                .await),
            Err(err) => Err(self.fail(seq, ExplorerError::retrieval(err.to_string())).await),
        }
    }

    pub async fn toggle_results_collapsed(&self) -> Projection {
        self.update_view(|state| state.view.toggle_results_collapsed())
            .await
    }

    /// Select a node by id. Selecting an id the current snapshot does not
    /// contain is ignored rather than recorded as a dangling pointer.
    pub async fn select_node(&self, id: &str) -> Projection {
        self.update_view(|state| {
            let present = state
                .graph
                .as_ref()
                .is_some_and(|graph| graph.contains_node(id));
            if present {
                state.view.selected_node = Some(id.to_string());
            }
        })
        .await
    }

    pub async fn set_view_mode(&self, mode: ViewMode) -> Projection {
        self.update_view(|state| {
            let has_graph = state.graph.is_some();
            state.view.request_mode(mode, has_graph);
        })
        .await
    }

    fn project(state: &ControllerState) -> Projection {
        Projection {
            graph: state.graph.clone(),
            title: state.title.clone(),
            suggested_name: state.suggested_name.clone(),
            breadcrumbs: state.history.crumbs().to_vec(),
            view: state.view.clone(),
            saved: state.saved.clone(),
            loading: state.in_flight > 0,
            error: state.error.clone(),
        }
    }

    /// Mark a retrieval in flight: allocate its sequence number, raise the
    /// loading flag, clear any stale error.
    async fn begin(&self) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let mut state = self.state.write().await;
        state.in_flight += 1;
        state.error = None;
        seq
    }

    /// Commit an action's effects unless a newer action on the same stream
    /// already committed, in which case the result is discarded. Either way
    /// the loading flag drops.
    async fn commit<F>(&self, seq: u64, stream: Stream, apply: F) -> Projection
    where
        F: FnOnce(&mut ControllerState),
    {
        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);

        let committed = match stream {
            Stream::Graph => &mut state.committed_graph_seq,
            Stream::Saved => &mut state.committed_saved_seq,
        };
        if seq <= *committed {
            debug!(seq, committed = *committed, "discarding superseded result");
            return Self::project(&state);
        }
        *committed = seq;

        apply(&mut state);
        let ControllerState { graph, view, .. } = &mut *state;
        view.reconcile_selection(graph.as_ref());
        Self::project(&state)
    }

    /// Commit a local (non-retrieval) graph-stream transition. It still
    /// claims a fresh sequence number so that older in-flight retrievals
    /// resolving afterwards are discarded rather than clobbering it.
    async fn commit_local<F>(&self, apply: F) -> Projection
    where
        F: FnOnce(&mut ControllerState),
    {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let mut state = self.state.write().await;
        state.committed_graph_seq = seq;
        apply(&mut state);
        let ControllerState { graph, view, .. } = &mut *state;
        view.reconcile_selection(graph.as_ref());
        Self::project(&state)
    }

    /// View-only tweaks do not claim a sequence number; toggling a flag must
    /// never cause an in-flight retrieval to be discarded.
    async fn update_view<F>(&self, apply: F) -> Projection
    where
        F: FnOnce(&mut ControllerState),
    {
        let mut state = self.state.write().await;
        apply(&mut state);
        Self::project(&state)
    }

    async fn fail(&self, seq: u64, err: ExplorerError) -> ExplorerError {
        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        state.error = Some(err.to_string());
        warn!(seq, error = %err, "action failed");
        err
    }

    async fn validation_failure(&self, message: &str) -> ExplorerError {
        let err = ExplorerError::validation(message);
        let mut state = self.state.write().await;
        state.error = Some(err.to_string());
        warn!(error = %err, "rejected locally");
        err
    }
}
