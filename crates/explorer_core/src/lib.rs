//! Exploration-graph state machine: graph merging, navigation history,
//! view state, and the controller that orchestrates retrieval calls against
//! the remote graph service.

pub mod controller;
pub mod gateway;
pub mod graph;
pub mod history;
pub mod view;

pub use controller::{ExplorationController, Projection};
pub use gateway::{HttpGateway, RetrievalError, RetrievalGateway};

#[cfg(test)]
mod tests;
