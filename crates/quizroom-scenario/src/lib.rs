//! Quizroom Scenario: scenario file ingestion.
//!
//! Reads the YAML or JSON scenario, normalizes each entry through the
//! mechanic registry, wraps the list with the implicit registration and
//! leaderboard steps, and loads it into an empty store.

pub mod application;
pub mod domain;

pub use application::command_handlers::{LoadReport, load_if_empty};
pub use application::query_handlers::{ScenarioPreview, preview};
pub use domain::error::ScenarioError;
