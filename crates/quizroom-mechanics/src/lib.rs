//! Quizroom Mechanics: the step-type registry.
//!
//! Each question mechanic (registration, open answer with voting, single
//! choice, multi choice, ordering, leaderboard) is a `MechanicHandler`: a
//! flat bundle of capabilities covering its phase count, scenario ingestion,
//! display context, participant prompts, answer handling and phase-entry
//! hook. `MechanicRegistry::standard()` builds the table once at startup.

pub mod application;
pub mod domain;

pub use application::handler::{MechanicContext, MechanicHandler};
pub use application::registry::MechanicRegistry;
pub use domain::outcome::{AnswerOutcome, ProgressUpdate};
pub use domain::render::RenderModel;
pub use domain::scenario_item::ScenarioItem;
