//! Quizroom Engine: the orchestration core.
//!
//! Owns the phase state machine that moves the event through its steps,
//! the display hub that fans render updates out to every connected display,
//! and the participant notifier that pushes prompts through the messaging
//! transport in the background. `QuizEngine` ties them together behind the
//! operations the HTTP surface exposes.

pub mod application;
pub mod domain;

pub use application::display_hub::{DisplayHub, DisplaySubscription};
pub use application::engine::{EngineSettings, QuizEngine};
pub use application::notifier::ParticipantNotifier;
pub use domain::commands::{AdvanceEvent, ParticipantInput, RecordAnswer, RegisterParticipant, ResetEvent};
pub use domain::events::DisplayEvent;
pub use domain::transition::AdvanceOutcome;
pub use quizroom_core::messaging::{Button, DeliveryError, Keyboard, MessagingTransport, Prompt};
