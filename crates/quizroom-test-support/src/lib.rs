//! Shared test mocks and utilities for the Quizroom live quiz engine.

mod clock;
mod repository;
mod rng;
mod transport;

pub use clock::{FixedClock, ManualClock};
pub use repository::FailingRepository;
pub use rng::SequenceRng;
pub use transport::{FailingTransport, RecordingTransport};
