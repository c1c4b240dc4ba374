//! Route modules, one per audience.

pub mod display;
pub mod health;
pub mod moderator;
pub mod participants;
pub mod scenario;
