//! Quizroom Core: shared domain abstractions.
//!
//! This crate defines the data model, the persistence seam and the
//! determinism traits that every other crate depends on. It contains no
//! infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod messaging;
pub mod model;
pub mod repository;
pub mod rng;
