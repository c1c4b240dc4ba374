//! Quizroom Scoring: converts recorded answers into points.
//!
//! Every scoring run recomputes the awards of one step from the current
//! answer records and replaces the step's award set, so entering a scored
//! phase twice never double-counts.

pub mod application;
pub mod domain;
