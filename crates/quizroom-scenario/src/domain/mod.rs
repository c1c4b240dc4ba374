pub mod commands;
pub mod document;
pub mod error;
