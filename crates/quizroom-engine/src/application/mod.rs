pub mod command_handlers;
pub mod display_hub;
pub mod engine;
pub mod notifier;
pub mod query_handlers;
pub mod state_machine;
