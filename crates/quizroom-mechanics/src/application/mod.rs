pub mod counters;
pub mod handler;
pub mod ingest;
pub mod latency;
pub mod leaderboard;
pub mod multi_choice;
pub mod open_answer;
pub mod ordering;
pub mod registration;
pub mod registry;
pub mod single_choice;
