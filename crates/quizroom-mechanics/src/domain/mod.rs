pub mod format;
pub mod outcome;
pub mod render;
pub mod scenario_item;
pub mod texts;
