pub mod awards;
pub mod ranking;
