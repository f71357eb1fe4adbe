pub mod config;
pub mod exam;
pub mod timer;
