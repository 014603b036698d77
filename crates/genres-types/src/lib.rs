pub mod claim;
pub mod config;
