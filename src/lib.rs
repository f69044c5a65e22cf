pub mod config;
pub mod entry;
pub mod error;
pub mod item;
pub mod logging;
pub mod movement;
pub mod persist;
pub mod report;
pub mod seed;
pub mod store;
pub mod utils;
