pub mod config;
pub mod database;
pub mod dso;
pub mod fields;
pub mod names;
pub mod record;
