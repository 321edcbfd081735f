pub mod aggregate;
pub mod config;
pub mod discover;
pub mod display;
pub mod errors;
pub mod parse;
pub mod render;
pub mod types;
pub mod viewer;
