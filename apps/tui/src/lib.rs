// Export our modules for the binary and tests
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod event;
pub mod loader;
pub mod probe;
pub mod terminal;
pub mod ui;
