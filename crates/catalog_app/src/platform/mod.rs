mod app;
mod commands;
mod config;
mod render;

pub use app::run_app;
