pub mod api;
pub mod app;
pub mod bulk;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod logging;
pub mod models;
pub mod output;
pub mod overlay;
pub mod render;
pub mod utils;

#[cfg(test)]
mod tests;
