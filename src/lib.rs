pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod extractor;
pub mod models;
pub mod progress;
pub mod quality;
pub mod url;
