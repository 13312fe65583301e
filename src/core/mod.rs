//! Core functionality: the portfolio document, path edits, configuration and local cache

pub mod cache;
pub mod config;
pub mod document;
pub mod path;
pub mod session;
