//! Core modules: store resolution, the database broker, schema migration,
//! configuration, and shared output primitives.

pub mod broker;
pub mod config;
pub mod db;
pub mod error;
pub mod migration;
pub mod output;
pub mod schemas;
pub mod store;
pub mod time;
pub mod tui;
