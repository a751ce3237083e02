//! Concrete adapter implementations for ports.

pub mod csv_quotes;
pub mod file_config_adapter;
pub mod sqlite_store;
pub mod web;
