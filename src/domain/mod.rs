//! Core domain types and ledger logic.

pub mod error;
pub mod ledger;
pub mod portfolio;
pub mod records;
