//! Persistence for the curriculum ledger: entities, the guarded mutation
//! engine, and read-only reports.

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod services;
