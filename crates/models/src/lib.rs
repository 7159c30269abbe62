//! Domain types of the curriculum ledger: keys, terms, the mutation catalog,
//! and the pure status functions shared by the mutation engine and reports.

pub mod evaluation;
pub mod fields;
pub mod keys;
pub mod mutation;
pub mod term;
