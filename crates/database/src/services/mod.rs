pub mod coordinator;
pub mod invariants;
pub mod mutation;
pub mod report;
