pub mod error;
pub mod mutation;
pub mod report;
