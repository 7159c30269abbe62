pub mod health;
pub mod mutation;
pub mod report;
pub mod root;
