pub mod client;
pub mod queries;
pub mod query;
pub mod types;
