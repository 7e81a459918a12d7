pub mod api;
pub mod dates;
pub mod error;
pub mod profile;
pub mod service;
pub mod session;
pub mod store;
pub mod thoughts;

#[cfg(test)]
pub(crate) mod test_helpers;

// Convenience re-exports
pub use api::client::RestClient;
pub use api::types::{Thought, ThoughtWithNumber, ThoughtsByDate, UserProfile};
pub use error::{MindTraceError, ProfileError, Result, ThoughtError};
pub use service::{ThoughtPage, ThoughtService, DAYS_PER_LOAD};
pub use session::Session;
pub use store::{ThoughtState, ThoughtStore};
