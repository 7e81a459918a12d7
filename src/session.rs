use std::sync::Arc;

use crate::api::client::RestClient;
use crate::profile::ProfileService;
use crate::service::ThoughtService;
use crate::store::ThoughtStore;

/// Everything scoped to one signed-in user. Built on sign-in, consumed on
/// sign-out; views receive the store handle explicitly.
pub struct Session {
    user_id: String,
    thoughts: Arc<ThoughtStore>,
    profiles: ProfileService,
}

impl Session {
    /// `user_id` must come from an already-verified auth identity.
    pub fn sign_in(client: RestClient, user_id: &str, days_per_load: usize) -> Self {
        tracing::info!(user_id, "session started");
        let service = ThoughtService::with_days_per_load(client.clone(), days_per_load);
        Self {
            user_id: user_id.to_string(),
            thoughts: Arc::new(ThoughtStore::new(service, user_id)),
            profiles: ProfileService::new(client),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn thoughts(&self) -> Arc<ThoughtStore> {
        Arc::clone(&self.thoughts)
    }

    pub fn profiles(&self) -> &ProfileService {
        &self.profiles
    }

    /// Clears the store so any handle still held elsewhere sees an empty view.
    pub fn sign_out(self) {
        self.thoughts.reset();
        tracing::info!(user_id = %self.user_id, "session ended");
    }
}
