//! Session-scoped view of a user's loaded thoughts.
//!
//! Every mutator awaits the remote call first and only then applies the
//! change locally, so a failed call leaves the state untouched. The mutex is
//! never held across an `.await`.

use std::collections::HashSet;

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::api::types::{Thought, ThoughtWithNumber, ThoughtsByDate};
use crate::error::{ThoughtError, ThoughtResult};
use crate::service::ThoughtService;
use crate::thoughts::{
    find_thought, find_thought_mut, insert_thought, merge_and_process_thoughts, process_thoughts,
    remove_thought,
};

/// Read-only copy of the store, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ThoughtState {
    pub thoughts: ThoughtsByDate,
    pub loading: bool,
    pub error: Option<ThoughtError>,
    pub has_more: bool,
    pub last_loaded_date: Option<NaiveDate>,
}

impl Default for ThoughtState {
    fn default() -> Self {
        Self {
            thoughts: ThoughtsByDate::new(),
            loading: false,
            error: None,
            has_more: true,
            last_loaded_date: None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    view: ThoughtState,
    initial_loaded: bool,
    // Bumped by `reset`; results of calls started under an older generation are dropped.
    generation: u64,
    in_flight: HashSet<String>,
}

pub struct ThoughtStore {
    service: ThoughtService,
    user_id: String,
    inner: Mutex<Inner>,
}

/// Marks a thought id busy until dropped.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    id: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.inner.lock().in_flight.remove(&self.id);
    }
}

impl ThoughtStore {
    pub fn new(service: ThoughtService, user_id: &str) -> Self {
        Self {
            service,
            user_id: user_id.to_string(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn snapshot(&self) -> ThoughtState {
        self.inner.lock().view.clone()
    }

    pub fn thoughts(&self) -> ThoughtsByDate {
        self.inner.lock().view.thoughts.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().view.loading
    }

    pub fn has_more(&self) -> bool {
        self.inner.lock().view.has_more
    }

    pub fn last_loaded_date(&self) -> Option<NaiveDate> {
        self.inner.lock().view.last_loaded_date
    }

    pub fn error(&self) -> Option<ThoughtError> {
        self.inner.lock().view.error.clone()
    }

    pub fn get(&self, id: &str) -> Option<ThoughtWithNumber> {
        find_thought(&self.inner.lock().view.thoughts, id).cloned()
    }

    /// Loads the newest page. Runs at most once per session: calls made while
    /// a load is in flight, or after the first load succeeded, do nothing.
    pub async fn load_initial(&self) -> ThoughtResult<()> {
        let generation = {
            let mut inner = self.inner.lock();
            if inner.view.loading || inner.initial_loaded {
                tracing::debug!(user_id = %self.user_id, "initial load skipped");
                return Ok(());
            }
            inner.view.loading = true;
            inner.view.error = None;
            inner.generation
        };

        let result = self.service.load_initial_thoughts(&self.user_id).await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return Ok(());
        }
        inner.view.loading = false;
        match result {
            Ok(page) => {
                inner.view.thoughts = process_thoughts(page.thoughts);
                inner.view.has_more = page.has_more;
                inner.view.last_loaded_date = page.last_loaded_date;
                inner.initial_loaded = true;
                Ok(())
            }
            Err(err) => {
                inner.view.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Loads the page of dates strictly older than the cursor and merges it.
    pub async fn load_more(&self) -> ThoughtResult<()> {
        let (generation, cursor) = {
            let mut inner = self.inner.lock();
            let cursor = match inner.view.last_loaded_date {
                Some(cursor) if inner.view.has_more && !inner.view.loading => cursor,
                _ => return Ok(()),
            };
            inner.view.loading = true;
            (inner.generation, cursor)
        };

        let result = self.service.load_more_thoughts(&self.user_id, cursor).await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return Ok(());
        }
        inner.view.loading = false;
        match result {
            Ok(page) if page.thoughts.is_empty() => {
                inner.view.has_more = false;
                Ok(())
            }
            Ok(page) => {
                merge_and_process_thoughts(&mut inner.view.thoughts, page.thoughts);
                inner.view.has_more = page.has_more;
                if let Some(date) = page.last_loaded_date {
                    inner.view.last_loaded_date = Some(date);
                }
                Ok(())
            }
            Err(err) => {
                inner.view.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub async fn add_thought(
        &self,
        content: &str,
        date: NaiveDate,
        hidden: bool,
    ) -> ThoughtResult<Thought> {
        let generation = self.inner.lock().generation;
        let result = self
            .service
            .add_thought(&self.user_id, content, date, hidden)
            .await;

        let mut inner = self.inner.lock();
        match result {
            Ok(thought) => {
                if inner.generation == generation
                    && !insert_thought(&mut inner.view.thoughts, thought.clone())
                {
                    tracing::debug!(id = %thought.id, "thought already present, skipping insert");
                }
                Ok(thought)
            }
            Err(err) => Err(record(&mut inner, err)),
        }
    }

    pub async fn update_thought(&self, id: &str, content: &str) -> ThoughtResult<()> {
        let (_guard, generation) = self.begin(id)?;
        let result = self.service.update_thought(&self.user_id, id, content).await;

        let mut inner = self.inner.lock();
        match result {
            Ok(row) => {
                if inner.generation == generation {
                    if let Some(entry) = find_thought_mut(&mut inner.view.thoughts, id) {
                        entry.thought.content = row.content;
                        entry.thought.updated_at = row.updated_at;
                    }
                }
                Ok(())
            }
            Err(err) => Err(record(&mut inner, err)),
        }
    }

    pub async fn delete_thought(&self, id: &str) -> ThoughtResult<()> {
        let (_guard, generation) = self.begin(id)?;
        let result = self.service.delete_thought(&self.user_id, id).await;

        let mut inner = self.inner.lock();
        match result {
            Ok(()) => {
                if inner.generation == generation {
                    remove_thought(&mut inner.view.thoughts, id);
                }
                Ok(())
            }
            Err(err) => Err(record(&mut inner, err)),
        }
    }

    /// Flips the hidden flag of a loaded thought. The current flag is read
    /// from local state, so the id must be loaded.
    pub async fn toggle_thought_hidden(&self, id: &str) -> ThoughtResult<()> {
        let current = {
            let mut inner = self.inner.lock();
            let hidden = find_thought(&inner.view.thoughts, id).map(|t| t.thought.hidden);
            match hidden {
                Some(hidden) => hidden,
                None => {
                    tracing::error!(
                        id,
                        user_id = %self.user_id,
                        "toggle requested for thought missing from local state"
                    );
                    return Err(record(&mut inner, ThoughtError::NotFound(id.to_string())));
                }
            }
        };
        let (_guard, generation) = self.begin(id)?;
        let result = self
            .service
            .toggle_thought_hidden(&self.user_id, id, current)
            .await;

        let mut inner = self.inner.lock();
        match result {
            Ok(row) => {
                if inner.generation == generation {
                    if let Some(entry) = find_thought_mut(&mut inner.view.thoughts, id) {
                        entry.thought.hidden = row.hidden;
                        entry.thought.updated_at = row.updated_at;
                    }
                }
                Ok(())
            }
            Err(err) => Err(record(&mut inner, err)),
        }
    }

    /// Drops everything loaded. Calls still in flight are ignored when they land.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let generation = inner.generation.wrapping_add(1);
        let in_flight = std::mem::take(&mut inner.in_flight);
        *inner = Inner {
            generation,
            in_flight,
            ..Inner::default()
        };
    }

    pub fn clear_error(&self) {
        self.inner.lock().view.error = None;
    }

    fn begin(&self, id: &str) -> ThoughtResult<(InFlight<'_>, u64)> {
        let mut inner = self.inner.lock();
        if !inner.in_flight.insert(id.to_string()) {
            return Err(record(&mut inner, ThoughtError::Busy(id.to_string())));
        }
        let generation = inner.generation;
        drop(inner);
        Ok((
            InFlight {
                inner: &self.inner,
                id: id.to_string(),
            },
            generation,
        ))
    }
}

fn record(inner: &mut Inner, err: ThoughtError) -> ThoughtError {
    inner.view.error = Some(err.clone());
    err
}
