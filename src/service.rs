use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};

use crate::api::client::RestClient;
use crate::api::queries::{self, DATE_PROBE_LIMIT, THOUGHTS_TABLE};
use crate::api::types::{ContentUpdate, DateRow, HiddenUpdate, NewThought, Thought};
use crate::error::{MindTraceError, Result, ThoughtError, ThoughtResult};

/// Distinct dates loaded per page.
pub const DAYS_PER_LOAD: usize = 2;

/// One page of thoughts covering whole dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ThoughtPage {
    /// Rows ordered by date desc, then `created_at` desc.
    pub thoughts: Vec<Thought>,
    pub has_more: bool,
    /// Oldest date in this page; `None` when the page is empty.
    pub last_loaded_date: Option<NaiveDate>,
}

impl ThoughtPage {
    fn empty() -> Self {
        Self {
            thoughts: Vec::new(),
            has_more: false,
            last_loaded_date: None,
        }
    }
}

/// The only component that talks to the `thoughts` table. Every failure is
/// logged and collapsed into a fixed [`ThoughtError`].
#[derive(Clone)]
pub struct ThoughtService {
    client: RestClient,
    days_per_load: usize,
}

impl ThoughtService {
    pub fn new(client: RestClient) -> Self {
        Self::with_days_per_load(client, DAYS_PER_LOAD)
    }

    pub fn with_days_per_load(client: RestClient, days_per_load: usize) -> Self {
        Self {
            client,
            days_per_load: days_per_load.max(1),
        }
    }

    pub fn days_per_load(&self) -> usize {
        self.days_per_load
    }

    pub async fn load_initial_thoughts(&self, user_id: &str) -> ThoughtResult<ThoughtPage> {
        tracing::debug!(user_id, "loading initial thoughts");
        self.load_page(user_id, None).await.map_err(|err| {
            tracing::error!(?err, user_id, "load initial thoughts failed");
            ThoughtError::LoadFailed
        })
    }

    pub async fn load_more_thoughts(
        &self,
        user_id: &str,
        last_loaded_date: NaiveDate,
    ) -> ThoughtResult<ThoughtPage> {
        tracing::debug!(user_id, %last_loaded_date, "loading older thoughts");
        self.load_page(user_id, Some(last_loaded_date))
            .await
            .map_err(|err| {
                tracing::error!(?err, user_id, "load more thoughts failed");
                ThoughtError::LoadFailed
            })
    }

    async fn load_page(&self, user_id: &str, before: Option<NaiveDate>) -> Result<ThoughtPage> {
        let distinct = self.probe_dates(user_id, before).await?;
        if distinct.is_empty() {
            return Ok(ThoughtPage::empty());
        }
        let dates: Vec<NaiveDate> = distinct
            .iter()
            .rev()
            .take(self.days_per_load)
            .copied()
            .collect();

        let thoughts: Vec<Thought> = self
            .client
            .select(THOUGHTS_TABLE, &queries::thoughts_on_dates(user_id, &dates))
            .await?;
        if thoughts.is_empty() {
            return Ok(ThoughtPage::empty());
        }

        let has_more = distinct.len() > dates.len();
        tracing::info!(
            user_id,
            rows = thoughts.len(),
            days = dates.len(),
            has_more,
            "loaded thought page"
        );
        Ok(ThoughtPage {
            thoughts,
            has_more,
            last_loaded_date: dates.last().copied(),
        })
    }

    /// Collects distinct dates older than `before` until one more than a page
    /// is known or the table runs out. A full probe can be taken up by a
    /// single busy day, so probing continues below its oldest date.
    async fn probe_dates(
        &self,
        user_id: &str,
        before: Option<NaiveDate>,
    ) -> Result<BTreeSet<NaiveDate>> {
        let mut distinct = BTreeSet::new();
        let mut cursor = before;
        loop {
            let probe: Vec<DateRow> = self
                .client
                .select(THOUGHTS_TABLE, &queries::recent_dates(user_id, cursor))
                .await?;
            let exhausted = probe.len() < DATE_PROBE_LIMIT;
            distinct.extend(probe.into_iter().map(|row| row.date));
            if exhausted || distinct.len() > self.days_per_load {
                return Ok(distinct);
            }
            cursor = distinct.first().copied();
            tracing::debug!(user_id, ?cursor, "date probe full, probing older dates");
        }
    }

    pub async fn add_thought(
        &self,
        user_id: &str,
        content: &str,
        date: NaiveDate,
        hidden: bool,
    ) -> ThoughtResult<Thought> {
        if content.trim().is_empty() {
            return Err(ThoughtError::EmptyContent);
        }
        let new = NewThought {
            user_id,
            content,
            date,
            hidden,
        };
        self.client
            .insert(THOUGHTS_TABLE, &new)
            .await
            .map_err(|err| {
                tracing::error!(?err, user_id, "add thought failed");
                ThoughtError::AddFailed
            })
    }

    pub async fn update_thought(
        &self,
        user_id: &str,
        id: &str,
        content: &str,
    ) -> ThoughtResult<Thought> {
        let update = ContentUpdate {
            content,
            updated_at: Utc::now(),
        };
        self.update_one(user_id, id, &update).await.map_err(|err| {
            tracing::error!(?err, user_id, id, "update thought failed");
            ThoughtError::UpdateFailed
        })
    }

    pub async fn delete_thought(&self, user_id: &str, id: &str) -> ThoughtResult<()> {
        let result: Result<Vec<Thought>> = self
            .client
            .delete(THOUGHTS_TABLE, &queries::owned_thought(user_id, id))
            .await;
        match result {
            Ok(rows) if !rows.is_empty() => Ok(()),
            Ok(_) => {
                tracing::error!(user_id, id, "delete thought matched no row");
                Err(ThoughtError::DeleteFailed)
            }
            Err(err) => {
                tracing::error!(?err, user_id, id, "delete thought failed");
                Err(ThoughtError::DeleteFailed)
            }
        }
    }

    pub async fn toggle_thought_hidden(
        &self,
        user_id: &str,
        id: &str,
        current_hidden: bool,
    ) -> ThoughtResult<Thought> {
        let update = HiddenUpdate {
            hidden: !current_hidden,
            updated_at: Utc::now(),
        };
        self.update_one(user_id, id, &update).await.map_err(|err| {
            tracing::error!(?err, user_id, id, "toggle thought hidden failed");
            ThoughtError::ToggleHiddenFailed
        })
    }

    async fn update_one<B: serde::Serialize>(&self, user_id: &str, id: &str, body: &B) -> Result<Thought> {
        let rows: Vec<Thought> = self
            .client
            .update(THOUGHTS_TABLE, &queries::owned_thought(user_id, id), body)
            .await?;
        rows.into_iter().next().ok_or(MindTraceError::EmptyResponse)
    }
}
