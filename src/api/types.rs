use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `thoughts` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thought {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub content: String,
    #[serde(default)]
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A thought with its per-date display number. Never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ThoughtWithNumber {
    #[serde(flatten)]
    pub thought: Thought,
    pub number: usize,
}

impl ThoughtWithNumber {
    pub fn new(thought: Thought) -> Self {
        Self { thought, number: 0 }
    }

    pub fn id(&self) -> &str {
        &self.thought.id
    }
}

/// Loaded thoughts bucketed by date. Iterate in reverse for newest-first.
pub type ThoughtsByDate = BTreeMap<NaiveDate, Vec<ThoughtWithNumber>>;

/// Projection used by the distinct-date probe.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DateRow {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct NewThought<'a> {
    pub user_id: &'a str,
    pub content: &'a str,
    pub date: NaiveDate,
    pub hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct ContentUpdate<'a> {
    pub content: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HiddenUpdate {
    pub hidden: bool,
    pub updated_at: DateTime<Utc>,
}

/// A row of the `user_profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct NewUserProfile<'a> {
    pub user_id: &'a str,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct BirthDateUpdate {
    pub birth_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}
