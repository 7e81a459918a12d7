//! Grouping and per-date numbering of thoughts.
//!
//! Numbers follow creation order (oldest is 1) while each bucket is kept
//! newest-first for display. Ties on `created_at` are broken by `id`, so both
//! orders are deterministic whatever order the rows arrived in.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::api::types::{Thought, ThoughtWithNumber, ThoughtsByDate};

fn creation_order(a: &ThoughtWithNumber, b: &ThoughtWithNumber) -> Ordering {
    a.thought
        .created_at
        .cmp(&b.thought.created_at)
        .then_with(|| a.thought.id.cmp(&b.thought.id))
}

/// Groups a flat list by date and numbers every bucket.
pub fn process_thoughts(thoughts: Vec<Thought>) -> ThoughtsByDate {
    let mut grouped = ThoughtsByDate::new();
    for thought in thoughts {
        grouped
            .entry(thought.date)
            .or_default()
            .push(ThoughtWithNumber::new(thought));
    }
    for bucket in grouped.values_mut() {
        assign_thought_numbers(bucket);
    }
    grouped
}

/// Renumbers a bucket after its membership changed and restores display
/// order. Returns the bucket size; zero means the caller should drop the key.
pub fn assign_thought_numbers(bucket: &mut [ThoughtWithNumber]) -> usize {
    bucket.sort_by(creation_order);
    for (index, entry) in bucket.iter_mut().enumerate() {
        entry.number = index + 1;
    }
    bucket.reverse();
    bucket.len()
}

/// Folds a freshly fetched page into `existing`. Dates already present are
/// renumbered over the union; a record whose id is already loaded replaces
/// the old copy.
pub fn merge_and_process_thoughts(existing: &mut ThoughtsByDate, new_thoughts: Vec<Thought>) {
    let incoming_ids: HashSet<String> = new_thoughts.iter().map(|t| t.id.clone()).collect();
    let mut emptied = Vec::new();
    for (date, bucket) in existing.iter_mut() {
        let before = bucket.len();
        bucket.retain(|t| !incoming_ids.contains(t.id()));
        if bucket.len() != before && assign_thought_numbers(bucket) == 0 {
            emptied.push(*date);
        }
    }
    for date in emptied {
        existing.remove(&date);
    }

    for (date, mut fresh) in process_thoughts(new_thoughts) {
        match existing.get_mut(&date) {
            Some(bucket) => {
                bucket.append(&mut fresh);
                assign_thought_numbers(bucket);
            }
            None => {
                existing.insert(date, fresh);
            }
        }
    }
}

/// Adds a thought to its date bucket unless a record with the same id is
/// already there. Returns whether it was inserted.
pub fn insert_thought(thoughts: &mut ThoughtsByDate, thought: Thought) -> bool {
    let bucket = thoughts.entry(thought.date).or_default();
    if bucket.iter().any(|t| t.thought.id == thought.id) {
        return false;
    }
    bucket.push(ThoughtWithNumber::new(thought));
    assign_thought_numbers(bucket);
    true
}

/// Removes a thought by id, renumbering its bucket or dropping the bucket
/// when it becomes empty.
pub fn remove_thought(thoughts: &mut ThoughtsByDate, id: &str) -> Option<Thought> {
    let (date, index) = thoughts.iter().find_map(|(date, bucket)| {
        bucket
            .iter()
            .position(|t| t.id() == id)
            .map(|index| (*date, index))
    })?;
    let bucket = thoughts.get_mut(&date)?;
    let removed = bucket.remove(index);
    if assign_thought_numbers(bucket) == 0 {
        thoughts.remove(&date);
    }
    Some(removed.thought)
}

pub fn find_thought<'a>(thoughts: &'a ThoughtsByDate, id: &str) -> Option<&'a ThoughtWithNumber> {
    thoughts.values().flatten().find(|t| t.id() == id)
}

pub fn find_thought_mut<'a>(
    thoughts: &'a mut ThoughtsByDate,
    id: &str,
) -> Option<&'a mut ThoughtWithNumber> {
    thoughts.values_mut().flatten().find(|t| t.id() == id)
}

/// All loaded thoughts, newest date first, each bucket in display order.
pub fn flatten(thoughts: &ThoughtsByDate) -> Vec<&ThoughtWithNumber> {
    thoughts.values().rev().flatten().collect()
}
