// Search-result list management: merge, dedup, expansion tracking.
use std::collections::HashSet;

use crate::models::SearchRecord;

/// The history list a screen renders, with its expansion state.
///
/// Deletion is deliberately absent from the merge path: callers remove a
/// record only after the backend confirmed the delete, so a failed call
/// leaves the list untouched.
#[derive(Debug, Default)]
pub struct HistoryList {
    records: Vec<SearchRecord>,
    expanded: HashSet<i64>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.contains(&id)
    }

    pub fn toggle(&mut self, id: i64) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    /// Merge freshly fetched history into whatever is already shown.
    ///
    /// Records are deduplicated by id with the last-seen copy winning, then
    /// re-sorted descending by creation time.
    pub fn merge(&mut self, fresh: Vec<SearchRecord>) {
        let mut combined = std::mem::take(&mut self.records);
        combined.extend(fresh);

        let mut seen = HashSet::new();
        let mut unique: Vec<SearchRecord> = Vec::with_capacity(combined.len());
        for record in combined.into_iter().rev() {
            if seen.insert(record.id) {
                unique.push(record);
            }
        }

        unique.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.records = unique;
    }

    /// Insert a just-completed search at the front, unless its id is already
    /// present, and make it the only expanded row.
    pub fn push_new(&mut self, record: SearchRecord) {
        let id = record.id;
        if !self.records.iter().any(|r| r.id == id) {
            self.records.insert(0, record);
        }
        self.expanded.clear();
        self.expanded.insert(id);
    }

    /// Remove a record the backend confirmed as deleted.
    pub fn remove(&mut self, id: i64) {
        self.records.retain(|r| r.id != id);
        self.expanded.remove(&id);
    }

    pub fn get(&self, index: usize) -> Option<&SearchRecord> {
        self.records.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PersonLookup, SearchOutcome};
    use chrono::{TimeZone, Utc};

    fn record(id: i64, day: u32) -> SearchRecord {
        SearchRecord {
            id,
            created_at: Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap(),
            user_id: 1,
            outcome: SearchOutcome::Person(vec![PersonLookup {
                name: format!("person-{}", id),
                company: "Acme".into(),
                email: None,
            }]),
        }
    }

    fn subject_of(record: &SearchRecord) -> &str {
        record.subject().unwrap()
    }

    #[test]
    fn test_merge_dedupes_by_id_last_wins() {
        let mut list = HistoryList::new();
        list.merge(vec![record(1, 2), record(2, 3)]);

        // The refetched copy of id 1 replaces the one already shown.
        let mut replacement = record(1, 2);
        if let SearchOutcome::Person(ref mut lookups) = replacement.outcome {
            lookups[0].name = "person-1-refreshed".into();
        }
        list.merge(vec![replacement, record(3, 1)]);

        assert_eq!(list.len(), 3);
        let ids: Vec<i64> = list.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        let refreshed = list.records().iter().find(|r| r.id == 1).unwrap();
        assert_eq!(subject_of(refreshed), "person-1-refreshed");
    }

    #[test]
    fn test_merge_keeps_descending_creation_order() {
        let mut list = HistoryList::new();
        list.merge(vec![record(1, 1), record(2, 9), record(3, 5)]);

        let days: Vec<u32> = list
            .records()
            .iter()
            .map(|r| chrono::Datelike::day(&r.created_at))
            .collect();
        assert_eq!(days, vec![9, 5, 1]);
    }

    #[test]
    fn test_push_new_inserts_once_and_expands_only_it() {
        let mut list = HistoryList::new();
        list.merge(vec![record(1, 2)]);
        list.toggle(1);
        assert!(list.is_expanded(1));

        list.push_new(record(5, 9));
        assert_eq!(list.len(), 2);
        assert_eq!(list.records()[0].id, 5);
        assert!(list.is_expanded(5));
        assert!(!list.is_expanded(1));

        // Same id again: no duplicate entry.
        list.push_new(record(5, 9));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_only_touches_the_confirmed_id() {
        let mut list = HistoryList::new();
        list.merge(vec![record(1, 2), record(2, 3)]);
        list.toggle(2);

        list.remove(2);
        assert_eq!(list.len(), 1);
        assert_eq!(list.records()[0].id, 1);
        assert!(!list.is_expanded(2));
    }

    #[test]
    fn test_toggle_flips_expansion() {
        let mut list = HistoryList::new();
        list.merge(vec![record(1, 2)]);

        list.toggle(1);
        assert!(list.is_expanded(1));
        list.toggle(1);
        assert!(!list.is_expanded(1));
    }
}
