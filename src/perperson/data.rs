//! Aggregated per-person result set

use std::collections::HashMap;

use super::record::{sort_key, IdentityRecord};
use crate::model::Identity;
use crate::processor::QueryData;

/// Orderings offered by [`PerPersonData::to_ordered_list`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrdering {
    /// By email, then username
    Alphabetical,
    /// By number of comments written, fewest first
    CommentsWritten,
}

/// One `IdentityRecord` per contributor plus metadata of the loaded data
#[derive(Debug, Clone, Default)]
pub struct PerPersonData {
    records: HashMap<Identity, IdentityRecord>,
    query_data: QueryData,
    from_date: Option<i64>,
    to_date: Option<i64>,
}

impl PerPersonData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all records and metadata
    pub fn clear(&mut self) {
        self.records.clear();
        self.query_data = QueryData::default();
        self.from_date = None;
        self.to_date = None;
    }

    pub fn get(&self, identity: &Identity) -> Option<&IdentityRecord> {
        self.records.get(identity)
    }

    pub fn get_or_create(&mut self, identity: &Identity) -> &mut IdentityRecord {
        self.records
            .entry(identity.clone())
            .or_insert_with(|| IdentityRecord::new(identity.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &IdentityRecord)> {
        self.records.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &IdentityRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_ordered_list(&self, ordering: RecordOrdering) -> Vec<&IdentityRecord> {
        let mut ordered: Vec<&IdentityRecord> = self.records.values().collect();
        match ordering {
            RecordOrdering::Alphabetical => {
                ordered.sort_by_cached_key(|record| sort_key(record.identity()));
            }
            RecordOrdering::CommentsWritten => {
                ordered.sort_by_cached_key(|record| {
                    (record.all_comments_written().len(), sort_key(record.identity()))
                });
            }
        }
        ordered
    }

    /// Keep the metadata of `query`; its commits are not retained
    pub fn set_query_data(&mut self, query: &QueryData) {
        self.query_data = QueryData {
            commits: Vec::new(),
            filenames: query.filenames.clone(),
            branches: query.branches.clone(),
            gerrit_version: query.gerrit_version,
        };
    }

    pub fn query_data(&self) -> &QueryData {
        &self.query_data
    }

    pub fn set_date_range(&mut self, from_date: Option<i64>, to_date: Option<i64>) {
        self.from_date = from_date;
        self.to_date = to_date;
    }

    /// Earliest last-updated date of the visited commits
    pub fn from_date(&self) -> Option<i64> {
        self.from_date
    }

    /// Latest last-updated date of the visited commits
    pub fn to_date(&self) -> Option<i64> {
        self.to_date
    }
}
