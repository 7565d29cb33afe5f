//! Per-person statistics
//!
//! Aggregates review data into one record per contributor identity.

pub mod comments;
pub mod data;
pub mod processor;
pub mod record;

pub use comments::{CommentGroup, PatchSetCommentEntry, PatchSetCommentTable};
pub use data::{PerPersonData, RecordOrdering};
pub use processor::PerPersonDataProcessor;
pub use record::{format_printable_duration, IdentityRecord, ReviewerData, ReviewerDataTable};
