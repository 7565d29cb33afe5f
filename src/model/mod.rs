//! Review data model

pub mod commit;
pub mod identity;
pub mod version;

pub use commit::{
    Approval, ChangeComment, Commit, PatchSet, PatchSetComment, PatchSetKind,
    STATUS_ABANDONED, STATUS_MERGED, STATUS_NEW,
};
pub use identity::{Identity, ANONYMOUS_IDENTIFIER};
pub use version::GerritVersion;
