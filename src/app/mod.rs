//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{
    load_configuration,
    configure_logging,
    build_commit_filter,
    resolve_output_format,
    resolve_output_rules,
};
pub use execution::{run, run_with_writer};
