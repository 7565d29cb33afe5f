//! Application execution

use anyhow::{Context, Result};
use std::io::{self, Write};
use log::info;
use crate::output::create_formatter;
use crate::perperson::PerPersonDataProcessor;
use crate::processor::CommitDataProcessor;
use crate::{cli, config, parser};
use super::initialization::{build_commit_filter, resolve_output_format, resolve_output_rules};

/// Load the data files named on the command line, aggregate and print to stdout
pub fn run(args: &cli::Args, config: &config::ConfigManager) -> Result<()> {
    let stdout = io::stdout();
    run_with_writer(args, config, stdout.lock())
}

pub fn run_with_writer<W: Write>(args: &cli::Args, config: &config::ConfigManager, writer: W) -> Result<()> {
    let paths = cli::expand_input_paths(&args.files)?;
    let filter = build_commit_filter(args, config)?;
    let format = resolve_output_format(args, config)?;
    let rules = resolve_output_rules(args, config)?;

    let query = parser::load_query_data(&paths, filter.included_branches())
        .context("Failed to load review data")?;
    info!(
        "Processing {} commits for {}",
        query.commits.len(),
        query.displayable_branch_list()
    );

    let mut processor = PerPersonDataProcessor::new(filter);
    let mut formatter = create_formatter(format, writer, rules);
    processor
        .process(formatter.as_mut(), &query)
        .context("Failed to compute review statistics")?;

    Ok(())
}
