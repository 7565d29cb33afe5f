use clap::Parser;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use log::debug;

use crate::output::OutputFormat;

/// Per-contributor code review statistics from downloaded Gerrit data
#[derive(Parser, Debug, Clone)]
#[command(name = "gerritstats")]
#[command(about = "Computes per-contributor code review statistics from review data downloaded from Gerrit")]
#[command(version)]
pub struct Args {
    /// Data files or directories of *.json files, comma separated
    #[arg(short = 'f', long = "file", visible_alias = "files", value_name = "FILES", value_delimiter = ',', required = true)]
    pub files: Vec<String>,

    /// Only include changes on these branches
    #[arg(long, value_name = "BRANCHES", value_delimiter = ',')]
    pub branches: Vec<String>,

    /// Only include these emails
    #[arg(long, value_name = "EMAILS", value_delimiter = ',')]
    pub include: Vec<String>,

    /// Exclude these emails (ignored when --include is given)
    #[arg(long, value_name = "EMAILS", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Include identities that have no email address
    #[arg(long)]
    pub include_empty_emails: bool,

    /// Report commits with more patch sets than this after review started (-1 disables)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub commit_patch_set_count_threshold: Option<i64>,

    /// Output format: table, compact or json
    #[arg(long, value_name = "FORMAT")]
    pub output_format: Option<String>,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {}
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(anyhow::anyhow!(
                "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace", level
            )),
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    if let Some(ref format) = args.output_format {
        format.parse::<OutputFormat>()?;
    }

    if args.files.iter().all(|file| file.trim().is_empty()) {
        return Err(anyhow::anyhow!("At least one data file must be given with --file"));
    }

    Ok(())
}

/// Resolve the `--file` entries into data files.
///
/// A directory contributes its `*.json` files in name order; anything else
/// must be an existing file.
pub fn expand_input_paths(entries: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in entries.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
        let path = Path::new(entry);
        if path.is_dir() {
            let mut json_files: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("Failed to read directory: {}", path.display()))?
                .filter_map(|dir_entry| dir_entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            json_files.sort();
            debug!("{}: {} data files", path.display(), json_files.len());
            paths.extend(json_files);
        } else if path.is_file() {
            paths.push(path.to_path_buf());
        } else {
            return Err(anyhow::anyhow!("Data file does not exist: {}", path.display()));
        }
    }

    if paths.is_empty() {
        return Err(anyhow::anyhow!("No data files found in: {}", entries.join(", ")));
    }
    Ok(paths)
}
