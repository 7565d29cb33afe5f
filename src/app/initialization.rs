//! Application initialization and configuration

use anyhow::{Context, Result};
use log::{debug, LevelFilter};
use std::str::FromStr;
use crate::filter::CommitFilter;
use crate::output::{OutputFormat, OutputRules};
use crate::{cli, config, logging};

pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    let mut manager = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        config::ConfigManager::load_from_file(config_file.clone())?
    } else {
        config::ConfigManager::load()?
    };

    if let Some(section_name) = &args.config_name {
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        match config.get_log_level("base", "console-level") {
            Ok(Some(level)) => level,
            Ok(None) => LevelFilter::Info,
            Err(e) => {
                debug!("Invalid console-level in config, using default: {}", e);
                LevelFilter::Info
            }
        }
    };

    let format = if args.log_format.to_lowercase() != "text" {
        logging::LogFormat::from_str(&args.log_format).map_err(|e| anyhow::anyhow!(e))?
    } else {
        config
            .get_value("base", "log-format")
            .and_then(|value| logging::LogFormat::from_str(value).ok())
            .unwrap_or_default()
    };

    let log_file_path = args.log_file.clone().or_else(|| config.get_path("base", "log-file"));

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => config
            .get_log_level("base", "file-log-level")
            .context("Invalid file-log-level in configuration")?,
    };

    let (destination, file_level) = match (log_file_path, file_log_level) {
        (Some(file_path), level) => {
            (logging::LogDestination::Both(file_path), Some(level.unwrap_or(console_level)))
        }
        (None, None) => (logging::LogDestination::Console, None),
        (None, Some(_)) => {
            return Err(anyhow::anyhow!("Log file level specified without log file"));
        }
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}

/// Inclusion filter from the `[filter]` section with command line lists taking precedence
pub fn build_commit_filter(args: &cli::Args, config: &config::ConfigManager) -> Result<CommitFilter> {
    let configured = config.get_commit_filter().context("Invalid [filter] configuration")?;

    let pick = |cli_values: &[String], configured: &[String]| -> Vec<String> {
        let values: Vec<String> = cli_values
            .iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
        if values.is_empty() {
            configured.to_vec()
        } else {
            values
        }
    };

    let filter = CommitFilter::new()
        .with_included_branches(pick(&args.branches, configured.included_branches()))
        .with_included_emails(pick(&args.include, configured.included_emails()))
        .with_excluded_emails(pick(&args.exclude, configured.excluded_emails()))
        .with_include_empty_emails(args.include_empty_emails || configured.includes_empty_emails());

    debug!("Commit filter: {:?}", filter);
    Ok(filter)
}

pub fn resolve_output_format(args: &cli::Args, config: &config::ConfigManager) -> Result<OutputFormat> {
    match &args.output_format {
        Some(format) => Ok(format.parse::<OutputFormat>()?),
        None => Ok(config
            .get_output_format()
            .context("Invalid [output] configuration")?
            .unwrap_or_default()),
    }
}

pub fn resolve_output_rules(args: &cli::Args, config: &config::ConfigManager) -> Result<OutputRules> {
    match args.commit_patch_set_count_threshold {
        Some(threshold) => Ok(OutputRules::from_threshold(threshold)),
        None => config.get_output_rules().context("Invalid [output] configuration"),
    }
}
