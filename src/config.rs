use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};
use crate::filter::CommitFilter;
use crate::output::{OutputFormat, OutputRules};

/// Flattened TOML: section -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "GERRITSTATS_CONFIG";

/// Configuration manager
#[derive(Debug, Default)]
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Wrap an already flattened configuration
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load the first configuration file found by discovery, or an empty configuration
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using empty configuration");
        Ok(Self::default())
    }

    /// Load the file given with `--config-file`
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        debug!("Loading configuration from file: {}", path.display());

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    /// File the configuration was read from, if any
    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    /// Raw value of `key`, looked up in the selected section, then `section`, then `[base]`
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// `true` or `false`, case-insensitive
    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>> {
        match self.get_value(section, key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(anyhow::anyhow!("Invalid boolean value for {}.{}: {}", section, key, value)),
            },
            None => Ok(None),
        }
    }

    pub fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>> {
        match self.get_value(section, key) {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map(Some)
                .with_context(|| format!("Invalid integer value for {}.{}: {}", section, key, value)),
            None => Ok(None),
        }
    }

    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Comma separated list; blank entries are dropped
    pub fn get_list(&self, section: &str, key: &str) -> Vec<String> {
        self.get_value(section, key)
            .map(|value| split_list(value))
            .unwrap_or_default()
    }

    /// Build the inclusion filter from the `[filter]` section
    pub fn get_commit_filter(&self) -> Result<CommitFilter> {
        let include_empty_emails = self
            .get_bool("filter", "include-empty-emails")?
            .unwrap_or(false);

        Ok(CommitFilter::new()
            .with_included_branches(self.get_list("filter", "branches"))
            .with_included_emails(self.get_list("filter", "include"))
            .with_excluded_emails(self.get_list("filter", "exclude"))
            .with_include_empty_emails(include_empty_emails))
    }

    /// Output format from `[output] format`
    pub fn get_output_format(&self) -> Result<Option<OutputFormat>> {
        match self.get_value("output", "format") {
            Some(value) => Ok(Some(value.parse::<OutputFormat>()?)),
            None => Ok(None),
        }
    }

    /// Output rules from `[output] patch-set-threshold`
    pub fn get_output_rules(&self) -> Result<OutputRules> {
        Ok(match self.get_int("output", "patch-set-threshold")? {
            Some(threshold) => OutputRules::from_threshold(threshold),
            None => OutputRules::default(),
        })
    }
}

/// Split a comma separated value into trimmed, non-empty entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Candidate files, most specific first
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("gerritstats").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".gerritstats.toml"));
    }

    paths.push(PathBuf::from("./.gerritstats.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML text into flattened sections
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse()
        .context("Failed to parse TOML content")?;

    let mut config = Configuration::new();

    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    debug!("Parsed {} configuration sections", config.len());
    Ok(config)
}

/// Nested tables become `parent.child` sections; top level scalars go to `[base]`
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        match value {
            Value::Table(subtable) => {
                let section_name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                let section = config.entry(section_name.clone()).or_default();
                for (subkey, subvalue) in subtable {
                    if !matches!(subvalue, Value::Table(_)) {
                        section.insert(subkey.clone(), toml_value_to_string(subvalue));
                    }
                }
                let nested: toml::Table = subtable
                    .iter()
                    .filter(|(_, v)| matches!(v, Value::Table(_)))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                if !nested.is_empty() {
                    flatten_toml_table(&nested, section_name, config);
                }
            }
            _ => {
                // Top level keys belong to [base]
                let section = if prefix.is_empty() { "base".to_string() } else { prefix.clone() };
                config
                    .entry(section)
                    .or_default()
                    .insert(key.clone(), toml_value_to_string(value));
            }
        }
    }
}

/// Scalar as text; arrays are joined with commas
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(toml_value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Table(_) | Value::Datetime(_) => value.to_string(),
    }
}
