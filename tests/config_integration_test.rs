use std::fs;
use tempfile::tempdir;

use gerritstats::config::{ConfigManager, CONFIG_ENV_VAR};
use gerritstats::output::OutputFormat;

const CONFIG: &str = r#"
[base]
console-level = "warn"
log-format = "json"

[filter]
branches = ["master", "release-1.0"]
include = "alice@example.com, bob@example.com"
include-empty-emails = false

[output]
format = "compact"
patch-set-threshold = 3

[nightly]
format = "json"
patch-set-threshold = -1
"#;

#[test]
fn test_config_file_drives_filter_and_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("gerritstats.toml");
    fs::write(&config_path, CONFIG).expect("Failed to write config file");

    let manager = ConfigManager::load_from_file(config_path).expect("Failed to load config");

    let filter = manager.get_commit_filter().unwrap();
    assert_eq!(filter.included_branches(), ["master".to_string(), "release-1.0".to_string()]);
    assert_eq!(filter.included_emails(), ["alice@example.com".to_string(), "bob@example.com".to_string()]);
    assert!(!filter.includes_empty_emails());

    assert_eq!(manager.get_output_format().unwrap(), Some(OutputFormat::Compact));
    assert_eq!(manager.get_output_rules().unwrap().patch_set_count_threshold, Some(3));
    assert_eq!(manager.get_log_level("base", "console-level").unwrap(), Some(log::LevelFilter::Warn));
}

#[test]
fn test_config_section_selection() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("gerritstats.toml");
    fs::write(&config_path, CONFIG).expect("Failed to write config file");

    let mut manager = ConfigManager::load_from_file(config_path).expect("Failed to load config");
    manager.select_section("nightly".to_string());

    assert_eq!(manager.get_output_format().unwrap(), Some(OutputFormat::Json));
    assert_eq!(manager.get_output_rules().unwrap().patch_set_count_threshold, None);
    assert_eq!(manager.get_list("filter", "branches"), vec!["master", "release-1.0"]);
}

#[test]
fn test_config_discovered_from_environment() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("env.toml");
    fs::write(&config_path, "[output]\nformat = \"table\"\n").expect("Failed to write config file");

    std::env::set_var(CONFIG_ENV_VAR, &config_path);
    let manager = ConfigManager::load();
    std::env::remove_var(CONFIG_ENV_VAR);

    let manager = manager.expect("Failed to load config");
    assert_eq!(manager.config_file_path(), Some(&config_path));
    assert_eq!(manager.get_output_format().unwrap(), Some(OutputFormat::Table));
}

#[test]
fn test_invalid_values_are_reported() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(
        &config_path,
        "[filter]\ninclude-empty-emails = \"sometimes\"\n\n[output]\npatch-set-threshold = \"many\"\n",
    )
    .expect("Failed to write config file");

    let manager = ConfigManager::load_from_file(config_path).expect("Failed to load config");
    assert!(manager.get_commit_filter().is_err());
    assert!(manager.get_output_rules().is_err());
}
