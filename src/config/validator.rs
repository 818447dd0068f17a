use super::Config;
use anyhow::Result;
use colored::Colorize;
use std::path::{Component, Path};

/// Every key understood by [`Config::get`] and [`Config::set`]
pub const KNOWN_KEYS: &[&str] = &[
    "core.default_directory",
    "tracking.metadata_dir",
    "tracking.registry_file",
    "tracking.preserve_permissions",
    "tracking.preserve_mtime",
];

/// Reject values the registry cannot work with
///
/// # Errors
///
/// Returns an error if a metadata name is not a single plain path component,
/// or the registry file name equals the metadata directory name.
pub fn validate_values(config: &Config) -> Result<()> {
    let tracking = &config.tracking;
    for (key, value) in [
        ("tracking.metadata_dir", &tracking.metadata_dir),
        ("tracking.registry_file", &tracking.registry_file),
    ] {
        if !is_plain_name(value) {
            anyhow::bail!("{key} must be a single file name, got '{value}'");
        }
    }
    if tracking.metadata_dir == tracking.registry_file {
        anyhow::bail!("tracking.metadata_dir and tracking.registry_file must differ");
    }
    Ok(())
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}

/// Collect keys present in a TOML document that retrace does not recognise
#[must_use]
pub fn unknown_keys(parsed: &toml::Value) -> Vec<String> {
    let mut unknown = Vec::new();
    if let toml::Value::Table(sections) = parsed {
        for (section, value) in sections {
            match value {
                toml::Value::Table(entries) => {
                    for key in entries.keys() {
                        let full_key = format!("{section}.{key}");
                        if !KNOWN_KEYS.contains(&full_key.as_str()) {
                            unknown.push(full_key);
                        }
                    }
                }
                _ => unknown.push(section.clone()),
            }
        }
    }
    unknown
}

/// Print a warning for every unknown key in the config file
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed
pub fn warn_unknown_keys(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        return Ok(());
    }

    let content = std::fs::read_to_string(config_path)?;
    let parsed: toml::Value = toml::from_str(&content)?;
    let unknown = unknown_keys(&parsed);

    if !unknown.is_empty() {
        eprintln!("{}", "Configuration warnings:".yellow().bold());
        for field in unknown {
            eprintln!("  Unknown configuration field: {}", field.yellow());
        }
        eprintln!();
    }

    Ok(())
}
