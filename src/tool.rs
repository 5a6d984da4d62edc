//! This module contains implementations for the command-line tools.

pub mod minify;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;

use crate::proc::MinifyConfiguration;

/// Default configuration profile.
const DEFAULT_CONFIG_PROFILE: &str = "default";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "Minify.toml";

/// Default configuration file contents.
pub const DEFAULT_CONFIG_TOML: &str = r#"# Web asset minification configuration

[default]
# Compiled scripts and stylesheets to minify, relative to this file.
outputs = ["wwwroot/js/site.js", "wwwroot/css/site.css"]

[default.minify]
enabled = true
# If true, minified files are also written as `.gz` files.
gzip = false
# "singleLine" or "multipleLines".
outputMode = "singleLine"
termSemicolons = false
renameLocals = true
preserveImportantComments = true
# "important" or "none".
commentMode = "important"

[production.minify]
gzip = true
"#;

/// Raw TOML structure of a `Minify.toml` file.
///
/// This is an internal representation used during deserialization.
/// External consumers should use [Config] (returned by [load_config]).
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(flatten)]
    profiles: BTreeMap<String, ConfigProfile>,
}

/// Profile-level configuration in a [Config].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfigProfile {
    /// Compiled output files to minify.
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Minification settings shared by every output.
    #[serde(default)]
    pub minify: toml::Table,
}

impl ConfigProfile {
    /// Merges this profile with another, with `other`
    /// taking precedence, and returning the merged profile.
    fn merge(&self, other: &ConfigProfile) -> ConfigProfile {
        let mut merged = self.clone();

        // Outputs are replaced wholesale.
        if !other.outputs.is_empty() {
            merged.outputs = other.outputs.clone();
        }

        for (key, value) in &other.minify {
            merged.minify.insert(key.clone(), value.clone());
        }

        merged
    }

    /// Returns this profile's minify settings as a [MinifyConfiguration].
    pub fn minify_configuration(&self) -> io::Result<MinifyConfiguration> {
        self.minify
            .iter()
            .map(|(key, value)| Ok((key.as_str(), setting_from_toml(key, value)?)))
            .collect()
    }
}

/// Returns the textual form of the TOML setting `value`.
fn setting_from_toml(key: &str, value: &toml::Value) -> io::Result<String> {
    match value {
        toml::Value::String(text) => Ok(text.clone()),
        toml::Value::Boolean(flag) => Ok(flag.to_string()),
        toml::Value::Integer(number) => Ok(number.to_string()),
        toml::Value::Float(number) => Ok(number.to_string()),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported value for minify.{}: {}", key, value),
        )),
    }
}

/// A loaded and resolved `Minify.toml` configuration.
#[derive(Debug)]
pub struct Config {
    pub profile: ConfigProfile,
    pub config_dir: PathBuf,
}

impl Config {
    /// Returns the paths of the profile's outputs,
    /// resolved against the configuration's directory.
    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.profile
            .outputs
            .iter()
            .map(|output| self.config_dir.join(output))
            .collect()
    }
}

/// Loads, validates, and merges a `Minify.toml` configuration file.
///
/// Reads the file at `config_path`, then delegates to [load_config_from_str].
pub async fn load_config(config_path: &Path, profile: Option<&str>) -> io::Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let toml_str = fs::read_to_string(config_path).await?;
    load_config_from_str(&toml_str, config_dir, profile)
}

/// Parses, validates, and merges a `Minify.toml` configuration string,
/// merging the selected profile over the default.
pub fn load_config_from_str(
    toml_str: &str,
    config_dir: PathBuf,
    profile: Option<&str>,
) -> io::Result<Config> {
    let profile_name = profile.unwrap_or(DEFAULT_CONFIG_PROFILE);

    let raw: RawConfig = toml::from_str(toml_str)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("invalid TOML: {}", e)))?;

    let default_profile = raw.profiles.get(DEFAULT_CONFIG_PROFILE).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("missing default profile: {}", DEFAULT_CONFIG_PROFILE),
        )
    })?;

    let merged = if profile_name == DEFAULT_CONFIG_PROFILE {
        default_profile.clone()
    } else {
        let selected = raw.profiles.get(profile_name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("missing selected profile: {}", profile_name),
            )
        })?;
        default_profile.merge(selected)
    };

    Ok(Config {
        profile: merged,
        config_dir,
    })
}

/// Creates a default configuration file in the current directory if one doesn't exist.
pub async fn init() -> io::Result<()> {
    init_in(Path::new(".")).await
}

/// Creates a default configuration file in `dir` if one doesn't exist.
async fn init_in(dir: &Path) -> io::Result<()> {
    let config_path = dir.join(DEFAULT_CONFIG_FILE);

    if fs::try_exists(&config_path).await? {
        tracing::warn!("{} already exists", config_path.display());
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG_TOML).await?;
    tracing::info!("Created {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn merges_profiles() {
        let toml = r#"
[default]
outputs = ["js/site.js", "css/site.css"]

[default.minify]
gzip = false
termSemicolons = true

[production.minify]
gzip = true
outputMode = "multipleLines"
"#;
        let config = load_config_from_str(toml, PathBuf::from("."), Some("production")).unwrap();

        // Outputs come from default; minify keys merge.
        assert_eq!(vec!["js/site.js", "css/site.css"], config.profile.outputs);
        let minify = config.profile.minify_configuration().unwrap();
        assert!(minify.is_true("gzip"));
        assert!(minify.is_true("termSemicolons"));
        assert_eq!("multipleLines", minify.get("outputMode").unwrap().as_str());
    }

    #[test]
    fn replaces_outputs() {
        let toml = r#"
[default]
outputs = ["js/site.js", "css/site.css"]

[staging]
outputs = ["js/app.js"]
"#;
        let config = load_config_from_str(toml, PathBuf::from("web"), Some("staging")).unwrap();
        assert_eq!(vec![PathBuf::from("web/js/app.js")], config.output_paths());
    }

    #[test]
    fn uses_default_profile() {
        let toml = r#"
[default]
outputs = ["site.js"]
"#;
        let config = load_config_from_str(toml, PathBuf::from("."), None).unwrap();
        assert_eq!(vec!["site.js"], config.profile.outputs);
        assert_eq!(
            MinifyConfiguration::new(),
            config.profile.minify_configuration().unwrap()
        );
    }

    #[test]
    fn stringifies_settings() {
        let toml = r#"
[default.minify]
gzip = "TRUE"
enabled = false
level = 3
ratio = 0.5
"#;
        let config = load_config_from_str(toml, PathBuf::from("."), None).unwrap();
        let minify = config.profile.minify_configuration().unwrap();
        assert_eq!("TRUE", minify.get("gzip").unwrap().as_str());
        assert_eq!("false", minify.get("enabled").unwrap().as_str());
        assert_eq!("3", minify.get("level").unwrap().as_str());
        assert_eq!("0.5", minify.get("ratio").unwrap().as_str());
    }

    #[test]
    fn rejects_nested_settings() {
        let toml = r#"
[default.minify]
gzip = { level = 9 }
"#;
        let config = load_config_from_str(toml, PathBuf::from("."), None).unwrap();
        let error = config.profile.minify_configuration().unwrap_err();
        assert_eq!(io::ErrorKind::InvalidData, error.kind());
    }

    #[test]
    fn rejects_missing_default_profile() {
        let toml = r#"
[production.minify]
gzip = true
"#;
        let result = load_config_from_str(toml, PathBuf::from("."), None);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_selected_profile() {
        let toml = r#"
[default]
outputs = ["site.js"]
"#;
        let result = load_config_from_str(toml, PathBuf::from("."), Some("staging"));
        assert!(result.is_err());
    }

    #[test]
    fn parses_default_config() {
        let config =
            load_config_from_str(DEFAULT_CONFIG_TOML, PathBuf::from("."), Some("production"))
                .unwrap();
        let minify = config.profile.minify_configuration().unwrap();
        assert!(minify.is_true("enabled"));
        assert!(minify.is_true("gzip"));
        assert_eq!(2, config.profile.outputs.len());
    }

    #[tokio::test]
    async fn initializes_config_once() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(DEFAULT_CONFIG_FILE);

        init_in(dir.path()).await.unwrap();
        assert_eq!(
            DEFAULT_CONFIG_TOML,
            std::fs::read_to_string(&config_path).unwrap()
        );

        std::fs::write(&config_path, "[default]\n").unwrap();
        init_in(dir.path()).await.unwrap();
        assert_eq!("[default]\n", std::fs::read_to_string(&config_path).unwrap());

        let config = load_config(&config_path, None).await.unwrap();
        assert_eq!(dir.path(), config.config_dir);
    }
}
