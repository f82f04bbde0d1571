use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Named defaults for the `analyze` command, read from `[profiles.<name>]`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfileConfig {
    pub model: Option<String>,
    pub system: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<u64>,
    pub output: Option<String>,
    pub base_url: Option<String>,
    pub vision: Option<bool>,
    pub tts_model: Option<String>,
    pub voice: Option<String>,
    pub show_usage: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

/// How advice is printed on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl ProfileConfig {
    /// Checks values that TOML typing alone cannot catch.
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if let Some(output) = &self.output {
            if OutputMode::parse(output).is_none() {
                return Err(format!(
                    "Invalid profile output '{output}' in profile '{name}'. Supported values: text, json."
                ));
            }
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "Invalid profile temperature {temperature} in profile '{name}'. Expected a value between 0 and 2."
                ));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(format!(
                "Invalid profile max_tokens 0 in profile '{name}'. Expected a positive value."
            ));
        }
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(format!("Profile '{name}' has an empty model."));
            }
        }
        Ok(())
    }
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, String> {
    let path = config_path()?;
    let profiles = read_profiles(&path)?;
    let profile = profiles.get(name).cloned().ok_or_else(|| {
        format!(
            "Profile '{}' not found in config file '{}'.",
            name,
            path.display()
        )
    })?;
    profile.validate(name)?;
    Ok(profile)
}

/// Parses the config file and validates one profile, or all of them.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, String> {
    let path = config_path()?;
    let profiles = read_profiles(&path)?;

    match profile {
        Some(name) => {
            let selected = profiles.get(name).ok_or_else(|| {
                format!(
                    "Profile '{}' not found in config file '{}'.",
                    name,
                    path.display()
                )
            })?;
            selected.validate(name)?;
        }
        None => {
            let mut names = profiles.keys().collect::<Vec<_>>();
            names.sort();
            for name in names {
                profiles[name].validate(name)?;
            }
        }
    }

    Ok(path)
}

fn read_profiles(path: &Path) -> Result<HashMap<String, ProfileConfig>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;

    let config: ConfigFile = toml::from_str(&raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))?;

    config.profiles.ok_or_else(|| {
        format!(
            "Config file '{}' does not contain a [profiles] section.",
            path.display()
        )
    })
}

pub fn config_path() -> Result<PathBuf, String> {
    if let Some(path) = non_empty_env("ADVISOR_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    if let Some(xdg) = non_empty_env("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg)
            .join("symptom-advisor")
            .join("config.toml"));
    }

    let home = env::var("HOME").map_err(|_| {
        "Cannot resolve config path: set ADVISOR_CONFIG or HOME/XDG_CONFIG_HOME.".to_string()
    })?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("symptom-advisor")
        .join("config.toml"))
}

/// Reads an environment variable, treating blank values as unset.
pub fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
