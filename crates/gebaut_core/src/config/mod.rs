use crate::error::AppError;
use crate::model::Priority;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "GEBAUT_CONFIG_PATH";
const APP_DIR_NAME: &str = "gebaut";

/// ANSI escape codes used when rendering tasks. The `default` theme leaves
/// every code empty so output stays plain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub high: &'static str,
    pub medium: &'static str,
    pub low: &'static str,
    pub accent: &'static str,
    pub muted: &'static str,
    pub strike: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn priority(&self, priority: Priority, text: &str) -> String {
        let code = match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        };
        paint(code, self.reset, text)
    }

    pub fn accentize(&self, text: &str) -> String {
        paint(self.accent, self.reset, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        paint(self.muted, self.reset, text)
    }

    pub fn strike(&self, text: &str) -> String {
        paint(self.strike, self.reset, text)
    }
}

fn paint(code: &str, reset: &str, text: &str) -> String {
    if code.is_empty() {
        text.to_string()
    } else {
        format!("{code}{text}{reset}")
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.map(canonical_theme_name).as_deref() {
        Some("bauhaus") => Palette {
            high: "\x1b[38;5;220m",
            medium: "\x1b[38;5;196m",
            low: "\x1b[38;5;21m",
            accent: "\x1b[1m",
            muted: "\x1b[38;5;244m",
            strike: "\x1b[9;38;5;244m",
            reset: "\x1b[0m",
        },
        Some("noir") => Palette {
            high: "\x1b[38;5;229m",
            medium: "\x1b[38;5;210m",
            low: "\x1b[38;5;111m",
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            strike: "\x1b[9;38;5;250m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            high: "",
            medium: "",
            low: "",
            accent: "",
            muted: "",
            strike: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    match trimmed {
        "" | "vanilla" | "light" | "plain" => "default".to_string(),
        "dark" | "dark_mode" | "darkmode" => "noir".to_string(),
        "color" | "colour" | "primary" => "bauhaus".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    /// Interactive shortcuts: the first word of a line is replaced by the
    /// aliased command.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Config {
    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }

    pub fn expand_alias(&self, line: &str) -> Option<String> {
        let trimmed = line.trim_start();
        let (head, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));
        let expansion = self.aliases.get(head)?;
        if rest.trim().is_empty() {
            Some(expansion.clone())
        } else {
            Some(format!("{expansion} {}", rest.trim()))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub aliases: HashMap<String, String>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.map(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref() {
        merged.theme = Some(canonical_theme_name(theme));
    }

    for (alias, value) in overrides.aliases.iter() {
        merged.aliases.insert(alias.clone(), value.clone());
    }

    merged
}
