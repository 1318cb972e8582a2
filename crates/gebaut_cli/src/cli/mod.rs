use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gebaut", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: gebaut add "Buy milk" -p high -i low --due 2026-10-20
    Add {
        text: Option<String>,
        /// Priority: high, medium or low
        #[arg(short = 'p', long, default_value = "medium")]
        priority: String,
        /// Impact: high, medium or low
        #[arg(short = 'i', long, default_value = "medium")]
        impact: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        /// Person the task is delegated to
        #[arg(long, value_name = "NAME")]
        delegate: Option<String>,
    },
    /// Edit a task; unspecified fields keep their value
    ///
    /// Example: edit 2 --text "Buy oat milk" --due ""
    Edit {
        /// Task id or list position
        task: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(short = 'p', long)]
        priority: Option<String>,
        #[arg(short = 'i', long)]
        impact: Option<String>,
        /// Due date (YYYY-MM-DD); empty clears it
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        /// Delegate name; empty clears it
        #[arg(long, value_name = "NAME")]
        delegate: Option<String>,
    },
    /// Mark a task done, or not done again
    ///
    /// Example: toggle 1
    Toggle {
        /// Task id or list position
        task: String,
    },
    /// Delete a task
    ///
    /// Example: delete 1
    Delete {
        /// Task id or list position
        task: String,
    },
    /// Move a task to another list position
    ///
    /// Example: move 3 1
    Move {
        from: usize,
        to: usize,
    },
    /// Set the list order, or flip it when no order is given
    ///
    /// Example: sort impact
    Sort {
        /// default or impact
        order: Option<String>,
    },
    /// List tasks
    ///
    /// Example: list
    /// Example: list --delegated
    List {
        /// Only tasks delegated to someone
        #[arg(long)]
        delegated: bool,
    },
    /// Show details of a task
    ///
    /// Example: show 1
    Show {
        /// Task id or list position
        task: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    match canonical_field.as_str() {
        "theme" => {
            if remainder.is_some() {
                Err("theme override cannot have subfields".to_string())
            } else {
                Ok(ParsedConfigOverride {
                    target: ConfigOverrideTarget::Theme,
                    value,
                })
            }
        }
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
