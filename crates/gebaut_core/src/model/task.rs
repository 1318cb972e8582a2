use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub priority: Priority,
    pub impact: ImpactLevel,
    /// Derived from `due_date` whenever the task is written; never set directly.
    pub urgency: UrgencyLevel,
    pub due_date: Option<Date>,
    pub delegated_to: Option<String>,
    pub completed: bool,
    pub created_at: OffsetDateTime,
}

/// Everything a caller supplies when creating a task. The store assigns the
/// id, the creation timestamp and the urgency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub priority: Priority,
    pub impact: ImpactLevel,
    pub due_date: Option<Date>,
    pub delegated_to: Option<String>,
    pub completed: bool,
}

impl NewTask {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            priority: Priority::Medium,
            impact: ImpactLevel::Medium,
            due_date: None,
            delegated_to: None,
            completed: false,
        }
    }
}

/// Partial update merged into an existing task. `None` leaves a field alone;
/// the nested options on `due_date` and `delegated_to` allow clearing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub impact: Option<ImpactLevel>,
    pub due_date: Option<Option<Date>>,
    pub delegated_to: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl From<NewTask> for TaskPatch {
    fn from(task: NewTask) -> Self {
        Self {
            text: Some(task.text),
            priority: Some(task.priority),
            impact: Some(task.impact),
            due_date: Some(task.due_date),
            delegated_to: Some(task.delegated_to),
            completed: Some(task.completed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn shape(self) -> &'static str {
        match self {
            Self::High => "△",
            Self::Medium => "□",
            Self::Low => "○",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

impl ImpactLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Position in the impact sort order: high first, low last.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    VeryUrgent,
    MediumUrgent,
    NotUrgent,
}

impl UrgencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryUrgent => "very_urgent",
            Self::MediumUrgent => "medium_urgent",
            Self::NotUrgent => "not_urgent",
        }
    }
}

fn unknown_level(field: &str, raw: &str) -> AppError {
    AppError::invalid_input(format!("{field} must be high, medium or low (got '{raw}')"))
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(unknown_level("priority", other)),
        }
    }
}

impl FromStr for ImpactLevel {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(unknown_level("impact", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
