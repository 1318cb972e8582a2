//! Add/edit form model.
//!
//! A `TaskForm` holds what the user typed, as raw strings. `submit` turns it
//! into validated task fields; nothing reaches the store until it succeeds.

use crate::error::AppError;
use crate::model::{ImpactLevel, NewTask, Priority, Task};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DUE_DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub text: String,
    pub priority: String,
    pub impact: String,
    /// `YYYY-MM-DD`, or empty for no due date.
    pub due_date: String,
    /// Empty means the task is not delegated.
    pub delegated_to: String,
    pub completed: bool,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            text: String::new(),
            priority: Priority::Medium.as_str().to_string(),
            impact: ImpactLevel::Medium.as_str().to_string(),
            due_date: String::new(),
            delegated_to: String::new(),
            completed: false,
        }
    }
}

impl TaskForm {
    /// Prefills the form with an existing task for editing.
    pub fn from_task(task: &Task) -> Result<Self, AppError> {
        let due_date = match task.due_date {
            Some(date) => format_due_date(date)?,
            None => String::new(),
        };

        Ok(Self {
            text: task.text.clone(),
            priority: task.priority.as_str().to_string(),
            impact: task.impact.as_str().to_string(),
            due_date,
            delegated_to: task.delegated_to.clone().unwrap_or_default(),
            completed: task.completed,
        })
    }

    pub fn submit(&self) -> Result<NewTask, AppError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(AppError::invalid_input("text is required"));
        }

        let delegated_to = self.delegated_to.trim();

        Ok(NewTask {
            text: text.to_string(),
            priority: self.priority.parse()?,
            impact: self.impact.parse()?,
            due_date: parse_due_date(&self.due_date)?,
            delegated_to: (!delegated_to.is_empty()).then(|| delegated_to.to_string()),
            completed: self.completed,
        })
    }
}

pub fn parse_due_date(raw: &str) -> Result<Option<Date>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    Date::parse(trimmed, DUE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| AppError::invalid_input("due date must be YYYY-MM-DD"))
}

pub fn format_due_date(date: Date) -> Result<String, AppError> {
    date.format(DUE_DATE_FORMAT)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{TaskForm, format_due_date, parse_due_date};
    use crate::model::{ImpactLevel, NewTask, Priority, TaskPatch};
    use crate::store::TaskStore;
    use time::macros::date;

    #[test]
    fn default_form_matches_new_task_defaults() {
        let form = TaskForm {
            text: "demo".to_string(),
            ..TaskForm::default()
        };

        assert_eq!(form.submit().unwrap(), NewTask::new("demo"));
    }

    #[test]
    fn submit_trims_text_and_delegate() {
        let form = TaskForm {
            text: "  call the plumber ".to_string(),
            priority: "high".to_string(),
            impact: "low".to_string(),
            due_date: "2026-10-20".to_string(),
            delegated_to: "  Ada ".to_string(),
            completed: false,
        };

        let task = form.submit().unwrap();

        assert_eq!(task.text, "call the plumber");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.impact, ImpactLevel::Low);
        assert_eq!(task.due_date, Some(date!(2026 - 10 - 20)));
        assert_eq!(task.delegated_to.as_deref(), Some("Ada"));
    }

    #[test]
    fn submit_rejects_blank_text() {
        let form = TaskForm {
            text: "   ".to_string(),
            ..TaskForm::default()
        };

        let err = form.submit().unwrap_err();
        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.message(), "text is required");
    }

    #[test]
    fn submit_treats_blank_delegate_as_none() {
        let form = TaskForm {
            text: "demo".to_string(),
            delegated_to: "   ".to_string(),
            ..TaskForm::default()
        };

        assert_eq!(form.submit().unwrap().delegated_to, None);
    }

    #[test]
    fn submit_rejects_bad_levels_and_dates() {
        let bad_priority = TaskForm {
            text: "demo".to_string(),
            priority: "critical".to_string(),
            ..TaskForm::default()
        };
        assert_eq!(bad_priority.submit().unwrap_err().code(), "invalid_input");

        let bad_date = TaskForm {
            text: "demo".to_string(),
            due_date: "20/10/2026".to_string(),
            ..TaskForm::default()
        };
        let err = bad_date.submit().unwrap_err();
        assert_eq!(err.message(), "due date must be YYYY-MM-DD");
    }

    #[test]
    fn from_task_round_trips_through_edit() {
        let mut store = TaskStore::new();
        let mut new_task = NewTask::new("review");
        new_task.due_date = Some(date!(2026 - 12 - 01));
        new_task.delegated_to = Some("Grace".to_string());
        let id = store.add(new_task).id.clone();
        store.toggle(&id);

        let task = store.get(&id).unwrap().clone();
        let mut form = TaskForm::from_task(&task).unwrap();
        assert_eq!(form.due_date, "2026-12-01");
        assert_eq!(form.delegated_to, "Grace");
        assert!(form.completed);

        form.text = "review again".to_string();
        let patch = TaskPatch::from(form.submit().unwrap());
        let updated = store.update(&id, patch).unwrap();

        assert_eq!(updated.text, "review again");
        assert_eq!(updated.due_date, Some(date!(2026 - 12 - 01)));
        assert_eq!(updated.delegated_to.as_deref(), Some("Grace"));
        assert!(updated.completed);
    }

    #[test]
    fn due_date_helpers_handle_empty_and_valid_input() {
        assert_eq!(parse_due_date("").unwrap(), None);
        assert_eq!(
            parse_due_date(" 2026-02-28 ").unwrap(),
            Some(date!(2026 - 02 - 28))
        );
        assert_eq!(
            format_due_date(date!(2026 - 02 - 03)).unwrap(),
            "2026-02-03"
        );
    }
}
