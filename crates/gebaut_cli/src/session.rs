//! One interactive session: the task store plus the view state around it.
//!
//! Every command returns the text to print so the read loop in `main` stays
//! the only place that writes to stdout.

use crate::cli::{Command, ConfigOverrideTarget, parse_config_override};
use crate::render::{self, ListedTask};
use gebaut_core::config::{Config, ConfigOverrides, Palette, merge_overrides};
use gebaut_core::error::AppError;
use gebaut_core::form::TaskForm;
use gebaut_core::model::{Task, TaskPatch};
use gebaut_core::store::{SortOrder, TaskStore};
use log::debug;

pub struct Session {
    store: TaskStore,
    sort_order: SortOrder,
    config: Config,
    palette: Palette,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let palette = config.palette();
        Self {
            store: TaskStore::new(),
            sort_order: SortOrder::default(),
            config,
            palette,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Merges `--config-override` values into the session config.
    pub fn apply_overrides(&mut self, raw_overrides: &[String]) -> Result<(), AppError> {
        if raw_overrides.is_empty() {
            return Ok(());
        }

        let mut overrides = ConfigOverrides::default();
        for raw in raw_overrides {
            let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
            match parsed.target {
                ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
                ConfigOverrideTarget::Alias(name) => {
                    overrides.aliases.insert(name, parsed.value);
                }
            }
        }

        self.config = merge_overrides(&self.config, &overrides);
        self.palette = self.config.palette();
        debug!("event=config_override count={}", raw_overrides.len());
        Ok(())
    }

    /// Resolves a task id, or a 1-based position in storage order, to an id.
    pub fn resolve(&self, reference: &str) -> Result<String, AppError> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("task is required"));
        }

        if let Some(task) = self.store.get(trimmed) {
            return Ok(task.id.clone());
        }

        trimmed
            .parse::<usize>()
            .ok()
            .and_then(|position| position.checked_sub(1))
            .and_then(|index| self.store.tasks().get(index))
            .map(|task| task.id.clone())
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }

    pub fn execute(&mut self, command: Command, json: bool) -> Result<String, AppError> {
        match command {
            Command::Add {
                text,
                priority,
                impact,
                due,
                delegate,
            } => {
                let form = TaskForm {
                    text: text.unwrap_or_default(),
                    priority,
                    impact,
                    due_date: due.unwrap_or_default(),
                    delegated_to: delegate.unwrap_or_default(),
                    completed: false,
                };
                let new_task = form.submit()?;
                let task = self.store.add(new_task).clone();
                self.report("Added", &task, json)
            }
            Command::Edit {
                task,
                text,
                priority,
                impact,
                due,
                delegate,
            } => {
                let id = self.resolve(&task)?;
                let current = self.existing(&id)?;
                let mut form = TaskForm::from_task(current)?;
                if let Some(text) = text {
                    form.text = text;
                }
                if let Some(priority) = priority {
                    form.priority = priority;
                }
                if let Some(impact) = impact {
                    form.impact = impact;
                }
                if let Some(due) = due {
                    form.due_date = due;
                }
                if let Some(delegate) = delegate {
                    form.delegated_to = delegate;
                }

                let patch = TaskPatch::from(form.submit()?);
                let task = self
                    .store
                    .update(&id, patch)
                    .cloned()
                    .ok_or_else(|| AppError::invalid_input("task not found"))?;
                self.report("Updated", &task, json)
            }
            Command::Toggle { task } => {
                let id = self.resolve(&task)?;
                let task = self
                    .store
                    .toggle(&id)
                    .cloned()
                    .ok_or_else(|| AppError::invalid_input("task not found"))?;
                let verb = if task.completed { "Completed" } else { "Reopened" };
                self.report(verb, &task, json)
            }
            Command::Delete { task } => {
                let id = self.resolve(&task)?;
                let task = self
                    .store
                    .delete(&id)
                    .ok_or_else(|| AppError::invalid_input("task not found"))?;
                self.report("Deleted", &task, json)
            }
            Command::Move { from, to } => {
                let from_index = position_to_index(from)?;
                let to_index = position_to_index(to)?;
                self.store.reorder(from_index, to_index)?;

                let task = self.store.tasks()[to_index].clone();
                if json {
                    let mut value = render::task_json(&task)?;
                    value["position"] = serde_json::json!(to);
                    Ok(value.to_string())
                } else {
                    Ok(format!(
                        "Moved task: {} ({}) to position {to}",
                        task.text, task.id
                    ))
                }
            }
            Command::Sort { order } => {
                self.sort_order = match order {
                    Some(raw) => raw.parse()?,
                    None => self.sort_order.toggled(),
                };
                if json {
                    Ok(serde_json::json!({ "sort_order": self.sort_order.as_str() }).to_string())
                } else {
                    Ok(format!("Sort order: {}", self.sort_order))
                }
            }
            Command::List { delegated } => {
                let view = if delegated {
                    self.store.delegated(self.sort_order)
                } else {
                    self.store.view(self.sort_order)
                };
                let listed = self.listed(view);

                if json {
                    Ok(render::task_list_json(&listed)?.to_string())
                } else {
                    let title = if delegated { "Delegated Tasks" } else { "Tasks" };
                    render::task_list(title, &listed, self.sort_order, &self.palette)
                }
            }
            Command::Show { task } => {
                let id = self.resolve(&task)?;
                let task = self.existing(&id)?;
                let position = self.store.position(&id).map_or(0, |index| index + 1);
                if json {
                    let mut value = render::task_json(task)?;
                    value["position"] = serde_json::json!(position);
                    Ok(value.to_string())
                } else {
                    render::task_details(task, position, &self.palette)
                }
            }
        }
    }

    fn existing(&self, id: &str) -> Result<&Task, AppError> {
        self.store
            .get(id)
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }

    fn listed<'a>(&'a self, view: Vec<&'a Task>) -> Vec<ListedTask<'a>> {
        view.into_iter()
            .map(|task| ListedTask {
                position: self.store.position(&task.id).map_or(0, |index| index + 1),
                task,
            })
            .collect()
    }

    fn report(&self, verb: &str, task: &Task, json: bool) -> Result<String, AppError> {
        if json {
            Ok(render::task_json(task)?.to_string())
        } else {
            Ok(render::task_summary(verb, task, &self.palette))
        }
    }
}

fn position_to_index(position: usize) -> Result<usize, AppError> {
    position
        .checked_sub(1)
        .ok_or_else(|| AppError::invalid_input("positions start at 1"))
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::cli::Cli;
    use clap::Parser;
    use gebaut_core::config::Config;
    use gebaut_core::model::{ImpactLevel, UrgencyLevel};
    use gebaut_core::store::SortOrder;

    fn run(session: &mut Session, args: &[&str]) -> Result<String, gebaut_core::error::AppError> {
        let mut argv = vec!["gebaut"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        session.apply_overrides(&cli.config_override)?;
        session.execute(cli.command, cli.json)
    }

    fn texts(session: &Session) -> Vec<String> {
        session
            .store()
            .tasks()
            .iter()
            .map(|task| task.text.clone())
            .collect()
    }

    #[test]
    fn add_then_list_keeps_state_in_memory() {
        let mut session = Session::new(Config::default());

        let added = run(&mut session, &["add", "  buy milk ", "-i", "high"]).unwrap();
        run(&mut session, &["add", "call Ada", "--delegate", "Ada"]).unwrap();
        let listed = run(&mut session, &["list"]).unwrap();

        assert!(added.starts_with("Added task: □ buy milk (task-"));
        assert_eq!(texts(&session), vec!["buy milk", "call Ada"]);
        assert_eq!(session.store().tasks()[0].impact, ImpactLevel::High);
        assert!(listed.contains("buy milk"));
        assert!(listed.contains("call Ada"));
    }

    #[test]
    fn add_rejects_blank_text_without_touching_store() {
        let mut session = Session::new(Config::default());

        let err = run(&mut session, &["add", "   "]).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert!(session.store().is_empty());
    }

    #[test]
    fn resolve_accepts_ids_and_positions() {
        let mut session = Session::new(Config::default());
        run(&mut session, &["add", "first"]).unwrap();
        run(&mut session, &["add", "second"]).unwrap();
        let second_id = session.store().tasks()[1].id.clone();

        assert_eq!(session.resolve("2").unwrap(), second_id);
        assert_eq!(session.resolve(&second_id).unwrap(), second_id);
        assert_eq!(session.resolve("0").unwrap_err().code(), "invalid_input");
        assert_eq!(session.resolve("3").unwrap_err().code(), "invalid_input");
        assert_eq!(session.resolve(" ").unwrap_err().message(), "task is required");
    }

    #[test]
    fn toggle_reports_completed_and_reopened() {
        let mut session = Session::new(Config::default());
        run(&mut session, &["add", "demo"]).unwrap();

        let first = run(&mut session, &["toggle", "1"]).unwrap();
        let second = run(&mut session, &["toggle", "1"]).unwrap();

        assert!(first.starts_with("Completed task:"));
        assert!(second.starts_with("Reopened task:"));
        assert!(!session.store().tasks()[0].completed);
    }

    #[test]
    fn edit_changes_only_given_fields_and_rederives_urgency() {
        let mut session = Session::new(Config::default());
        run(
            &mut session,
            &["add", "report", "-p", "low", "--due", "2000-01-01", "--delegate", "Ada"],
        )
        .unwrap();
        assert_eq!(
            session.store().tasks()[0].urgency,
            UrgencyLevel::VeryUrgent
        );

        run(&mut session, &["edit", "1", "--due", "", "--text", "final report"]).unwrap();
        let task = &session.store().tasks()[0];

        assert_eq!(task.text, "final report");
        assert_eq!(task.due_date, None);
        assert_eq!(task.urgency, UrgencyLevel::MediumUrgent);
        assert_eq!(task.delegated_to.as_deref(), Some("Ada"));
        assert_eq!(task.priority.as_str(), "low");
    }

    #[test]
    fn edit_rejects_blank_text() {
        let mut session = Session::new(Config::default());
        run(&mut session, &["add", "report"]).unwrap();

        let err = run(&mut session, &["edit", "1", "--text", "  "]).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert_eq!(texts(&session), vec!["report"]);
    }

    #[test]
    fn delete_and_move_use_positions() {
        let mut session = Session::new(Config::default());
        for text in ["a", "b", "c"] {
            run(&mut session, &["add", text]).unwrap();
        }

        run(&mut session, &["move", "3", "1"]).unwrap();
        assert_eq!(texts(&session), vec!["c", "a", "b"]);

        run(&mut session, &["delete", "2"]).unwrap();
        assert_eq!(texts(&session), vec!["c", "b"]);

        let err = run(&mut session, &["move", "1", "5"]).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
        let err = run(&mut session, &["move", "0", "1"]).unwrap_err();
        assert_eq!(err.message(), "positions start at 1");
        assert_eq!(texts(&session), vec!["c", "b"]);
    }

    #[test]
    fn sort_flips_or_sets_view_order() {
        let mut session = Session::new(Config::default());
        run(&mut session, &["add", "low", "-i", "low"]).unwrap();
        run(&mut session, &["add", "high", "-i", "high"]).unwrap();

        run(&mut session, &["sort"]).unwrap();
        assert_eq!(session.sort_order(), SortOrder::Impact);

        let listed = run(&mut session, &["list", "--json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&listed).unwrap();
        assert_eq!(value[0]["text"], "high");
        assert_eq!(value[0]["position"], 2);
        assert_eq!(texts(&session), vec!["low", "high"]);

        run(&mut session, &["sort", "default"]).unwrap();
        assert_eq!(session.sort_order(), SortOrder::Default);
    }

    #[test]
    fn list_delegated_filters_tasks() {
        let mut session = Session::new(Config::default());
        run(&mut session, &["add", "mine"]).unwrap();
        run(&mut session, &["add", "theirs", "--delegate", "Grace"]).unwrap();

        let listed = run(&mut session, &["list", "--delegated", "--json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&listed).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["delegated_to"], "Grace");
    }

    #[test]
    fn config_override_switches_theme_for_session() {
        let mut session = Session::new(Config::default());

        run(&mut session, &["list", "--config-override", "theme=bauhaus"]).unwrap();
        assert_eq!(session.config().theme.as_deref(), Some("bauhaus"));

        let err = run(&mut session, &["list", "--config-override", "nope"]).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }
}
