use gebaut_core::config::Palette;
use gebaut_core::error::AppError;
use gebaut_core::form::format_due_date;
use gebaut_core::model::Task;
use gebaut_core::store::SortOrder;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

/// A task as it appears in a list, with its storage position (1-based).
pub struct ListedTask<'a> {
    pub position: usize,
    pub task: &'a Task,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "")]
    shape: String,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Impact")]
    impact: &'static str,
    #[tabled(rename = "Urgency")]
    urgency: &'static str,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Delegated")]
    delegated_to: String,
    #[tabled(rename = "Done")]
    done: &'static str,
}

pub fn due_label(task: &Task) -> Result<String, AppError> {
    match task.due_date {
        Some(date) => format_due_date(date),
        None => Ok("-".to_string()),
    }
}

fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, AppError> {
    timestamp
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn painted_text(task: &Task, palette: &Palette) -> String {
    if task.completed {
        palette.strike(&task.text)
    } else {
        task.text.clone()
    }
}

/// One-line summary used after add/edit/toggle/delete.
pub fn task_summary(verb: &str, task: &Task, palette: &Palette) -> String {
    let shape = palette.priority(task.priority, task.priority.shape());
    let text = painted_text(task, palette);
    format!("{verb} task: {shape} {text} ({})", task.id)
}

pub fn task_table(tasks: &[ListedTask<'_>], palette: &Palette) -> Result<String, AppError> {
    let mut rows = Vec::with_capacity(tasks.len());
    for listed in tasks {
        let task = listed.task;
        rows.push(TaskRow {
            position: listed.position,
            shape: palette.priority(task.priority, task.priority.shape()),
            text: painted_text(task, palette),
            impact: task.impact.as_str(),
            urgency: task.urgency.as_str(),
            due: due_label(task)?,
            delegated_to: task.delegated_to.clone().unwrap_or_else(|| "-".to_string()),
            done: if task.completed { "x" } else { "" },
        });
    }

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    Ok(table.to_string())
}

pub fn task_list(
    title: &str,
    tasks: &[ListedTask<'_>],
    order: SortOrder,
    palette: &Palette,
) -> Result<String, AppError> {
    let heading = palette.accentize(&title.to_uppercase());
    if tasks.is_empty() {
        return Ok(format!("{heading}\n{}", palette.mutedize("No tasks.")));
    }

    let open = tasks.iter().filter(|listed| !listed.task.completed).count();
    let footer = palette.mutedize(&format!(
        "{} tasks, {} open, sorted by {}",
        tasks.len(),
        open,
        order
    ));
    Ok(format!("{heading}\n{}\n{footer}", task_table(tasks, palette)?))
}

pub fn task_details(task: &Task, position: usize, palette: &Palette) -> Result<String, AppError> {
    let created_local = task.created_at.to_offset(local_offset());
    let status = if task.completed { "completed" } else { "open" };
    let lines = [
        format!("ID: {}", task.id),
        format!("Position: {position}"),
        format!(
            "Task: {} {}",
            palette.priority(task.priority, task.priority.shape()),
            task.text
        ),
        format!("Status: {status}"),
        format!("Priority: {}", task.priority),
        format!("Impact: {}", task.impact),
        format!("Urgency: {}", task.urgency),
        format!("Due: {}", due_label(task)?),
        format!(
            "Delegated to: {}",
            task.delegated_to.as_deref().unwrap_or("-")
        ),
        format!("Created: {}", format_timestamp(created_local)?),
    ];
    Ok(lines.join("\n"))
}

pub fn task_json(task: &Task) -> Result<serde_json::Value, AppError> {
    let due_date = match task.due_date {
        Some(date) => Some(format_due_date(date)?),
        None => None,
    };

    Ok(serde_json::json!({
        "id": task.id,
        "text": task.text,
        "priority": task.priority,
        "impact": task.impact,
        "urgency": task.urgency,
        "due_date": due_date,
        "delegated_to": task.delegated_to,
        "completed": task.completed,
        "created_at": format_timestamp(task.created_at)?,
    }))
}

pub fn task_list_json(tasks: &[ListedTask<'_>]) -> Result<serde_json::Value, AppError> {
    let mut payload = Vec::with_capacity(tasks.len());
    for listed in tasks {
        let mut value = task_json(listed.task)?;
        value["position"] = serde_json::json!(listed.position);
        payload.push(value);
    }
    Ok(serde_json::Value::Array(payload))
}
