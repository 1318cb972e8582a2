mod task;

pub use task::{ImpactLevel, NewTask, Priority, Task, TaskPatch, UrgencyLevel};
