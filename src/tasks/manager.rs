// tasks/manager.rs — validation + orchestration between REST and storage.
//
// The manager owns every rule that is not pure persistence: the category
// allow-list, deadline parsing, partial-edit semantics, and the
// false → true completion transition. Both stores see only clean records.

use std::sync::Arc;

use chrono::NaiveDate;

use super::error::TaskError;
use super::model::{Category, NewTaskInput, Task, TaskPatch};
use crate::storage::{NewTask, TaskStore};

pub struct TaskManager {
    store: Arc<dyn TaskStore>,
}

impl TaskManager {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a new task. The store assigns the id; the
    /// returned record always has `completed = false`.
    pub async fn add_task(&self, input: NewTaskInput) -> Result<Task, TaskError> {
        let description = match input.description {
            Some(d) if !d.is_empty() => d,
            _ => return Err(TaskError::Validation("Description is required".to_string())),
        };
        let category = match input.category.as_deref().filter(|c| !c.is_empty()) {
            Some(raw) => Some(
                Category::parse(raw)
                    .ok_or_else(|| TaskError::Validation("Categoria inválida".to_string()))?,
            ),
            None => None,
        };
        let deadline = parse_deadline(input.deadline.as_deref())?;

        let task = self
            .store
            .insert(NewTask {
                description,
                category,
                deadline,
            })
            .await?;
        Ok(task)
    }

    /// Partial update. Only non-empty fields are applied; an unknown category
    /// is dropped silently and the record keeps its prior one.
    pub async fn edit_task(&self, id: i64, patch: TaskPatch) -> Result<Task, TaskError> {
        let mut task = self.store.get(id).await?.ok_or(TaskError::NotFound)?;

        if let Some(description) = patch.description.filter(|d| !d.is_empty()) {
            task.description = description;
        }
        if let Some(category) = patch.category.as_deref().and_then(Category::parse) {
            task.category = Some(category);
        }
        if let Some(deadline) = parse_deadline(patch.deadline.as_deref())? {
            task.deadline = Some(deadline);
        }

        if !self.store.update(&task).await? {
            // Deleted between the read and the write.
            return Err(TaskError::NotFound);
        }
        Ok(task)
    }

    /// Idempotent: deleting an absent id is already-satisfied, not an error.
    pub async fn delete_task(&self, id: i64) -> Result<(), TaskError> {
        self.store.delete(id).await?;
        Ok(())
    }

    /// Set `completed = true`. Idempotent when the task is already completed;
    /// there is no reverse transition.
    pub async fn mark_completed(&self, id: i64) -> Result<Task, TaskError> {
        let mut task = self.store.get(id).await?.ok_or(TaskError::NotFound)?;
        task.completed = true;
        if !self.store.update(&task).await? {
            return Err(TaskError::NotFound);
        }
        Ok(task)
    }

    /// List tasks, optionally filtered on the completion flag. Both stores
    /// return undated tasks first, then ascending by deadline.
    pub async fn get_tasks(&self, completed: Option<bool>) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.list(completed).await?)
    }

    /// Remove every record. Always succeeds, even on an empty store.
    pub async fn delete_all(&self) -> Result<(), TaskError> {
        self.store.delete_all().await?;
        Ok(())
    }
}

fn parse_deadline(raw: Option<&str>) -> Result<Option<NaiveDate>, TaskError> {
    match raw.filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                TaskError::Validation("Invalid deadline, expected YYYY-MM-DD".to_string())
            }),
        None => Ok(None),
    }
}
