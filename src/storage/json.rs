// storage/json.rs — flat-file JSON task store.
//
// The whole task list lives in memory and is rewritten to tasks.json after
// every mutation. Written atomically: tmp file → rename to prevent partial
// reads. All access is serialized through one RwLock, so in-process writers
// cannot lose each other's updates.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use super::{NewTask, TaskStore};
use crate::tasks::model::Task;

pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<State>,
}

struct State {
    /// Insertion-ordered; `list` sorts a copy, never this sequence.
    tasks: Vec<Task>,
    next_id: i64,
}

impl JsonFileStore {
    /// Load `{data_dir}/tasks.json`, or start empty when the file does not
    /// exist yet. A file that exists but does not parse is an error — silently
    /// discarding a task list is worse than refusing to start.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).await?;
        let path = data_dir.join("tasks.json");
        let tasks: Vec<Task> = match fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("malformed task file: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading task file: {}", path.display()))
            }
        };

        // Seeded past every id ever persisted, so ids freed by deletions in a
        // previous run are never handed out again.
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;

        Ok(Self {
            path,
            state: RwLock::new(State { tasks, next_id }),
        })
    }

    async fn flush(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for JsonFileStore {
    async fn insert(&self, new: NewTask) -> Result<Task> {
        let mut state = self.state.write().await;
        let task = Task {
            id: state.next_id,
            description: new.description,
            category: new.category,
            deadline: new.deadline,
            completed: false,
            created_at: None,
        };
        state.next_id += 1;
        state.tasks.push(task.clone());
        self.flush(&state.tasks).await?;
        Ok(task)
    }

    async fn get(&self, id: i64) -> Result<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self, completed: Option<bool>) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| completed.map_or(true, |flag| t.completed == flag))
            .cloned()
            .collect();
        // None < Some(date): undated tasks first, then ascending by date.
        // Stable sort keeps insertion order among equal deadlines.
        tasks.sort_by_key(|t| t.deadline);
        Ok(tasks)
    }

    async fn update(&self, task: &Task) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task.clone(),
            None => return Ok(false),
        }
        self.flush(&state.tasks).await?;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        let removed = state.tasks.len() != before;
        if removed {
            self.flush(&state.tasks).await?;
        }
        Ok(removed)
    }

    async fn delete_all(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.tasks.clear();
        self.flush(&state.tasks).await?;
        Ok(())
    }
}
