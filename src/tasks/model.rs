//! Task data model types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The fixed category allow-list.
///
/// Enforced for both backends at creation time; an unknown category on edit
/// is dropped silently (the record keeps its prior category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Home,
    Health,
    Finance,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Home,
        Category::Health,
        Category::Finance,
    ];

    /// Parse a category name. Returns `None` for anything outside the set.
    pub fn parse(raw: &str) -> Option<Category> {
        match raw {
            "Work" => Some(Category::Work),
            "Personal" => Some(Category::Personal),
            "Home" => Some(Category::Home),
            "Health" => Some(Category::Health),
            "Finance" => Some(Category::Finance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Home => "Home",
            Category::Health => "Health",
            Category::Finance => "Finance",
        }
    }
}

/// A task record.
///
/// `id` is assigned by the store at creation and never reused while the store
/// lives. `completed` only ever transitions false → true. `created_at`
/// (`YYYY-MM-DD HH:MM:SS`, UTC) is set by the SQLite backend only; the file
/// backend carries none and omits the field from its serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub category: Option<Category>,
    /// Optional date, no time-of-day. Wire and file format `YYYY-MM-DD`.
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Request body for task creation. Every field arrives raw and optional —
/// validation lives in the manager, not the deserializer.
#[derive(Debug, Default, Deserialize)]
pub struct NewTaskInput {
    pub description: Option<String>,
    pub category: Option<String>,
    pub deadline: Option<String>,
}

/// Partial update body. Empty strings count as absent, so a client sending
/// `{"description": ""}` leaves the description untouched.
#[derive(Debug, Default, Deserialize)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub category: Option<String>,
    pub deadline: Option<String>,
}
