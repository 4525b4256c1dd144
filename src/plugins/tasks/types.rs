use serde::{Deserialize, Serialize};

/// One to-do entry as held in memory and written to preferences.
///
/// `id` and `added_time` are fixed at creation; everything else is editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub added_time: String,
    #[serde(default)]
    pub is_important: bool,
    /// Reference to an externally owned image, never the bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

/// The user-editable fields of a task, as collected by an add or edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub is_important: bool,
    pub image_uri: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            is_important: false,
            image_uri: None,
        }
    }

    pub fn important(mut self, is_important: bool) -> Self {
        self.is_important = is_important;
        self
    }

    pub fn image(mut self, image_uri: Option<String>) -> Self {
        self.image_uri = image_uri;
        self
    }

    /// Draft pre-filled from an existing task, for edit forms.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            is_important: task.is_important,
            image_uri: task.image_uri.clone(),
        }
    }
}

/// Delta notification for whoever renders the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    Inserted(usize),
    Removed(usize),
    /// The whole list must be redrawn.
    Reset,
}
