//! In-progress labels of the tag editing surface.
//!
//! The buffer is never persisted. Each row is classified against the
//! committed Tag Store and its siblings so the caller knows which rows may be
//! committed through the service.

use std::fmt;

use serde::Serialize;

use crate::models::{Tag, TagId};
use crate::store::{Keyed, reorder};

/// Classification of one row in a [`TagEditBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagInputStatus {
    Empty,
    Overlong,
    Duplicate,
    Unsaved,
    Good,
}

impl TagInputStatus {
    /// Returns `true` for rows that block a commit.
    pub fn is_error(self) -> bool {
        matches!(self, Self::Empty | Self::Overlong | Self::Duplicate)
    }
}

impl fmt::Display for TagInputStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Overlong => "overlong",
            Self::Duplicate => "duplicate",
            Self::Unsaved => "unsaved",
            Self::Good => "good",
        };
        f.write_str(s)
    }
}

/// One edit row together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagInputWithStatus {
    pub id: TagId,
    pub label: String,
    pub status: TagInputStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TagInput {
    id: TagId,
    label: String,
}

impl Keyed for TagInput {
    type Key = TagId;

    fn key(&self) -> &TagId {
        &self.id
    }
}

/// Ordered in-progress labels, one row per committed tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEditBuffer {
    rows: Vec<TagInput>,
}

impl TagEditBuffer {
    /// Starts a buffer holding the committed labels.
    pub fn from_tags(committed: &[Tag]) -> Self {
        Self {
            rows: committed
                .iter()
                .map(|tag| TagInput {
                    id: tag.id().clone(),
                    label: tag.label().to_string(),
                })
                .collect(),
        }
    }

    /// Follows a change to the committed Tag Store.
    ///
    /// Rows take committed order. Existing rows keep their in-progress label,
    /// new tags bring their committed label and deleted tags lose their row.
    pub fn sync(&mut self, committed: &[Tag]) {
        self.rows = committed
            .iter()
            .map(|tag| {
                let label = self
                    .label(tag.id())
                    .map_or_else(|| tag.label().to_string(), str::to_string);
                TagInput {
                    id: tag.id().clone(),
                    label,
                }
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The in-progress label of `id`.
    pub fn label(&self, id: &TagId) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| &row.id == id)
            .map(|row| row.label.as_str())
    }

    /// Replaces the in-progress label of `id`. Returns `false` if no row has that id.
    pub fn set_label(&mut self, id: &TagId, label: impl Into<String>) -> bool {
        match self.rows.iter_mut().find(|row| &row.id == id) {
            Some(row) => {
                row.label = label.into();
                true
            }
            None => false,
        }
    }

    /// Moves the row `active` to the position of `over`.
    pub fn move_row(&mut self, active: &TagId, over: &TagId) -> bool {
        reorder(&mut self.rows, active, over)
    }

    fn status_of(&self, row: &TagInput, committed: &[Tag], max_len: usize) -> TagInputStatus {
        let len = row.label.chars().count();
        if len == 0 {
            return TagInputStatus::Empty;
        }
        if len > max_len {
            return TagInputStatus::Overlong;
        }
        if self
            .rows
            .iter()
            .any(|other| other.id != row.id && other.label == row.label)
        {
            return TagInputStatus::Duplicate;
        }
        let saved = committed
            .iter()
            .find(|tag| tag.id() == &row.id)
            .map(Tag::label);
        if saved == Some(row.label.as_str()) {
            TagInputStatus::Good
        } else {
            TagInputStatus::Unsaved
        }
    }

    /// Classifies every row, in buffer order.
    ///
    /// Checks run in order: empty, overlong, duplicate, unsaved. A row that
    /// passes all of them is good.
    pub fn statuses(&self, committed: &[Tag], max_len: usize) -> Vec<TagInputWithStatus> {
        self.rows
            .iter()
            .map(|row| TagInputWithStatus {
                id: row.id.clone(),
                label: row.label.clone(),
                status: self.status_of(row, committed, max_len),
            })
            .collect()
    }

    /// The label to commit for `id`, present only when the row is unsaved.
    pub fn committable(&self, id: &TagId, committed: &[Tag], max_len: usize) -> Option<&str> {
        let row = self.rows.iter().find(|row| &row.id == id)?;
        (self.status_of(row, committed, max_len) == TagInputStatus::Unsaved)
            .then_some(row.label.as_str())
    }

    /// Resets the row of `id` to its committed label.
    pub fn revert(&mut self, id: &TagId, committed: &[Tag]) {
        if let Some(tag) = committed.iter().find(|tag| tag.id() == id) {
            self.set_label(id, tag.label());
        }
    }
}
