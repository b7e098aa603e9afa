use serde::{Deserialize, Serialize};

use crate::models::{ChecklistItem, ItemId};

/// The to-do checklist: an ordered list of items that can be ticked off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checklist {
    items: Vec<ChecklistItem>,
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Appends an open item.
    pub fn add_item(&mut self, title: impl Into<String>) -> ChecklistItem {
        let item = ChecklistItem::new(title);
        self.items.push(item.clone());
        item
    }

    /// Sets the completion flag of `id`. Returns `false` if `id` is unknown.
    pub fn toggle_item(&mut self, id: &ItemId, completed: bool) -> bool {
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.completed = completed;
                true
            }
            None => false,
        }
    }

    pub fn delete_item(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }
}
