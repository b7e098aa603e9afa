use serde::{Deserialize, Serialize};

use super::ItemId;

/// An entry of the to-do checklist, stored in the `ITEMS` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ItemId,
    pub title: String,
    pub completed: bool,
}

impl ChecklistItem {
    /// Creates an open item with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            title: title.into(),
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_starts_open() {
        let item = ChecklistItem::new("water plants");
        assert_eq!(item.title, "water plants");
        assert!(!item.completed);
    }

    #[test]
    fn serialization_roundtrip() {
        let item = ChecklistItem {
            id: ItemId::new("i1"),
            title: "call mom".to_string(),
            completed: true,
        };

        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":"i1","title":"call mom","completed":true}"#);

        let deserialized: ChecklistItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, deserialized);
    }
}
