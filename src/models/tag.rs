use serde::{Deserialize, Serialize};

use super::TagId;

/// A labeled category that notes refer to by id.
///
/// Serialized as `{ "id": ..., "label": ... }`, the layout of the `TAGS` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    label: String,
}

impl Tag {
    /// Creates a tag from an existing id and label.
    ///
    /// # Examples
    ///
    /// ```
    /// use getem::{Tag, TagId};
    ///
    /// let tag = Tag::new(TagId::new("t1"), "work");
    /// assert_eq!(tag.id(), &TagId::new("t1"));
    /// assert_eq!(tag.label(), "work");
    /// ```
    pub fn new(id: TagId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// Creates a tag with a freshly generated id.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self::new(TagId::generate(), label)
    }

    /// Returns the tag's unique identifier.
    pub fn id(&self) -> &TagId {
        &self.id
    }

    /// Returns the display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }
}

/// A tag annotated with whether any note currently references it.
///
/// Derived from the Tag Store and Note Store, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWithNotesInfo {
    #[serde(flatten)]
    tag: Tag,
    is_used_by_notes: bool,
}

impl TagWithNotesInfo {
    pub fn new(tag: Tag, is_used_by_notes: bool) -> Self {
        Self {
            tag,
            is_used_by_notes,
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn id(&self) -> &TagId {
        self.tag.id()
    }

    pub fn label(&self) -> &str {
        self.tag.label()
    }

    /// Returns `true` when at least one note lists this tag.
    pub fn is_used_by_notes(&self) -> bool {
        self.is_used_by_notes
    }
}
