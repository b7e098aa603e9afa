use serde::{Deserialize, Serialize};

use super::{NoteId, Tag, TagId};

/// A titled text record referring to zero or more tags by id.
///
/// This is the stored shape of the `NOTES` slot:
/// `{ "id", "title", "body", "tagIds": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier, generated at creation.
    pub id: NoteId,
    /// Short title, searched case-insensitively.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Weak references into the Tag Store, in the order the note was saved with.
    pub tag_ids: Vec<TagId>,
}

impl Note {
    /// Returns `true` if the note lists `tag_id`.
    pub fn has_tag(&self, tag_id: &TagId) -> bool {
        self.tag_ids.contains(tag_id)
    }
}

/// Input for creating or updating a note: title, body and the chosen tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteData {
    pub title: String,
    pub body: String,
    pub tags: Vec<Tag>,
}

impl NoteData {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tags,
        }
    }
}

/// A note whose tag ids have been replaced by the referenced tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedNote {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub tags: Vec<Tag>,
}

impl ResolvedNote {
    /// Returns `true` if the resolved tags include `tag_id`.
    pub fn has_tag(&self, tag_id: &TagId) -> bool {
        self.tags.iter().any(|tag| tag.id() == tag_id)
    }

    /// Returns the tag labels in resolved order.
    pub fn tag_labels(&self) -> Vec<&str> {
        self.tags.iter().map(Tag::label).collect()
    }
}

/// Builder for constructing `Note` instances with optional fields.
///
/// # Examples
///
/// ```
/// use getem::{NoteBuilder, NoteId, TagId};
///
/// let note = NoteBuilder::new()
///     .id(NoteId::new("n1"))
///     .title("Groceries")
///     .tag_ids(vec![TagId::new("t1")])
///     .build();
///
/// assert_eq!(note.title, "Groceries");
/// assert!(note.body.is_empty());
/// assert_eq!(note.tag_ids.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct NoteBuilder {
    id: Option<NoteId>,
    title: Option<String>,
    body: Option<String>,
    tag_ids: Option<Vec<TagId>>,
}

impl NoteBuilder {
    /// Creates a new `NoteBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the note ID.
    pub fn id(mut self, id: NoteId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the note title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the note body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the referenced tag ids.
    pub fn tag_ids(mut self, tag_ids: Vec<TagId>) -> Self {
        self.tag_ids = Some(tag_ids);
        self
    }

    /// Builds the `Note`.
    ///
    /// A missing id is generated; missing text fields default to empty.
    pub fn build(self) -> Note {
        Note {
            id: self.id.unwrap_or_else(NoteId::generate),
            title: self.title.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            tag_ids: self.tag_ids.unwrap_or_default(),
        }
    }
}
