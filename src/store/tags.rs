use serde::{Deserialize, Serialize};

use super::reorder;
use crate::models::{Tag, TagId};

/// Ordered collection of tags.
///
/// Order is significant: it is the default order of a note's resolved tags
/// and the display order of the tag editor. Serializes as a plain array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagStore {
    tags: Vec<Tag>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already ordered tag list.
    pub fn from_tags(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, id: &TagId) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id() == id)
    }

    pub fn contains(&self, id: &TagId) -> bool {
        self.get(id).is_some()
    }

    /// Finds a tag by exact label.
    pub fn find_by_label(&self, label: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.label() == label)
    }

    /// Appends a tag with a fresh id and returns it.
    pub fn add_tag(&mut self, label: impl Into<String>) -> Tag {
        let tag = Tag::with_label(label);
        self.insert_tag(tag.clone());
        tag
    }

    /// Appends an already built tag. Returns `false` and leaves the store
    /// unchanged if its id is taken.
    pub fn insert_tag(&mut self, tag: Tag) -> bool {
        if self.contains(tag.id()) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Replaces the label of `id` in place. Returns `false` if `id` is unknown.
    pub fn rename_tag(&mut self, id: &TagId, label: impl Into<String>) -> bool {
        match self.tags.iter_mut().find(|tag| tag.id() == id) {
            Some(tag) => {
                tag.set_label(label);
                true
            }
            None => false,
        }
    }

    /// Removes `id` from the collection.
    ///
    /// This does not touch notes; callers must also strip the id from the
    /// Note Store in the same step.
    pub fn delete_tag(&mut self, id: &TagId) -> Option<Tag> {
        let index = self.tags.iter().position(|tag| tag.id() == id)?;
        Some(self.tags.remove(index))
    }

    /// Moves `active` to the position of `over`.
    pub fn reorder_tag(&mut self, active: &TagId, over: &TagId) -> bool {
        reorder(&mut self.tags, active, over)
    }
}
