use serde::{Deserialize, Serialize};

use super::reorder;
use crate::models::{Note, NoteId, Tag, TagId};

/// Ordered collection of notes. Serializes as a plain array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    /// Appends a note with a fresh id referencing `tags` by id.
    pub fn create_note(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
        tags: &[Tag],
    ) -> Note {
        let note = Note {
            id: NoteId::generate(),
            title: title.into(),
            body: body.into(),
            tag_ids: tags.iter().map(|tag| tag.id().clone()).collect(),
        };
        self.notes.push(note.clone());
        note
    }

    /// Replaces title, body and tag ids of `id`. Returns `false` if `id` is unknown.
    pub fn update_note(
        &mut self,
        id: &NoteId,
        title: impl Into<String>,
        body: impl Into<String>,
        tags: &[Tag],
    ) -> bool {
        let Some(note) = self.notes.iter_mut().find(|note| &note.id == id) else {
            return false;
        };
        note.title = title.into();
        note.body = body.into();
        note.tag_ids = tags.iter().map(|tag| tag.id().clone()).collect();
        true
    }

    pub fn delete_note(&mut self, id: &NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|note| &note.id == id)?;
        Some(self.notes.remove(index))
    }

    /// Moves `active` to the position of `over`.
    pub fn reorder_note(&mut self, active: &NoteId, over: &NoteId) -> bool {
        reorder(&mut self.notes, active, over)
    }

    /// Strips `tag_id` from every note. Returns the number of notes changed.
    pub fn remove_tag_references(&mut self, tag_id: &TagId) -> usize {
        let mut changed = 0;
        for note in &mut self.notes {
            let before = note.tag_ids.len();
            note.tag_ids.retain(|id| id != tag_id);
            if note.tag_ids.len() != before {
                changed += 1;
            }
        }
        changed
    }

    /// Returns `true` if any note lists `tag_id`.
    pub fn references_tag(&self, tag_id: &TagId) -> bool {
        self.notes.iter().any(|note| note.has_tag(tag_id))
    }
}
