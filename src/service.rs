use std::collections::HashSet;

use anyhow::Result;

use crate::db::Database;
use crate::demo::{self, DemoSummary};
use crate::models::{
    ChecklistItem, ItemId, Note, NoteData, NoteId, OptionKey, OptionValue, Options, ResolvedNote,
    Tag, TagId, TagWithNotesInfo,
};
use crate::storage::{self, ITEMS_KEY, KeyValueStore, NOTES_KEY, OPTIONS_KEY, TAGS_KEY};
use crate::store::{Checklist, NoteStore, TagStore};
use crate::validation::{ValidationError, validate_note_title, validate_tag_label};
use crate::view::{DerivedView, SearchQuery, searchable_tags};

/// Outcome of [`NoteService::request_note_deletion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionRequest {
    /// The note was deleted (or did not exist).
    Deleted,
    /// Deletion is gated; call [`NoteService::delete_note`] once the user confirms.
    NeedsConfirmation(NoteId),
}

/// Service layer owning all application state.
///
/// Holds the Tag Store, Note Store, options and checklist in memory, writes
/// every committed change through to `S`, and keeps the derived views
/// current. This service is UI-independent and is shared by the CLI and
/// the TUI.
///
/// Each mutation builds the next state on a copy, persists it, and only then
/// swaps it in. A failed write leaves memory as it was.
///
/// # Examples
///
/// ```
/// use getem::{Database, NoteData, NoteService};
///
/// # fn main() -> anyhow::Result<()> {
/// let mut service = NoteService::new(Database::in_memory()?)?;
///
/// let work = service.add_tag("work")?;
/// service.create_note(NoteData::new("Standup", "Notes", vec![work]))?;
///
/// assert_eq!(service.resolved_notes()[0].tag_labels(), vec!["work"]);
/// # Ok(())
/// # }
/// ```
pub struct NoteService<S: KeyValueStore = Database> {
    storage: S,
    tags: TagStore,
    notes: NoteStore,
    options: Options,
    checklist: Checklist,
    view: DerivedView,
}

impl<S: KeyValueStore> NoteService<S> {
    /// Loads every slot from `storage`.
    ///
    /// Empty or unreadable slots start from their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `storage` cannot be read at all.
    pub fn new(storage: S) -> Result<Self> {
        let tags: TagStore = storage::load(&storage, TAGS_KEY, TagStore::new)?;
        let notes: NoteStore = storage::load(&storage, NOTES_KEY, NoteStore::new)?;
        let options: Options = storage::load(&storage, OPTIONS_KEY, Options::default)?;
        let checklist: Checklist = storage::load(&storage, ITEMS_KEY, Checklist::new)?;

        tracing::debug!(
            tags = tags.len(),
            notes = notes.len(),
            "loaded application state"
        );

        let view = DerivedView::compute(notes.as_slice(), tags.as_slice(), &options);
        Ok(Self {
            storage,
            tags,
            notes,
            options,
            checklist,
            view,
        })
    }

    /// Returns a reference to the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The committed tags, in Tag Store order.
    pub fn tags(&self) -> &[Tag] {
        self.tags.as_slice()
    }

    /// The committed notes, in Note Store order.
    pub fn notes(&self) -> &[Note] {
        self.notes.as_slice()
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn tag(&self, id: &TagId) -> Option<&Tag> {
        self.tags.get(id)
    }

    pub fn find_tag_by_label(&self, label: &str) -> Option<&Tag> {
        self.tags.find_by_label(label)
    }

    // ---- tags ----

    /// Appends a tag with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `label` is empty, too long or already taken.
    pub fn add_tag(&mut self, label: &str) -> Result<Tag> {
        validate_tag_label(
            label,
            self.options.max_tag_label_length(),
            self.tags.as_slice(),
            None,
        )?;

        let mut tags = self.tags.clone();
        let tag = tags.add_tag(label);
        self.commit_tags(tags)?;

        tracing::info!(tag_id = %tag.id(), label, "added tag");
        Ok(tag)
    }

    /// Changes the label of `id`. Notes referring to the tag see the new
    /// label on their next resolution.
    pub fn rename_tag(&mut self, id: &TagId, label: &str) -> Result<()> {
        if !self.tags.contains(id) {
            tracing::debug!(tag_id = %id, "rename of unknown tag ignored");
            return Ok(());
        }
        validate_tag_label(
            label,
            self.options.max_tag_label_length(),
            self.tags.as_slice(),
            Some(id),
        )?;

        let mut tags = self.tags.clone();
        tags.rename_tag(id, label);
        self.commit_tags(tags)?;

        tracing::info!(tag_id = %id, label, "renamed tag");
        Ok(())
    }

    /// Removes `id` from the Tag Store and from every note that lists it.
    ///
    /// Both slots are written in one storage call, so no reader ever sees a
    /// note pointing at the deleted tag.
    pub fn delete_tag(&mut self, id: &TagId) -> Result<()> {
        let mut tags = self.tags.clone();
        let Some(removed) = tags.delete_tag(id) else {
            tracing::debug!(tag_id = %id, "delete of unknown tag ignored");
            return Ok(());
        };

        let mut notes = self.notes.clone();
        let detached = notes.remove_tag_references(id);
        self.commit_notes_and_tags(notes, tags)?;

        tracing::info!(
            tag_id = %id,
            label = removed.label(),
            notes_changed = detached,
            "deleted tag"
        );
        Ok(())
    }

    /// Moves tag `active` to the position of tag `over`.
    pub fn reorder_tags(&mut self, active: &TagId, over: &TagId) -> Result<()> {
        let mut tags = self.tags.clone();
        if !tags.reorder_tag(active, over) {
            tracing::debug!(active = %active, over = %over, "tag reorder was a no-op");
            return Ok(());
        }
        self.commit_tags(tags)
    }

    /// Looks up each label and creates the ones that do not exist yet.
    ///
    /// Returns the tags in input order without duplicates. Nothing is
    /// created if any new label fails validation.
    pub fn ensure_tags<L: AsRef<str>>(&mut self, labels: &[L]) -> Result<Vec<Tag>> {
        let max_len = self.options.max_tag_label_length();
        let mut tags = self.tags.clone();
        let mut created = 0;
        let mut result: Vec<Tag> = Vec::new();

        for label in labels {
            let label = label.as_ref();
            let tag = match tags.find_by_label(label) {
                Some(tag) => tag.clone(),
                None => {
                    validate_tag_label(label, max_len, tags.as_slice(), None)?;
                    created += 1;
                    tags.add_tag(label)
                }
            };
            if !result.iter().any(|t| t.id() == tag.id()) {
                result.push(tag);
            }
        }

        if created > 0 {
            self.commit_tags(tags)?;
            tracing::info!(created, "created tags");
        }
        Ok(result)
    }

    // ---- notes ----

    /// Appends a note built from `data`.
    ///
    /// Tags in `data` not present in the Tag Store are dropped; repeated
    /// tags collapse to their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the title is empty or too long.
    pub fn create_note(&mut self, data: NoteData) -> Result<Note> {
        validate_note_title(&data.title, self.options.max_note_title_length())?;
        let tags = self.known_tags(&data.tags);

        let mut notes = self.notes.clone();
        let note = notes.create_note(data.title, data.body, &tags);
        self.commit_notes(notes)?;

        tracing::info!(note_id = %note.id, tags = tags.len(), "created note");
        Ok(note)
    }

    /// Replaces title, body and tags of `id`.
    pub fn update_note(&mut self, id: &NoteId, data: NoteData) -> Result<()> {
        if self.notes.get(id).is_none() {
            tracing::debug!(note_id = %id, "update of unknown note ignored");
            return Ok(());
        }
        validate_note_title(&data.title, self.options.max_note_title_length())?;
        let tags = self.known_tags(&data.tags);

        let mut notes = self.notes.clone();
        notes.update_note(id, data.title, data.body, &tags);
        self.commit_notes(notes)?;

        tracing::info!(note_id = %id, "updated note");
        Ok(())
    }

    /// Removes `id` from the Note Store. Tags are left alone.
    pub fn delete_note(&mut self, id: &NoteId) -> Result<()> {
        let mut notes = self.notes.clone();
        if notes.delete_note(id).is_none() {
            tracing::debug!(note_id = %id, "delete of unknown note ignored");
            return Ok(());
        }
        self.commit_notes(notes)?;

        tracing::info!(note_id = %id, "deleted note");
        Ok(())
    }

    /// Deletes `id` right away unless `deleteNoteRequireConfirm` is on, in
    /// which case nothing changes until [`Self::delete_note`] is called.
    pub fn request_note_deletion(&mut self, id: &NoteId) -> Result<DeletionRequest> {
        if self.options.delete_note_require_confirm() && self.notes.get(id).is_some() {
            return Ok(DeletionRequest::NeedsConfirmation(id.clone()));
        }
        self.delete_note(id)?;
        Ok(DeletionRequest::Deleted)
    }

    /// Moves note `active` to the position of note `over`.
    pub fn reorder_notes(&mut self, active: &NoteId, over: &NoteId) -> Result<()> {
        let mut notes = self.notes.clone();
        if !notes.reorder_note(active, over) {
            tracing::debug!(active = %active, over = %over, "note reorder was a no-op");
            return Ok(());
        }
        self.commit_notes(notes)
    }

    fn known_tags(&self, requested: &[Tag]) -> Vec<Tag> {
        let mut seen = HashSet::new();
        requested
            .iter()
            .filter(|tag| seen.insert(tag.id().clone()))
            .filter_map(|tag| match self.tags.get(tag.id()) {
                Some(known) => Some(known.clone()),
                None => {
                    tracing::warn!(tag_id = %tag.id(), "dropping unknown tag from note");
                    None
                }
            })
            .collect()
    }

    // ---- options ----

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Sets one option and persists the sparse options object.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a mistyped or out-of-range value.
    pub fn update_option(&mut self, key: OptionKey, value: OptionValue) -> Result<()> {
        let mut options = self.options.clone();
        options.set(key, value)?;
        self.commit_options(options)?;

        tracing::info!(option = key.name(), %value, "updated option");
        Ok(())
    }

    /// Clears one option so its default applies again.
    pub fn reset_option(&mut self, key: OptionKey) -> Result<()> {
        let mut options = self.options.clone();
        options.reset(key);
        self.commit_options(options)?;

        tracing::info!(option = key.name(), "reset option");
        Ok(())
    }

    // ---- derived views ----

    /// Every note with its tags resolved, in Note Store order.
    pub fn resolved_notes(&self) -> &[ResolvedNote] {
        &self.view.resolved_notes
    }

    pub fn resolved_note(&self, id: &NoteId) -> Option<&ResolvedNote> {
        self.view.resolved_notes.iter().find(|note| &note.id == id)
    }

    /// Every tag with its usage flag, in Tag Store order.
    pub fn tags_with_notes_info(&self) -> &[TagWithNotesInfo] {
        &self.view.tags_with_usage
    }

    /// Tags offered by the search picker under the current options.
    pub fn searchable_tags(&self) -> Vec<&TagWithNotesInfo> {
        searchable_tags(
            &self.view.tags_with_usage,
            self.options.exclude_unused_tags_for_search(),
        )
    }

    /// Runs `query` against the resolved notes.
    ///
    /// Selected tags that no longer exist are ignored. A selected tag that
    /// no note uses still counts, so such a query matches nothing.
    pub fn search(&self, query: &SearchQuery) -> Vec<&ResolvedNote> {
        let mut query = query.clone();
        query.retain_existing(&self.view.tags_with_usage);
        query.apply(&self.view.resolved_notes)
    }

    // ---- checklist ----

    pub fn checklist(&self) -> &[ChecklistItem] {
        self.checklist.as_slice()
    }

    /// Appends an open checklist item.
    pub fn add_item(&mut self, title: &str) -> Result<ChecklistItem> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyItem.into());
        }
        let mut checklist = self.checklist.clone();
        let item = checklist.add_item(title);
        self.commit_checklist(checklist)?;

        tracing::info!(item_id = %item.id, "added checklist item");
        Ok(item)
    }

    /// Marks `id` completed or open.
    pub fn toggle_item(&mut self, id: &ItemId, completed: bool) -> Result<()> {
        let mut checklist = self.checklist.clone();
        if !checklist.toggle_item(id, completed) {
            tracing::debug!(item_id = %id, "toggle of unknown item ignored");
            return Ok(());
        }
        self.commit_checklist(checklist)
    }

    pub fn delete_item(&mut self, id: &ItemId) -> Result<()> {
        let mut checklist = self.checklist.clone();
        if !checklist.delete_item(id) {
            tracing::debug!(item_id = %id, "delete of unknown item ignored");
            return Ok(());
        }
        self.commit_checklist(checklist)
    }

    // ---- demo ----

    /// Returns `true` unless the user asked never to see the demo prompt.
    pub fn demo_prompt_visible(&self) -> bool {
        !self.options.hide_demo_perm()
    }

    /// Adds the bundled sample notes next to the existing data.
    ///
    /// Labels that already exist reuse their tag. The sample set is bundled
    /// content, so its titles and labels skip the length limits.
    pub fn generate_demo(&mut self) -> Result<DemoSummary> {
        let data = demo::demo_data()?;
        let mut tags = self.tags.clone();
        let mut notes = self.notes.clone();
        let mut summary = DemoSummary::default();

        let mut tag_for = |tags: &mut TagStore, label: &str| match tags.find_by_label(label) {
            Some(tag) => tag.clone(),
            None => {
                summary.tags_created += 1;
                tags.add_tag(label)
            }
        };

        for sample in &data.notes {
            let note_tags: Vec<Tag> = sample
                .tag_labels
                .iter()
                .map(|label| tag_for(&mut tags, label.as_str()))
                .collect();
            notes.create_note(sample.title.as_str(), sample.body.as_str(), &note_tags);
        }
        for label in &data.unused_tag_labels {
            tag_for(&mut tags, label.as_str());
        }
        summary.notes_created = data.notes.len();

        self.commit_notes_and_tags(notes, tags)?;

        tracing::info!(
            notes = summary.notes_created,
            tags = summary.tags_created,
            "generated demo data"
        );
        Ok(summary)
    }

    // ---- persistence ----

    fn refresh(&mut self) {
        self.view = DerivedView::compute(self.notes.as_slice(), self.tags.as_slice(), &self.options);
    }

    fn commit_tags(&mut self, tags: TagStore) -> Result<()> {
        storage::save(&self.storage, TAGS_KEY, &tags)?;
        self.tags = tags;
        self.refresh();
        Ok(())
    }

    fn commit_notes(&mut self, notes: NoteStore) -> Result<()> {
        storage::save(&self.storage, NOTES_KEY, &notes)?;
        self.notes = notes;
        self.refresh();
        Ok(())
    }

    fn commit_notes_and_tags(&mut self, notes: NoteStore, tags: TagStore) -> Result<()> {
        self.storage.set_items(&[
            (NOTES_KEY, storage::encode(NOTES_KEY, &notes)?),
            (TAGS_KEY, storage::encode(TAGS_KEY, &tags)?),
        ])?;
        self.notes = notes;
        self.tags = tags;
        self.refresh();
        Ok(())
    }

    fn commit_options(&mut self, options: Options) -> Result<()> {
        storage::save(&self.storage, OPTIONS_KEY, &options)?;
        self.options = options;
        self.refresh();
        Ok(())
    }

    fn commit_checklist(&mut self, checklist: Checklist) -> Result<()> {
        storage::save(&self.storage, ITEMS_KEY, &checklist)?;
        self.checklist = checklist;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
