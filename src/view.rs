//! Derived views over the canonical stores.
//!
//! Everything here is a pure function of (notes, tags, options). Results are
//! recomputed after each committed change and never persisted.

use std::collections::{HashMap, HashSet};

use crate::models::{Note, Options, ResolvedNote, Tag, TagId, TagWithNotesInfo};

/// Resolves one note's tag ids into tag objects.
///
/// With `tags_order_affect_notes` the resolved tags follow Tag Store order,
/// ignoring the note's own id order. Without it they follow the note's
/// stored order. Ids missing from `tags` are dropped in both cases.
pub fn resolve_note(note: &Note, tags: &[Tag], tags_order_affect_notes: bool) -> ResolvedNote {
    let resolved = if tags_order_affect_notes {
        let wanted: HashSet<&TagId> = note.tag_ids.iter().collect();
        tags.iter()
            .filter(|tag| wanted.contains(tag.id()))
            .cloned()
            .collect()
    } else {
        let by_id: HashMap<&TagId, &Tag> = tags.iter().map(|tag| (tag.id(), tag)).collect();
        note.tag_ids
            .iter()
            .filter_map(|id| by_id.get(id).map(|tag| (*tag).clone()))
            .collect()
    };

    ResolvedNote {
        id: note.id.clone(),
        title: note.title.clone(),
        body: note.body.clone(),
        tags: resolved,
    }
}

/// Resolves every note, keeping Note Store order.
pub fn resolve_notes(
    notes: &[Note],
    tags: &[Tag],
    tags_order_affect_notes: bool,
) -> Vec<ResolvedNote> {
    notes
        .iter()
        .map(|note| resolve_note(note, tags, tags_order_affect_notes))
        .collect()
}

/// Annotates each tag with whether any note references it.
pub fn tags_with_usage(tags: &[Tag], notes: &[Note]) -> Vec<TagWithNotesInfo> {
    let used: HashSet<&TagId> = notes.iter().flat_map(|note| &note.tag_ids).collect();
    tags.iter()
        .map(|tag| TagWithNotesInfo::new(tag.clone(), used.contains(tag.id())))
        .collect()
}

/// Keeps the notes matching both the title query and the selected tags.
///
/// The title matches as a case-insensitive substring; an empty query matches
/// everything. A note must carry every selected tag; an empty selection
/// matches everything.
pub fn filter_notes<'a>(
    notes: &'a [ResolvedNote],
    title_query: &str,
    selected_tags: &[TagId],
) -> Vec<&'a ResolvedNote> {
    let query = title_query.to_lowercase();
    notes
        .iter()
        .filter(|note| query.is_empty() || note.title.to_lowercase().contains(&query))
        .filter(|note| selected_tags.iter().all(|id| note.has_tag(id)))
        .collect()
}

/// The tags offered by the search picker.
///
/// With `exclude_unused` only tags referenced by at least one note are offered.
pub fn searchable_tags(
    tags_with_usage: &[TagWithNotesInfo],
    exclude_unused: bool,
) -> Vec<&TagWithNotesInfo> {
    tags_with_usage
        .iter()
        .filter(|tag| !exclude_unused || tag.is_used_by_notes())
        .collect()
}

/// Cached output of the derived view computations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedView {
    pub resolved_notes: Vec<ResolvedNote>,
    pub tags_with_usage: Vec<TagWithNotesInfo>,
}

impl DerivedView {
    pub fn compute(notes: &[Note], tags: &[Tag], options: &Options) -> Self {
        Self {
            resolved_notes: resolve_notes(notes, tags, options.tags_order_affect_notes()),
            tags_with_usage: tags_with_usage(tags, notes),
        }
    }
}

/// The state of the search view: a title query and an ordered tag selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: String,
    selected_tags: Vec<TagWithNotesInfo>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title query.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Adds `tag` to the selection.
    pub fn with_tag(mut self, tag: TagWithNotesInfo) -> Self {
        self.select_tag(tag);
        self
    }

    pub fn selected_tags(&self) -> &[TagWithNotesInfo] {
        &self.selected_tags
    }

    pub fn selected_ids(&self) -> Vec<TagId> {
        self.selected_tags.iter().map(|tag| tag.id().clone()).collect()
    }

    pub fn is_selected(&self, id: &TagId) -> bool {
        self.selected_tags.iter().any(|tag| tag.id() == id)
    }

    /// Appends `tag` to the selection unless it is already selected.
    pub fn select_tag(&mut self, tag: TagWithNotesInfo) {
        if !self.is_selected(tag.id()) {
            self.selected_tags.push(tag);
        }
    }

    pub fn deselect_tag(&mut self, id: &TagId) {
        self.selected_tags.retain(|tag| tag.id() != id);
    }

    /// Selects `tag` if unselected, deselects it otherwise.
    pub fn toggle_tag(&mut self, tag: &TagWithNotesInfo) {
        if self.is_selected(tag.id()) {
            self.deselect_tag(tag.id());
        } else {
            self.selected_tags.push(tag.clone());
        }
    }

    /// Follows tag edits: drops deleted tags and refreshes labels and usage
    /// of the rest, keeping selection order.
    pub fn retain_existing(&mut self, tags_with_usage: &[TagWithNotesInfo]) {
        self.selected_tags = self
            .selected_tags
            .iter()
            .filter_map(|selected| {
                tags_with_usage
                    .iter()
                    .find(|current| current.id() == selected.id())
                    .cloned()
            })
            .collect();
    }

    /// Drops selected tags that no note uses.
    pub fn exclude_unused(&mut self) {
        self.selected_tags.retain(TagWithNotesInfo::is_used_by_notes);
    }

    /// Returns `true` if an unused tag is selected, which makes every search empty.
    pub fn has_unused_selection(&self) -> bool {
        self.selected_tags.iter().any(|tag| !tag.is_used_by_notes())
    }

    /// Returns `true` when neither a title nor tags constrain the search.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.selected_tags.is_empty()
    }

    /// Applies the query to `notes`.
    pub fn apply<'a>(&self, notes: &'a [ResolvedNote]) -> Vec<&'a ResolvedNote> {
        filter_notes(notes, &self.title, &self.selected_ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteBuilder, NoteId};

    fn tag(id: &str, label: &str) -> Tag {
        Tag::new(TagId::new(id), label)
    }

    fn note(id: &str, title: &str, tag_ids: &[&str]) -> Note {
        NoteBuilder::new()
            .id(NoteId::new(id))
            .title(title)
            .tag_ids(tag_ids.iter().map(|t| TagId::new(*t)).collect())
            .build()
    }

    #[test]
    fn tag_store_order_overrides_note_order_when_enabled() {
        let tags = vec![tag("a", "A"), tag("b", "B")];
        let n = note("n1", "x", &["b", "a"]);

        let resolved = resolve_note(&n, &tags, true);

        assert_eq!(resolved.tag_labels(), vec!["A", "B"]);
    }

    #[test]
    fn note_order_is_kept_when_disabled() {
        let tags = vec![tag("a", "A"), tag("b", "B")];
        let n = note("n1", "x", &["b", "a"]);

        let resolved = resolve_note(&n, &tags, false);

        assert_eq!(resolved.tag_labels(), vec!["B", "A"]);
    }

    #[test]
    fn dangling_ids_are_dropped_in_both_modes() {
        let tags = vec![tag("a", "A")];
        let n = note("n1", "x", &["gone", "a"]);

        assert_eq!(resolve_note(&n, &tags, true).tag_labels(), vec!["A"]);
        assert_eq!(resolve_note(&n, &tags, false).tag_labels(), vec!["A"]);
    }

    #[test]
    fn resolve_notes_keeps_note_order() {
        let tags = vec![tag("a", "A")];
        let notes = vec![note("n2", "second", &[]), note("n1", "first", &["a"])];

        let resolved = resolve_notes(&notes, &tags, true);

        assert_eq!(resolved[0].id, NoteId::new("n2"));
        assert_eq!(resolved[1].tags.len(), 1);
    }

    #[test]
    fn usage_flag_tracks_references() {
        let tags = vec![tag("a", "A"), tag("b", "B")];
        let notes = vec![note("n1", "x", &["a"])];

        let usage = tags_with_usage(&tags, &notes);

        assert!(usage[0].is_used_by_notes());
        assert!(!usage[1].is_used_by_notes());
        assert!(!tags_with_usage(&tags, &[])[0].is_used_by_notes());
    }

    fn groceries_and_work() -> Vec<ResolvedNote> {
        let tags = vec![tag("x", "X"), tag("y", "Y")];
        let notes = vec![
            note("n1", "Groceries", &["x"]),
            note("n2", "Work", &["x", "y"]),
        ];
        resolve_notes(&notes, &tags, true)
    }

    #[test]
    fn selected_tags_use_and_semantics() {
        let notes = groceries_and_work();

        let result = filter_notes(&notes, "", &[TagId::new("x"), TagId::new("y")]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Work");
    }

    #[test]
    fn title_query_matches_regardless_of_tags() {
        let notes = groceries_and_work();

        let result = filter_notes(&notes, "Work", &[]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Work");
    }

    #[test]
    fn title_query_is_case_insensitive_substring() {
        let notes = groceries_and_work();

        let result = filter_notes(&notes, "cer", &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Groceries");

        assert_eq!(filter_notes(&notes, "GROC", &[]).len(), 1);
    }

    #[test]
    fn empty_query_matches_everything() {
        let notes = groceries_and_work();
        assert_eq!(filter_notes(&notes, "", &[]).len(), 2);
    }

    #[test]
    fn searchable_tags_can_exclude_unused() {
        let tags = vec![tag("a", "A"), tag("b", "B")];
        let notes = vec![note("n1", "x", &["b"])];
        let usage = tags_with_usage(&tags, &notes);

        let only_used = searchable_tags(&usage, true);
        assert_eq!(only_used.len(), 1);
        assert_eq!(only_used[0].label(), "B");

        assert_eq!(searchable_tags(&usage, false).len(), 2);
    }

    #[test]
    fn query_follows_deleted_and_renamed_tags() {
        let usage = tags_with_usage(&[tag("a", "A"), tag("b", "B")], &[]);
        let mut query = SearchQuery::new()
            .with_tag(usage[1].clone())
            .with_tag(usage[0].clone());

        // "b" renamed, "a" deleted
        let after = tags_with_usage(&[tag("b", "Bee")], &[]);
        query.retain_existing(&after);

        assert_eq!(query.selected_tags().len(), 1);
        assert_eq!(query.selected_tags()[0].label(), "Bee");
    }

    #[test]
    fn exclude_unused_drops_unused_selection() {
        let usage = tags_with_usage(&[tag("a", "A"), tag("b", "B")], &[note("n1", "x", &["a"])]);
        let mut query = SearchQuery::new()
            .with_tag(usage[0].clone())
            .with_tag(usage[1].clone());
        assert!(query.has_unused_selection());

        query.exclude_unused();

        assert_eq!(query.selected_ids(), vec![TagId::new("a")]);
        assert!(!query.has_unused_selection());
    }

    #[test]
    fn toggle_tag_flips_selection() {
        let usage = tags_with_usage(&[tag("a", "A")], &[]);
        let mut query = SearchQuery::new();

        query.toggle_tag(&usage[0]);
        assert!(query.is_selected(&TagId::new("a")));

        query.toggle_tag(&usage[0]);
        assert!(query.is_empty());
    }
}
