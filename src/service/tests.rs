use super::*;
use crate::models::MainTab;
use crate::storage::MemoryStorage;

fn service() -> NoteService {
    let db = Database::in_memory().expect("failed to create in-memory database");
    NoteService::new(db).expect("failed to load service")
}

fn stored<S: KeyValueStore>(service: &NoteService<S>, key: &str) -> serde_json::Value {
    let json = service
        .storage()
        .get_item(key)
        .expect("failed to read slot")
        .expect("slot should be written");
    serde_json::from_str(&json).expect("slot should hold JSON")
}

fn validation_error(err: &anyhow::Error) -> &ValidationError {
    err.downcast_ref::<ValidationError>()
        .expect("expected a validation error")
}

#[test]
fn new_service_on_empty_storage_has_defaults() {
    let service = service();

    assert!(service.tags().is_empty());
    assert!(service.notes().is_empty());
    assert!(service.checklist().is_empty());
    assert_eq!(service.options(), &Options::default());
    assert!(service.demo_prompt_visible());
}

// --- Tags ---

#[test]
fn add_tag_persists_tag_slot() {
    let mut service = service();

    let tag = service.add_tag("work").expect("failed to add tag");

    assert_eq!(service.tags(), &[tag.clone()]);
    assert_eq!(
        stored(&service, TAGS_KEY),
        serde_json::json!([{ "id": tag.id().as_str(), "label": "work" }])
    );
}

#[test]
fn add_tag_rejects_empty_overlong_and_duplicate_labels() {
    let mut service = service();
    service.add_tag("work").expect("failed to add tag");

    let err = service.add_tag("").unwrap_err();
    assert_eq!(validation_error(&err), &ValidationError::EmptyLabel);

    let err = service.add_tag(&"x".repeat(31)).unwrap_err();
    assert_eq!(
        validation_error(&err),
        &ValidationError::LabelTooLong { len: 31, max: 30 }
    );

    let err = service.add_tag("work").unwrap_err();
    assert_eq!(
        validation_error(&err),
        &ValidationError::DuplicateLabel("work".to_string())
    );

    assert_eq!(service.tags().len(), 1);
}

#[test]
fn rename_tag_is_seen_by_resolved_notes() {
    let mut service = service();
    let tag = service.add_tag("wrk").expect("failed to add tag");
    service
        .create_note(NoteData::new("Standup", "", vec![tag.clone()]))
        .expect("failed to create note");

    service
        .rename_tag(tag.id(), "work")
        .expect("failed to rename tag");

    assert_eq!(service.resolved_notes()[0].tag_labels(), vec!["work"]);
    assert_eq!(service.notes()[0].tag_ids, vec![tag.id().clone()]);
}

#[test]
fn rename_tag_to_own_label_is_allowed() {
    let mut service = service();
    let tag = service.add_tag("work").expect("failed to add tag");

    service
        .rename_tag(tag.id(), "work")
        .expect("renaming to the same label should succeed");
}

#[test]
fn rename_unknown_tag_is_silent_noop() {
    let mut service = service();

    service
        .rename_tag(&TagId::new("missing"), "")
        .expect("unknown id should not error");

    assert!(service.storage().get_item(TAGS_KEY).unwrap().is_none());
}

#[test]
fn delete_tag_cascades_to_notes_and_both_slots() {
    let mut service = service();
    let work = service.add_tag("work").expect("failed to add tag");
    let home = service.add_tag("home").expect("failed to add tag");
    let note = service
        .create_note(NoteData::new("Both", "", vec![work.clone(), home.clone()]))
        .expect("failed to create note");

    service.delete_tag(work.id()).expect("failed to delete tag");

    assert_eq!(service.tags(), &[home.clone()]);
    assert_eq!(
        service.note(&note.id).expect("note should remain").tag_ids,
        vec![home.id().clone()]
    );

    let stored_notes = stored(&service, NOTES_KEY);
    assert_eq!(
        stored_notes[0]["tagIds"],
        serde_json::json!([home.id().as_str()])
    );
    assert_eq!(stored(&service, TAGS_KEY).as_array().unwrap().len(), 1);
}

#[test]
fn delete_tag_keeps_notes_themselves() {
    let mut service = service();
    let tag = service.add_tag("solo").expect("failed to add tag");
    service
        .create_note(NoteData::new("Only tag", "", vec![tag.clone()]))
        .expect("failed to create note");

    service.delete_tag(tag.id()).expect("failed to delete tag");

    assert_eq!(service.notes().len(), 1);
    assert!(service.notes()[0].tag_ids.is_empty());
}

#[test]
fn reorder_tags_changes_store_order() {
    let mut service = service();
    let a = service.add_tag("a-tag").unwrap();
    service.add_tag("b-tag").unwrap();
    let c = service.add_tag("c-tag").unwrap();

    service
        .reorder_tags(c.id(), a.id())
        .expect("failed to reorder tags");

    let labels: Vec<&str> = service.tags().iter().map(Tag::label).collect();
    assert_eq!(labels, vec!["c-tag", "a-tag", "b-tag"]);
}

#[test]
fn ensure_tags_reuses_existing_and_creates_missing() {
    let mut service = service();
    let work = service.add_tag("work").unwrap();

    let tags = service
        .ensure_tags(&["work", "urgent", "work"])
        .expect("failed to ensure tags");

    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].id(), work.id());
    assert_eq!(tags[1].label(), "urgent");
    assert_eq!(service.tags().len(), 2);
}

#[test]
fn ensure_tags_creates_nothing_when_a_label_is_invalid() {
    let mut service = service();

    let err = service.ensure_tags(&["fine", ""]).unwrap_err();

    assert_eq!(validation_error(&err), &ValidationError::EmptyLabel);
    assert!(service.tags().is_empty());
}

// --- Notes ---

#[test]
fn create_note_persists_note_slot() {
    let mut service = service();
    let tag = service.add_tag("work").unwrap();

    let note = service
        .create_note(NoteData::new("Standup", "# Agenda", vec![tag.clone()]))
        .expect("failed to create note");

    assert_eq!(note.title, "Standup");
    assert_eq!(note.tag_ids, vec![tag.id().clone()]);
    assert_eq!(
        stored(&service, NOTES_KEY),
        serde_json::json!([{
            "id": note.id.as_str(),
            "title": "Standup",
            "body": "# Agenda",
            "tagIds": [tag.id().as_str()],
        }])
    );
}

#[test]
fn create_note_validates_title() {
    let mut service = service();

    let err = service.create_note(NoteData::default()).unwrap_err();
    assert_eq!(validation_error(&err), &ValidationError::EmptyTitle);

    let err = service
        .create_note(NoteData::new("t".repeat(81), "", vec![]))
        .unwrap_err();
    assert_eq!(
        validation_error(&err),
        &ValidationError::TitleTooLong { len: 81, max: 80 }
    );

    assert!(service.notes().is_empty());
}

#[test]
fn create_note_drops_unknown_and_repeated_tags() {
    let mut service = service();
    let work = service.add_tag("work").unwrap();
    let ghost = Tag::new(TagId::new("ghost"), "ghost");

    let note = service
        .create_note(NoteData::new(
            "Mixed",
            "",
            vec![work.clone(), ghost, work.clone()],
        ))
        .expect("failed to create note");

    assert_eq!(note.tag_ids, vec![work.id().clone()]);
}

#[test]
fn update_note_replaces_fields_and_keeps_id() {
    let mut service = service();
    let work = service.add_tag("work").unwrap();
    let home = service.add_tag("home").unwrap();
    let note = service
        .create_note(NoteData::new("Draft", "old", vec![work]))
        .unwrap();

    service
        .update_note(&note.id, NoteData::new("Final", "new", vec![home.clone()]))
        .expect("failed to update note");

    let updated = service.note(&note.id).expect("note should exist");
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.body, "new");
    assert_eq!(updated.tag_ids, vec![home.id().clone()]);
    assert_eq!(service.notes().len(), 1);
}

#[test]
fn update_unknown_note_is_silent_noop() {
    let mut service = service();

    service
        .update_note(&NoteId::new("missing"), NoteData::new("x", "", vec![]))
        .expect("unknown id should not error");

    assert!(service.notes().is_empty());
}

#[test]
fn update_note_with_invalid_title_changes_nothing() {
    let mut service = service();
    let note = service
        .create_note(NoteData::new("Keep me", "", vec![]))
        .unwrap();

    assert!(
        service
            .update_note(&note.id, NoteData::new("", "", vec![]))
            .is_err()
    );
    assert_eq!(service.note(&note.id).unwrap().title, "Keep me");
}

#[test]
fn delete_note_leaves_tags_alone() {
    let mut service = service();
    let tag = service.add_tag("work").unwrap();
    let note = service
        .create_note(NoteData::new("Gone soon", "", vec![tag.clone()]))
        .unwrap();

    service.delete_note(&note.id).expect("failed to delete note");

    assert!(service.notes().is_empty());
    assert_eq!(service.tags(), &[tag]);
    assert!(!service.tags_with_notes_info()[0].is_used_by_notes());
}

#[test]
fn delete_unknown_note_is_silent_noop() {
    let mut service = service();
    service
        .delete_note(&NoteId::new("missing"))
        .expect("unknown id should not error");
}

#[test]
fn request_note_deletion_respects_confirmation_option() {
    let mut service = service();
    let note = service
        .create_note(NoteData::new("Careful", "", vec![]))
        .unwrap();

    let request = service.request_note_deletion(&note.id).unwrap();
    assert_eq!(request, DeletionRequest::NeedsConfirmation(note.id.clone()));
    assert_eq!(service.notes().len(), 1);

    service
        .update_option(OptionKey::DeleteNoteRequireConfirm, OptionValue::Bool(false))
        .unwrap();

    let request = service.request_note_deletion(&note.id).unwrap();
    assert_eq!(request, DeletionRequest::Deleted);
    assert!(service.notes().is_empty());
}

#[test]
fn reorder_notes_moves_note() {
    let mut service = service();
    let first = service.create_note(NoteData::new("first", "", vec![])).unwrap();
    let second = service.create_note(NoteData::new("second", "", vec![])).unwrap();

    service
        .reorder_notes(&second.id, &first.id)
        .expect("failed to reorder notes");

    assert_eq!(service.resolved_notes()[0].title, "second");
    assert_eq!(stored(&service, NOTES_KEY)[0]["title"], "second");
}

// --- Options ---

#[test]
fn options_slot_stays_sparse() {
    let mut service = service();

    service
        .update_option(OptionKey::ActiveMainTabKey, OptionValue::Tab(MainTab::Manage))
        .unwrap();
    assert_eq!(
        stored(&service, OPTIONS_KEY),
        serde_json::json!({ "activeMainTabKey": "manage" })
    );

    service.reset_option(OptionKey::ActiveMainTabKey).unwrap();
    assert_eq!(stored(&service, OPTIONS_KEY), serde_json::json!({}));
    assert_eq!(service.options().active_main_tab(), MainTab::Search);
}

#[test]
fn out_of_range_option_is_rejected() {
    let mut service = service();

    let err = service
        .update_option(OptionKey::MaxTagLabelLength, OptionValue::Number(51))
        .unwrap_err();

    assert!(matches!(
        validation_error(&err),
        ValidationError::OptionOutOfRange { .. }
    ));
    assert!(!service.options().is_set(OptionKey::MaxTagLabelLength));
}

#[test]
fn max_title_length_option_applies_to_new_notes() {
    let mut service = service();
    service
        .update_option(OptionKey::MaxNoteTitleLength, OptionValue::Number(10))
        .unwrap();

    assert!(
        service
            .create_note(NoteData::new("exactly 10", "", vec![]))
            .is_ok()
    );
    assert!(
        service
            .create_note(NoteData::new("eleven char", "", vec![]))
            .is_err()
    );
}

#[test]
fn switching_tag_order_option_recomputes_resolved_tags() {
    let mut service = service();
    let a = service.add_tag("A").unwrap();
    let b = service.add_tag("B").unwrap();
    service
        .create_note(NoteData::new("n", "", vec![b, a]))
        .unwrap();

    assert_eq!(service.resolved_notes()[0].tag_labels(), vec!["A", "B"]);

    service
        .update_option(OptionKey::TagsOrderAffectNotes, OptionValue::Bool(false))
        .unwrap();

    assert_eq!(service.resolved_notes()[0].tag_labels(), vec!["B", "A"]);
}

// --- Views ---

#[test]
fn search_keeps_unused_selection_and_drops_deleted_tags() {
    let mut service = service();
    let x = service.add_tag("x").unwrap();
    let unused = service.add_tag("unused").unwrap();
    service
        .create_note(NoteData::new("Groceries", "", vec![x.clone()]))
        .unwrap();

    let info = service.tags_with_notes_info().to_vec();
    let only_unused = SearchQuery::new().with_tag(info[1].clone());
    let both = SearchQuery::new()
        .with_tag(info[0].clone())
        .with_tag(info[1].clone());

    // every selected tag must be carried, whatever the picker shows
    assert!(service.options().exclude_unused_tags_for_search());
    assert!(service.search(&only_unused).is_empty());
    assert!(service.search(&both).is_empty());

    service
        .update_option(OptionKey::ExcludeUnusedTagsForSearch, OptionValue::Bool(false))
        .unwrap();
    assert!(service.search(&both).is_empty());

    service.delete_tag(unused.id()).unwrap();
    assert_eq!(service.search(&both).len(), 1);
    assert_eq!(service.search(&only_unused).len(), 1);
}

#[test]
fn searchable_tags_follow_exclude_option() {
    let mut service = service();
    let used = service.add_tag("used").unwrap();
    service.add_tag("idle").unwrap();
    service
        .create_note(NoteData::new("n", "", vec![used]))
        .unwrap();

    assert_eq!(service.searchable_tags().len(), 1);

    service
        .update_option(OptionKey::ExcludeUnusedTagsForSearch, OptionValue::Bool(false))
        .unwrap();
    assert_eq!(service.searchable_tags().len(), 2);
}

#[test]
fn resolved_note_lookup() {
    let mut service = service();
    let note = service
        .create_note(NoteData::new("Find me", "body", vec![]))
        .unwrap();

    let resolved = service.resolved_note(&note.id).expect("should resolve");
    assert_eq!(resolved.body, "body");
    assert!(service.resolved_note(&NoteId::new("nope")).is_none());
}

// --- Checklist ---

#[test]
fn checklist_add_toggle_delete_persist() {
    let mut service = service();

    let item = service.add_item("Water plants").expect("failed to add item");
    service.toggle_item(&item.id, true).unwrap();

    assert!(service.checklist()[0].completed);
    assert_eq!(stored(&service, ITEMS_KEY)[0]["completed"], true);

    service.delete_item(&item.id).unwrap();
    assert!(service.checklist().is_empty());
    assert_eq!(stored(&service, ITEMS_KEY), serde_json::json!([]));
}

#[test]
fn blank_checklist_item_is_rejected() {
    let mut service = service();
    let err = service.add_item("   ").unwrap_err();
    assert_eq!(validation_error(&err), &ValidationError::EmptyItem);
}

// --- Demo ---

#[test]
fn generate_demo_adds_notes_and_unused_tags() {
    let mut service = service();

    let summary = service.generate_demo().expect("failed to generate demo");

    assert_eq!(service.notes().len(), summary.notes_created);
    assert_eq!(service.tags().len(), summary.tags_created);
    let unused: Vec<&str> = service
        .tags_with_notes_info()
        .iter()
        .filter(|t| !t.is_used_by_notes())
        .map(|t| t.label())
        .collect();
    assert_eq!(unused, vec!["this tag is not used", "another unused tag"]);
}

#[test]
fn generate_demo_reuses_existing_labels_and_keeps_data() {
    let mut service = service();
    let work = service.add_tag("work").unwrap();
    service
        .create_note(NoteData::new("Mine", "", vec![]))
        .unwrap();

    service.generate_demo().unwrap();

    assert_eq!(service.notes()[0].title, "Mine");
    let works: Vec<&Tag> = service
        .tags()
        .iter()
        .filter(|t| t.label() == "work")
        .collect();
    assert_eq!(works, vec![&work]);

    // second run adds notes but no new tags
    let tags_before = service.tags().len();
    let summary = service.generate_demo().unwrap();
    assert_eq!(summary.tags_created, 0);
    assert_eq!(service.tags().len(), tags_before);
}

#[test]
fn hiding_demo_prompt_persists() {
    let mut service = service();
    service
        .update_option(OptionKey::HideDemoPerm, OptionValue::Bool(true))
        .unwrap();

    assert!(!service.demo_prompt_visible());
}

// --- Persistence ---

#[test]
fn state_survives_reload_from_same_storage() {
    let storage = MemoryStorage::new();
    let (note_id, tag_id) = {
        let mut service = NoteService::new(&storage).unwrap();
        let tag = service.add_tag("work").unwrap();
        let note = service
            .create_note(NoteData::new("Persist", "me", vec![tag.clone()]))
            .unwrap();
        service.add_item("milk").unwrap();
        service
            .update_option(OptionKey::HideTooltips, OptionValue::Bool(true))
            .unwrap();
        (note.id, tag.id().clone())
    };

    let service = NoteService::new(&storage).unwrap();

    assert_eq!(service.note(&note_id).unwrap().tag_ids, vec![tag_id]);
    assert_eq!(service.resolved_notes()[0].tag_labels(), vec!["work"]);
    assert_eq!(service.checklist().len(), 1);
    assert!(service.options().hide_tooltips());
}

#[test]
fn corrupt_slots_load_as_defaults() {
    let storage = MemoryStorage::new();
    storage.set_item(NOTES_KEY, "not json").unwrap();
    storage.set_item(TAGS_KEY, "{}").unwrap();

    let service = NoteService::new(&storage).expect("corrupt slots must not block startup");

    assert!(service.notes().is_empty());
    assert!(service.tags().is_empty());
}

#[test]
fn bad_stored_option_does_not_discard_the_rest() {
    let storage = MemoryStorage::new();
    storage
        .set_item(
            OPTIONS_KEY,
            r#"{"hideDemoPerm":true,"tagsOrderAffectNotes":false,"maxTagLabelLength":30.5}"#,
        )
        .unwrap();

    let mut service = NoteService::new(&storage).unwrap();
    assert!(service.options().hide_demo_perm());
    assert!(!service.options().tags_order_affect_notes());
    assert_eq!(service.options().max_tag_label_length(), 30);

    service
        .update_option(OptionKey::HideTooltips, OptionValue::Bool(true))
        .unwrap();
    assert_eq!(
        stored(&service, OPTIONS_KEY),
        serde_json::json!({
            "hideDemoPerm": true,
            "tagsOrderAffectNotes": false,
            "hideTooltips": true
        })
    );
}

#[test]
fn stored_zero_label_limit_falls_back_to_default() {
    let storage = MemoryStorage::new();
    storage
        .set_item(OPTIONS_KEY, r#"{"maxTagLabelLength":0}"#)
        .unwrap();

    let mut service = NoteService::new(&storage).unwrap();

    assert_eq!(service.options().max_tag_label_length(), 30);
    assert_eq!(service.add_tag("home").unwrap().label(), "home");
}

#[test]
fn failed_cascade_write_leaves_memory_unchanged() {
    let mut service = service();
    let tag = service.add_tag("work").unwrap();
    service
        .create_note(NoteData::new("n", "", vec![tag.clone()]))
        .unwrap();

    service
        .storage()
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_writes BEFORE UPDATE ON local_storage
             BEGIN SELECT RAISE(ABORT, 'read only'); END;",
        )
        .unwrap();

    assert!(service.delete_tag(tag.id()).is_err());
    assert_eq!(service.tags().len(), 1);
    assert_eq!(service.notes()[0].tag_ids, vec![tag.id().clone()]);
}
