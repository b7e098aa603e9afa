pub mod db;
pub mod demo;
pub mod models;
pub mod service;
pub mod storage;
pub mod store;
pub mod tag_edit;
pub mod tui;
pub mod utils;
pub mod validation;
pub mod view;

pub use db::{Database, SlotInfo};
pub use models::{
    ChecklistItem, ItemId, MainTab, Note, NoteBuilder, NoteData, NoteId, OptionKey, OptionValue,
    Options, ResolvedNote, Tag, TagId, TagWithNotesInfo,
};
pub use service::{DeletionRequest, NoteService};
pub use storage::{KeyValueStore, MemoryStorage};
pub use tag_edit::{TagEditBuffer, TagInputStatus, TagInputWithStatus};
pub use validation::ValidationError;
pub use view::{DerivedView, SearchQuery};
