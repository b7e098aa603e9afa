mod checklist_item;
mod ids;
mod note;
mod options;
mod tag;

pub use checklist_item::ChecklistItem;
pub use ids::{ItemId, NoteId, TagId};
pub use note::{Note, NoteBuilder, NoteData, ResolvedNote};
pub use options::{MainTab, OptionKey, OptionValue, Options};
pub use tag::{Tag, TagWithNotesInfo};
