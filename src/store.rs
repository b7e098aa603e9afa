//! Ordered, canonical collections: tags, notes and checklist items.
//!
//! Stores only mutate memory. Persisting and recomputing derived views is
//! the caller's job (see [`crate::NoteService`]).

mod checklist;
mod notes;
mod reorder;
mod tags;

pub use checklist::Checklist;
pub use notes::NoteStore;
pub use reorder::{Keyed, reorder};
pub use tags::TagStore;
