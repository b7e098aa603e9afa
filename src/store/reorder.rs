use crate::models::{ChecklistItem, ItemId, Note, NoteId, Tag, TagId};

/// An element with a stable key, usable with [`reorder`].
pub trait Keyed {
    type Key: PartialEq;

    fn key(&self) -> &Self::Key;
}

impl Keyed for Tag {
    type Key = TagId;

    fn key(&self) -> &TagId {
        self.id()
    }
}

impl Keyed for Note {
    type Key = NoteId;

    fn key(&self) -> &NoteId {
        &self.id
    }
}

impl Keyed for ChecklistItem {
    type Key = ItemId;

    fn key(&self) -> &ItemId {
        &self.id
    }
}

/// Moves the element keyed `active` to the position of the element keyed
/// `over`, shifting the elements in between by one.
///
/// Returns `false` and leaves `items` untouched when either key is absent or
/// both keys are equal.
///
/// # Examples
///
/// ```
/// use getem::store::{Keyed, reorder};
///
/// struct Row(u8);
/// impl Keyed for Row {
///     type Key = u8;
///     fn key(&self) -> &u8 { &self.0 }
/// }
///
/// let mut rows = vec![Row(1), Row(2), Row(3), Row(4)];
/// assert!(reorder(&mut rows, &1, &3));
/// assert_eq!(rows.iter().map(|r| r.0).collect::<Vec<_>>(), vec![2, 3, 1, 4]);
/// ```
pub fn reorder<T: Keyed>(items: &mut [T], active: &T::Key, over: &T::Key) -> bool {
    if active == over {
        return false;
    }
    let Some(from) = items.iter().position(|item| item.key() == active) else {
        return false;
    };
    let Some(to) = items.iter().position(|item| item.key() == over) else {
        return false;
    };

    if from < to {
        items[from..=to].rotate_left(1);
    } else {
        items[to..=from].rotate_right(1);
    }
    true
}
