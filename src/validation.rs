//! Input validation for note titles, tag labels, checklist items and options.
//!
//! Validation failures block the commit: the service returns the error and
//! leaves every store untouched. Lengths are counted in characters.

use thiserror::Error;

use crate::models::{Tag, TagId};

/// A user input that cannot be committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("note title cannot be empty")]
    EmptyTitle,

    #[error("note title is {len} characters, longer than the limit of {max}")]
    TitleTooLong { len: usize, max: usize },

    #[error("tag label cannot be empty")]
    EmptyLabel,

    #[error("tag label is {len} characters, longer than the limit of {max}")]
    LabelTooLong { len: usize, max: usize },

    #[error("a tag labeled \"{0}\" already exists")]
    DuplicateLabel(String),

    #[error("checklist item cannot be empty")]
    EmptyItem,

    #[error("unknown option \"{0}\"")]
    UnknownOption(String),

    #[error("option {key} must be between {min} and {max}, got {value}")]
    OptionOutOfRange {
        key: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid value \"{value}\" for option {key}")]
    InvalidOptionValue { key: &'static str, value: String },
}

/// Checks a note title against emptiness and the configured maximum length.
pub fn validate_note_title(title: &str, max_len: usize) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if len == 0 {
        return Err(ValidationError::EmptyTitle);
    }
    if len > max_len {
        return Err(ValidationError::TitleTooLong { len, max: max_len });
    }
    Ok(())
}

/// Checks a tag label for the Tag Store boundary.
///
/// `existing` is the committed Tag Store; `renaming` names the tag being
/// renamed so that it does not collide with its own label.
pub fn validate_tag_label(
    label: &str,
    max_len: usize,
    existing: &[Tag],
    renaming: Option<&TagId>,
) -> Result<(), ValidationError> {
    let len = label.chars().count();
    if len == 0 {
        return Err(ValidationError::EmptyLabel);
    }
    if len > max_len {
        return Err(ValidationError::LabelTooLong { len, max: max_len });
    }
    let duplicate = existing
        .iter()
        .filter(|tag| Some(tag.id()) != renaming)
        .any(|tag| tag.label() == label);
    if duplicate {
        return Err(ValidationError::DuplicateLabel(label.to_string()));
    }
    Ok(())
}
