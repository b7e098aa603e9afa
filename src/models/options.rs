use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

/// Which main view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainTab {
    /// Filter notes by title and tags.
    #[default]
    Search,
    /// Reorder and delete notes.
    Manage,
}

impl fmt::Display for MainTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search => write!(f, "search"),
            Self::Manage => write!(f, "manage"),
        }
    }
}

/// Recognized option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    HideDemoPerm,
    ActiveMainTabKey,
    DeleteNoteRequireConfirm,
    ExcludeUnusedTagsForSearch,
    HideTooltips,
    TagsOrderAffectNotes,
    MaxNoteTitleLength,
    MaxTagLabelLength,
}

impl OptionKey {
    /// Every recognized key, in display order.
    pub const ALL: [OptionKey; 8] = [
        Self::HideDemoPerm,
        Self::ActiveMainTabKey,
        Self::DeleteNoteRequireConfirm,
        Self::ExcludeUnusedTagsForSearch,
        Self::HideTooltips,
        Self::TagsOrderAffectNotes,
        Self::MaxNoteTitleLength,
        Self::MaxTagLabelLength,
    ];

    /// Returns the persisted name of the option.
    pub fn name(self) -> &'static str {
        match self {
            Self::HideDemoPerm => "hideDemoPerm",
            Self::ActiveMainTabKey => "activeMainTabKey",
            Self::DeleteNoteRequireConfirm => "deleteNoteRequireConfirm",
            Self::ExcludeUnusedTagsForSearch => "excludeUnusedTagsForSearch",
            Self::HideTooltips => "hideTooltips",
            Self::TagsOrderAffectNotes => "tagsOrderAffectNotes",
            Self::MaxNoteTitleLength => "maxNoteTitleLength",
            Self::MaxTagLabelLength => "maxTagLabelLength",
        }
    }

    /// Inclusive bounds for numeric options.
    pub fn range(self) -> Option<(u32, u32)> {
        match self {
            Self::MaxNoteTitleLength => Some((10, 150)),
            Self::MaxTagLabelLength => Some((5, 50)),
            _ => None,
        }
    }

    /// Parses a textual value (as typed on the command line) for this key.
    pub fn parse_value(self, raw: &str) -> Result<OptionValue, ValidationError> {
        let invalid = || ValidationError::InvalidOptionValue {
            key: self.name(),
            value: raw.to_string(),
        };
        match self {
            Self::ActiveMainTabKey => match raw {
                "search" => Ok(OptionValue::Tab(MainTab::Search)),
                "manage" => Ok(OptionValue::Tab(MainTab::Manage)),
                _ => Err(invalid()),
            },
            Self::MaxNoteTitleLength | Self::MaxTagLabelLength => {
                raw.parse().map(OptionValue::Number).map_err(|_| invalid())
            }
            _ => raw.parse().map(OptionValue::Bool).map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| ValidationError::UnknownOption(s.to_string()))
    }
}

/// A typed option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Number(u32),
    Tab(MainTab),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Tab(tab) => write!(f, "{tab}"),
        }
    }
}

/// User settings with documented fallback defaults.
///
/// Only explicitly changed options are stored; unset fields are skipped when
/// serializing, so the `OPTIONS` slot stays a sparse object. Accessors
/// return the default for anything unset.
///
/// # Examples
///
/// ```
/// use getem::{OptionKey, OptionValue, Options};
///
/// let mut options = Options::default();
/// assert!(options.tags_order_affect_notes());
///
/// options.set(OptionKey::TagsOrderAffectNotes, OptionValue::Bool(false)).unwrap();
/// assert!(!options.tags_order_affect_notes());
/// assert_eq!(
///     serde_json::to_string(&options).unwrap(),
///     r#"{"tagsOrderAffectNotes":false}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    hide_demo_perm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_main_tab_key: Option<MainTab>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delete_note_require_confirm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude_unused_tags_for_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hide_tooltips: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags_order_affect_notes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_note_title_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tag_label_length: Option<u32>,
}

impl Options {
    pub const DEFAULT_MAX_NOTE_TITLE_LENGTH: u32 = 80;
    pub const DEFAULT_MAX_TAG_LABEL_LENGTH: u32 = 30;

    /// Suppress the one-time sample data prompt. Default `false`.
    pub fn hide_demo_perm(&self) -> bool {
        self.hide_demo_perm.unwrap_or(false)
    }

    /// The active main view. Default `search`.
    pub fn active_main_tab(&self) -> MainTab {
        self.active_main_tab_key.unwrap_or_default()
    }

    /// Gate note deletion behind a confirmation step. Default `true`.
    pub fn delete_note_require_confirm(&self) -> bool {
        self.delete_note_require_confirm.unwrap_or(true)
    }

    /// Omit unused tags from the search tag picker. Default `true`.
    pub fn exclude_unused_tags_for_search(&self) -> bool {
        self.exclude_unused_tags_for_search.unwrap_or(true)
    }

    /// Suppress contextual hints. Default `false`.
    pub fn hide_tooltips(&self) -> bool {
        self.hide_tooltips.unwrap_or(false)
    }

    /// Resolve note tags in Tag Store order instead of per-note order. Default `true`.
    pub fn tags_order_affect_notes(&self) -> bool {
        self.tags_order_affect_notes.unwrap_or(true)
    }

    /// Maximum note title length in characters. Default 80.
    pub fn max_note_title_length(&self) -> usize {
        self.max_note_title_length
            .unwrap_or(Self::DEFAULT_MAX_NOTE_TITLE_LENGTH) as usize
    }

    /// Maximum tag label length in characters. Default 30.
    pub fn max_tag_label_length(&self) -> usize {
        self.max_tag_label_length
            .unwrap_or(Self::DEFAULT_MAX_TAG_LABEL_LENGTH) as usize
    }

    /// Returns the effective value of `key`, falling back to its default.
    pub fn get(&self, key: OptionKey) -> OptionValue {
        match key {
            OptionKey::HideDemoPerm => OptionValue::Bool(self.hide_demo_perm()),
            OptionKey::ActiveMainTabKey => OptionValue::Tab(self.active_main_tab()),
            OptionKey::DeleteNoteRequireConfirm => {
                OptionValue::Bool(self.delete_note_require_confirm())
            }
            OptionKey::ExcludeUnusedTagsForSearch => {
                OptionValue::Bool(self.exclude_unused_tags_for_search())
            }
            OptionKey::HideTooltips => OptionValue::Bool(self.hide_tooltips()),
            OptionKey::TagsOrderAffectNotes => OptionValue::Bool(self.tags_order_affect_notes()),
            OptionKey::MaxNoteTitleLength => OptionValue::Number(
                self.max_note_title_length
                    .unwrap_or(Self::DEFAULT_MAX_NOTE_TITLE_LENGTH),
            ),
            OptionKey::MaxTagLabelLength => OptionValue::Number(
                self.max_tag_label_length
                    .unwrap_or(Self::DEFAULT_MAX_TAG_LABEL_LENGTH),
            ),
        }
    }

    /// Returns `true` if `key` has been explicitly set.
    pub fn is_set(&self, key: OptionKey) -> bool {
        match key {
            OptionKey::HideDemoPerm => self.hide_demo_perm.is_some(),
            OptionKey::ActiveMainTabKey => self.active_main_tab_key.is_some(),
            OptionKey::DeleteNoteRequireConfirm => self.delete_note_require_confirm.is_some(),
            OptionKey::ExcludeUnusedTagsForSearch => {
                self.exclude_unused_tags_for_search.is_some()
            }
            OptionKey::HideTooltips => self.hide_tooltips.is_some(),
            OptionKey::TagsOrderAffectNotes => self.tags_order_affect_notes.is_some(),
            OptionKey::MaxNoteTitleLength => self.max_note_title_length.is_some(),
            OptionKey::MaxTagLabelLength => self.max_tag_label_length.is_some(),
        }
    }

    /// Sets `key` to `value`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOptionValue` when the value has the wrong type for the
    /// key, and `OptionOutOfRange` when a length limit is outside its bounds.
    /// The options are unchanged on error.
    pub fn set(&mut self, key: OptionKey, value: OptionValue) -> Result<(), ValidationError> {
        let invalid = || ValidationError::InvalidOptionValue {
            key: key.name(),
            value: value.to_string(),
        };
        match (key, value) {
            (OptionKey::HideDemoPerm, OptionValue::Bool(v)) => self.hide_demo_perm = Some(v),
            (OptionKey::ActiveMainTabKey, OptionValue::Tab(tab)) => {
                self.active_main_tab_key = Some(tab)
            }
            (OptionKey::DeleteNoteRequireConfirm, OptionValue::Bool(v)) => {
                self.delete_note_require_confirm = Some(v)
            }
            (OptionKey::ExcludeUnusedTagsForSearch, OptionValue::Bool(v)) => {
                self.exclude_unused_tags_for_search = Some(v)
            }
            (OptionKey::HideTooltips, OptionValue::Bool(v)) => self.hide_tooltips = Some(v),
            (OptionKey::TagsOrderAffectNotes, OptionValue::Bool(v)) => {
                self.tags_order_affect_notes = Some(v)
            }
            (OptionKey::MaxNoteTitleLength, OptionValue::Number(n)) => {
                check_range(key, n)?;
                self.max_note_title_length = Some(n)
            }
            (OptionKey::MaxTagLabelLength, OptionValue::Number(n)) => {
                check_range(key, n)?;
                self.max_tag_label_length = Some(n)
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// Clears `key` so its default applies again.
    pub fn reset(&mut self, key: OptionKey) {
        match key {
            OptionKey::HideDemoPerm => self.hide_demo_perm = None,
            OptionKey::ActiveMainTabKey => self.active_main_tab_key = None,
            OptionKey::DeleteNoteRequireConfirm => self.delete_note_require_confirm = None,
            OptionKey::ExcludeUnusedTagsForSearch => self.exclude_unused_tags_for_search = None,
            OptionKey::HideTooltips => self.hide_tooltips = None,
            OptionKey::TagsOrderAffectNotes => self.tags_order_affect_notes = None,
            OptionKey::MaxNoteTitleLength => self.max_note_title_length = None,
            OptionKey::MaxTagLabelLength => self.max_tag_label_length = None,
        }
    }
}

/// Decodes a stored options object one entry at a time.
///
/// Entries go through [`Options::set`], so a mistyped or out-of-range value
/// is skipped on its own and its default applies. Unknown keys are ignored.
impl From<Map<String, Value>> for Options {
    fn from(stored: Map<String, Value>) -> Self {
        let mut options = Options::default();
        for (name, raw) in stored {
            let Ok(key) = name.parse::<OptionKey>() else {
                tracing::debug!(option = %name, "ignoring unknown stored option");
                continue;
            };
            let applied = stored_value(key, &raw).and_then(|value| options.set(key, value));
            if let Err(e) = applied {
                tracing::warn!(option = key.name(), value = %raw, error = %e, "ignoring stored option");
            }
        }
        options
    }
}

fn stored_value(key: OptionKey, raw: &Value) -> Result<OptionValue, ValidationError> {
    match raw {
        Value::Bool(v) => Ok(OptionValue::Bool(*v)),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(OptionValue::Number)
            .ok_or_else(|| ValidationError::InvalidOptionValue {
                key: key.name(),
                value: n.to_string(),
            }),
        Value::String(s) if key == OptionKey::ActiveMainTabKey => key.parse_value(s),
        other => Err(ValidationError::InvalidOptionValue {
            key: key.name(),
            value: other.to_string(),
        }),
    }
}

fn check_range(key: OptionKey, value: u32) -> Result<(), ValidationError> {
    if let Some((min, max)) = key.range()
        && !(min..=max).contains(&value)
    {
        return Err(ValidationError::OptionOutOfRange {
            key: key.name(),
            value,
            min,
            max,
        });
    }
    Ok(())
}
