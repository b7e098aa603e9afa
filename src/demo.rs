//! Bundled sample data for a first run.

use anyhow::{Context, Result};
use serde::Deserialize;

const DEMO_JSON: &str = include_str!("demo/demo_notes.json");

/// One sample note; tags are named by label and resolved at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoNote {
    pub title: String,
    pub body: String,
    pub tag_labels: Vec<String>,
}

/// The whole sample set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoData {
    pub notes: Vec<DemoNote>,
    /// Tags created without any note referring to them.
    pub unused_tag_labels: Vec<String>,
}

/// Parses the bundled sample set.
pub fn demo_data() -> Result<DemoData> {
    serde_json::from_str(DEMO_JSON).context("Failed to parse bundled demo data")
}

/// What a demo generation run added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub notes_created: usize,
    pub tags_created: usize,
}
