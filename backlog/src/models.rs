//! YAML backlog entries.

use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One issue to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSpec {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Milestone title, resolved to a number at import time
    #[serde(default)]
    pub milestone: Option<String>,
}

/// One label to create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

impl LabelSpec {
    /// Hex color without a leading `#`, as `gh` expects it.
    pub fn hex_color(&self) -> &str {
        self.color.trim_start_matches('#')
    }
}

fn default_color() -> String {
    "ededed".to_string()
}

/// One milestone to create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl MilestoneSpec {
    /// End of the due day in UTC, the format the milestones API takes.
    pub fn due_on(&self) -> Option<String> {
        self.due_date
            .map(|date| format!("{}T23:59:59Z", date.format("%Y-%m-%d")))
    }
}

/// Parse a YAML list. An empty document is an empty list.
pub fn parse_items<T: DeserializeOwned>(yaml: &str) -> Result<Vec<T>> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = serde_yaml::from_str(yaml)?;
    Ok(items.unwrap_or_default())
}

/// Read and parse a YAML list from disk.
pub fn load_items<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let yaml = std::fs::read_to_string(path)?;
    parse_items(&yaml)
}
