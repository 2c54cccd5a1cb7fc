use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// One detected course listing from the catalog PDF export.
///
/// `raw_text` keeps the full text block the listing was cut from; the title
/// is a best-effort heuristic and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub title: String,
    pub raw_text: String,
}

impl Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.title.is_empty() {
            write!(f, "{}", self.course_id)
        } else {
            write!(f, "{} | {}", self.course_id, self.title)
        }
    }
}

/// The record set of the most recent successful run, keyed by course id.
/// Key uniqueness is the only structural invariant.
pub type Snapshot = HashMap<String, Course>;

/// One named, independently configured search-and-notify unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watch {
    pub name: String,
    pub search_url: String,
    pub state_key: String,
}
