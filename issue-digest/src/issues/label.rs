//! Issue label.

use serde::{Deserialize, Serialize};

/// A label attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name (e.g., "bug").
    pub name: String,

    /// Hex color without the leading `#` (e.g., "d73a4a").
    pub color: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}
