//! Plot document model
//!
//! A [`Document`] is the mutable handle passed to plot callbacks. A callback
//! populates it with a title and root elements; the server serializes the
//! result for the browser. Root contents are opaque plot specs carried as
//! JSON values; interpreting them is the job of whatever chart frontend the
//! embedding page loads.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A displayable document built by a plot callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    title: String,
    roots: Vec<Value>,
}

impl Document {
    /// Create an empty document with no title and no roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Get the document title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append a root element to the document.
    pub fn add_root(&mut self, root: Value) {
        self.roots.push(root);
    }

    /// Get the root elements in insertion order.
    pub fn roots(&self) -> &[Value] {
        &self.roots
    }

    /// Serialize the document for transport to the browser.
    pub fn to_json(&self) -> Value {
        json!({ "title": self.title, "roots": self.roots })
    }
}
