use foundation::Revision;
use serde_json::Value;
use tracing::debug;

use crate::geometry::{Feature, is_feature_collection};

/// Text a fresh session starts with.
pub const DEFAULT_DOCUMENT: &str = "{\n  \"type\": \"FeatureCollection\",\n  \"features\": []\n}";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// The user replaced the text in the editor.
    Edit,
    /// Features were appended programmatically.
    Append,
}

/// Notification returned by every document mutation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    pub revision: Revision,
    pub origin: ChangeOrigin,
}

/// Holds the raw GeoJSON text and its last successful JSON parse.
///
/// `set_raw_text` and `append_features` are the only mutation paths.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    raw_text: String,
    parsed: Option<Value>,
    revision: Revision,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            raw_text: String::new(),
            parsed: None,
            revision: Revision::initial(),
        }
    }

    /// Store seeded with an empty FeatureCollection.
    pub fn with_default_document() -> Self {
        let mut store = Self::new();
        store.set_raw_text(DEFAULT_DOCUMENT);
        store
    }

    /// Stores `text` verbatim. A JSON parse failure is not an error: the parsed
    /// value is simply absent until the text parses again.
    pub fn set_raw_text(&mut self, text: impl Into<String>) -> DocumentChange {
        self.raw_text = text.into();
        self.parsed = serde_json::from_str::<Value>(&self.raw_text).ok();
        self.bump(ChangeOrigin::Edit)
    }

    pub fn current_text(&self) -> &str {
        &self.raw_text
    }

    pub fn current_parsed(&self) -> Option<&Value> {
        self.parsed.as_ref()
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Appends `features` in order when the document is a FeatureCollection and
    /// re-serializes it pretty-printed. Any other document is left untouched
    /// and `None` is returned.
    pub fn append_features(&mut self, features: &[Feature]) -> Option<DocumentChange> {
        let Some(parsed) = self.parsed.as_ref() else {
            debug!("append skipped: document is not valid JSON");
            return None;
        };
        if !is_feature_collection(parsed) {
            debug!("append skipped: document is not a FeatureCollection");
            return None;
        }

        let mut next = parsed.clone();
        let list = next.get_mut("features").and_then(Value::as_array_mut)?;
        list.extend(features.iter().map(Feature::to_geojson_value));

        let text = match serde_json::to_string_pretty(&next) {
            Ok(text) => text,
            Err(err) => {
                debug!("append skipped: serialization failed: {err}");
                return None;
            }
        };
        self.raw_text = text;
        self.parsed = Some(next);
        Some(self.bump(ChangeOrigin::Append))
    }

    /// Number of features when the document is a FeatureCollection.
    pub fn feature_count(&self) -> Option<usize> {
        let parsed = self.parsed.as_ref()?;
        if !is_feature_collection(parsed) {
            return None;
        }
        parsed.get("features").and_then(Value::as_array).map(Vec::len)
    }

    fn bump(&mut self, origin: ChangeOrigin) -> DocumentChange {
        self.revision = self.revision.next();
        DocumentChange {
            revision: self.revision,
            origin,
        }
    }
}
