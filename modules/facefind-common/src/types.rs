use serde::{Deserialize, Serialize};

/// Server-reported evidence that an indexed photo contains the submitted face.
///
/// Ordering is server-defined; index 0 is treated as the best match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Similarity in `[0, 1]`. Missing from the server counts as `0.0`.
    #[serde(default)]
    pub similarity: f64,
    /// Any other fields the server attaches. Opaque to the client.
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl MatchRecord {
    pub fn new(similarity: f64) -> Self {
        Self {
            similarity,
            metadata: serde_json::Map::new(),
        }
    }
}

/// Normalized outcome of a successful recognition call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub matched: bool,
    pub photo_urls: Vec<String>,
    pub matches: Vec<MatchRecord>,
}

impl RecognitionResult {
    pub fn matched(photo_urls: Vec<String>, matches: Vec<MatchRecord>) -> Self {
        Self {
            matched: true,
            photo_urls,
            matches,
        }
    }

    pub fn no_match() -> Self {
        Self::default()
    }

    /// True only when the server matched and returned at least one photo.
    pub fn has_photos(&self) -> bool {
        self.matched && !self.photo_urls.is_empty()
    }

    pub fn best_match(&self) -> Option<&MatchRecord> {
        self.matches.first()
    }
}
