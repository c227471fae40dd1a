use std::sync::Arc;

use facefind_common::{CapturedImage, MatchRecord, RecognitionResult};
use serde::{Deserialize, Deserializer};

/// A captured image on its way to the recognition endpoint.
#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    image: Arc<CapturedImage>,
}

impl RecognitionRequest {
    pub fn new(image: Arc<CapturedImage>) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &CapturedImage {
        &self.image
    }
}

/// Wire shape of the endpoint's JSON body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecognitionResponse {
    #[serde(default, deserialize_with = "null_as_false")]
    pub matched: bool,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub matches: Option<Vec<MatchRecord>>,
    #[serde(default)]
    pub message: Option<String>,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl RecognitionResponse {
    pub(crate) fn into_result(self) -> RecognitionResult {
        let urls = self.image_urls.unwrap_or_default();
        if self.matched && !urls.is_empty() {
            RecognitionResult::matched(urls, self.matches.unwrap_or_default())
        } else {
            RecognitionResult::no_match()
        }
    }

    /// Server message, if it sent a non-empty one.
    pub(crate) fn message(&self) -> Option<String> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from)
    }
}
