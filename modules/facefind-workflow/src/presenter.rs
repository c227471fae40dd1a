//! Maps a workflow record to what the user sees.
//!
//! No decisions are made here beyond picking the best-match confidence and
//! the photo count for the headline.

use serde::Serialize;

use crate::state::{WorkflowRecord, WorkflowState};

/// Everything on screen at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub view: View,
    /// Full-size photo shown over the results grid.
    pub overlay: Option<PhotoOverlay>,
    /// Blocking message the user has to acknowledge.
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Landing {
        title: String,
        subtitle: String,
    },
    LiveCapture {
        ready: bool,
        hint: String,
    },
    Progress {
        title: String,
        percent: u8,
        label: String,
        preview_uri: Option<String>,
    },
    Results(ResultsView),
    NoMatches {
        title: String,
        message: String,
        hint: String,
        action: String,
    },
    Error {
        title: String,
        message: String,
        action: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub headline: String,
    /// Present only when the server reported at least one match.
    pub confidence: Option<String>,
    pub photos: Vec<PhotoTile>,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoTile {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoOverlay {
    pub index: usize,
    pub url: String,
}

pub fn present(record: &WorkflowRecord) -> Screen {
    let view = match record.state {
        WorkflowState::Idle => View::Landing {
            title: "Find Your Photos".to_string(),
            subtitle: "Take a selfie or upload a photo to find pictures of you".to_string(),
        },
        WorkflowState::CapturingMedia => View::LiveCapture {
            ready: record.camera_ready,
            hint: if record.camera_ready {
                "Position your face in the frame".to_string()
            } else {
                "Starting camera...".to_string()
            },
        },
        WorkflowState::Processing => View::Progress {
            title: "Finding Your Photos...".to_string(),
            percent: record.progress,
            label: format!("{}% complete", record.progress),
            preview_uri: record.captured.as_ref().and_then(|i| i.preview_uri()),
        },
        WorkflowState::Results => View::Results(results_view(record)),
        WorkflowState::NoMatches => View::NoMatches {
            title: "No Matches Found".to_string(),
            message: "We couldn't find any photos of you".to_string(),
            hint: "Try using better lighting or a different photo".to_string(),
            action: "Try Again".to_string(),
        },
        WorkflowState::Error => View::Error {
            title: "Something went wrong".to_string(),
            message: record.error.clone().unwrap_or_default(),
            action: "Try Again".to_string(),
        },
    };

    let overlay = match (record.state, record.selected_photo, record.selected_photo_url()) {
        (WorkflowState::Results, Some(index), Some(url)) => Some(PhotoOverlay {
            index,
            url: url.to_string(),
        }),
        _ => None,
    };

    Screen {
        view,
        overlay,
        notice: record.notice.clone(),
    }
}

fn results_view(record: &WorkflowRecord) -> ResultsView {
    let urls = record.photo_urls();
    let noun = if urls.len() == 1 { "Photo" } else { "Photos" };
    let best = record.result.as_ref().and_then(|r| r.best_match());

    ResultsView {
        headline: format!("Found {} {noun}", urls.len()),
        confidence: best.map(|_| format!("Best Match Confidence: {}%", confidence_percent(record))),
        photos: urls
            .iter()
            .enumerate()
            .map(|(i, url)| PhotoTile {
                label: format!("Photo {}", i + 1),
                url: url.clone(),
            })
            .collect(),
        action: "Search Again".to_string(),
    }
}

/// Best-match similarity as a percentage with one decimal; `0.0` when the
/// server sent no match records.
pub fn confidence_percent(record: &WorkflowRecord) -> String {
    let similarity = record
        .result
        .as_ref()
        .and_then(|r| r.best_match())
        .map(|m| m.similarity)
        .unwrap_or(0.0);
    format!("{:.1}", similarity * 100.0)
}
