use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Text,
    Doodle,
    Both,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Text => "text",
            SubmissionKind::Doodle => "doodle",
            SubmissionKind::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Option<SubmissionKind> {
        match s {
            "text" => Some(SubmissionKind::Text),
            "doodle" => Some(SubmissionKind::Doodle),
            "both" => Some(SubmissionKind::Both),
            _ => None,
        }
    }
}

/// One persisted unit of user-contributed text and/or image. Immutable once
/// stored; `kind` always reflects which of the two payload fields are set.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: i64,
    pub text_content: Option<String>,
    pub doodle_filename: Option<String>,
    pub kind: SubmissionKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub text_content: Option<String>,
    pub doodle_filename: Option<String>,
}

impl NewSubmission {
    /// The derived kind, or None when both payloads are absent (an invalid
    /// submission the store must reject).
    pub fn kind(&self) -> Option<SubmissionKind> {
        match (&self.text_content, &self.doodle_filename) {
            (Some(_), Some(_)) => Some(SubmissionKind::Both),
            (Some(_), None) => Some(SubmissionKind::Text),
            (None, Some(_)) => Some(SubmissionKind::Doodle),
            (None, None) => None,
        }
    }
}
