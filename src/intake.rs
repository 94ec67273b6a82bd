use std::fs;

use crate::canvas::decode_canvas_payload;
use crate::config::OrbConfig;
use crate::errors::{OrbError, Result};
use crate::sanitize::sanitize;
use crate::storage::SubmissionStore;
use crate::storage::models::{NewSubmission, Submission};
use crate::validate::validate;

pub const MAX_TEXT_CHARS: usize = 2000;

/// Which image source, if any, accompanies a submission. Resolved once at
/// the boundary so the rest of the pipeline never re-checks option
/// combinations.
pub enum DoodleInput {
    None,
    Canvas(String),
    Upload { bytes: Vec<u8>, filename: String },
}

impl DoodleInput {
    /// Collapses the two optional request fields into a single variant.
    /// Supplying both a drawing and a file upload is a caller error.
    pub fn resolve(canvas: Option<String>, upload: Option<(Vec<u8>, String)>) -> Result<Self> {
        let canvas = canvas.filter(|c| !c.is_empty() && c.as_str() != "null");
        let upload = upload.filter(|(_, filename)| !filename.is_empty());
        match (canvas, upload) {
            (Some(_), Some(_)) => Err(OrbError::InvalidInput(
                "cannot submit both drawing and file upload, choose one".to_string(),
            )),
            (Some(payload), None) => Ok(DoodleInput::Canvas(payload)),
            (None, Some((bytes, filename))) => Ok(DoodleInput::Upload { bytes, filename }),
            (None, None) => Ok(DoodleInput::None),
        }
    }
}

/// Trims and truncates submitted text; all-whitespace collapses to absent.
fn normalize_text(text: Option<&str>) -> Option<String> {
    let trimmed = text?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_TEXT_CHARS).collect())
}

/// Runs the full intake pipeline: normalize text, route the doodle through
/// its validation/sanitization path, then persist.
///
/// The image is written before the row is inserted; if the insert itself
/// fails the stored file is removed again, so no file outlives a failed
/// submission and no row ever references a file that was not written.
pub fn submit_intake<S: SubmissionStore>(
    config: &OrbConfig,
    store: &S,
    text: Option<&str>,
    doodle: DoodleInput,
) -> Result<Submission> {
    let text_content = normalize_text(text);

    let doodle_filename = match doodle {
        DoodleInput::None => None,
        DoodleInput::Canvas(payload) => {
            let bytes = decode_canvas_payload(&payload)?;
            Some(sanitize(config, &bytes, true)?)
        }
        DoodleInput::Upload { bytes, filename } => {
            validate(config, &bytes, &filename)?;
            Some(sanitize(config, &bytes, false)?)
        }
    };

    if text_content.is_none() && doodle_filename.is_none() {
        return Err(OrbError::InvalidInput(
            "must provide either text or image".to_string(),
        ));
    }

    let submission = NewSubmission {
        text_content,
        doodle_filename: doodle_filename.clone(),
    };
    match store.insert(submission) {
        Ok(stored) => Ok(stored),
        Err(e) => {
            if let Some(filename) = doodle_filename {
                let _ = fs::remove_file(config.uploads_dir.join(filename));
            }
            Err(e)
        }
    }
}

/// One uniformly random submission, or None when the orb is empty.
pub fn fetch_vision<S: SubmissionStore>(store: &S) -> Result<Option<Submission>> {
    store.fetch_random()
}

pub fn fetch_stats<S: SubmissionStore>(store: &S) -> Result<i64> {
    store.count()
}

/// Reads back a stored image by its generated filename. Generated names
/// never contain separators, so anything that does is rejected outright.
pub fn serve_image(config: &OrbConfig, filename: &str) -> Result<Vec<u8>> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(OrbError::InvalidInput("invalid image filename".to_string()));
    }
    match fs::read(config.uploads_dir.join(filename)) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(OrbError::NotFound(format!("no stored image named {}", filename)))
        }
        Err(e) => Err(e.into()),
    }
}
