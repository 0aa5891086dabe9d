//! Video document schema: shape, casting, required fields and defaults.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_THUMBNAIL: &str = "https://via.placeholder.com/1600x900.webp";

/// Candidate field values as received in a request body.
pub type Candidate = Map<String, Value>;

fn default_thumbnail() -> String {
    DEFAULT_THUMBNAIL.to_string()
}

/// A stored video document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub channel_name: String,
    pub description: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(default = "default_thumbnail")]
    pub thumbnail: String,
    #[serde(rename = "__v", default)]
    pub version: i32,
}

/// Wire representation of a [`Video`], with the id as a hex string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoObject {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub channel_name: String,
    pub description: String,
    pub watched: bool,
    pub thumbnail: String,
    #[serde(rename = "__v")]
    pub version: i32,
}

impl From<Video> for VideoObject {
    fn from(video: Video) -> Self {
        Self {
            id: video.id.to_hex(),
            title: video.title,
            channel_name: video.channel_name,
            description: video.description,
            watched: video.watched,
            thumbnail: video.thumbnail,
            version: video.version,
        }
    }
}

/// A validated video that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDraft {
    pub title: String,
    pub channel_name: String,
    pub description: String,
    pub watched: bool,
    pub thumbnail: String,
}

impl VideoDraft {
    /// Builds a draft from candidate values, applying schema defaults for
    /// omitted optional fields. Unknown fields are dropped.
    pub fn from_candidate(candidate: &Candidate) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();

        let title = collect(required_text(candidate.get("title"), "title"), &mut errors);
        let channel_name = collect(
            required_text(candidate.get("channelName"), "channelName"),
            &mut errors,
        );
        let description = collect(
            required_text(candidate.get("description"), "description"),
            &mut errors,
        );
        let watched = collect(
            match candidate.get("watched") {
                None => Ok(false),
                Some(value) => cast_bool("watched", value)
                    .and_then(|watched| watched.ok_or(FieldError::required("watched"))),
            },
            &mut errors,
        );
        let thumbnail = collect(
            candidate
                .get("thumbnail")
                .map(|value| cast_text("thumbnail", value))
                .transpose()
                .map(|thumbnail| {
                    thumbnail
                        .flatten()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(default_thumbnail)
                }),
            &mut errors,
        );

        match (title, channel_name, description, watched, thumbnail) {
            (Some(title), Some(channel_name), Some(description), Some(watched), Some(thumbnail))
                if errors.is_empty() =>
            {
                Ok(Self {
                    title,
                    channel_name,
                    description,
                    watched,
                    thumbnail,
                })
            }
            _ => Err(ValidationError { errors }),
        }
    }

    pub fn into_video(self, id: ObjectId) -> Video {
        Video {
            id,
            title: self.title,
            channel_name: self.channel_name,
            description: self.description,
            watched: self.watched,
            thumbnail: self.thumbnail,
            version: 0,
        }
    }
}

impl Video {
    /// Shallow-merges candidate values onto this record. Fields absent from
    /// the candidate are untouched. Nothing changes unless every present
    /// field passes validation.
    pub fn apply(&mut self, candidate: &Candidate) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        let mut next = self.clone();

        for (path, field) in [
            ("title", &mut next.title),
            ("channelName", &mut next.channel_name),
            ("description", &mut next.description),
        ] {
            if let Some(value) = candidate.get(path) {
                if let Some(text) = collect(required_text(Some(value), path), &mut errors) {
                    *field = text;
                }
            }
        }

        if let Some(value) = candidate.get("watched") {
            let watched = cast_bool("watched", value)
                .and_then(|watched| watched.ok_or(FieldError::required("watched")));
            if let Some(watched) = collect(watched, &mut errors) {
                next.watched = watched;
            }
        }

        // thumbnail is never cleared; an empty or null value keeps the current one
        if let Some(value) = candidate.get("thumbnail") {
            if let Some(Some(thumbnail)) = collect(cast_text("thumbnail", value), &mut errors) {
                if !thumbnail.is_empty() {
                    next.thumbnail = thumbnail;
                }
            }
        }

        if !errors.is_empty() {
            return Err(ValidationError { errors });
        }

        *self = next;
        Ok(())
    }
}

/// Removes a `thumbnail` that would not count as a value (absent, null,
/// false, zero, empty string) so the stored or default value stays.
pub fn strip_falsy_thumbnail(candidate: &mut Candidate) {
    if candidate.get("thumbnail").map_or(true, is_falsy) {
        candidate.remove("thumbnail");
    }
}

pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n == 0.0 || n.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Video validation failed: {}", join_errors(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    #[cfg(test)]
    pub fn paths(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.path).collect()
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    path: &'static str,
    kind: FieldErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
enum FieldErrorKind {
    Required,
    Cast {
        to: &'static str,
        value: String,
        type_name: &'static str,
    },
}

impl FieldError {
    fn required(path: &'static str) -> Self {
        Self {
            path,
            kind: FieldErrorKind::Required,
        }
    }

    fn cast(path: &'static str, to: &'static str, value: &Value) -> Self {
        let shown = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            path,
            kind: FieldErrorKind::Cast {
                to,
                value: shown,
                type_name: type_name(value),
            },
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FieldErrorKind::Required => write!(f, "{}: Path `{}` is required.", self.path, self.path),
            FieldErrorKind::Cast {
                to,
                value,
                type_name,
            } => write!(
                f,
                "{}: Cast to {} failed for value \"{}\" (type {}) at path \"{}\"",
                self.path, to, value, type_name, self.path
            ),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

fn collect<T>(result: Result<T, FieldError>, errors: &mut Vec<FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

/// `Ok(None)` means an explicit null.
fn cast_text(path: &'static str, value: &Value) -> Result<Option<String>, FieldError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(number_text(n))),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(FieldError::cast(path, "string", value)),
    }
}

/// Integral floats drop their fraction, so `1.0` is stored as `"1"`. Exponent
/// notation for very large or very small magnitudes is not reproduced.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

fn cast_bool(path: &'static str, value: &Value) -> Result<Option<bool>, FieldError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::Number(n) if n.as_f64() == Some(1.0) => Ok(Some(true)),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(Some(false)),
        Value::String(s) => match s.as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(FieldError::cast(path, "Boolean", value)),
        },
        _ => Err(FieldError::cast(path, "Boolean", value)),
    }
}

fn required_text(value: Option<&Value>, path: &'static str) -> Result<String, FieldError> {
    match value.map(|v| cast_text(path, v)).transpose()?.flatten() {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(FieldError::required(path)),
    }
}
