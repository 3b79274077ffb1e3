use chrono::{DateTime, FixedOffset, Local, SubsecRound};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::ServiceError;

pub const MISSING_FIELDS: &str = "Missing required fields: title and content are mandatory.";

/// Persisted note. `id` and `created_at` are assigned by the server and
/// never change afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(with = "offset_timestamp")]
    pub created_at: DateTime<FixedOffset>,
}

/// Create input. Both fields are required; see [`NoteDraft::into_note`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Partial update input: `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Top-level JSON object of a request body. Empty, non-JSON and non-object
/// bodies carry no fields.
fn body_object(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// `Ok(None)` for an absent or null field, an error for a non-string one.
fn string_field(obj: &mut Map<String, Value>, key: &str) -> Result<Option<String>, ServiceError> {
    match obj.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ServiceError::Validation(format!("Invalid field type: {key} must be a string."))),
    }
}

impl NoteDraft {
    /// A field of the wrong type counts as missing.
    pub fn from_body(body: &[u8]) -> Self {
        let mut obj = body_object(body);
        Self {
            title: string_field(&mut obj, "title").unwrap_or(None),
            content: string_field(&mut obj, "content").unwrap_or(None),
        }
    }

    /// Validate and build a new note with a fresh id and timestamp.
    /// Absent, null and empty-string fields are missing.
    pub fn into_note(self) -> Result<Note, ServiceError> {
        let title = self.title.filter(|t| !t.is_empty());
        let content = self.content.filter(|c| !c.is_empty());
        match (title, content) {
            (Some(title), Some(content)) => Ok(Note {
                id: generate_id(),
                title,
                content,
                created_at: now_timestamp(),
            }),
            _ => Err(ServiceError::Validation(MISSING_FIELDS.into())),
        }
    }
}

impl NotePatch {
    /// Fields are taken one at a time; a non-string, non-null `title` or
    /// `content` is rejected rather than dropped.
    pub fn from_body(body: &[u8]) -> Result<Self, ServiceError> {
        let mut obj = body_object(body);
        Ok(Self {
            title: string_field(&mut obj, "title")?,
            content: string_field(&mut obj, "content")?,
        })
    }

    pub fn apply(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
    }
}

/// Random version-4 UUID in hyphenated lowercase form.
pub fn generate_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Current local time, whole seconds, with its UTC offset.
pub fn now_timestamp() -> DateTime<FixedOffset> {
    let now = Local::now().trunc_subsecs(0);
    now.with_timezone(now.offset())
}

/// RFC 3339 with a numeric offset (`+00:00`, never `Z`).
mod offset_timestamp {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<FixedOffset>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)
    }
}
