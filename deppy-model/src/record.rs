use serde::de::{Deserialize, Deserializer, Error as _, IgnoredAny};
use serde::Serialize;
use serde_json::value::RawValue;

use crate::Entity;

/// One line of a registry export.
///
/// Entity lines carry the bare entity object. Error lines have the shape
/// `{"error":"<message>"}` and take the place of an entity that could not
/// be encoded, so a reader can tell a partial export from a complete one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExportRecord {
    Entity(Entity),
    Error { error: String },
}

impl ExportRecord {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Decode a newline-delimited export body. Blank lines are skipped.
    pub fn parse_lines(body: &str) -> serde_json::Result<Vec<Self>> {
        body.lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect()
    }
}

impl From<Entity> for ExportRecord {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

/// The keys that decide which kind of record a line is.
#[derive(serde::Deserialize)]
struct RecordShape {
    #[serde(default)]
    id: Option<IgnoredAny>,
    #[serde(default)]
    error: Option<String>,
}

// Entity payloads decode from raw JSON, which serde's untagged buffering
// cannot provide, so the line is captured raw and dispatched on its keys.
impl<'de> Deserialize<'de> for ExportRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let shape: RecordShape = serde_json::from_str(raw.get()).map_err(D::Error::custom)?;
        match (shape.id, shape.error) {
            (Some(_), _) => serde_json::from_str(raw.get())
                .map(Self::Entity)
                .map_err(D::Error::custom),
            (None, Some(error)) => Ok(Self::Error { error }),
            (None, None) => Err(D::Error::custom(
                "export record has neither an \"id\" nor an \"error\" field",
            )),
        }
    }
}
