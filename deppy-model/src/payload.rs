use std::fmt;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::value::RawValue;

/// An already-encoded JSON value carried opaquely by the registry.
///
/// The bytes are emitted verbatim as raw JSON when an entity is exported.
/// Values built through [`Payload::from_value`], [`Payload::from_json`] or
/// `From<serde_json::Value>` are guaranteed to be valid JSON. [`Payload::from_raw`]
/// skips validation, so an invalid payload only surfaces when it is encoded.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Encode any serializable value.
    pub fn from_value<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_vec(value).map(Self)
    }

    /// Wrap JSON text after checking that it holds exactly one JSON value.
    pub fn from_json(text: impl Into<String>) -> serde_json::Result<Self> {
        let text = text.into();
        serde_json::from_str::<&RawValue>(&text)?;
        Ok(Self(text.into_bytes()))
    }

    /// Wrap pre-encoded bytes without validating them.
    pub fn from_raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the bytes hold a single well-formed JSON value.
    pub fn is_valid(&self) -> bool {
        serde_json::from_slice::<&RawValue>(&self.0).is_ok()
    }

    /// Decode into a JSON tree.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.0)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self(value.to_string().into_bytes())
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Payload")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw: &RawValue = serde_json::from_slice(&self.0)
            .map_err(|e| S::Error::custom(format!("invalid JSON payload: {e}")))?;
        raw.serialize(serializer)
    }
}

// Decoded payloads hold the input bytes unchanged. Only `serde_json`
// deserializers are supported.
impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Self(raw.get().as_bytes().to_vec()))
    }
}
