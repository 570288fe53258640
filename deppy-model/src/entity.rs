use serde::{Deserialize, Serialize};

use crate::Payload;

/// A tagged value annotating an entity as a property or a constraint.
///
/// `type` is a producer-defined tag such as `"olm.package"`; it is never
/// checked against a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type")]
    pub type_: String,
    pub value: Payload,
}

impl TypedValue {
    pub fn new(type_: impl Into<String>, value: impl Into<Payload>) -> Self {
        Self {
            type_: type_.into(),
            value: value.into(),
        }
    }
}

/// A uniquely identified record held by the registry.
///
/// `data` describes the entity itself in a producer-defined shape. The
/// `properties` and `constraints` lists keep the order they were supplied
/// in; the registry treats them identically and only the field name tells
/// "facts" apart from "requirements". Absent or empty fields are left out
/// of the encoded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<TypedValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<TypedValue>,
}

impl Entity {
    /// An entity with only an ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: None,
            properties: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: impl Into<Payload>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Append a property, keeping insertion order.
    pub fn with_property(mut self, type_: impl Into<String>, value: impl Into<Payload>) -> Self {
        self.properties.push(TypedValue::new(type_, value));
        self
    }

    /// Append a constraint, keeping insertion order.
    pub fn with_constraint(mut self, type_: impl Into<String>, value: impl Into<Payload>) -> Self {
        self.constraints.push(TypedValue::new(type_, value));
        self
    }

    /// Value of the first property tagged `type_`.
    pub fn property(&self, type_: &str) -> Option<&Payload> {
        first_of_type(&self.properties, type_)
    }

    /// Value of the first constraint tagged `type_`.
    pub fn constraint(&self, type_: &str) -> Option<&Payload> {
        first_of_type(&self.constraints, type_)
    }
}

fn first_of_type<'a>(values: &'a [TypedValue], type_: &str) -> Option<&'a Payload> {
    values.iter().find(|tv| tv.type_ == type_).map(|tv| &tv.value)
}
