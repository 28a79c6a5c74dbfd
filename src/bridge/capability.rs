//! Capabilities a host record exposes to the services.
//!
//! Fields are addressed through a typed enum per entity family rather than
//! strings, so a patch for a note can never name a reminder property.

use std::fmt;

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use super::BridgeError;
use crate::models::{ContainerRef, Timestamp};

/// A writable host property of one entity family.
pub trait HostField: Copy + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];

    /// The property name as the host spells it.
    fn as_str(&self) -> &'static str;

    fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == s)
    }
}

/// Read access to a record's fields as JSON values.
pub trait Readable {
    type Field: HostField;

    fn get(&self, field: Self::Field) -> Value;
}

/// Write access to a record's fields. Used by hosts applying a [`Patch`].
pub trait Writable: Readable {
    fn set(&mut self, field: Self::Field, value: Value) -> Result<(), BridgeError>;
}

/// Something that holds entities: a reminder list, a folder, a calendar.
pub trait Container {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Container for ContainerRef {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Encodes a timestamp the way patches and [`Readable::get`] exchange it.
pub fn timestamp_value(ts: Timestamp) -> Value {
    Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn optional_timestamp_value(ts: Option<Timestamp>) -> Value {
    ts.map(timestamp_value).unwrap_or(Value::Null)
}

/// Decodes a patch value into a field's type.
pub fn decode_field<T: serde::de::DeserializeOwned>(
    field: impl HostField,
    value: Value,
) -> Result<T, BridgeError> {
    serde_json::from_value(value).map_err(|e| {
        BridgeError::Script(format!("Invalid value for {}: {}", field.as_str(), e))
    })
}

/// An ordered set of field assignments, at most one per field.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch<F: HostField> {
    entries: Vec<(F, Value)>,
}

impl<F: HostField> Default for Patch<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: HostField> Patch<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `field`, replacing an earlier assignment to the same field.
    pub fn set(&mut self, field: F, value: Value) {
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Assigns `field` only when a value is present.
    pub fn set_some<V: Into<Value>>(&mut self, field: F, value: Option<V>) {
        if let Some(value) = value {
            self.set(field, value.into());
        }
    }

    pub fn set_timestamp(&mut self, field: F, value: Option<Timestamp>) {
        if let Some(value) = value {
            self.set(field, timestamp_value(value));
        }
    }

    /// Drops assignments that would leave `current` unchanged.
    pub fn retain_changes<R>(mut self, current: &R) -> Self
    where
        R: Readable<Field = F>,
    {
        self.entries.retain(|(field, value)| current.get(*field) != *value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fields(&self) -> Vec<F> {
        self.entries.iter().map(|(f, _)| *f).collect()
    }

    /// The JSON object sent to the host.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(field, value)| (field.as_str().to_string(), value.clone()))
            .collect();
        Value::Object(map)
    }

    /// Parses a patch object received by a host.
    pub fn from_value(value: &Value) -> Result<Self, BridgeError> {
        let object = value
            .as_object()
            .ok_or_else(|| BridgeError::Script("Patch must be a JSON object".to_string()))?;

        let mut patch = Self::new();
        for (key, value) in object {
            let field = F::from_str(key)
                .ok_or_else(|| BridgeError::Script(format!("Unknown or read-only field '{}'", key)))?;
            patch.set(field, value.clone());
        }
        Ok(patch)
    }

    pub fn apply_to<W>(&self, target: &mut W) -> Result<(), BridgeError>
    where
        W: Writable<Field = F>,
    {
        for (field, value) in &self.entries {
            target.set(*field, value.clone())?;
        }
        Ok(())
    }
}
