use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::errors::TelemetryError;
use crate::fields::{FieldName, FieldSource, Schema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryField {
    pub name: FieldName,
    pub value: String,
    pub source: FieldSource,
}

/// Values produced by one collection step, not yet merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partial {
    values: BTreeMap<FieldName, String>,
}

impl Partial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FieldName, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(FieldName, String)> for Partial {
    fn from_iter<I: IntoIterator<Item = (FieldName, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotState {
    Empty,
    Populating,
    Ready,
}

/// Collected fields for one collection run, keyed in display order.
#[derive(Debug, Clone)]
pub struct TelemetrySnapshot {
    id: Uuid,
    collected_at: DateTime<Utc>,
    schema: Schema,
    fields: BTreeMap<FieldName, TelemetryField>,
}

impl TelemetrySnapshot {
    pub fn new(schema: Schema) -> Self {
        Self {
            id: Uuid::new_v4(),
            collected_at: Utc::now(),
            schema,
            fields: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the snapshot became Ready; creation time until then.
    pub fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn state(&self) -> SnapshotState {
        if self.fields.is_empty() && !self.schema.is_empty() {
            SnapshotState::Empty
        } else if self.fields.len() < self.schema.len() {
            SnapshotState::Populating
        } else {
            SnapshotState::Ready
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SnapshotState::Ready
    }

    /// Declared fields that have no value yet.
    pub fn pending(&self) -> Vec<FieldName> {
        self.schema
            .fields()
            .iter()
            .copied()
            .filter(|f| !self.fields.contains_key(f))
            .collect()
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.fields.get(&field).map(|f| f.value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &TelemetryField> {
        self.fields.values()
    }

    /// Writes `partial` into the snapshot, last write wins. Fields outside the
    /// schema are dropped. Returns the number of fields written.
    pub fn merge_into(&mut self, partial: &Partial) -> Result<usize, TelemetryError> {
        if self.is_ready() {
            return Err(TelemetryError::SnapshotSealed);
        }
        let mut written = 0;
        for (name, value) in partial.iter() {
            if !self.schema.contains(name) {
                continue;
            }
            self.fields.insert(
                name,
                TelemetryField {
                    name,
                    value: value.to_string(),
                    source: name.source(),
                },
            );
            written += 1;
        }
        if self.is_ready() {
            self.collected_at = Utc::now();
        }
        Ok(written)
    }

    /// Renders the fields named by `layout` as a compact JSON object, keys in
    /// layout order. Only Ready snapshots serialize.
    pub fn serialize(&self, layout: &SummaryLayout) -> Result<String, TelemetryError> {
        if !self.is_ready() {
            return Err(TelemetryError::NotReady {
                pending: self.pending().iter().map(|f| f.to_string()).collect(),
            });
        }
        Ok(serde_json::to_string(&Summary {
            snapshot: self,
            layout,
        })?)
    }
}

impl Serialize for TelemetrySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields: Vec<&TelemetryField> = self.fields.values().collect();
        let mut s = serializer.serialize_struct("TelemetrySnapshot", 4)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("collected_at", &self.collected_at)?;
        s.serialize_field("state", &self.state())?;
        s.serialize_field("fields", &fields)?;
        s.end()
    }
}

/// Which snapshot fields go into the outbound summary, and under which keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLayout {
    entries: Vec<(String, FieldName)>,
}

impl SummaryLayout {
    pub fn new(entries: impl IntoIterator<Item = (String, FieldName)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Keys equal the fields' wire names.
    pub fn of(fields: &[FieldName]) -> Self {
        Self::new(fields.iter().map(|f| (f.as_str().to_string(), *f)))
    }

    /// Parses entries written as `field` or `key=field`.
    pub fn parse<I, S>(entries: I) -> Result<Self, TelemetryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .map(|entry| -> Result<(String, FieldName), TelemetryError> {
                let entry = entry.as_ref();
                match entry.split_once('=') {
                    Some((key, field)) => {
                        Ok((key.trim().to_string(), FieldName::from_str(field)?))
                    }
                    None => {
                        let field = FieldName::from_str(entry)?;
                        Ok((field.as_str().to_string(), field))
                    }
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn entries(&self) -> &[(String, FieldName)] {
        &self.entries
    }
}

impl Default for SummaryLayout {
    fn default() -> Self {
        Self::of(&[FieldName::Ipv4, FieldName::Ipv6, FieldName::Isp, FieldName::Os])
    }
}

struct Summary<'a> {
    snapshot: &'a TelemetrySnapshot,
    layout: &'a SummaryLayout,
}

impl Serialize for Summary<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.layout.entries.len()))?;
        for (key, field) in &self.layout.entries {
            let value = self.snapshot.get(*field).unwrap_or(field.fallback());
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
