//! Records and patches.
//!
//! A [`Record`] is an ordered set of named fields, used for a component's
//! props and state. A [`Patch`] is a partial record: merging it overwrites
//! the fields it mentions and leaves every other field untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Ordered map of field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Remove a field, keeping the order of the remaining ones.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overwrite the fields mentioned by `patch`.
    ///
    /// Fields not present in the patch keep their current value. A field
    /// present in the patch with a `null` value is overwritten with `null`.
    pub fn merge(&mut self, patch: &Patch) {
        for (field, value) in patch.0.iter() {
            self.fields.insert(field.to_owned(), value.clone());
        }
    }

    /// Consume the record and return it with `patch` merged in.
    pub fn merged(mut self, patch: &Patch) -> Self {
        self.merge(patch);
        self
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<serde_json::Map<String, Value>> for Record {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

/// A partial record merged field by field into component state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(Record);

impl Patch {
    /// An empty patch. Merging it changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that sets exactly one field.
    pub fn field(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self(Record::new().with(field, value))
    }

    pub fn with(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self(self.0.with(field, value))
    }

    /// Build a patch from any value that serializes to an object, such as a
    /// struct of the fields a component cares about.
    ///
    /// `Option` fields skipped with `#[serde(skip_serializing_if =
    /// "Option::is_none")]` are left out of the patch and so preserve the
    /// current state.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(Self(map.into())),
            Ok(other) => Err(Error::PatchShape(value_kind(&other))),
            Err(source) => Err(Error::Serialize {
                field: String::new(),
                source,
            }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_record(self) -> Record {
        self.0
    }
}

impl From<Record> for Patch {
    fn from(record: Record) -> Self {
        Self(record)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overwrites_present_fields_only() {
        let mut state = Record::new().with("count", 1).with("name", "x");
        state.merge(&Patch::field("count", 2));

        assert_eq!(state.get("count"), Some(&json!(2)));
        assert_eq!(state.get("name"), Some(&json!("x")));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn merge_null_is_an_overwrite() {
        let mut state = Record::new().with("name", "x");
        state.merge(&Patch::field("name", Value::Null));
        assert_eq!(state.get("name"), Some(&Value::Null));
    }

    #[test]
    fn sequential_merges_are_last_writer_wins() {
        let patches = [
            Patch::field("a", 1).with("b", 1),
            Patch::field("b", 2),
            Patch::field("c", 3).with("a", 4),
        ];
        let state = patches.iter().fold(Record::new(), |s, p| s.merged(p));

        assert_eq!(state, Record::new().with("a", 4).with("b", 2).with("c", 3));
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let state = Record::new().with("a", 1);
        assert_eq!(state.clone().merged(&Patch::new()), state);
    }

    #[test]
    fn patch_from_struct_skips_absent_options() {
        #[derive(Serialize)]
        struct View {
            count: i64,
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
        }

        let patch = Patch::from_serialize(&View { count: 3, name: None }).unwrap();
        assert_eq!(patch.get("count"), Some(&json!(3)));
        assert!(patch.get("name").is_none());
    }

    #[test]
    fn patch_from_non_object_is_rejected() {
        let err = Patch::from_serialize(&42).unwrap_err();
        assert!(matches!(err, Error::PatchShape("a number")));
    }

    #[test]
    fn remove_keeps_order() {
        let mut record = Record::new().with("a", 1).with("b", 2).with("c", 3);
        record.remove("b");
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
