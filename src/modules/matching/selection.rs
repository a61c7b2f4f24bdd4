//! Requester-supplied groupings of areas or categories.
//!
//! On the wire a selection is a JSON object mapping an opaque group key to a
//! list of strings, e.g. `{"関東": ["東京都渋谷区", "神奈川県"]}`. Internally
//! it is an ordered list of groups so iteration follows insertion order.
//!
//! Postgres `jsonb` re-sorts object keys, so the stored column uses an array
//! of `[key, [items]]` pairs instead of the wire object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::shared::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection must be an object of lists, got {0}")]
    NotAMapping(&'static str),

    #[error("group `{0}` must be a list of strings")]
    GroupNotAList(String),

    #[error("group `{group}` has a non-string entry at index {index}")]
    NonStringEntry { group: String, index: usize },

    #[error("stored group {0} is not a [key, [items]] pair")]
    MalformedStoredGroup(usize),
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        AppError::MalformedSelection(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionGroup {
    pub key: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Selection {
    groups: Vec<SelectionGroup>,
}

impl Selection {
    pub fn new(groups: Vec<SelectionGroup>) -> Self {
        Self { groups }
    }

    pub fn from_value(value: &Value) -> Result<Self, SelectionError> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(SelectionError::NotAMapping(json_kind(other))),
        };

        let groups = map
            .iter()
            .map(|(key, leaf)| group(key, leaf))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { groups })
    }

    /// Column form, `[["関東", ["東京都"]], ...]`.
    pub fn to_stored(&self) -> Value {
        let pairs = self
            .groups
            .iter()
            .map(|g| {
                let items = g.items.iter().cloned().map(Value::String).collect();
                Value::Array(vec![Value::String(g.key.clone()), Value::Array(items)])
            })
            .collect();
        Value::Array(pairs)
    }

    /// Reads the column form. Rows written as a plain object are still accepted.
    pub fn from_stored(value: &Value) -> Result<Self, SelectionError> {
        let pairs = match value {
            Value::Array(pairs) => pairs,
            other => return Self::from_value(other),
        };

        let groups = pairs
            .iter()
            .enumerate()
            .map(|(index, pair)| match pair.as_array().map(Vec::as_slice) {
                Some([Value::String(key), leaf]) => group(key, leaf),
                _ => Err(SelectionError::MalformedStoredGroup(index)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { groups })
    }

    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .groups
            .iter()
            .map(|g| {
                let items = g.items.iter().cloned().map(Value::String).collect();
                (g.key.clone(), Value::Array(items))
            })
            .collect();
        Value::Object(map)
    }

    pub fn groups(&self) -> &[SelectionGroup] {
        &self.groups
    }

    /// Every `(group key, item)` pair in group order, then list order.
    pub fn leaves(&self) -> impl Iterator<Item = (&str, &str)> {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter().map(move |item| (g.key.as_str(), item.as_str())))
    }

    pub fn leaf_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count() == 0
    }
}

impl TryFrom<Value> for Selection {
    type Error = SelectionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Selection::from_value(&value)
    }
}

impl From<Selection> for Value {
    fn from(selection: Selection) -> Self {
        selection.to_value()
    }
}

fn group(key: &str, leaf: &Value) -> Result<SelectionGroup, SelectionError> {
    let entries = leaf
        .as_array()
        .ok_or_else(|| SelectionError::GroupNotAList(key.to_string()))?;

    let items = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| SelectionError::NonStringEntry {
                    group: key.to_string(),
                    index,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SelectionGroup {
        key: key.to_string(),
        items,
    })
}

fn json_kind(value: &Value) -> &'static str {
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
    fn test_preserves_insertion_order() {
        let value = json!({
            "zeta": ["b", "a"],
            "alpha": ["c"],
        });
        let selection = Selection::from_value(&value).unwrap();

        let leaves: Vec<_> = selection.leaves().collect();
        assert_eq!(leaves, vec![("zeta", "b"), ("zeta", "a"), ("alpha", "c")]);
        assert_eq!(selection.leaf_count(), 3);
        assert_eq!(selection.to_value(), value);
    }

    #[test]
    fn test_empty_object_is_empty_selection() {
        let selection = Selection::from_value(&json!({})).unwrap();
        assert!(selection.is_empty());

        let with_empty_group = Selection::from_value(&json!({"k": []})).unwrap();
        assert!(with_empty_group.is_empty());
        assert_eq!(with_empty_group.groups().len(), 1);
    }

    #[test]
    fn test_rejects_malformed_shapes() {
        assert_eq!(
            Selection::from_value(&json!(null)),
            Err(SelectionError::NotAMapping("null"))
        );
        assert_eq!(
            Selection::from_value(&json!(["a"])),
            Err(SelectionError::NotAMapping("an array"))
        );
        assert_eq!(
            Selection::from_value(&json!({"k": "東京都"})),
            Err(SelectionError::GroupNotAList("k".to_string()))
        );
        assert_eq!(
            Selection::from_value(&json!({"k": ["ok", 3]})),
            Err(SelectionError::NonStringEntry {
                group: "k".to_string(),
                index: 1
            })
        );
    }

    #[test]
    fn test_serde_round_trip_through_json_text() {
        let selection: Selection =
            serde_json::from_str(r#"{"region1": ["東京都渋谷区"]}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&selection).unwrap(),
            r#"{"region1":["東京都渋谷区"]}"#
        );

        let err = serde_json::from_str::<Selection>(r#"{"region1": 5}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_stored_form_keeps_group_order() {
        let selection = Selection::from_value(&json!({
            "region2": ["大阪府"],
            "region1": ["東京都"],
        }))
        .unwrap();

        let stored = selection.to_stored();
        assert_eq!(
            stored,
            json!([["region2", ["大阪府"]], ["region1", ["東京都"]]])
        );

        let restored = Selection::from_stored(&stored).unwrap();
        let leaves: Vec<_> = restored.leaves().collect();
        assert_eq!(leaves, vec![("region2", "大阪府"), ("region1", "東京都")]);
    }

    #[test]
    fn test_stored_form_accepts_legacy_object_and_rejects_bad_pairs() {
        let legacy = Selection::from_stored(&json!({"k": ["a"]})).unwrap();
        assert_eq!(legacy.leaf_count(), 1);

        assert_eq!(
            Selection::from_stored(&json!([["k", ["a"]], ["only-key"]])),
            Err(SelectionError::MalformedStoredGroup(1))
        );
        assert_eq!(
            Selection::from_stored(&json!([["k", [1]]])),
            Err(SelectionError::NonStringEntry {
                group: "k".to_string(),
                index: 0
            })
        );
    }

    #[test]
    fn test_malformed_selection_maps_to_app_error() {
        let err: AppError = SelectionError::GroupNotAList("k".to_string()).into();
        assert!(matches!(err, AppError::MalformedSelection(_)));
    }
}
