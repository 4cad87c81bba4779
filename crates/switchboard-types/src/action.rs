//! Action tree nodes and their attributes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ActionKind;

/// A scalar attribute value attached to an action (voice, language, `to`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Rendering hints for a single action, keyed by attribute name.
///
/// The mapping is semantically unordered; a sorted map keeps rendered output
/// deterministic.
pub type Attributes = BTreeMap<String, AttrValue>;

/// One unit of voice output.
///
/// Only container kinds (see [`ActionKind::is_container`]) carry children.
/// The order of `children`, like the order of sibling nodes, is the playback
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionNode {
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ActionNode>,
}

impl ActionNode {
    /// Creates a childless node with no attributes.
    pub fn new(kind: ActionKind, payload: Option<String>) -> Self {
        Self {
            kind,
            payload,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Returns the attribute stored under `key`, if any.
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_value_display() {
        assert_eq!(AttrValue::from("woman").to_string(), "woman");
        assert_eq!(AttrValue::from(3_602_636_483_i64).to_string(), "3602636483");
        assert_eq!(AttrValue::from(true).to_string(), "true");
        assert_eq!(AttrValue::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn empty_fields_are_omitted_from_json() {
        let node = ActionNode::new(ActionKind::Hangup, None);
        let json = serde_json::to_value(&node).expect("should serialize");
        assert_eq!(json, serde_json::json!({ "kind": "Hangup" }));
    }

    #[test]
    fn untagged_attributes_deserialize_to_the_narrowest_scalar() {
        let attrs: Attributes =
            serde_json::from_str(r#"{"loop": 2, "voice": "man", "beep": false}"#)
                .expect("should deserialize");
        assert_eq!(attrs["loop"], AttrValue::Int(2));
        assert_eq!(attrs["voice"], AttrValue::Text("man".to_string()));
        assert_eq!(attrs["beep"], AttrValue::Bool(false));
    }
}
