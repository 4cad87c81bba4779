//! The parameter bag a telephony platform posts back to the application.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field holding the keypad digits the caller entered.
pub const DIGITS_FIELD: &str = "Digits";

/// An unordered mapping of request field names to their raw text values.
///
/// The bag is handed verbatim to menu bodies and option callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputBag(BTreeMap<String, String>);

impl InputBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bag holding only a `Digits` field.
    pub fn digits(digits: impl Into<String>) -> Self {
        let mut bag = Self::new();
        bag.insert(DIGITS_FIELD, digits);
        bag
    }

    /// Inserts or replaces a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns the raw value of a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for InputBag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
