//! Menu options: matchers, transitions, and the per-evaluation registry.

use regex::Regex;
use std::fmt;
use switchboard_types::{AttrValue, MenuName};

use crate::registry::Callback;

/// Decides whether a raw input value selects an option.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Matches when the input, coerced to an integer, equals this value.
    Digits(i64),
    /// Matches when the input text is exactly this string.
    Literal(String),
    /// Matches when the pattern is found anywhere in the input text.
    Pattern(Regex),
}

impl Matcher {
    /// Compiles `pattern` into a [`Matcher::Pattern`].
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    pub fn matches(&self, raw: &str) -> bool {
        match self {
            Self::Pattern(pattern) => pattern.is_match(raw),
            Self::Literal(literal) => raw == literal,
            Self::Digits(expected) => coerce_integer(raw) == *expected,
        }
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Digits(a), Self::Digits(b)) => a == b,
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digits(value) => write!(f, "{value}"),
            Self::Literal(literal) => write!(f, "{literal:?}"),
            Self::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
        }
    }
}

impl From<i64> for Matcher {
    fn from(value: i64) -> Self {
        Self::Digits(value)
    }
}

impl From<i32> for Matcher {
    fn from(value: i32) -> Self {
        Self::Digits(i64::from(value))
    }
}

impl From<u32> for Matcher {
    fn from(value: u32) -> Self {
        Self::Digits(i64::from(value))
    }
}

impl From<&str> for Matcher {
    fn from(literal: &str) -> Self {
        Self::Literal(literal.to_string())
    }
}

impl From<String> for Matcher {
    fn from(literal: String) -> Self {
        Self::Literal(literal)
    }
}

impl From<Regex> for Matcher {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

/// Coerces keypad input to an integer the way numeric options compare it.
///
/// Leading whitespace and an optional sign are accepted, then the longest run
/// of ASCII digits is read; anything after it is ignored. Input with no
/// leading digits coerces to `0`, so `"*"` or `""` only select a `0` option.
/// Values past the `i64` range saturate.
pub fn coerce_integer(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(byte - b'0');
        value = value.saturating_mul(10);
        value = if negative {
            value.saturating_sub(digit)
        } else {
            value.saturating_add(digit)
        };
    }
    value
}

/// Where an option leads, and what to run before getting there.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub menu: MenuName,
    /// Name of a callback registered on the [`crate::MenuRegistry`].
    pub callback: Option<String>,
    /// Extra value handed to the callback alongside the raw input.
    pub value: Option<AttrValue>,
}

impl Transition {
    pub fn to(menu: impl Into<MenuName>) -> Self {
        Self {
            menu: menu.into(),
            callback: None,
            value: None,
        }
    }

    #[must_use]
    pub fn with_callback(mut self, name: impl Into<String>) -> Self {
        self.callback = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<AttrValue>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl From<&str> for Transition {
    fn from(menu: &str) -> Self {
        Self::to(menu)
    }
}

impl From<MenuName> for Transition {
    fn from(menu: MenuName) -> Self {
        Self::to(menu)
    }
}

/// One registered choice within a menu evaluation.
pub struct OptionEntry<E> {
    matcher: Matcher,
    transition: Transition,
    callback: Option<Callback<E>>,
}

impl<E> OptionEntry<E> {
    pub(crate) fn new(
        matcher: Matcher,
        transition: Transition,
        callback: Option<Callback<E>>,
    ) -> Self {
        Self {
            matcher,
            transition,
            callback,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub fn destination(&self) -> &MenuName {
        &self.transition.menu
    }

    pub(crate) fn callback(&self) -> Option<&Callback<E>> {
        self.callback.as_ref()
    }
}

impl<E> Clone for OptionEntry<E> {
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher.clone(),
            transition: self.transition.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<E> fmt::Debug for OptionEntry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionEntry")
            .field("matcher", &self.matcher)
            .field("transition", &self.transition)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Options registered by one menu evaluation, in registration order.
///
/// Order is priority: [`OptionRegistry::first_match`] returns the earliest
/// entry that accepts the input, even if a later entry would also accept it.
pub struct OptionRegistry<E> {
    entries: Vec<OptionEntry<E>>,
}

impl<E> OptionRegistry<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, entry: OptionEntry<E>) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionEntry<E>> {
        self.entries.iter()
    }

    pub fn first_match(&self, raw: &str) -> Option<&OptionEntry<E>> {
        self.entries.iter().find(|entry| entry.matcher.matches(raw))
    }
}

impl<E> Default for OptionRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for OptionRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<E> fmt::Debug for OptionRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registry(entries: Vec<(Matcher, &str)>) -> OptionRegistry<()> {
        let mut options = OptionRegistry::new();
        for (matcher, menu) in entries {
            options.push(OptionEntry::new(matcher, Transition::to(menu), None));
        }
        options
    }

    #[test]
    fn pattern_matches_anywhere_in_the_input() {
        let matcher = Matcher::pattern("50").expect("valid pattern");
        assert!(matcher.matches("50"));
        assert!(matcher.matches("1500"));
        assert!(!matcher.matches("6523"));
    }

    #[test]
    fn literal_requires_exact_text() {
        let matcher = Matcher::from("*");
        assert!(matcher.matches("*"));
        assert!(!matcher.matches("**"));
        assert!(!matcher.matches("6523"));
    }

    #[test]
    fn digits_compare_as_integers() {
        assert!(Matcher::from(1).matches("1"));
        assert!(Matcher::from(1).matches("01"));
        assert!(!Matcher::from(1).matches("99"));
    }

    #[test]
    fn non_numeric_input_only_selects_zero() {
        assert!(Matcher::from(0).matches("*"));
        assert!(Matcher::from(0).matches(""));
        assert!(!Matcher::from(1).matches("#"));
    }

    #[test]
    fn coerce_integer_reads_leading_digits() {
        assert_eq!(coerce_integer("42"), 42);
        assert_eq!(coerce_integer("  7"), 7);
        assert_eq!(coerce_integer("12abc"), 12);
        assert_eq!(coerce_integer("-3"), -3);
        assert_eq!(coerce_integer("+8"), 8);
        assert_eq!(coerce_integer("abc"), 0);
        assert_eq!(coerce_integer("#"), 0);
        assert_eq!(coerce_integer("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn first_match_respects_registration_order() {
        let options = registry(vec![
            (Matcher::pattern("50").expect("valid pattern"), "b"),
            (Matcher::from("*"), "c"),
            (Matcher::from(1), "d"),
        ]);

        let hit = |raw: &str| options.first_match(raw).map(|e| e.destination().to_string());
        assert_eq!(hit("50").as_deref(), Some("b"));
        assert_eq!(hit("*").as_deref(), Some("c"));
        assert_eq!(hit("1").as_deref(), Some("d"));
        assert_eq!(hit("99"), None);
    }

    #[test]
    fn earlier_exact_entry_is_not_pre_empted_by_a_later_pattern() {
        let options = registry(vec![
            (Matcher::from(5), "exact"),
            (Matcher::pattern(".*").expect("valid pattern"), "anything"),
        ]);
        assert_eq!(
            options.first_match("5").map(|e| e.destination().as_str()),
            Some("exact")
        );
        assert_eq!(
            options.first_match("7").map(|e| e.destination().as_str()),
            Some("anything")
        );
    }

    #[test]
    fn transition_builder_sets_callback_and_value() {
        let transition = Transition::to("zip_menu")
            .with_callback("store_zip")
            .with_value("billing");
        assert_eq!(transition.menu, MenuName::new("zip_menu"));
        assert_eq!(transition.callback.as_deref(), Some("store_zip"));
        assert_eq!(transition.value, Some(AttrValue::from("billing")));
    }

    proptest! {
        #[test]
        fn coerce_integer_agrees_with_parse_for_plain_numbers(n in 0i64..1_000_000_000) {
            prop_assert_eq!(coerce_integer(&n.to_string()), n);
        }

        #[test]
        fn digit_matcher_ignores_trailing_garbage(n in 0i64..10_000, tail in "[*#a-z]{0,4}") {
            let raw = format!("{n}{tail}");
            prop_assert!(Matcher::from(n).matches(&raw));
        }
    }
}
