//! Shared types for the Switchboard IVR workspace.
//!
//! This crate provides the value types passed between the menu core, the
//! persistence layer and the renderers: menu names, the closed vocabulary of
//! voice actions, action tree nodes with their scalar attributes, and the
//! input bag a telephony platform posts back after gathering digits.
//!
//! Nothing here knows how menus are evaluated or stored. Keeping these types
//! free of behaviour lets every other crate depend on them without pulling in
//! the state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

mod action;
mod input;

pub use action::{ActionNode, AttrValue, Attributes};
pub use input::{InputBag, DIGITS_FIELD};

/// Identifier of a menu state.
///
/// Menu names are compared by their exact text. They are stored verbatim in
/// the `current_menu` column of a call row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuName(String);

impl MenuName {
    /// Creates a menu name from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MenuName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MenuName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MenuName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&MenuName> for MenuName {
    fn from(name: &MenuName) -> Self {
        name.clone()
    }
}

impl AsRef<str> for MenuName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The closed vocabulary of voice actions.
///
/// New actions are added here as new variants; the renderers match on this
/// enum exhaustively so a new entry cannot be silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Speak text with the platform's text-to-speech engine.
    Say,
    /// Play an audio file from a URL.
    Play,
    /// Collect keypad digits, optionally while playing nested actions.
    Gather,
    /// Record the caller, optionally around nested actions.
    Record,
    /// Dial a single number.
    Dial,
    /// Dial several numbers at once; the numbers are nested `Number` actions.
    DialMultiple,
    /// A number inside a `DialMultiple`.
    Number,
    /// Send a text message.
    SendMessage,
    /// Hand control to another document URL.
    Redirect,
    /// Wait silently.
    Pause,
    /// End the call.
    Hangup,
}

impl ActionKind {
    /// Every kind, in declaration order.
    pub const ALL: [ActionKind; 11] = [
        Self::Say,
        Self::Play,
        Self::Gather,
        Self::Record,
        Self::Dial,
        Self::DialMultiple,
        Self::Number,
        Self::SendMessage,
        Self::Redirect,
        Self::Pause,
        Self::Hangup,
    ];

    /// Whether nodes of this kind may hold children.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Gather | Self::Record | Self::DialMultiple)
    }

    /// Returns the markup element name for this kind.
    ///
    /// `DialMultiple` shares the `Dial` element; it differs from `Dial` only
    /// in carrying its numbers as children instead of a payload.
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Say => "Say",
            Self::Play => "Play",
            Self::Gather => "Gather",
            Self::Record => "Record",
            Self::Dial | Self::DialMultiple => "Dial",
            Self::Number => "Number",
            Self::SendMessage => "Sms",
            Self::Redirect => "Redirect",
            Self::Pause => "Pause",
            Self::Hangup => "Hangup",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}
