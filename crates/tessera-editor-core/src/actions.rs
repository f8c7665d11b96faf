//! Key actions and handler outcomes.
//!
//! Platform-agnostic definitions for the keyboard-driven structural actions.
//! `Key` and `Modifiers` describe a raw key press; `KeyAction` is the semantic
//! intent that key handlers receive.

use smol_str::SmolStr;

use crate::transform::Transaction;

/// Key values for keyboard input.
///
/// Platform-specific code converts from native key events to this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown key, or a named key no binding uses.
    Unidentified,

    Backspace,
    Enter,
    Tab,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Backspace" => Self::Backspace,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            other if other.chars().count() == 1 => Self::Character(other.into()),
            _ => Self::Unidentified,
        }
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// A key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Structural actions offered to key handlers before default editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Tab.
    IncreaseIndent,
    /// Shift+Tab.
    DecreaseIndent,
    /// Enter.
    Split,
    /// Backspace.
    DeleteBackward,
}

impl KeyAction {
    /// Map a key combination to an action using the default bindings.
    pub fn from_combo(combo: &KeyCombo) -> Option<Self> {
        let m = combo.modifiers;
        match (&combo.key, m) {
            (Key::Tab, m) if m.is_none() => Some(Self::IncreaseIndent),
            (Key::Tab, Modifiers::SHIFT) => Some(Self::DecreaseIndent),
            (Key::Enter, m) if m.is_none() => Some(Self::Split),
            (Key::Backspace, m) if m.is_none() => Some(Self::DeleteBackward),
            _ => None,
        }
    }
}

/// What a key handler decided.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Not ours; fall through to the next handler or default behaviour.
    Ignored,
    /// Consumed without changing the document.
    Handled,
    /// Consumed; apply this patch.
    Apply(Transaction),
}

impl KeyOutcome {
    /// `true` when default handling must be suppressed.
    pub fn is_handled(&self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }
}
