//! Key codes and key-release events
//!
//! Only the handful of codes the activation shortcut cares about are named;
//! everything else is carried through as [`Key::Other`].

use serde::{Deserialize, Serialize};

use crate::annotation::NodeId;

/// A keyboard key, identified by its DOM `keyCode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Tab,
    Enter,
    Escape,
    Space,
    Other(u32),
}

impl Key {
    pub fn from_code(code: u32) -> Self {
        match code {
            9 => Key::Tab,
            13 => Key::Enter,
            27 => Key::Escape,
            32 => Key::Space,
            other => Key::Other(other),
        }
    }

    /// Key for a DOM `KeyboardEvent.key` value; `None` for keys without a
    /// named variant
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Tab" => Some(Key::Tab),
            "Enter" => Some(Key::Enter),
            "Escape" | "Esc" => Some(Key::Escape),
            " " | "Spacebar" => Some(Key::Space),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Key::Tab => 9,
            Key::Enter => 13,
            Key::Escape => 27,
            Key::Space => 32,
            Key::Other(code) => code,
        }
    }
}

/// A key-release event delivered by the host document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl_key: bool,
    pub meta_key: bool,
    /// Node the event was dispatched on, if the host could resolve it
    pub target: Option<NodeId>,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl_key: false,
            meta_key: false,
            target: None,
        }
    }

    /// Shorthand for a Ctrl+key release
    pub fn ctrl(key: Key) -> Self {
        Self::new(key).with_ctrl(true)
    }

    pub fn with_ctrl(mut self, pressed: bool) -> Self {
        self.ctrl_key = pressed;
        self
    }

    pub fn with_meta(mut self, pressed: bool) -> Self {
        self.meta_key = pressed;
        self
    }

    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Handle for a bound key-release listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);
