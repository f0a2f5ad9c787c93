//! Configuration for the caret navigation controller

use serde::Deserialize;

use crate::error::{CaretError, Result};
use crate::keyboard::Key;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaretConfig {
    /// Keys that start annotation creation when combined with Ctrl
    pub activation_keys: Vec<Key>,
    /// Let the Command/Meta modifier stand in for Ctrl
    pub accept_meta_key: bool,
    /// Class carried by every rendered highlight
    pub highlight_class: String,
    /// Extra class marking a highlight whose annotation is not saved yet
    pub temporary_class: String,
}

impl Default for CaretConfig {
    fn default() -> Self {
        Self {
            activation_keys: vec![Key::Enter, Key::Space],
            accept_meta_key: false,
            highlight_class: "annotator-hl".to_string(),
            temporary_class: "annotator-hl-temporary".to_string(),
        }
    }
}

impl CaretConfig {
    /// Parse a (possibly partial) JSON document; missing fields use defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CaretConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.activation_keys.is_empty() {
            return Err(CaretError::InvalidConfig(
                "at least one activation key is required".to_string(),
            ));
        }

        for (field, class) in [
            ("highlight_class", &self.highlight_class),
            ("temporary_class", &self.temporary_class),
        ] {
            if class.is_empty() || class.chars().any(char::is_whitespace) {
                return Err(CaretError::InvalidConfig(format!(
                    "{} must be a single non-empty class name, got {:?}",
                    field, class
                )));
            }
        }

        if self.highlight_class == self.temporary_class {
            return Err(CaretError::InvalidConfig(
                "temporary_class must differ from highlight_class".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_activation_key(&self, key: Key) -> bool {
        self.activation_keys.contains(&key)
    }
}
